use teloxide::prelude::*;
use teloxide::types::{ChatAction, ParseMode};
use std::error::Error;

use crate::app_state::AppState;
use crate::classifier;
use crate::forms::TextField;
use crate::handlers::commands::handle_help;
use crate::handlers::utils::{
    booking_summary_text, confirm_keyboard, main_menu_keyboard, provider_cards_text,
    providers_keyboard, show_bookings, show_profile, show_services, skip_instructions_keyboard,
};
use crate::models::BookingDraft;

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: AppState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let chat_id = msg.chat.id;

    if let Some(text) = msg.text().map(str::to_string) {
        // Commands are already handled in command_handler
        if text.starts_with('/') {
            return Ok(());
        }

        match text.as_str() {
            "🛠 Services" => {
                show_services(&bot, chat_id, &state).await?;
            }
            "📋 My Bookings" => {
                show_bookings(&bot, chat_id, &state, "all", None).await?;
            }
            "👤 Profile" => {
                show_profile(&bot, chat_id, &state).await?;
            }
            "ℹ️ Help" => {
                handle_help(bot, msg).await?;
            }
            _ => {
                let mut session = state.session(chat_id).await;

                // An in-progress booking draft consumes free text first
                if let Some(draft) = session.draft.as_mut() {
                    if fill_draft_field(&bot, chat_id, draft, &text).await? {
                        state.save_session(chat_id, session).await;
                        return Ok(());
                    }
                }

                let _ = bot.send_chat_action(chat_id, ChatAction::Typing).await;

                let reply = classifier::respond(&state.db, &mut session, &text).await;
                bot.send_message(chat_id, reply.text.clone()).await?;

                if !reply.providers.is_empty() {
                    bot.send_message(chat_id, provider_cards_text(&reply.providers))
                        .parse_mode(ParseMode::MarkdownV2)
                        .reply_markup(providers_keyboard(&reply.providers))
                        .await?;
                }

                state.save_session(chat_id, session).await;
            }
        }
    } else {
        bot.send_message(chat_id, "👋 Tell me what service you need, or use the menu below.")
            .reply_markup(main_menu_keyboard())
            .await?;
    }

    Ok(())
}

enum NextPrompt {
    Description,
    Instructions,
    Summary,
}

/// Routes a text message into the field the draft is waiting on. Returns
/// false when the draft isn't expecting text, letting the assistant answer.
async fn fill_draft_field(
    bot: &Bot,
    chat_id: ChatId,
    draft: &mut BookingDraft,
    text: &str,
) -> Result<bool, Box<dyn Error + Send + Sync>> {
    let next = match draft {
        BookingDraft::General(form) => match form.awaiting {
            Some(TextField::Location) => {
                form.location = text.to_string();
                form.awaiting = Some(TextField::Description);
                NextPrompt::Description
            }
            Some(TextField::Description) => {
                form.description = text.to_string();
                form.awaiting = None;
                NextPrompt::Summary
            }
            _ => return Ok(false),
        },
        BookingDraft::Laundry(form) => match form.awaiting {
            Some(TextField::PickupAddress) => {
                form.address = text.to_string();
                form.awaiting = Some(TextField::Instructions);
                NextPrompt::Instructions
            }
            Some(TextField::Instructions) => {
                form.instructions = text.to_string();
                form.awaiting = None;
                NextPrompt::Summary
            }
            _ => return Ok(false),
        },
    };

    match next {
        NextPrompt::Description => {
            bot.send_message(chat_id, "📝 Describe the problem or service needed in detail.")
                .await?;
        }
        NextPrompt::Instructions => {
            bot.send_message(
                chat_id,
                "Any special instructions for the pickup? Send them now, or skip.",
            )
            .reply_markup(skip_instructions_keyboard())
            .await?;
        }
        NextPrompt::Summary => {
            bot.send_message(chat_id, booking_summary_text(draft))
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(confirm_keyboard())
                .await?;
        }
    }

    Ok(true)
}
