use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};
use std::error::Error;
use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::database::DbError;
use crate::forms::{
    ContactPreference, GeneralBookingForm, LaundryBookingForm, TextField, Urgency,
    DURATION_OPTIONS, LAUNDRY_CATEGORY,
};
use crate::handlers::utils::{
    booking_summary_text, confirm_keyboard, contact_keyboard, duration_keyboard,
    escape_markdown_v2, format_money, general_time_slots, laundry_services_keyboard,
    make_calendar_keyboard, make_days_keyboard, provider_cards_text, providers_keyboard,
    show_bookings, time_slots_keyboard, urgency_keyboard, LAUNDRY_TIME_SLOTS,
};
use crate::models::{Booking, BookingDraft, BookingStatus, ServiceProvider};

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: AppState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if let Some(data) = q.data.as_deref() {
        if let Some(ref message) = q.message {
            let chat_id = message.chat().id;
            let message_id = message.id();

            match data {
                data if data.starts_with("category_") => {
                    let category = data.strip_prefix("category_").unwrap();
                    show_category_providers(&bot, chat_id, message_id, &state, category).await?;
                }

                data if data.starts_with("book_") => {
                    let id = data.strip_prefix("book_").unwrap();
                    start_booking(&bot, chat_id, message_id, &state, id).await?;
                }

                data if data.starts_with("calendar_") => {
                    handle_calendar_callback(&bot, chat_id, message_id, &state, data).await?;
                }

                data if data.starts_with("slot_") => {
                    let slot = data.strip_prefix("slot_").unwrap();
                    handle_time_selection(&bot, chat_id, message_id, &state, slot).await?;
                }

                data if data.starts_with("urgency_") => {
                    let value = data.strip_prefix("urgency_").unwrap();
                    if let Some(urgency) = Urgency::from_value(value) {
                        let mut session = state.session(chat_id).await;
                        if let Some(BookingDraft::General(form)) = session.draft.as_mut() {
                            form.urgency = urgency;
                            state.save_session(chat_id, session).await;

                            bot.edit_message_text(
                                chat_id,
                                message_id,
                                "⏱ How long do you expect the job to take?",
                            )
                            .reply_markup(duration_keyboard())
                            .await?;
                        }
                    }
                }

                data if data.starts_with("duration_") => {
                    let idx: usize = data.strip_prefix("duration_").unwrap().parse().unwrap_or(1);
                    let duration = DURATION_OPTIONS.get(idx).copied().unwrap_or("1-2 hours");

                    let mut session = state.session(chat_id).await;
                    if let Some(BookingDraft::General(form)) = session.draft.as_mut() {
                        form.duration = duration.to_string();
                        state.save_session(chat_id, session).await;

                        bot.edit_message_text(
                            chat_id,
                            message_id,
                            "📲 How should the provider contact you?",
                        )
                        .reply_markup(contact_keyboard())
                        .await?;
                    }
                }

                data if data.starts_with("contact_") => {
                    let value = data.strip_prefix("contact_").unwrap();
                    if let Some(contact) = ContactPreference::from_value(value) {
                        let mut session = state.session(chat_id).await;
                        if let Some(BookingDraft::General(form)) = session.draft.as_mut() {
                            form.contact = contact;
                            form.awaiting = Some(TextField::Location);
                            state.save_session(chat_id, session).await;

                            bot.edit_message_text(
                                chat_id,
                                message_id,
                                "📍 Please enter the complete address where service is needed.",
                            )
                            .await?;
                        }
                    }
                }

                "laundry_done" => {
                    let mut session = state.session(chat_id).await;
                    if let Some(BookingDraft::Laundry(form)) = session.draft.as_mut() {
                        if form.selected.is_empty() {
                            bot.send_message(chat_id, "⚠️ Please select at least one service.")
                                .await?;
                        } else {
                            form.awaiting = None;
                            state.save_session(chat_id, session).await;

                            bot.edit_message_text(chat_id, message_id, "📅 Select a pickup date:")
                                .reply_markup(make_calendar_keyboard())
                                .await?;
                        }
                    }
                }

                data if data.starts_with("laundry_") => {
                    let id = data.strip_prefix("laundry_").unwrap();
                    let mut session = state.session(chat_id).await;
                    if let Some(BookingDraft::Laundry(form)) = session.draft.as_mut() {
                        form.toggle(id);
                        let text = laundry_intro_text(form);
                        let keyboard = laundry_services_keyboard(form);
                        state.save_session(chat_id, session).await;

                        bot.edit_message_text(chat_id, message_id, text)
                            .parse_mode(ParseMode::MarkdownV2)
                            .reply_markup(keyboard)
                            .await?;
                    }
                }

                "skip_instructions" => {
                    let mut session = state.session(chat_id).await;
                    let mut skipped = false;
                    if let Some(BookingDraft::Laundry(form)) = session.draft.as_mut() {
                        if form.awaiting == Some(TextField::Instructions) {
                            form.instructions.clear();
                            form.awaiting = None;
                            skipped = true;
                        }
                    }
                    if skipped {
                        if let Some(draft) = session.draft.as_ref() {
                            bot.edit_message_text(chat_id, message_id, booking_summary_text(draft))
                                .parse_mode(ParseMode::MarkdownV2)
                                .reply_markup(confirm_keyboard())
                                .await?;
                        }
                        state.save_session(chat_id, session).await;
                    }
                }

                "submit_booking" => {
                    handle_submit(&bot, chat_id, &state).await?;
                }

                "cancel_draft" => {
                    state.clear_draft(chat_id).await;
                    bot.edit_message_text(chat_id, message_id, "❌ Booking cancelled.")
                        .await?;
                }

                data if data.starts_with("filter_") => {
                    let filter = data.strip_prefix("filter_").unwrap();
                    show_bookings(&bot, chat_id, &state, filter, Some(message_id)).await?;
                }

                data if data.starts_with("cancelbk_") => {
                    let id = data.strip_prefix("cancelbk_").unwrap();
                    cancel_booking(&bot, chat_id, message_id, &state, id).await?;
                }

                _ => {}
            }
        }
    }

    Ok(())
}

async fn show_category_providers(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &AppState,
    category: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let providers = ServiceProvider::by_category(&state.db, category, 10).await;

    if providers.is_empty() {
        bot.edit_message_text(
            chat_id,
            message_id,
            format!("😔 No verified {} providers are available right now. Please check back later.", category),
        )
        .await?;
        return Ok(());
    }

    bot.edit_message_text(
        chat_id,
        message_id,
        format!(
            "*{}*\n\n{}",
            escape_markdown_v2(category),
            provider_cards_text(&providers),
        ),
    )
    .parse_mode(ParseMode::MarkdownV2)
    .reply_markup(providers_keyboard(&providers))
    .await?;

    Ok(())
}

async fn start_booking(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &AppState,
    provider_id: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Ok(provider_id) = Uuid::parse_str(provider_id) else {
        return Ok(());
    };

    let Some(provider) = ServiceProvider::find(&state.db, provider_id).await else {
        bot.send_message(chat_id, "❌ This provider is no longer available.")
            .await?;
        return Ok(());
    };

    let mut session = state.session(chat_id).await;

    // Laundry providers get the sub-service picker; everyone else goes
    // straight to scheduling.
    if provider.service_categories.iter().any(|c| c == LAUNDRY_CATEGORY) {
        let form = LaundryBookingForm::new(provider);
        let text = laundry_intro_text(&form);
        let keyboard = laundry_services_keyboard(&form);
        session.draft = Some(BookingDraft::Laundry(form));
        state.save_session(chat_id, session).await;

        bot.edit_message_text(chat_id, message_id, text)
            .parse_mode(ParseMode::MarkdownV2)
            .reply_markup(keyboard)
            .await?;
    } else {
        let business_name = provider.business_name.clone();
        session.draft = Some(BookingDraft::General(GeneralBookingForm::new(provider)));
        state.save_session(chat_id, session).await;

        bot.edit_message_text(
            chat_id,
            message_id,
            format!(
                "📅 *Book {}*\n\nSelect a preferred service date:",
                escape_markdown_v2(&business_name),
            ),
        )
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(make_calendar_keyboard())
        .await?;
    }

    Ok(())
}

fn laundry_intro_text(form: &LaundryBookingForm) -> String {
    format!(
        "🧺 *Book Laundry Service — {}*\n\nSelect the services you need \\(tap again to deselect\\):\n\n*Estimated total:* {}",
        escape_markdown_v2(&form.provider.business_name),
        format_money(form.estimated_cost()),
    )
}

async fn handle_calendar_callback(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &AppState,
    data: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let parts: Vec<&str> = data.split('_').collect();
    if parts.len() < 2 {
        return Ok(());
    }

    let action = parts[1];
    let year = parts
        .get(2)
        .and_then(|p| p.parse::<i32>().ok())
        .unwrap_or_else(|| Utc::now().year());
    let month = parts
        .get(3)
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or_else(|| Utc::now().month());
    let day = parts.get(4).and_then(|p| p.parse::<u32>().ok()).unwrap_or(1);

    match action {
        "day" => {
            let date = format!("{:04}-{:02}-{:02}", year, month, day);

            let mut session = state.session(chat_id).await;
            let slots: Vec<String> = match session.draft.as_mut() {
                Some(BookingDraft::General(form)) => {
                    form.date = date.clone();
                    general_time_slots()
                }
                Some(BookingDraft::Laundry(form)) => {
                    form.date = date.clone();
                    LAUNDRY_TIME_SLOTS.iter().map(|s| s.to_string()).collect()
                }
                None => {
                    log::warn!("Calendar tap without an active draft from user {}", chat_id);
                    return Ok(());
                }
            };
            state.save_session(chat_id, session).await;

            bot.edit_message_text(
                chat_id,
                message_id,
                format!(
                    "🕐 *Select a preferred time*\n\n*Date:* {}",
                    escape_markdown_v2(&date),
                ),
            )
            .parse_mode(ParseMode::MarkdownV2)
            .reply_markup(time_slots_keyboard(&slots))
            .await?;
        }
        "prev" | "next" => {
            let new_month = if action == "prev" {
                if month == 1 { 12 } else { month - 1 }
            } else {
                if month == 12 { 1 } else { month + 1 }
            };

            let new_year = if action == "prev" && month == 1 {
                year - 1
            } else if action == "next" && month == 12 {
                year + 1
            } else {
                year
            };

            bot.edit_message_reply_markup(chat_id, message_id)
                .reply_markup(make_days_keyboard(new_year, new_month))
                .await?;
        }
        _ => {}
    }

    Ok(())
}

async fn handle_time_selection(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &AppState,
    slot: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut session = state.session(chat_id).await;

    match session.draft.as_mut() {
        Some(BookingDraft::General(form)) => {
            form.time = slot.to_string();
            state.save_session(chat_id, session).await;

            bot.edit_message_text(chat_id, message_id, "⚡ How urgent is the request?")
                .reply_markup(urgency_keyboard())
                .await?;
        }
        Some(BookingDraft::Laundry(form)) => {
            form.time = slot.to_string();
            form.awaiting = Some(TextField::PickupAddress);
            state.save_session(chat_id, session).await;

            bot.edit_message_text(chat_id, message_id, "📍 Please enter your pickup address.")
                .await?;
        }
        None => {}
    }

    Ok(())
}

async fn handle_submit(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut session = state.session(chat_id).await;

    let Some(draft) = session.draft.as_ref() else {
        bot.send_message(chat_id, "⚠️ This booking is no longer active.")
            .await?;
        return Ok(());
    };

    let (in_flight, record, provider_name) = match draft {
        BookingDraft::General(form) => (
            form.submitting,
            form.to_record(),
            form.provider.business_name.clone(),
        ),
        BookingDraft::Laundry(form) => (
            form.submitting,
            form.to_record(),
            form.provider.business_name.clone(),
        ),
    };

    // The in-flight flag is the only duplicate-submission guard
    if in_flight {
        return Ok(());
    }

    let record = match record {
        Ok(record) => record,
        Err(e) => {
            bot.send_message(chat_id, format!("⚠️ {}", e)).await?;
            return Ok(());
        }
    };

    set_submitting(&mut session.draft, true);
    state.save_session(chat_id, session.clone()).await;

    match Booking::create(&state.db, chat_id, &record).await {
        Ok(booking) => {
            let id = booking.id.to_string();
            let short_id = id.get(..8).unwrap_or(&id);

            bot.send_message(
                chat_id,
                format!(
                    "✅ *Booking Request Sent\\!*\n\n\
                     Your service request has been sent to {}\\. They will contact \
                     you within 30 minutes to confirm details and provide a final \
                     quote\\.\n\n\
                     *Estimated Cost:* {}\n\
                     *Booking ID:* `{}`",
                    escape_markdown_v2(&provider_name),
                    format_money(record.estimated_cost.unwrap_or(0.0)),
                    short_id,
                ),
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;

            // Reset the form back to its defaults
            session.draft = None;
            state.save_session(chat_id, session).await;
        }
        Err(e) => {
            log::error!("Error creating booking for user {}: {}", chat_id, e);

            let text = match e {
                DbError::NotAuthenticated => {
                    "⚠️ User not authenticated. Send /start and try again."
                }
                _ => "⚠️ Failed to create booking. Please try again.",
            };
            bot.send_message(chat_id, text).await?;

            set_submitting(&mut session.draft, false);
            state.save_session(chat_id, session).await;
        }
    }

    Ok(())
}

fn set_submitting(draft: &mut Option<BookingDraft>, value: bool) {
    match draft {
        Some(BookingDraft::General(form)) => form.submitting = value,
        Some(BookingDraft::Laundry(form)) => form.submitting = value,
        None => {}
    }
}

async fn cancel_booking(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &AppState,
    booking_id: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Ok(booking_id) = Uuid::parse_str(booking_id) else {
        return Ok(());
    };

    match Booking::update_status(&state.db, booking_id, BookingStatus::Cancelled).await {
        Ok(()) => {
            log::info!("✅ Booking {} cancelled by user {}", booking_id, chat_id);
            show_bookings(bot, chat_id, state, "all", Some(message_id)).await?;
        }
        Err(e) => {
            log::error!("Error cancelling booking {}: {}", booking_id, e);
            bot.send_message(chat_id, "❌ Couldn't cancel the booking. Please try again.")
                .await?;
        }
    }

    Ok(())
}
