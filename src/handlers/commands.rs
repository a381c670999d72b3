use teloxide::prelude::*;
use teloxide::types::ParseMode;
use std::error::Error;

use crate::app_state::AppState;
use crate::handlers::utils::{
    escape_markdown_v2, main_menu_keyboard, provider_cards_text, providers_keyboard,
    show_bookings, show_profile, show_services,
};
use crate::models::{Profile, ServiceProvider};

use crate::Command;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: AppState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await?,
        Command::Help => handle_help(bot, msg).await?,
        Command::Services => show_services(&bot, msg.chat.id, &state).await?,
        Command::Bookings => show_bookings(&bot, msg.chat.id, &state, "all", None).await?,
        Command::Profile => show_profile(&bot, msg.chat.id, &state).await?,
        Command::Search(query) => handle_search(bot, msg, state, query).await?,
    }
    Ok(())
}

async fn handle_start(
    bot: Bot,
    msg: Message,
    state: AppState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let full_name = match (msg.chat.first_name(), msg.chat.last_name()) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        (Some(first), None) => first.to_string(),
        _ => String::new(),
    };

    // Registering the profile is what makes bookings possible later
    if let Err(e) = Profile::upsert(&state.db, msg.chat.id, &full_name).await {
        log::error!("Error registering profile for user {}: {}", msg.chat.id, e);
    }

    let start_text = "👋 *Welcome to Habi\\!*\n\n\
        🤖 *Who am I?*\n\
        I'm Habi, your personal service assistant\\. I help you find and book \
        vetted local professionals — plumbers, electricians, IT techs, cleaners \
        and more\\.\n\n\
        📋 *Commands:*\n\
        /services – browse service categories\n\
        /bookings – track your service requests\n\
        /profile – your profile\n\
        /search – find providers, e\\.g\\. `/search aircon near Makati`\n\n\
        🛠️ *How it works:*\n\
        1\\. Tell me what you need \\(\"my sink is leaking\"\\)\n\
        2\\. Pick one of the matched professionals\n\
        3\\. Choose a date, time and details\n\
        4\\. The provider contacts you to confirm\n\n\
        What home service do you need today?";

    bot.send_message(msg.chat.id, start_text)
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(main_menu_keyboard())
        .await?;

    Ok(())
}

pub async fn handle_help(bot: Bot, msg: Message) -> Result<(), Box<dyn Error + Send + Sync>> {
    bot.send_message(
        msg.chat.id,
        "ℹ️ *Habi help*\n\n\
        /start \\- main menu\n\
        /services \\- browse service categories\n\
        /bookings \\- my bookings\n\
        /profile \\- my profile\n\
        /search \\- search providers\n\n\
        *Tips:*\n\
        • Just describe your problem in chat — I'll match it to a service\n\
        • Add `near <place>` to a search to filter by location\n\
        • Bookings start as *pending* until the provider confirms",
    )
    .parse_mode(ParseMode::MarkdownV2)
    .await?;

    Ok(())
}

async fn handle_search(
    bot: Bot,
    msg: Message,
    state: AppState,
    query: String,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let query = query.trim();
    if query.is_empty() {
        bot.send_message(
            msg.chat.id,
            "🔍 Usage: `/search what you need`, optionally followed by `near location`\\.\n\
             Example: `/search aircon repair near Makati`",
        )
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
        return Ok(());
    }

    // A trailing "near <place>" clause narrows by location
    let (term, location) = match query.split_once(" near ") {
        Some((term, location)) => (term.trim(), Some(location.trim())),
        None => (query, None),
    };

    let providers = ServiceProvider::search(&state.db, term, location).await;

    if providers.is_empty() {
        bot.send_message(
            msg.chat.id,
            format!("🔍 No providers matched \"{}\". Try a different search term.", query),
        )
        .await?;
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        format!(
            "🔍 *Search results for* {}:\n\n{}",
            escape_markdown_v2(query),
            provider_cards_text(&providers),
        ),
    )
    .parse_mode(ParseMode::MarkdownV2)
    .reply_markup(providers_keyboard(&providers))
    .await?;

    Ok(())
}
