use teloxide::{prelude::*, utils::command::BotCommands};
use std::env;

mod app_state;
mod classifier;
mod database;
mod forms;
mod handlers;
mod models;

use crate::app_state::AppState;
use crate::database::Database;
use crate::handlers::{callback_handler, command_handler, message_handler};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
enum Command {
    #[command(description = "start the bot and open the main menu")]
    Start,
    #[command(description = "show help")]
    Help,
    #[command(description = "browse service categories")]
    Services,
    #[command(description = "show my bookings")]
    Bookings,
    #[command(description = "show my profile")]
    Profile,
    #[command(description = "search providers, e.g. /search plumber near Makati")]
    Search(String),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Starting Habi marketplace bot...");

    let database_url = env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set");

    let db = Database::new(&database_url).await?;
    db.init().await?;
    log::info!("✅ Database initialized");

    let state = AppState::new(db);
    let bot = Bot::from_env();

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler)
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
