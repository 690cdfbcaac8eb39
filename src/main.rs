mod config;
mod discord_bot;
mod prediction;
mod service;
mod sources;

use crate::config::Config;
use crate::discord_bot::Handler;
use crate::service::PredictionService;
use dotenv::dotenv;
use serenity::all::GatewayIntents;
use serenity::Client;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    info!(
        "predictions reset daily at {}, phrases from {}, memes from {}",
        config.reset_at.format("%H:%M"),
        config.phrases_file.display(),
        config.memes_dir.display()
    );

    let service = Arc::new(PredictionService::new(&config));

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler::new(service))
        .await?;

    client.start().await?;
    Ok(())
}
