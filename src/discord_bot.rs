use crate::prediction::PredictionContent;
use crate::service::{Issued, PredictionService};
use chrono::Local;
use serenity::all::{Context, CreateAttachment, CreateMessage, EventHandler, Message, Ready};
use serenity::async_trait;
use std::sync::Arc;
use tracing::{error, info};

// Captions from the original bot: one for a freshly drawn fate, one for a
// user trying to re-roll the fate they already got today.
const FRESH_CAPTION: &str = "Мое предсказание для тебя";
const CACHED_CAPTION: &str = "Твое маф будущее на сегодня и не пытайся это поменять";
const TRY_AGAIN_REPLY: &str = "Предсказание не сложилось, попробуй позже";

pub struct Handler {
    service: Arc<PredictionService>,
}

impl Handler {
    pub fn new(service: Arc<PredictionService>) -> Self {
        Self { service }
    }

    async fn handle_prediction(&self, ctx: &Context, msg: &Message) {
        let now = Local::now().naive_local();
        let issued = match self.service.get_or_create(msg.author.id.get(), now).await {
            Ok(issued) => issued,
            Err(e) => {
                error!("prediction failed for user {}: {}", msg.author.id, e);
                if let Err(e) = msg.reply(&ctx.http, TRY_AGAIN_REPLY).await {
                    error!("could not send the fallback reply: {}", e);
                }
                return;
            }
        };

        if let Err(e) = self.deliver(ctx, msg, &issued).await {
            error!("could not deliver prediction to user {}: {}", msg.author.id, e);
        }
    }

    async fn deliver(
        &self,
        ctx: &Context,
        msg: &Message,
        issued: &Issued,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match &issued.prediction.content {
            PredictionContent::Phrase(text) => {
                msg.reply(&ctx.http, text.as_str()).await?;
            }
            PredictionContent::Image(file_name) => {
                let attachment =
                    CreateAttachment::path(self.service.image_path(file_name)).await?;
                let caption = if issued.from_cache {
                    CACHED_CAPTION
                } else {
                    FRESH_CAPTION
                };
                let builder = CreateMessage::new()
                    .content(caption)
                    .add_file(attachment)
                    .reference_message(msg);
                msg.channel_id.send_message(&ctx.http, builder).await?;
            }
        }
        Ok(())
    }

    async fn handle_start(&self, ctx: &Context, msg: &Message) {
        let name = msg.author.global_name.as_deref().unwrap_or(&msg.author.name);
        if let Err(e) = msg.reply(&ctx.http, format!("Hello, {}!", name)).await {
            error!("could not send greeting: {}", e);
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected and waiting for predictions", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        match msg.content.trim() {
            "!prediction" => self.handle_prediction(&ctx, &msg).await,
            "!start" => self.handle_start(&ctx, &msg).await,
            _ => {}
        }
    }
}
