use std::sync::Arc;

use poise::serenity_prelude::Message;
use tracing::{debug, error, warn};

use crate::bot::data::Data;
use crate::services::moderation::{Decision, InboundMessage};

impl From<&Message> for InboundMessage {
    fn from(message: &Message) -> Self {
        Self {
            chat_id: message.guild_id.map(|g| g.get()),
            channel_id: message.channel_id.get(),
            message_id: message.id.get(),
            user_id: message.author.id.get(),
            text: message.content.clone(),
            from_bot: message.author.bot,
        }
    }
}

/// Run a new guild message through the moderation pipeline.
/// Errors end this message's cycle only; they never reach the gateway loop.
pub async fn handle_message(data: &Arc<Data>, message: &Message) {
    let inbound = InboundMessage::from(message);

    match data.pipeline.process(&inbound).await {
        Ok(Decision::Judged { judgment, .. }) => {
            debug!(
                "Judged message {} from {}: score={:.1} spam={}",
                judgment.message_id, judgment.user_id, judgment.score, judgment.is_spam
            );
        }
        Ok(Decision::Skipped(_)) => {}
        Err(e) if e.is_fatal_for_message() => {
            error!(
                "Moderation of message {} from user {} abandoned, nothing was enforced: {}",
                inbound.message_id, inbound.user_id, e
            );
        }
        Err(e) => {
            warn!(
                "Moderation of message {} from user {} failed: {}",
                inbound.message_id, inbound.user_id, e
            );
        }
    }
}
