use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, FullEvent};
use tracing::{debug, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::handlers::message;

pub async fn event_handler(
    _ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Arc<Data>, Error>,
    data: &Arc<Data>,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            info!("Bot ready as {}", data_about_bot.user.name);
        }

        FullEvent::Message { new_message } => {
            message::handle_message(data, new_message).await;
        }

        FullEvent::GuildDelete { incomplete, .. } => {
            debug!("Guild {} removed", incomplete.id);
        }

        _ => {}
    }

    Ok(())
}
