pub mod discord;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::bot::error::Error;

pub use discord::DiscordEnforcer;

/// Platform calls the moderation pipeline needs. Each call is attempted once.
#[async_trait]
pub trait Enforcer: Send + Sync {
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), Error>;

    /// Send a private message to the user
    async fn warn_user(&self, user_id: u64, text: &str) -> Result<(), Error>;

    /// Remove the user from the chat; they may rejoin
    async fn kick_user(&self, chat_id: u64, user_id: u64) -> Result<(), Error>;

    async fn ban_user(&self, chat_id: u64, user_id: u64) -> Result<(), Error>;

    async fn list_administrators(&self, chat_id: u64) -> Result<HashSet<u64>, Error>;
}
