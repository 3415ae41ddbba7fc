use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{ChannelId, CreateMessage, GuildId, Http, MessageId, RoleId, UserId};
use tracing::debug;

use crate::bot::error::Error;
use crate::constants::messages::{BAN_REASON, KICK_REASON};
use crate::constants::moderation::MEMBER_PAGE_SIZE;
use crate::services::enforcement::Enforcer;

/// Enforcement over the Discord REST API
pub struct DiscordEnforcer {
    http: Arc<Http>,
}

impl DiscordEnforcer {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Enforcer for DiscordEnforcer {
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), Error> {
        let http: &Http = &self.http;
        ChannelId::new(channel_id)
            .delete_message(http, MessageId::new(message_id))
            .await?;

        debug!("Deleted message {} in channel {}", message_id, channel_id);
        Ok(())
    }

    async fn warn_user(&self, user_id: u64, text: &str) -> Result<(), Error> {
        let http: &Http = &self.http;
        let dm_channel = UserId::new(user_id).create_dm_channel(http).await?;
        dm_channel
            .send_message(http, CreateMessage::new().content(text))
            .await?;

        debug!("Sent private notice to user {}", user_id);
        Ok(())
    }

    async fn kick_user(&self, chat_id: u64, user_id: u64) -> Result<(), Error> {
        let http: &Http = &self.http;
        GuildId::new(chat_id)
            .kick_with_reason(http, UserId::new(user_id), KICK_REASON)
            .await?;
        Ok(())
    }

    async fn ban_user(&self, chat_id: u64, user_id: u64) -> Result<(), Error> {
        let http: &Http = &self.http;
        GuildId::new(chat_id)
            .ban_with_reason(http, UserId::new(user_id), 0, BAN_REASON)
            .await?;
        Ok(())
    }

    /// The guild owner plus every member holding an ADMINISTRATOR role
    async fn list_administrators(&self, chat_id: u64) -> Result<HashSet<u64>, Error> {
        let http: &Http = &self.http;
        let guild_id = GuildId::new(chat_id);
        let guild = guild_id.to_partial_guild(http).await?;

        let admin_roles: HashSet<RoleId> = guild
            .roles
            .values()
            .filter(|role| role.permissions.administrator())
            .map(|role| role.id)
            .collect();

        let mut admins = HashSet::from([guild.owner_id.get()]);
        let mut after: Option<UserId> = None;

        loop {
            let page = guild_id.members(http, Some(MEMBER_PAGE_SIZE), after).await?;

            admins.extend(
                page.iter()
                    .filter(|m| m.roles.iter().any(|r| admin_roles.contains(r)))
                    .map(|m| m.user.id.get()),
            );

            if (page.len() as u64) < MEMBER_PAGE_SIZE {
                break;
            }
            after = page.last().map(|m| m.user.id);
        }

        Ok(admins)
    }
}
