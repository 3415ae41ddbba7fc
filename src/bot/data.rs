use std::fmt;
use std::sync::Arc;

use crate::config::Settings;
use crate::db::store::ModerationStore;
use crate::services::enforcement::Enforcer;
use crate::services::moderation::ModerationPipeline;
use crate::services::quota::RateLimiter;
use crate::services::whitelist::WhitelistGuard;
use crate::utils::clock::Clock;

/// Shared data available to all commands and handlers
pub struct Data {
    pub settings: Settings,
    pub store: Arc<dyn ModerationStore>,
    pub guard: Arc<WhitelistGuard>,
    pub limiter: Arc<RateLimiter>,
    pub enforcer: Arc<dyn Enforcer>,
    pub clock: Arc<dyn Clock>,
    pub pipeline: ModerationPipeline,
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("target_guild_id", &self.settings.target_guild_id)
            .field("dry_run", &self.settings.dry_run)
            .field("whitelisted", &self.guard.whitelist_len())
            .field("administrators", &self.guard.admin_count())
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Arc<Data>, crate::bot::error::Error>;
