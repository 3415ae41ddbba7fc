use chrono::Duration;

use crate::bot::error::Error;
use crate::db::store::ModerationStore;
use crate::services::quota::{QuotaUsage, RateLimiter};
use crate::services::whitelist::WhitelistGuard;
use crate::utils::clock::Clock;

/// Moderation activity for the stats command
#[derive(Debug, Clone)]
pub struct ModerationStats {
    pub usage: QuotaUsage,
    pub window_days: i64,
    pub judged: i64,
    pub spam: i64,
    pub warned: i64,
    pub kicked: i64,
    pub banned: i64,
    /// Users whose violation history has not lapsed yet
    pub active_violators: i64,
    pub whitelisted: usize,
    pub administrators: usize,
    pub dry_run: bool,
}

impl ModerationStats {
    /// Share of judged messages that were spam, in percent
    pub fn spam_rate(&self) -> f64 {
        if self.judged == 0 {
            0.0
        } else {
            self.spam as f64 * 100.0 / self.judged as f64
        }
    }
}

/// Collect today's quota usage and the rolling window's activity counts
pub async fn get_moderation_stats(
    store: &dyn ModerationStore,
    limiter: &RateLimiter,
    guard: &WhitelistGuard,
    clock: &dyn Clock,
    window_days: i64,
    reset_window: Duration,
    dry_run: bool,
) -> Result<ModerationStats, Error> {
    let usage = limiter.usage().await?;

    let now = clock.now();
    let counts = store
        .activity_since(now - Duration::days(window_days), now - reset_window)
        .await?;

    Ok(ModerationStats {
        usage,
        window_days,
        judged: counts.judged,
        spam: counts.spam,
        warned: counts.warned,
        kicked: counts.kicked,
        banned: counts.banned,
        active_violators: counts.active_violators,
        whitelisted: guard.whitelist_len(),
        administrators: guard.admin_count(),
        dry_run,
    })
}
