use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::bot::error::Error;
use crate::db::store::ModerationStore;
use crate::utils::clock::Clock;

/// Today's scoring quota
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaUsage {
    pub day: NaiveDate,
    pub calls_made: u32,
    pub daily_limit: u32,
}

impl QuotaUsage {
    pub fn remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.calls_made)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

/// Gates scoring calls behind a per-day quota.
///
/// The counter is keyed by calendar day, so the first call of a new day
/// lands on a fresh zero counter; there is no scheduled reset. The
/// check-and-increment is a single store operation, which keeps concurrent
/// callers from overrunning the limit.
pub struct RateLimiter {
    store: Arc<dyn ModerationStore>,
    clock: Arc<dyn Clock>,
    daily_limit: u32,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn ModerationStore>, clock: Arc<dyn Clock>, daily_limit: u32) -> Self {
        Self {
            store,
            clock,
            daily_limit,
        }
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Take one unit of today's quota and return the calls made so far.
    /// `Error::QuotaExhausted` is the normal "skip scoring" signal.
    pub async fn try_consume(&self) -> Result<u32, Error> {
        let day = self.clock.today();

        match self.store.try_consume_usage(day, self.daily_limit).await? {
            Some(calls_made) => {
                debug!("API usage incremented: {}/{}", calls_made, self.daily_limit);
                Ok(calls_made)
            }
            None => {
                warn!("Daily API limit reached: {}/{}", self.daily_limit, self.daily_limit);
                Err(Error::QuotaExhausted)
            }
        }
    }

    pub async fn usage(&self) -> Result<QuotaUsage, Error> {
        let day = self.clock.today();
        let calls_made = self.store.usage(day).await?;

        Ok(QuotaUsage {
            day,
            calls_made,
            daily_limit: self.daily_limit,
        })
    }
}
