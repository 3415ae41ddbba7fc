use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::bot::error::Error;
use crate::db::models::{
    ActivityCounts, PunishmentRecord, ScoringFailure, SpamJudgment, ViolationRecord,
};
use crate::db::queries::{judgment, punishment, scoring_failure, usage, violation, whitelist};

/// Durable moderation state: violation records, the judgment audit log,
/// punishment decisions, daily scoring usage and the persisted whitelist.
///
/// Every method is a single atomic operation from the caller's point of view.
#[async_trait]
pub trait ModerationStore: Send + Sync {
    async fn violation(&self, user_id: i64) -> Result<Option<ViolationRecord>, Error>;

    /// Append a spam judgment and store the author's new epoch count in one
    /// transaction, bumping their lifetime total. Returns None without writing
    /// anything if the message was already judged.
    async fn commit_spam_verdict(
        &self,
        judgment: &SpamJudgment,
        violation_count: i32,
    ) -> Result<Option<ViolationRecord>, Error>;

    /// Force a user's count back to zero. Returns false if there was nothing to reset.
    async fn reset_violation(&self, user_id: i64) -> Result<bool, Error>;

    /// Delete records whose last violation is older than `cutoff`
    async fn compact_violations(&self, cutoff: DateTime<Utc>) -> Result<u64, Error>;

    /// True once a message was judged or its scoring failed
    async fn message_processed(&self, chat_id: i64, message_id: i64) -> Result<bool, Error>;

    /// Append a non-spam judgment to the audit log. Returns false if the
    /// message was already judged.
    async fn insert_judgment(&self, judgment: &SpamJudgment) -> Result<bool, Error>;

    /// Returns false if a failure was already recorded for the message
    async fn record_scoring_failure(&self, failure: &ScoringFailure) -> Result<bool, Error>;

    /// Returns false if the message already has a punishment decision
    async fn insert_punishment(&self, record: &PunishmentRecord) -> Result<bool, Error>;

    /// Atomically take one scoring call from `day`'s quota.
    /// Returns the new count, or None if `limit` calls were already made.
    async fn try_consume_usage(&self, day: NaiveDate, limit: u32) -> Result<Option<u32>, Error>;

    async fn usage(&self, day: NaiveDate) -> Result<u32, Error>;

    async fn whitelist(&self) -> Result<Vec<i64>, Error>;

    async fn add_whitelist(&self, user_id: i64) -> Result<bool, Error>;

    async fn remove_whitelist(&self, user_id: i64) -> Result<bool, Error>;

    /// Judgment and punishment counts since `since`, plus users with a
    /// violation at or after `active_cutoff`
    async fn activity_since(
        &self,
        since: DateTime<Utc>,
        active_cutoff: DateTime<Utc>,
    ) -> Result<ActivityCounts, Error>;
}

/// Postgres-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModerationStore for PgStore {
    async fn violation(&self, user_id: i64) -> Result<Option<ViolationRecord>, Error> {
        Ok(violation::get(&self.pool, user_id).await?)
    }

    async fn commit_spam_verdict(
        &self,
        record: &SpamJudgment,
        violation_count: i32,
    ) -> Result<Option<ViolationRecord>, Error> {
        let mut tx = self.pool.begin().await?;

        if !judgment::insert(&mut *tx, record).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let updated =
            violation::record_violation(&mut *tx, record.user_id, violation_count, record.judged_at)
                .await?;
        tx.commit().await?;

        Ok(Some(updated))
    }

    async fn reset_violation(&self, user_id: i64) -> Result<bool, Error> {
        Ok(violation::reset(&self.pool, user_id).await?)
    }

    async fn compact_violations(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        Ok(violation::delete_expired(&self.pool, cutoff).await?)
    }

    async fn message_processed(&self, chat_id: i64, message_id: i64) -> Result<bool, Error> {
        Ok(judgment::message_processed(&self.pool, chat_id, message_id).await?)
    }

    async fn insert_judgment(&self, record: &SpamJudgment) -> Result<bool, Error> {
        Ok(judgment::insert(&self.pool, record).await?)
    }

    async fn record_scoring_failure(&self, failure: &ScoringFailure) -> Result<bool, Error> {
        Ok(scoring_failure::insert(&self.pool, failure).await?)
    }

    async fn insert_punishment(&self, record: &PunishmentRecord) -> Result<bool, Error> {
        Ok(punishment::insert(&self.pool, record).await?)
    }

    async fn try_consume_usage(&self, day: NaiveDate, limit: u32) -> Result<Option<u32>, Error> {
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        let count = usage::try_increment(&self.pool, day, limit).await?;
        Ok(count.map(|c| c.max(0) as u32))
    }

    async fn usage(&self, day: NaiveDate) -> Result<u32, Error> {
        let row = usage::get(&self.pool, day).await?;
        Ok(row.map(|r| r.calls_made.max(0) as u32).unwrap_or(0))
    }

    async fn whitelist(&self) -> Result<Vec<i64>, Error> {
        Ok(whitelist::list(&self.pool).await?)
    }

    async fn add_whitelist(&self, user_id: i64) -> Result<bool, Error> {
        Ok(whitelist::add(&self.pool, user_id).await?)
    }

    async fn remove_whitelist(&self, user_id: i64) -> Result<bool, Error> {
        Ok(whitelist::remove(&self.pool, user_id).await?)
    }

    async fn activity_since(
        &self,
        since: DateTime<Utc>,
        active_cutoff: DateTime<Utc>,
    ) -> Result<ActivityCounts, Error> {
        let (judged, spam) = judgment::counts_since(&self.pool, since).await?;
        let actions = punishment::action_counts_since(&self.pool, since).await?;
        let active_violators = violation::count_active(&self.pool, active_cutoff).await?;

        let mut counts = ActivityCounts {
            judged,
            spam,
            active_violators,
            ..Default::default()
        };
        for (action, count) in actions {
            counts.add_action(&action, count);
        }

        Ok(counts)
    }
}
