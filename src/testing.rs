//! Fakes for the pipeline's collaborators

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;

use crate::bot::error::Error;
use crate::db::models::{
    ActivityCounts, PunishmentRecord, ScoringFailure, SpamJudgment, ViolationRecord,
};
use crate::db::{MemoryStore, ModerationStore};
use crate::services::enforcement::Enforcer;
use crate::services::scorer::{ScoreVerdict, SpamScorer};

#[derive(Debug, Clone, Copy)]
pub enum Script {
    Score(f64),
    Unavailable,
    Malformed,
    /// Never answers
    Hang,
}

/// Scorer that answers from a per-text script
pub struct ScriptedScorer {
    default: Script,
    scripts: Mutex<HashMap<String, Script>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedScorer {
    pub fn new(default: Script) -> Self {
        Self {
            default,
            scripts: Mutex::new(HashMap::new()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(self, text: &str, script: Script) -> Self {
        self.scripts.lock().insert(text.to_string(), script);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpamScorer for ScriptedScorer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn score(&self, message_text: &str) -> Result<ScoreVerdict, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .get(message_text)
            .copied()
            .unwrap_or(self.default);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match script {
            Script::Score(score) => Ok(ScoreVerdict {
                score,
                rationale: format!("scripted {}", score),
            }),
            Script::Unavailable => Err(Error::ScorerUnavailable("503 Service Unavailable".into())),
            Script::Malformed => Err(Error::ScorerMalformedResponse("score missing".into())),
            Script::Hang => std::future::pending().await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnforcementCall {
    Delete { channel_id: u64, message_id: u64 },
    Warn { user_id: u64 },
    Kick { chat_id: u64, user_id: u64 },
    Ban { chat_id: u64, user_id: u64 },
}

/// Enforcer that records every call instead of performing it
#[derive(Default)]
pub struct RecordingEnforcer {
    calls: Mutex<Vec<EnforcementCall>>,
    admins: Mutex<HashSet<u64>>,
    fail_warnings: AtomicBool,
    fail_removals: AtomicBool,
    fail_admin_listing: AtomicBool,
}

impl RecordingEnforcer {
    pub fn calls(&self) -> Vec<EnforcementCall> {
        self.calls.lock().clone()
    }

    pub fn set_admins(&self, admins: impl IntoIterator<Item = u64>) {
        *self.admins.lock() = admins.into_iter().collect();
    }

    pub fn fail_warnings(&self) {
        self.fail_warnings.store(true, Ordering::SeqCst);
    }

    /// Kicks and bans fail
    pub fn fail_removals(&self) {
        self.fail_removals.store(true, Ordering::SeqCst);
    }

    pub fn fail_admin_listing(&self) {
        self.fail_admin_listing.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: EnforcementCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl Enforcer for RecordingEnforcer {
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), Error> {
        self.record(EnforcementCall::Delete {
            channel_id,
            message_id,
        });
        Ok(())
    }

    async fn warn_user(&self, user_id: u64, _text: &str) -> Result<(), Error> {
        self.record(EnforcementCall::Warn { user_id });
        if self.fail_warnings.load(Ordering::SeqCst) {
            return Err(Error::custom("cannot send messages to this user"));
        }
        Ok(())
    }

    async fn kick_user(&self, chat_id: u64, user_id: u64) -> Result<(), Error> {
        self.record(EnforcementCall::Kick { chat_id, user_id });
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(Error::custom("missing KICK_MEMBERS"));
        }
        Ok(())
    }

    async fn ban_user(&self, chat_id: u64, user_id: u64) -> Result<(), Error> {
        self.record(EnforcementCall::Ban { chat_id, user_id });
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(Error::custom("missing BAN_MEMBERS"));
        }
        Ok(())
    }

    async fn list_administrators(&self, _chat_id: u64) -> Result<HashSet<u64>, Error> {
        if self.fail_admin_listing.load(Ordering::SeqCst) {
            return Err(Error::custom("guild unavailable"));
        }
        Ok(self.admins.lock().clone())
    }
}

/// MemoryStore whose spam verdict commits can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_verdict_commits: AtomicBool,
}

impl FlakyStore {
    pub fn set_fail_verdict_commits(&self, fail: bool) {
        self.fail_verdict_commits.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ModerationStore for FlakyStore {
    async fn violation(&self, user_id: i64) -> Result<Option<ViolationRecord>, Error> {
        self.inner.violation(user_id).await
    }

    async fn commit_spam_verdict(
        &self,
        judgment: &SpamJudgment,
        violation_count: i32,
    ) -> Result<Option<ViolationRecord>, Error> {
        if self.fail_verdict_commits.load(Ordering::SeqCst) {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.commit_spam_verdict(judgment, violation_count).await
    }

    async fn reset_violation(&self, user_id: i64) -> Result<bool, Error> {
        self.inner.reset_violation(user_id).await
    }

    async fn compact_violations(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        self.inner.compact_violations(cutoff).await
    }

    async fn message_processed(&self, chat_id: i64, message_id: i64) -> Result<bool, Error> {
        self.inner.message_processed(chat_id, message_id).await
    }

    async fn insert_judgment(&self, judgment: &SpamJudgment) -> Result<bool, Error> {
        self.inner.insert_judgment(judgment).await
    }

    async fn record_scoring_failure(&self, failure: &ScoringFailure) -> Result<bool, Error> {
        self.inner.record_scoring_failure(failure).await
    }

    async fn insert_punishment(&self, record: &PunishmentRecord) -> Result<bool, Error> {
        self.inner.insert_punishment(record).await
    }

    async fn try_consume_usage(&self, day: NaiveDate, limit: u32) -> Result<Option<u32>, Error> {
        self.inner.try_consume_usage(day, limit).await
    }

    async fn usage(&self, day: NaiveDate) -> Result<u32, Error> {
        self.inner.usage(day).await
    }

    async fn whitelist(&self) -> Result<Vec<i64>, Error> {
        self.inner.whitelist().await
    }

    async fn add_whitelist(&self, user_id: i64) -> Result<bool, Error> {
        self.inner.add_whitelist(user_id).await
    }

    async fn remove_whitelist(&self, user_id: i64) -> Result<bool, Error> {
        self.inner.remove_whitelist(user_id).await
    }

    async fn activity_since(
        &self,
        since: DateTime<Utc>,
        active_cutoff: DateTime<Utc>,
    ) -> Result<ActivityCounts, Error> {
        self.inner.activity_since(since, active_cutoff).await
    }
}
