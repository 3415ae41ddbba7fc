use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;

use crate::bot::error::Error;
use crate::db::models::{
    ActivityCounts, PunishmentRecord, ScoringFailure, SpamJudgment, ViolationRecord,
};
use crate::db::store::ModerationStore;

/// In-process store. State lives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    violations: HashMap<i64, ViolationRecord>,
    judgments: HashMap<(i64, i64), SpamJudgment>,
    punishments: HashMap<(i64, i64), PunishmentRecord>,
    scoring_failures: HashMap<(i64, i64), ScoringFailure>,
    usage: HashMap<NaiveDate, u32>,
    whitelist: BTreeSet<i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn judgment_count(&self) -> usize {
        self.inner.lock().judgments.len()
    }

    #[cfg(test)]
    pub fn punishments(&self) -> Vec<PunishmentRecord> {
        let mut records: Vec<_> = self.inner.lock().punishments.values().cloned().collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// Seed a violation record directly, bypassing the state machine
    #[cfg(test)]
    pub fn put_violation(&self, record: ViolationRecord) {
        self.inner.lock().violations.insert(record.user_id, record);
    }
}

#[async_trait]
impl ModerationStore for MemoryStore {
    async fn violation(&self, user_id: i64) -> Result<Option<ViolationRecord>, Error> {
        Ok(self.inner.lock().violations.get(&user_id).cloned())
    }

    async fn commit_spam_verdict(
        &self,
        judgment: &SpamJudgment,
        violation_count: i32,
    ) -> Result<Option<ViolationRecord>, Error> {
        let mut inner = self.inner.lock();
        let key = (judgment.chat_id, judgment.message_id);
        if inner.judgments.contains_key(&key) {
            return Ok(None);
        }
        inner.judgments.insert(key, judgment.clone());

        let (user_id, at) = (judgment.user_id, judgment.judged_at);
        let record = inner
            .violations
            .entry(user_id)
            .and_modify(|r| {
                r.violation_count = violation_count;
                r.total_violations += 1;
                r.last_violation_at = at;
                r.updated_at = at;
            })
            .or_insert_with(|| ViolationRecord {
                user_id,
                violation_count,
                total_violations: 1,
                last_violation_at: at,
                created_at: at,
                updated_at: at,
            });

        Ok(Some(record.clone()))
    }

    async fn reset_violation(&self, user_id: i64) -> Result<bool, Error> {
        let mut inner = self.inner.lock();
        match inner.violations.get_mut(&user_id) {
            Some(record) if record.violation_count > 0 => {
                record.violation_count = 0;
                record.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn compact_violations(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let mut inner = self.inner.lock();
        let before = inner.violations.len();
        inner.violations.retain(|_, r| r.last_violation_at >= cutoff);
        Ok((before - inner.violations.len()) as u64)
    }

    async fn message_processed(&self, chat_id: i64, message_id: i64) -> Result<bool, Error> {
        let inner = self.inner.lock();
        let key = (chat_id, message_id);
        Ok(inner.judgments.contains_key(&key) || inner.scoring_failures.contains_key(&key))
    }

    async fn insert_judgment(&self, judgment: &SpamJudgment) -> Result<bool, Error> {
        let mut inner = self.inner.lock();
        let key = (judgment.chat_id, judgment.message_id);
        if inner.judgments.contains_key(&key) {
            return Ok(false);
        }
        inner.judgments.insert(key, judgment.clone());
        Ok(true)
    }

    async fn record_scoring_failure(&self, failure: &ScoringFailure) -> Result<bool, Error> {
        let mut inner = self.inner.lock();
        let key = (failure.chat_id, failure.message_id);
        if inner.scoring_failures.contains_key(&key) {
            return Ok(false);
        }
        inner.scoring_failures.insert(key, failure.clone());
        Ok(true)
    }

    async fn insert_punishment(&self, record: &PunishmentRecord) -> Result<bool, Error> {
        let mut inner = self.inner.lock();
        let key = (record.chat_id, record.message_id);
        if inner.punishments.contains_key(&key) {
            return Ok(false);
        }
        inner.punishments.insert(key, record.clone());
        Ok(true)
    }

    async fn try_consume_usage(&self, day: NaiveDate, limit: u32) -> Result<Option<u32>, Error> {
        let mut inner = self.inner.lock();
        let calls = inner.usage.entry(day).or_insert(0);
        if *calls >= limit {
            return Ok(None);
        }
        *calls += 1;
        Ok(Some(*calls))
    }

    async fn usage(&self, day: NaiveDate) -> Result<u32, Error> {
        Ok(self.inner.lock().usage.get(&day).copied().unwrap_or(0))
    }

    async fn whitelist(&self) -> Result<Vec<i64>, Error> {
        Ok(self.inner.lock().whitelist.iter().copied().collect())
    }

    async fn add_whitelist(&self, user_id: i64) -> Result<bool, Error> {
        Ok(self.inner.lock().whitelist.insert(user_id))
    }

    async fn remove_whitelist(&self, user_id: i64) -> Result<bool, Error> {
        Ok(self.inner.lock().whitelist.remove(&user_id))
    }

    async fn activity_since(
        &self,
        since: DateTime<Utc>,
        active_cutoff: DateTime<Utc>,
    ) -> Result<ActivityCounts, Error> {
        let inner = self.inner.lock();
        let mut counts = ActivityCounts::default();

        for judgment in inner.judgments.values().filter(|j| j.judged_at >= since) {
            counts.judged += 1;
            if judgment.is_spam {
                counts.spam += 1;
            }
        }

        for record in inner.punishments.values().filter(|p| p.created_at >= since) {
            counts.add_action(&record.action, 1);
        }

        counts.active_violators = inner
            .violations
            .values()
            .filter(|r| r.violation_count > 0 && r.last_violation_at >= active_cutoff)
            .count() as i64;

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;

    #[test]
    fn test_usage_never_exceeds_limit() {
        let store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        tokio_test::block_on(async {
            assert_eq!(store.try_consume_usage(day, 2).await.unwrap(), Some(1));
            assert_eq!(store.try_consume_usage(day, 2).await.unwrap(), Some(2));
            assert_eq!(store.try_consume_usage(day, 2).await.unwrap(), None);
            assert_eq!(store.usage(day).await.unwrap(), 2);

            // A new day starts from zero and the old one is kept
            let next = day.succ_opt().unwrap();
            assert_eq!(store.try_consume_usage(next, 2).await.unwrap(), Some(1));
            assert_eq!(store.usage(day).await.unwrap(), 2);
        });
    }

    #[tokio::test]
    async fn test_concurrent_usage_respects_limit() {
        let store = Arc::new(MemoryStore::new());
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.try_consume_usage(day, 20).await.unwrap() })
            })
            .collect();

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                granted += 1;
            }
        }

        assert_eq!(granted, 20);
        assert_eq!(store.usage(day).await.unwrap(), 20);
    }

    fn spam(message_id: i64, user_id: i64, at: DateTime<Utc>) -> SpamJudgment {
        SpamJudgment::new(1, 2, message_id, user_id, "buy now", 9.0, "promo".into(), 8.0, at)
    }

    #[tokio::test]
    async fn test_violation_lifecycle() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let first = store.commit_spam_verdict(&spam(1, 7, now), 1).await.unwrap().unwrap();
        assert_eq!((first.violation_count, first.total_violations), (1, 1));

        let second = store.commit_spam_verdict(&spam(2, 7, now), 2).await.unwrap().unwrap();
        assert_eq!((second.violation_count, second.total_violations), (2, 2));

        assert!(store.reset_violation(7).await.unwrap());
        assert!(!store.reset_violation(7).await.unwrap());
        let reset = store.violation(7).await.unwrap().unwrap();
        assert_eq!((reset.violation_count, reset.total_violations), (0, 2));

        assert!(!store.reset_violation(8).await.unwrap());
    }

    #[tokio::test]
    async fn test_repeated_spam_verdict_writes_nothing() {
        let store = MemoryStore::new();
        let now = Utc::now();

        assert!(store.commit_spam_verdict(&spam(1, 7, now), 1).await.unwrap().is_some());
        assert!(store.commit_spam_verdict(&spam(1, 7, now), 2).await.unwrap().is_none());

        let record = store.violation(7).await.unwrap().unwrap();
        assert_eq!((record.violation_count, record.total_violations), (1, 1));
        assert_eq!(store.judgment_count(), 1);
    }

    #[tokio::test]
    async fn test_compaction_only_removes_stale_records() {
        let store = MemoryStore::new();
        let now = Utc::now();

        store.commit_spam_verdict(&spam(1, 1, now - Duration::days(40)), 1).await.unwrap();
        store.commit_spam_verdict(&spam(2, 2, now - Duration::days(3)), 1).await.unwrap();

        let removed = store.compact_violations(now - Duration::days(30)).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.violation(1).await.unwrap().is_none());
        assert!(store.violation(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_judgments_are_unique_per_message() {
        let store = MemoryStore::new();
        let judgment = SpamJudgment::new(1, 2, 3, 4, "hello", 1.0, "chat".into(), 8.0, Utc::now());

        assert!(store.insert_judgment(&judgment).await.unwrap());
        assert!(!store.insert_judgment(&judgment).await.unwrap());
        assert!(store.message_processed(1, 3).await.unwrap());
        assert_eq!(store.judgment_count(), 1);
    }

    #[tokio::test]
    async fn test_scoring_failure_marks_message_processed() {
        let store = MemoryStore::new();
        let failure = ScoringFailure {
            chat_id: 1,
            message_id: 3,
            user_id: 4,
            reason: "timed out".into(),
            observed_at: Utc::now(),
        };

        assert!(!store.message_processed(1, 3).await.unwrap());
        assert!(store.record_scoring_failure(&failure).await.unwrap());
        assert!(!store.record_scoring_failure(&failure).await.unwrap());
        assert!(store.message_processed(1, 3).await.unwrap());
        assert!(!store.message_processed(1, 4).await.unwrap());
    }
}
