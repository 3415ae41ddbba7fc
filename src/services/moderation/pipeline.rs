use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::bot::error::Error;
use crate::config::Settings;
use crate::db::models::{PunishmentRecord, ScoringFailure, SpamJudgment};
use crate::db::store::ModerationStore;
use crate::services::enforcement::Enforcer;
use crate::services::punishment::dispatcher::{dispatch, EnforcementTarget};
use crate::services::punishment::{apply_violation, PunishmentAction, Transition};
use crate::services::quota::RateLimiter;
use crate::services::scorer::{ScoreVerdict, SpamScorer};
use crate::services::whitelist::WhitelistGuard;
use crate::utils::clock::Clock;

/// A chat message as the pipeline sees it
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// None for direct messages
    pub chat_id: Option<u64>,
    pub channel_id: u64,
    pub message_id: u64,
    pub user_id: u64,
    pub text: String,
    pub from_bot: bool,
}

/// Why a message left the pipeline without a judgment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    Bot,
    Command,
    NotTargetChat,
    Exempt,
    /// Already judged or failed scoring, or being judged right now
    Duplicate,
    QuotaExhausted,
    ScorerFailure(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Empty => f.write_str("empty message"),
            SkipReason::Bot => f.write_str("bot author"),
            SkipReason::Command => f.write_str("command"),
            SkipReason::NotTargetChat => f.write_str("not the moderated guild"),
            SkipReason::Exempt => f.write_str("exempt user"),
            SkipReason::Duplicate => f.write_str("already processed"),
            SkipReason::QuotaExhausted => f.write_str("daily quota exhausted"),
            SkipReason::ScorerFailure(reason) => write!(f, "scorer failure: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PunishmentOutcome {
    pub transition: Transition,
    pub dry_run: bool,
    /// Every enforcement call succeeded
    pub dispatched: bool,
    pub failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Skipped(SkipReason),
    Judged {
        judgment: SpamJudgment,
        punishment: Option<PunishmentOutcome>,
    },
}

impl Decision {
    /// The punishment decided for this message, if any
    pub fn action(&self) -> Option<PunishmentAction> {
        match self {
            Decision::Judged {
                punishment: Some(p),
                ..
            } => Some(p.transition.action),
            _ => None,
        }
    }
}

/// The knobs that change what the pipeline decides
#[derive(Debug, Clone)]
pub struct ModerationPolicy {
    pub target_chat_id: u64,
    pub spam_threshold: f64,
    pub reset_window: chrono::Duration,
    pub dry_run: bool,
    pub scorer_timeout: Duration,
}

impl ModerationPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            target_chat_id: settings.target_guild_id,
            spam_threshold: settings.spam_threshold,
            reset_window: settings.reset_window(),
            dry_run: settings.dry_run,
            scorer_timeout: settings.scorer_timeout(),
        }
    }
}

/// Turns inbound messages into judgments and punishments.
///
/// Different users are processed concurrently. Messages from the same user
/// queue on a per-user lock in arrival order, so violation counts are never
/// read and written by two messages at once.
pub struct ModerationPipeline {
    store: Arc<dyn ModerationStore>,
    guard: Arc<WhitelistGuard>,
    limiter: Arc<RateLimiter>,
    scorer: Arc<dyn SpamScorer>,
    enforcer: Arc<dyn Enforcer>,
    clock: Arc<dyn Clock>,
    policy: ModerationPolicy,
    user_locks: DashMap<u64, Arc<Mutex<()>>>,
    in_flight: DashMap<(u64, u64), ()>,
}

/// Marks a message as being processed until dropped
struct InFlightClaim<'a> {
    map: &'a DashMap<(u64, u64), ()>,
    key: (u64, u64),
}

impl<'a> InFlightClaim<'a> {
    fn acquire(map: &'a DashMap<(u64, u64), ()>, key: (u64, u64)) -> Option<Self> {
        match map.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => None,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(());
                Some(Self { map, key })
            }
        }
    }
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}

impl ModerationPipeline {
    pub fn new(
        store: Arc<dyn ModerationStore>,
        guard: Arc<WhitelistGuard>,
        limiter: Arc<RateLimiter>,
        scorer: Arc<dyn SpamScorer>,
        enforcer: Arc<dyn Enforcer>,
        clock: Arc<dyn Clock>,
        policy: ModerationPolicy,
    ) -> Self {
        Self {
            store,
            guard,
            limiter,
            scorer,
            enforcer,
            clock,
            policy,
            user_locks: DashMap::new(),
            in_flight: DashMap::new(),
        }
    }

    /// Run one message through screening, quota, scoring and punishment.
    ///
    /// Skips are `Ok(Decision::Skipped)`. `Err` is only returned when the
    /// message's cycle had to be abandoned, e.g. a violation could not be
    /// persisted; nothing is enforced in that case.
    pub async fn process(&self, message: &InboundMessage) -> Result<Decision, Error> {
        let chat_id = match self.screen(message) {
            Ok(chat_id) => chat_id,
            Err(reason) => {
                debug!("Skipping message {}: {}", message.message_id, reason);
                return Ok(Decision::Skipped(reason));
            }
        };

        let Some(_claim) = InFlightClaim::acquire(&self.in_flight, (chat_id, message.message_id))
        else {
            debug!("Message {} is already being processed", message.message_id);
            return Ok(Decision::Skipped(SkipReason::Duplicate));
        };

        let lock = self.user_lock(message.user_id);
        let result = {
            let _serial = lock.lock().await;
            self.judge(chat_id, message).await
        };
        drop(lock);
        self.release_user_lock(message.user_id);

        result
    }

    /// Force a user's violation count back to zero.
    /// Returns false if the user had nothing to reset.
    pub async fn reset_user(&self, user_id: u64) -> Result<bool, Error> {
        let lock = self.user_lock(user_id);
        let result = {
            let _serial = lock.lock().await;
            self.store.reset_violation(user_id as i64).await
        };
        drop(lock);
        self.release_user_lock(user_id);

        let reset = result?;
        if reset {
            info!("Reset violation count for user {}", user_id);
        }
        Ok(reset)
    }

    /// Delete violation records whose reset window has already lapsed.
    /// Such records behave as absent anyway, so this only reclaims space.
    pub async fn compact_expired_violations(&self) -> Result<u64, Error> {
        let cutoff = self.clock.now() - self.policy.reset_window;
        let removed = self.store.compact_violations(cutoff).await?;

        if removed > 0 {
            info!("Compacted {} expired violation records", removed);
        }
        Ok(removed)
    }

    fn screen(&self, message: &InboundMessage) -> Result<u64, SkipReason> {
        if message.from_bot {
            return Err(SkipReason::Bot);
        }

        let text = message.text.trim();
        if text.is_empty() {
            return Err(SkipReason::Empty);
        }
        if text.starts_with('/') {
            return Err(SkipReason::Command);
        }

        let chat_id = match message.chat_id {
            Some(id) if id == self.policy.target_chat_id => id,
            _ => return Err(SkipReason::NotTargetChat),
        };

        if self.guard.is_exempt(message.user_id) {
            return Err(SkipReason::Exempt);
        }

        Ok(chat_id)
    }

    async fn judge(&self, chat_id: u64, message: &InboundMessage) -> Result<Decision, Error> {
        if self
            .store
            .message_processed(chat_id as i64, message.message_id as i64)
            .await?
        {
            debug!("Message {} was already processed", message.message_id);
            return Ok(Decision::Skipped(SkipReason::Duplicate));
        }

        match self.limiter.try_consume().await {
            Ok(_) => {}
            Err(Error::QuotaExhausted) => {
                warn!(
                    "Daily API limit reached, message {} from user {} passes unscored",
                    message.message_id, message.user_id
                );
                return Ok(Decision::Skipped(SkipReason::QuotaExhausted));
            }
            Err(e) => return Err(e),
        }

        let verdict = match self.score(&message.text).await {
            Ok(verdict) => verdict,
            Err(e) if e.is_scorer_failure() => {
                warn!(
                    "Scorer {} failed on message {}: {}",
                    self.scorer.name(),
                    message.message_id,
                    e
                );
                self.record_scoring_failure(chat_id, message, &e).await;
                return Ok(Decision::Skipped(SkipReason::ScorerFailure(e.to_string())));
            }
            Err(e) => return Err(e),
        };

        let judgment = SpamJudgment::new(
            chat_id as i64,
            message.channel_id as i64,
            message.message_id as i64,
            message.user_id as i64,
            &message.text,
            verdict.score,
            verdict.rationale,
            self.policy.spam_threshold,
            self.clock.now(),
        );

        if !judgment.is_spam {
            if !self.store.insert_judgment(&judgment).await? {
                return Ok(Decision::Skipped(SkipReason::Duplicate));
            }
            debug!(
                "Message {} from user {} scored {:.1}, not spam",
                message.message_id, message.user_id, judgment.score
            );
            return Ok(Decision::Judged {
                judgment,
                punishment: None,
            });
        }

        info!(
            "Spam detected from user {}: score={:.1}, reasoning={}",
            message.user_id, judgment.score, judgment.rationale
        );

        let target = EnforcementTarget {
            chat_id,
            channel_id: message.channel_id,
            message_id: message.message_id,
            user_id: message.user_id,
        };
        match self.punish(&judgment, &target).await? {
            Some(punishment) => Ok(Decision::Judged {
                judgment,
                punishment: Some(punishment),
            }),
            None => Ok(Decision::Skipped(SkipReason::Duplicate)),
        }
    }

    /// Mark the message processed so a redelivery does not spend quota again.
    /// A failed write only costs that protection, so it is logged and dropped.
    async fn record_scoring_failure(&self, chat_id: u64, message: &InboundMessage, cause: &Error) {
        let failure = ScoringFailure {
            chat_id: chat_id as i64,
            message_id: message.message_id as i64,
            user_id: message.user_id as i64,
            reason: cause.to_string(),
            observed_at: self.clock.now(),
        };

        if let Err(e) = self.store.record_scoring_failure(&failure).await {
            error!(
                "Failed to record scoring failure for message {}: {:?}",
                message.message_id, e
            );
        }
    }

    async fn score(&self, text: &str) -> Result<ScoreVerdict, Error> {
        match timeout(self.policy.scorer_timeout, self.scorer.score(text)).await {
            Ok(result) => result,
            Err(_) => Err(Error::ScorerUnavailable(format!(
                "timed out after {:?}",
                self.policy.scorer_timeout
            ))),
        }
    }

    /// Commit the spam judgment together with the user's advanced record,
    /// then enforce. If the commit fails nothing is written or enforced, so
    /// the message can be judged again. None if it was already judged.
    async fn punish(
        &self,
        judgment: &SpamJudgment,
        target: &EnforcementTarget,
    ) -> Result<Option<PunishmentOutcome>, Error> {
        let user_id = target.user_id as i64;
        let now = judgment.judged_at;
        let prior = self.store.violation(user_id).await?;
        let transition = apply_violation(prior.as_ref(), now, self.policy.reset_window);

        if transition.reset_applied {
            info!(
                "Violation history for user {} expired, starting over from a first offense",
                target.user_id
            );
        }

        match self
            .store
            .commit_spam_verdict(judgment, transition.new_count)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(None),
            Err(e) => {
                error!(
                    "Failed to record violation for user {}, not enforcing: {:?}",
                    target.user_id, e
                );
                return Err(e);
            }
        }

        info!(
            "User {} violation count: {} (action: {})",
            target.user_id, transition.new_count, transition.action
        );

        let (dispatched, failure) = if self.policy.dry_run {
            warn!(
                "[DRY RUN] Would {} user {} (violation {})",
                transition.action, target.user_id, transition.new_count
            );
            (false, None)
        } else {
            match dispatch(self.enforcer.as_ref(), target, transition.action).await {
                Ok(()) => (true, None),
                Err(e) => {
                    error!(
                        "Violation {} for user {} was recorded but enforcement failed: {}",
                        transition.new_count, target.user_id, e
                    );
                    (false, Some(e.to_string()))
                }
            }
        };

        let record = PunishmentRecord {
            id: Uuid::new_v4(),
            chat_id: target.chat_id as i64,
            message_id: target.message_id as i64,
            user_id,
            action: transition.action.as_str().to_string(),
            violation_count: transition.new_count,
            dry_run: self.policy.dry_run,
            dispatched,
            failure: failure.clone(),
            created_at: now,
        };
        if let Err(e) = self.store.insert_punishment(&record).await {
            error!(
                "Failed to log {} for message {}: {:?}",
                transition.action, target.message_id, e
            );
        }

        Ok(Some(PunishmentOutcome {
            transition,
            dry_run: self.policy.dry_run,
            dispatched,
            failure,
        }))
    }

    fn user_lock(&self, user_id: u64) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn release_user_lock(&self, user_id: u64) {
        self.user_locks
            .remove_if(&user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
