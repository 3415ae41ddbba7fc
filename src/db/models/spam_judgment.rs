use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::constants::moderation::MAX_LOGGED_TEXT_CHARS;
use crate::utils::formatting::truncate;

/// One scored message. Immutable once written to the audit log.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SpamJudgment {
    pub id: Uuid,
    pub chat_id: i64,
    pub channel_id: i64,
    pub message_id: i64,
    pub user_id: i64,
    /// The scored text, kept so a decision can be reviewed after the message is deleted
    pub message_text: String,
    pub score: f64,
    pub rationale: String,
    pub is_spam: bool,
    pub judged_at: DateTime<Utc>,
}

impl SpamJudgment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chat_id: i64,
        channel_id: i64,
        message_id: i64,
        user_id: i64,
        message_text: &str,
        score: f64,
        rationale: String,
        threshold: f64,
        judged_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_id,
            channel_id,
            message_id,
            user_id,
            message_text: truncate(message_text, MAX_LOGGED_TEXT_CHARS),
            score,
            rationale,
            is_spam: score >= threshold,
            judged_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        let now = Utc::now();
        let at = SpamJudgment::new(1, 2, 3, 4, "buy now", 8.0, String::new(), 8.0, now);
        let below = SpamJudgment::new(1, 2, 4, 4, "buy now", 7.9, String::new(), 8.0, now);

        assert!(at.is_spam);
        assert!(!below.is_spam);
    }

    #[test]
    fn test_long_text_is_truncated_for_the_log() {
        let text = "x".repeat(MAX_LOGGED_TEXT_CHARS + 50);
        let judgment = SpamJudgment::new(1, 2, 3, 4, &text, 9.0, String::new(), 8.0, Utc::now());

        assert_eq!(judgment.message_text.chars().count(), MAX_LOGGED_TEXT_CHARS);
        assert!(judgment.message_text.ends_with("..."));
    }
}
