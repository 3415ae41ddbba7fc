use chrono::{DateTime, Utc};

/// A message whose scoring call failed. Marks the message as processed.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ScoringFailure {
    pub chat_id: i64,
    pub message_id: i64,
    pub user_id: i64,
    pub reason: String,
    pub observed_at: DateTime<Utc>,
}
