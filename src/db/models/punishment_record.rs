use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The punishment decided for one spam judgment
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PunishmentRecord {
    pub id: Uuid,
    pub chat_id: i64,
    pub message_id: i64,
    pub user_id: i64,
    /// "warning", "kick" or "ban"
    pub action: String,
    /// Violation count after this punishment
    pub violation_count: i32,
    pub dry_run: bool,
    /// Whether every enforcement call succeeded
    pub dispatched: bool,
    pub failure: Option<String>,
    pub created_at: DateTime<Utc>,
}
