use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ViolationRecord {
    pub user_id: i64,
    /// Violations within the current epoch
    pub violation_count: i32,
    /// Lifetime violations, never reset
    pub total_violations: i32,
    pub last_violation_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ViolationRecord {
    /// Check if the reset window has lapsed since the last violation
    pub fn is_expired(&self, now: DateTime<Utc>, reset_after: Duration) -> bool {
        now - self.last_violation_at > reset_after
    }
}
