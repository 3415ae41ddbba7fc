use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyUsage {
    pub usage_date: NaiveDate,
    pub calls_made: i32,
    pub updated_at: DateTime<Utc>,
}
