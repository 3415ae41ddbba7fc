use chrono::NaiveDate;
use sqlx::PgPool;

use crate::db::models::DailyUsage;

pub async fn get(pool: &PgPool, day: NaiveDate) -> Result<Option<DailyUsage>, sqlx::Error> {
    sqlx::query_as::<_, DailyUsage>("SELECT * FROM api_usage WHERE usage_date = $1")
        .bind(day)
        .fetch_optional(pool)
        .await
}

/// Consume one call for `day` if fewer than `limit` have been made.
/// The row for a new day is created on its first call.
/// Returns the new count, or None when the quota is exhausted.
pub async fn try_increment(
    pool: &PgPool,
    day: NaiveDate,
    limit: i32,
) -> Result<Option<i32>, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as(
        r#"
        INSERT INTO api_usage (usage_date, calls_made)
        SELECT $1, 1 WHERE $2 > 0
        ON CONFLICT (usage_date)
        DO UPDATE SET
            calls_made = api_usage.calls_made + 1,
            updated_at = NOW()
        WHERE api_usage.calls_made < $2
        RETURNING calls_made
        "#,
    )
    .bind(day)
    .bind(limit)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.0))
}
