use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::db::models::ViolationRecord;

pub async fn get(pool: &PgPool, user_id: i64) -> Result<Option<ViolationRecord>, sqlx::Error> {
    sqlx::query_as::<_, ViolationRecord>("SELECT * FROM user_violations WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Write the epoch count decided by the state machine and bump the lifetime total
pub async fn record_violation<'e, E>(
    executor: E,
    user_id: i64,
    violation_count: i32,
    at: DateTime<Utc>,
) -> Result<ViolationRecord, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ViolationRecord>(
        r#"
        INSERT INTO user_violations (user_id, violation_count, total_violations, last_violation_at)
        VALUES ($1, $2, 1, $3)
        ON CONFLICT (user_id)
        DO UPDATE SET
            violation_count = EXCLUDED.violation_count,
            total_violations = user_violations.total_violations + 1,
            last_violation_at = EXCLUDED.last_violation_at,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(violation_count)
    .bind(at)
    .fetch_one(executor)
    .await
}

pub async fn reset(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE user_violations
        SET
            violation_count = 0,
            updated_at = NOW()
        WHERE user_id = $1 AND violation_count > 0
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Users with a violation at or after `cutoff`
pub async fn count_active(pool: &PgPool, cutoff: DateTime<Utc>) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM user_violations WHERE violation_count > 0 AND last_violation_at >= $1",
    )
    .bind(cutoff)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

pub async fn delete_expired(pool: &PgPool, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_violations WHERE last_violation_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
