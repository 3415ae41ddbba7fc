use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::models::PunishmentRecord;

/// Record a punishment decision. Returns false if the message already has one.
pub async fn insert(pool: &PgPool, record: &PunishmentRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO punishment_log
            (id, chat_id, message_id, user_id, action, violation_count, dry_run, dispatched, failure, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (chat_id, message_id) DO NOTHING
        "#,
    )
    .bind(record.id)
    .bind(record.chat_id)
    .bind(record.message_id)
    .bind(record.user_id)
    .bind(&record.action)
    .bind(record.violation_count)
    .bind(record.dry_run)
    .bind(record.dispatched)
    .bind(&record.failure)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Number of decisions per action since `since`
pub async fn action_counts_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT action, COUNT(*)
        FROM punishment_log
        WHERE created_at >= $1
        GROUP BY action
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await
}
