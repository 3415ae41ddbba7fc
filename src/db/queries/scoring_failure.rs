use sqlx::PgPool;

use crate::db::models::ScoringFailure;

/// Returns false if a failure was already recorded for the message
pub async fn insert(pool: &PgPool, failure: &ScoringFailure) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO scoring_failures (chat_id, message_id, user_id, reason, observed_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (chat_id, message_id) DO NOTHING
        "#,
    )
    .bind(failure.chat_id)
    .bind(failure.message_id)
    .bind(failure.user_id)
    .bind(&failure.reason)
    .bind(failure.observed_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
