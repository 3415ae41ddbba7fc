use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::db::models::SpamJudgment;

/// True if the message was judged or its scoring already failed once
pub async fn message_processed(
    pool: &PgPool,
    chat_id: i64,
    message_id: i64,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(SELECT 1 FROM spam_judgments WHERE chat_id = $1 AND message_id = $2)
            OR EXISTS(SELECT 1 FROM scoring_failures WHERE chat_id = $1 AND message_id = $2)
        "#,
    )
    .bind(chat_id)
    .bind(message_id)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

/// Append a judgment. Returns false if the message was already judged.
pub async fn insert<'e, E>(executor: E, judgment: &SpamJudgment) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO spam_judgments
            (id, chat_id, channel_id, message_id, user_id, message_text,
             score, rationale, is_spam, judged_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (chat_id, message_id) DO NOTHING
        "#,
    )
    .bind(judgment.id)
    .bind(judgment.chat_id)
    .bind(judgment.channel_id)
    .bind(judgment.message_id)
    .bind(judgment.user_id)
    .bind(&judgment.message_text)
    .bind(judgment.score)
    .bind(&judgment.rationale)
    .bind(judgment.is_spam)
    .bind(judgment.judged_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// (judged, spam) counts since `since`
pub async fn counts_since(pool: &PgPool, since: DateTime<Utc>) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT COUNT(*), COUNT(*) FILTER (WHERE is_spam)
        FROM spam_judgments
        WHERE judged_at >= $1
        "#,
    )
    .bind(since)
    .fetch_one(pool)
    .await
}
