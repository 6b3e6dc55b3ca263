use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::verification::{SubmissionStatus, Verification};

const VERIFICATION_COLUMNS: &str = r#"
    id, worker_id, id_card_key, selfie_key, status, rejection_reason, screened_at,
    reviewed_by, reviewed_at, created_at
"#;

pub async fn create_verification<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    worker_id: Uuid,
    id_card_key: &str,
    selfie_key: &str,
) -> Result<Verification, sqlx::Error> {
    sqlx::query_as::<_, Verification>(&format!(
        r#"
        INSERT INTO verifications (id, worker_id, id_card_key, selfie_key)
        VALUES ($1, $2, $3, $4)
        RETURNING {VERIFICATION_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(worker_id)
    .bind(id_card_key)
    .bind(selfie_key)
    .fetch_one(executor)
    .await
}

pub async fn get_verification<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<Verification>, sqlx::Error> {
    sqlx::query_as::<_, Verification>(&format!(
        "SELECT {VERIFICATION_COLUMNS} FROM verifications WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn lock_verification(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Verification>, sqlx::Error> {
    sqlx::query_as::<_, Verification>(&format!(
        "SELECT {VERIFICATION_COLUMNS} FROM verifications WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn latest_for_worker(
    pool: &PgPool,
    worker_id: Uuid,
) -> Result<Option<Verification>, sqlx::Error> {
    sqlx::query_as::<_, Verification>(&format!(
        r#"
        SELECT {VERIFICATION_COLUMNS}
        FROM verifications
        WHERE worker_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        "#
    ))
    .bind(worker_id)
    .fetch_optional(pool)
    .await
}

/// Pending submissions, oldest first, for the admin review queue.
pub async fn list_pending(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Verification>, sqlx::Error> {
    sqlx::query_as::<_, Verification>(&format!(
        r#"
        SELECT {VERIFICATION_COLUMNS}
        FROM verifications
        WHERE status = 'pending'
        ORDER BY created_at ASC
        LIMIT $1 OFFSET $2
        "#
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM verifications WHERE status = 'pending'")
        .fetch_one(pool)
        .await
}

pub async fn mark_screened<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE verifications SET screened_at = NOW() WHERE id = $1 AND status = 'pending'")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Record the outcome of a review. `reviewed_by` is `None` for automated
/// screening rejections.
pub async fn record_outcome<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: SubmissionStatus,
    reason: Option<&str>,
    reviewed_by: Option<Uuid>,
) -> Result<Verification, sqlx::Error> {
    sqlx::query_as::<_, Verification>(&format!(
        r#"
        UPDATE verifications
        SET status = $2,
            rejection_reason = $3,
            reviewed_by = $4,
            reviewed_at = NOW()
        WHERE id = $1
        RETURNING {VERIFICATION_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status.to_string())
    .bind(reason)
    .bind(reviewed_by)
    .fetch_one(executor)
    .await
}
