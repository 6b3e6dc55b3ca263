use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::application::{
    Applicant, Application, ApplicationFilter, ApplicationStatus, WorkerApplication,
};

const APPLICATION_COLUMNS: &str =
    "id, shift_id, worker_id, status, message, decided_at, created_at, updated_at";

pub async fn create_application<'e>(
    executor: impl PgExecutor<'e>,
    shift_id: Uuid,
    worker_id: Uuid,
    message: Option<&str>,
) -> Result<Application, sqlx::Error> {
    sqlx::query_as::<_, Application>(&format!(
        r#"
        INSERT INTO applications (shift_id, worker_id, message)
        VALUES ($1, $2, $3)
        RETURNING {APPLICATION_COLUMNS}
        "#
    ))
    .bind(shift_id)
    .bind(worker_id)
    .bind(message)
    .fetch_one(executor)
    .await
}

pub async fn get_application<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(&format!(
        "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn lock_application(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(&format!(
        "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Store a new status. Company decisions also stamp `decided_at`.
pub async fn set_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: ApplicationStatus,
) -> Result<Application, sqlx::Error> {
    sqlx::query_as::<_, Application>(&format!(
        r#"
        UPDATE applications
        SET status = $2,
            decided_at = CASE
                WHEN $2 IN ('accepted', 'rejected', 'waitlisted', 'cancelled') THEN NOW()
                ELSE decided_at
            END
        WHERE id = $1
        RETURNING {APPLICATION_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status.to_string())
    .fetch_one(executor)
    .await
}

/// Applicants for a shift, annotated for the owning company.
pub async fn list_for_shift(
    pool: &PgPool,
    shift_id: Uuid,
    company_id: Uuid,
) -> Result<Vec<Applicant>, sqlx::Error> {
    sqlx::query_as::<_, Applicant>(
        r#"
        SELECT a.id, a.shift_id, a.worker_id, a.status, a.message, a.decided_at,
               a.created_at, a.updated_at,
               p.display_name AS worker_name,
               p.verification_status,
               r.rating_average,
               COALESCE(r.rating_count, 0) AS rating_count,
               wr.kind AS relation
        FROM applications a
        JOIN profiles p ON p.id = a.worker_id
        LEFT JOIN LATERAL (
            SELECT AVG(rating)::FLOAT8 AS rating_average, COUNT(*) AS rating_count
            FROM reviews WHERE reviewee_id = a.worker_id
        ) r ON TRUE
        LEFT JOIN worker_relations wr
               ON wr.company_id = $2 AND wr.worker_id = a.worker_id
        WHERE a.shift_id = $1
        ORDER BY a.created_at ASC
        "#,
    )
    .bind(shift_id)
    .bind(company_id)
    .fetch_all(pool)
    .await
}

/// A worker's applications with shift details, soonest shift first.
pub async fn list_for_worker(
    pool: &PgPool,
    worker_id: Uuid,
    filter: &ApplicationFilter,
) -> Result<Vec<WorkerApplication>, sqlx::Error> {
    sqlx::query_as::<_, WorkerApplication>(
        r#"
        SELECT a.id, a.shift_id, a.worker_id, a.status, a.message, a.decided_at,
               a.created_at, a.updated_at,
               s.title AS shift_title,
               s.location AS shift_location,
               s.starts_at AS shift_starts_at,
               s.ends_at AS shift_ends_at,
               s.status AS shift_status,
               s.hourly_rate_cents,
               s.company_id
        FROM applications a
        JOIN shifts s ON s.id = a.shift_id
        WHERE a.worker_id = $1
          AND ($2::TEXT IS NULL OR a.status = $2)
        ORDER BY s.starts_at ASC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(worker_id)
    .bind(filter.status.map(|s| s.to_string()))
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

/// Reject a blacklisted worker's undecided applications on the company's
/// live shifts.
pub async fn reject_open_for_worker(
    conn: &mut PgConnection,
    company_id: Uuid,
    worker_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE applications a
        SET status = 'rejected', decided_at = NOW()
        FROM shifts s
        WHERE s.id = a.shift_id
          AND s.company_id = $1
          AND s.status IN ('open', 'filled')
          AND a.worker_id = $2
          AND a.status IN ('pending', 'waitlisted')
        "#,
    )
    .bind(company_id)
    .bind(worker_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Undecided applications on shifts that already started can no longer be
/// filled.
pub async fn expire_started(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE applications a
        SET status = 'expired'
        FROM shifts s
        WHERE s.id = a.shift_id
          AND s.starts_at <= $1
          AND a.status IN ('pending', 'waitlisted')
        "#,
    )
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
