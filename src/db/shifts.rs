use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool, Row};
use uuid::Uuid;

use crate::models::shift::{
    CreateShiftRequest, Shift, ShiftFilter, ShiftStatus, UpdateShiftRequest,
};

/// Applications occupying a vacancy.
const OCCUPYING: &str = "('accepted', 'completed')";

fn select_shift() -> String {
    format!(
        r#"
        SELECT s.id, s.company_id, s.title, s.description, s.location, s.starts_at, s.ends_at,
               s.hourly_rate_cents, s.vacancies, s.status, s.created_at, s.updated_at,
               (SELECT COUNT(*) FROM applications a
                 WHERE a.shift_id = s.id AND a.status IN {OCCUPYING}) AS accepted_count
        FROM shifts s
        "#
    )
}

pub async fn create_shift(
    pool: &PgPool,
    company_id: Uuid,
    req: &CreateShiftRequest,
) -> Result<Shift, sqlx::Error> {
    sqlx::query_as::<_, Shift>(
        r#"
        INSERT INTO shifts
            (company_id, title, description, location, starts_at, ends_at, hourly_rate_cents, vacancies)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, company_id, title, description, location, starts_at, ends_at,
                  hourly_rate_cents, vacancies, status, created_at, updated_at,
                  0::BIGINT AS accepted_count
        "#,
    )
    .bind(company_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.location)
    .bind(req.starts_at)
    .bind(req.ends_at)
    .bind(req.hourly_rate_cents)
    .bind(req.vacancies)
    .fetch_one(pool)
    .await
}

pub async fn get_shift<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<Shift>, sqlx::Error> {
    sqlx::query_as::<_, Shift>(&format!("{} WHERE s.id = $1", select_shift()))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Fetch a shift and hold its row lock until the transaction ends.
/// Serializes decisions that consume vacancies.
pub async fn lock_shift(conn: &mut PgConnection, id: Uuid) -> Result<Option<Shift>, sqlx::Error> {
    sqlx::query_as::<_, Shift>(&format!("{} WHERE s.id = $1 FOR UPDATE", select_shift()))
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Browse shifts, earliest first.
pub async fn list_shifts(pool: &PgPool, filter: &ShiftFilter) -> Result<Vec<Shift>, sqlx::Error> {
    sqlx::query_as::<_, Shift>(&format!(
        r#"
        {}
        WHERE s.status = $1
          AND ($2::TIMESTAMPTZ IS NULL OR s.starts_at >= $2)
          AND ($3::TIMESTAMPTZ IS NULL OR s.starts_at < $3)
          AND ($4::TEXT IS NULL OR s.location ILIKE $4)
          AND ($5::BIGINT IS NULL OR s.hourly_rate_cents >= $5)
          AND ($6::UUID IS NULL OR s.company_id = $6)
        ORDER BY s.starts_at ASC, s.id ASC
        LIMIT $7 OFFSET $8
        "#,
        select_shift()
    ))
    .bind(filter.status.to_string())
    .bind(filter.from)
    .bind(filter.to)
    .bind(filter.location_pattern())
    .bind(filter.min_rate_cents)
    .bind(filter.company_id)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

/// A company's own shifts, most recent start first.
pub async fn list_company_shifts(
    pool: &PgPool,
    company_id: Uuid,
    status: Option<ShiftStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Shift>, sqlx::Error> {
    sqlx::query_as::<_, Shift>(&format!(
        r#"
        {}
        WHERE s.company_id = $1
          AND ($2::TEXT IS NULL OR s.status = $2)
        ORDER BY s.starts_at DESC
        LIMIT $3 OFFSET $4
        "#,
        select_shift()
    ))
    .bind(company_id)
    .bind(status.map(|s| s.to_string()))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Apply edits to a locked shift and store the recomputed status.
pub async fn update_shift(
    conn: &mut PgConnection,
    id: Uuid,
    req: &UpdateShiftRequest,
    status: ShiftStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE shifts
        SET title             = COALESCE($2, title),
            description       = COALESCE($3, description),
            location          = COALESCE($4, location),
            hourly_rate_cents = COALESCE($5, hourly_rate_cents),
            vacancies         = COALESCE($6, vacancies),
            status            = $7
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.location)
    .bind(req.hourly_rate_cents)
    .bind(req.vacancies)
    .bind(status.to_string())
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn set_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: ShiftStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE shifts SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status.to_string())
        .execute(executor)
        .await?;
    Ok(())
}

/// Cancel a shift and every live application on it. Returns how many
/// applications were cancelled.
pub async fn cancel_shift(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
    set_status(&mut *conn, id, ShiftStatus::Cancelled).await?;

    let result = sqlx::query(
        r#"
        UPDATE applications
        SET status = 'cancelled', decided_at = NOW()
        WHERE shift_id = $1 AND status IN ('pending', 'waitlisted', 'accepted')
        "#,
    )
    .bind(id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Time windows of shifts the worker is booked on that have not ended yet.
pub async fn committed_windows<'e>(
    executor: impl PgExecutor<'e>,
    worker_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT s.starts_at, s.ends_at
        FROM applications a
        JOIN shifts s ON s.id = a.shift_id
        WHERE a.worker_id = $1
          AND a.status = 'accepted'
          AND s.status IN ('open', 'filled')
          AND s.ends_at > $2
        ORDER BY s.starts_at
        "#,
    )
    .bind(worker_id)
    .bind(now)
    .fetch_all(executor)
    .await?;

    rows.into_iter()
        .map(|r| Ok((r.try_get("starts_at")?, r.try_get("ends_at")?)))
        .collect()
}

/// Close out live shifts whose end time has passed.
pub async fn complete_ended(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE shifts
        SET status = 'completed'
        WHERE status IN ('open', 'filled') AND ends_at <= $1
        "#,
    )
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
