use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{payments, profiles, reviews, verifications, Party};
use crate::models::dashboard::{AdminDashboard, CompanyDashboard, WorkerDashboard};
use crate::models::profile::{Role, VerificationStatus};

pub async fn company_dashboard(
    pool: &PgPool,
    company_id: Uuid,
    now: DateTime<Utc>,
) -> Result<CompanyDashboard, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT
            (SELECT COUNT(*) FROM shifts
              WHERE company_id = $1 AND status = 'open') AS open_shifts,
            (SELECT COUNT(*) FROM shifts
              WHERE company_id = $1 AND status = 'filled') AS filled_shifts,
            (SELECT COUNT(*) FROM shifts
              WHERE company_id = $1 AND status IN ('open', 'filled') AND starts_at > $2) AS upcoming_shifts,
            (SELECT COUNT(*) FROM applications a JOIN shifts s ON s.id = a.shift_id
              WHERE s.company_id = $1 AND a.status = 'pending') AS pending_applications,
            (SELECT COUNT(*) FROM timesheets
              WHERE company_id = $1 AND status = 'submitted') AS submitted_timesheets
        "#,
    )
    .bind(company_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    let totals = payments::totals(pool, Party::Company(company_id)).await?;

    Ok(CompanyDashboard {
        open_shifts: row.try_get("open_shifts")?,
        filled_shifts: row.try_get("filled_shifts")?,
        upcoming_shifts: row.try_get("upcoming_shifts")?,
        pending_applications: row.try_get("pending_applications")?,
        submitted_timesheets: row.try_get("submitted_timesheets")?,
        pending_payments_cents: totals.pending_cents,
        paid_payments_cents: totals.paid_cents,
    })
}

pub async fn worker_dashboard(
    pool: &PgPool,
    worker_id: Uuid,
    verification_status: VerificationStatus,
    now: DateTime<Utc>,
) -> Result<WorkerDashboard, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT
            (SELECT COUNT(*) FROM applications a JOIN shifts s ON s.id = a.shift_id
              WHERE a.worker_id = $1 AND a.status = 'accepted' AND s.starts_at > $2) AS upcoming_shifts,
            (SELECT COUNT(*) FROM applications
              WHERE worker_id = $1 AND status IN ('pending', 'waitlisted')) AS pending_applications,
            (SELECT COUNT(*) FROM applications
              WHERE worker_id = $1 AND status = 'completed') AS completed_shifts
        "#,
    )
    .bind(worker_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    let totals = payments::totals(pool, Party::Worker(worker_id)).await?;
    let rating = reviews::rating_summary(pool, worker_id).await?;

    Ok(WorkerDashboard {
        upcoming_shifts: row.try_get("upcoming_shifts")?,
        pending_applications: row.try_get("pending_applications")?,
        completed_shifts: row.try_get("completed_shifts")?,
        pending_earnings_cents: totals.pending_cents,
        paid_earnings_cents: totals.paid_cents,
        rating,
        verification_status,
    })
}

pub async fn admin_dashboard(pool: &PgPool) -> Result<AdminDashboard, sqlx::Error> {
    Ok(AdminDashboard {
        pending_verifications: verifications::count_pending(pool).await?,
        workers: profiles::count_by_role(pool, Role::Worker).await?,
        companies: profiles::count_by_role(pool, Role::Company).await?,
        admins: profiles::count_by_role(pool, Role::Admin).await?,
    })
}
