use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use super::Party;
use crate::models::application::Application;
use crate::models::shift::Shift;
use crate::models::timesheet::{ApprovedTimes, SubmitTimesheetRequest, Timesheet, TimesheetFilter};

const TIMESHEET_COLUMNS: &str = r#"
    id, application_id, shift_id, worker_id, company_id, clock_in, clock_out, break_minutes,
    approved_clock_in, approved_clock_out, approved_break_minutes, status, worker_note,
    dispute_reason, approved_at, created_at, updated_at
"#;

pub async fn create_timesheet<'e>(
    executor: impl PgExecutor<'e>,
    application: &Application,
    shift: &Shift,
    req: &SubmitTimesheetRequest,
) -> Result<Timesheet, sqlx::Error> {
    sqlx::query_as::<_, Timesheet>(&format!(
        r#"
        INSERT INTO timesheets
            (application_id, shift_id, worker_id, company_id, clock_in, clock_out,
             break_minutes, worker_note)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {TIMESHEET_COLUMNS}
        "#
    ))
    .bind(application.id)
    .bind(shift.id)
    .bind(application.worker_id)
    .bind(shift.company_id)
    .bind(req.clock_in)
    .bind(req.clock_out)
    .bind(req.break_minutes)
    .bind(&req.note)
    .fetch_one(executor)
    .await
}

/// Replace the times on a disputed timesheet and send it back for approval.
pub async fn resubmit_timesheet<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    req: &SubmitTimesheetRequest,
) -> Result<Timesheet, sqlx::Error> {
    sqlx::query_as::<_, Timesheet>(&format!(
        r#"
        UPDATE timesheets
        SET clock_in = $2,
            clock_out = $3,
            break_minutes = $4,
            worker_note = $5,
            status = 'submitted',
            dispute_reason = NULL
        WHERE id = $1
        RETURNING {TIMESHEET_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(req.clock_in)
    .bind(req.clock_out)
    .bind(req.break_minutes)
    .bind(&req.note)
    .fetch_one(executor)
    .await
}

pub async fn get_timesheet<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<Timesheet>, sqlx::Error> {
    sqlx::query_as::<_, Timesheet>(&format!(
        "SELECT {TIMESHEET_COLUMNS} FROM timesheets WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_for_application<'e>(
    executor: impl PgExecutor<'e>,
    application_id: Uuid,
) -> Result<Option<Timesheet>, sqlx::Error> {
    sqlx::query_as::<_, Timesheet>(&format!(
        "SELECT {TIMESHEET_COLUMNS} FROM timesheets WHERE application_id = $1"
    ))
    .bind(application_id)
    .fetch_optional(executor)
    .await
}

pub async fn lock_timesheet(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Timesheet>, sqlx::Error> {
    sqlx::query_as::<_, Timesheet>(&format!(
        "SELECT {TIMESHEET_COLUMNS} FROM timesheets WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn approve_timesheet(
    conn: &mut PgConnection,
    id: Uuid,
    times: ApprovedTimes,
) -> Result<Timesheet, sqlx::Error> {
    sqlx::query_as::<_, Timesheet>(&format!(
        r#"
        UPDATE timesheets
        SET status = 'approved',
            approved_clock_in = $2,
            approved_clock_out = $3,
            approved_break_minutes = $4,
            approved_at = NOW()
        WHERE id = $1 AND status = 'submitted'
        RETURNING {TIMESHEET_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(times.clock_in)
    .bind(times.clock_out)
    .bind(times.break_minutes)
    .fetch_one(conn)
    .await
}

/// Send a submitted timesheet back to the worker. `None` when it is no
/// longer submitted.
pub async fn dispute_timesheet(
    conn: &mut PgConnection,
    id: Uuid,
    reason: &str,
) -> Result<Option<Timesheet>, sqlx::Error> {
    sqlx::query_as::<_, Timesheet>(&format!(
        r#"
        UPDATE timesheets
        SET status = 'disputed', dispute_reason = $2
        WHERE id = $1 AND status = 'submitted'
        RETURNING {TIMESHEET_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(reason)
    .fetch_optional(conn)
    .await
}

pub async fn list_timesheets(
    pool: &PgPool,
    party: Party,
    filter: &TimesheetFilter,
) -> Result<Vec<Timesheet>, sqlx::Error> {
    sqlx::query_as::<_, Timesheet>(&format!(
        r#"
        SELECT {TIMESHEET_COLUMNS}
        FROM timesheets
        WHERE {} = $1
          AND ($2::TEXT IS NULL OR status = $2)
        ORDER BY clock_in DESC
        LIMIT $3 OFFSET $4
        "#,
        party.column()
    ))
    .bind(party.id())
    .bind(filter.status.map(|s| s.to_string()))
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}
