use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use garde::Validate;
use uuid::Uuid;

use super::extract::Caller;
use crate::app_state::AppState;
use crate::db::{self, payments::NewPayment};
use crate::error::AppError;
use crate::models::application::ApplicationStatus;
use crate::models::payment::Payment;
use crate::models::profile::Role;
use crate::models::timesheet::{
    ApproveTimesheetRequest, ApprovedTimes, DisputeTimesheetRequest, SubmitTimesheetRequest,
    Timesheet, TimesheetFilter, TimesheetStatus,
};
use crate::services::payroll;

/// POST /api/v1/applications/{id}/timesheet
pub async fn submit_timesheet(
    State(state): State<AppState>,
    caller: Caller,
    Path(application_id): Path<Uuid>,
    Json(req): Json<SubmitTimesheetRequest>,
) -> Result<(StatusCode, Json<Timesheet>), AppError> {
    let worker = caller.require(Role::Worker)?;
    req.validate()?;

    let application = db::applications::get_application(&state.db, application_id)
        .await?
        .filter(|a| a.worker_id == worker.id)
        .ok_or(AppError::NotFound("Application"))?;
    if application.status != ApplicationStatus::Accepted {
        return Err(AppError::conflict(format!(
            "Application is {}; only accepted applications take timesheets",
            application.status
        )));
    }

    let shift = db::shifts::get_shift(&state.db, application.shift_id)
        .await?
        .ok_or(AppError::NotFound("Shift"))?;
    if !shift.has_started(Utc::now()) {
        return Err(AppError::conflict("Shift has not started yet"));
    }

    payroll::payable_minutes(req.clock_in, req.clock_out, i64::from(req.break_minutes))?;

    let existing = db::timesheets::get_for_application(&state.db, application.id).await?;
    let timesheet = match existing {
        None => db::timesheets::create_timesheet(&state.db, &application, &shift, &req).await?,
        Some(ts) if ts.status == TimesheetStatus::Disputed => {
            db::timesheets::resubmit_timesheet(&state.db, ts.id, &req).await?
        }
        Some(ts) => {
            return Err(AppError::conflict(format!(
                "Timesheet already {} for this application",
                ts.status
            )));
        }
    };

    metrics::counter!("timesheets_submitted_total").increment(1);
    tracing::info!(
        timesheet_id = %timesheet.id,
        application_id = %application.id,
        break_minutes = timesheet.break_minutes,
        "Timesheet submitted"
    );

    Ok((StatusCode::CREATED, Json(timesheet)))
}

/// GET /api/v1/timesheets
pub async fn list_timesheets(
    State(state): State<AppState>,
    caller: Caller,
    Query(filter): Query<TimesheetFilter>,
) -> Result<Json<Vec<Timesheet>>, AppError> {
    let party = caller.party()?;
    filter.validate()?;

    let timesheets = db::timesheets::list_timesheets(&state.db, party, &filter).await?;
    Ok(Json(timesheets))
}

/// POST /api/v1/timesheets/{id}/approve: approves, completes the
/// application and books the payment in one transaction.
pub async fn approve_timesheet(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    body: Option<Json<ApproveTimesheetRequest>>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    let company = caller.require(Role::Company)?;
    let overrides = body.map(|Json(req)| req).unwrap_or_default();
    overrides.validate()?;

    let mut tx = state.db.begin().await?;
    let timesheet = db::timesheets::lock_timesheet(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Timesheet"))?;

    if timesheet.company_id != company.id {
        return Err(AppError::forbidden("Not your timesheet"));
    }
    if timesheet.status != TimesheetStatus::Submitted {
        return Err(AppError::conflict(format!("Timesheet is {}", timesheet.status)));
    }

    // Timesheet, then application. A shift cancelled after the work was
    // logged leaves the application cancelled, and nothing is paid for it.
    let application = db::applications::lock_application(&mut tx, timesheet.application_id)
        .await?
        .ok_or(AppError::NotFound("Application"))?;
    if !application.status.can_transition_to(ApplicationStatus::Completed) {
        return Err(AppError::InvalidTransition {
            from: application.status,
            to: ApplicationStatus::Completed,
        });
    }

    let shift = db::shifts::get_shift(&mut *tx, timesheet.shift_id)
        .await?
        .ok_or(AppError::NotFound("Shift"))?;

    let times = ApprovedTimes::resolve(&timesheet, &overrides);
    let minutes =
        payroll::payable_minutes(times.clock_in, times.clock_out, i64::from(times.break_minutes))?;
    let amount = payroll::amount_cents(minutes, shift.hourly_rate_cents);

    let approved = db::timesheets::approve_timesheet(&mut tx, id, times).await?;
    db::applications::set_status(&mut *tx, approved.application_id, ApplicationStatus::Completed)
        .await?;
    let payment = db::payments::create_payment(
        &mut tx,
        &approved,
        NewPayment {
            payable_minutes: minutes,
            hourly_rate_cents: shift.hourly_rate_cents,
            amount_cents: amount,
        },
    )
    .await?;
    tx.commit().await?;

    metrics::counter!("timesheets_approved_total").increment(1);
    metrics::counter!("payments_booked_cents_total").increment(amount.max(0) as u64);
    tracing::info!(
        timesheet_id = %id,
        payment_id = %payment.id,
        payable_minutes = minutes,
        amount = %payroll::format_cents(amount),
        "Timesheet approved"
    );

    Ok((StatusCode::CREATED, Json(payment)))
}

/// POST /api/v1/timesheets/{id}/dispute
pub async fn dispute_timesheet(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<DisputeTimesheetRequest>,
) -> Result<Json<Timesheet>, AppError> {
    let company = caller.require(Role::Company)?;
    req.validate()?;

    let mut tx = state.db.begin().await?;
    let timesheet = db::timesheets::lock_timesheet(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Timesheet"))?;
    if timesheet.company_id != company.id {
        return Err(AppError::forbidden("Not your timesheet"));
    }
    if timesheet.status != TimesheetStatus::Submitted {
        return Err(AppError::conflict(format!("Timesheet is {}", timesheet.status)));
    }

    let disputed = db::timesheets::dispute_timesheet(&mut tx, id, &req.reason)
        .await?
        .ok_or_else(|| AppError::conflict("Timesheet is no longer submitted"))?;
    tx.commit().await?;

    tracing::info!(timesheet_id = %id, "Timesheet disputed");
    Ok(Json(disputed))
}
