use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use garde::Validate;
use uuid::Uuid;

use super::extract::Caller;
use crate::app_state::AppState;
use crate::db;
use crate::error::AppError;
use crate::models::application::{
    Applicant, Application, ApplicationFilter, ApplicationStatus, ApplyRequest, Decision,
    DecisionRequest, WorkerApplication,
};
use crate::models::profile::{Role, VerificationStatus};
use crate::models::relation::RelationKind;
use crate::models::shift::ShiftStatus;
use crate::services::matching;

/// POST /api/v1/shifts/{id}/applications
pub async fn apply(
    State(state): State<AppState>,
    caller: Caller,
    Path(shift_id): Path<Uuid>,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let worker = caller.require(Role::Worker)?;
    req.validate()?;

    if state.policy.require_worker_verification
        && worker.verification_status != VerificationStatus::Verified
    {
        return Err(AppError::forbidden(
            "Complete identity verification before applying",
        ));
    }

    let now = Utc::now();

    // Shift, then worker: a blacklist or acceptance committed meanwhile is
    // seen by the checks below.
    let mut tx = state.db.begin().await?;
    let shift = db::shifts::lock_shift(&mut tx, shift_id)
        .await?
        .ok_or(AppError::NotFound("Shift"))?;

    if shift.status != ShiftStatus::Open || shift.has_started(now) {
        return Err(AppError::conflict("Shift is not accepting applications"));
    }

    db::profiles::lock_profile(&mut tx, worker.id)
        .await?
        .ok_or(AppError::ProfileRequired)?;

    let relation = db::relations::relation_kind(&mut *tx, shift.company_id, worker.id).await?;
    if relation == Some(RelationKind::Blacklist) {
        return Err(AppError::forbidden(
            "You cannot apply to this company's shifts",
        ));
    }

    let committed = db::shifts::committed_windows(&mut *tx, worker.id, now).await?;
    if matching::first_conflict((shift.starts_at, shift.ends_at), &committed).is_some() {
        return Err(AppError::conflict(
            "You are already booked on an overlapping shift",
        ));
    }

    let application =
        db::applications::create_application(&mut *tx, shift.id, worker.id, req.message.as_deref())
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => AppError::conflict("Already applied to this shift"),
                other => other,
            })?;
    tx.commit().await?;

    metrics::counter!("applications_submitted_total").increment(1);
    tracing::info!(
        application_id = %application.id,
        shift_id = %shift.id,
        worker_id = %worker.id,
        "Application submitted"
    );

    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/shifts/{id}/applications: ranked for the hiring company.
pub async fn list_shift_applications(
    State(state): State<AppState>,
    caller: Caller,
    Path(shift_id): Path<Uuid>,
) -> Result<Json<Vec<Applicant>>, AppError> {
    let company = caller.require(Role::Company)?;

    let shift = db::shifts::get_shift(&state.db, shift_id)
        .await?
        .ok_or(AppError::NotFound("Shift"))?;
    if shift.company_id != company.id {
        return Err(AppError::forbidden("Not your shift"));
    }

    let mut applicants = db::applications::list_for_shift(&state.db, shift_id, company.id).await?;
    matching::rank_applicants(&mut applicants);

    Ok(Json(applicants))
}

/// GET /api/v1/applications/mine
pub async fn list_my_applications(
    State(state): State<AppState>,
    caller: Caller,
    Query(filter): Query<ApplicationFilter>,
) -> Result<Json<Vec<WorkerApplication>>, AppError> {
    let worker = caller.require(Role::Worker)?;
    filter.validate()?;

    let applications = db::applications::list_for_worker(&state.db, worker.id, &filter).await?;
    Ok(Json(applications))
}

/// POST /api/v1/applications/{id}/decision: accept, reject, waitlist, or
/// revoke an acceptance.
pub async fn decide(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<Application>, AppError> {
    let company = caller.require(Role::Company)?;
    let now = Utc::now();

    let existing = db::applications::get_application(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Application"))?;

    // Shift, then worker, then application: the order every booking change
    // uses. Only acceptance books the worker.
    let mut tx = state.db.begin().await?;
    let shift = db::shifts::lock_shift(&mut tx, existing.shift_id)
        .await?
        .ok_or(AppError::NotFound("Shift"))?;
    if req.decision == Decision::Accept {
        db::profiles::lock_profile(&mut tx, existing.worker_id)
            .await?
            .ok_or(AppError::NotFound("Worker"))?;
    }
    let application = db::applications::lock_application(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Application"))?;

    if shift.company_id != company.id {
        return Err(AppError::forbidden("Not your shift"));
    }

    let target = req.decision.target_status();
    let revoking = req.decision == Decision::Cancel;
    if !application.status.can_transition_to(target)
        || (revoking && application.status != ApplicationStatus::Accepted)
    {
        return Err(AppError::InvalidTransition {
            from: application.status,
            to: target,
        });
    }
    if !shift.status.is_active() {
        return Err(AppError::conflict(format!("Shift is {}", shift.status)));
    }

    let mut accepted = shift.accepted_count;
    match req.decision {
        Decision::Accept => {
            if shift.has_started(now) {
                return Err(AppError::conflict("Shift has already started"));
            }
            if shift.remaining_vacancies() == 0 {
                return Err(AppError::conflict("Shift is full"));
            }
            let committed =
                db::shifts::committed_windows(&mut *tx, application.worker_id, now).await?;
            if matching::first_conflict((shift.starts_at, shift.ends_at), &committed).is_some() {
                return Err(AppError::conflict(
                    "Worker is already booked on an overlapping shift",
                ));
            }
            accepted += 1;
        }
        Decision::Cancel => {
            if shift.has_started(now) {
                return Err(AppError::conflict("Shift has already started"));
            }
            accepted -= 1;
        }
        Decision::Reject | Decision::Waitlist => {}
    }

    let updated = db::applications::set_status(&mut *tx, id, target).await?;

    let shift_status = ShiftStatus::for_occupancy(accepted, shift.vacancies);
    if shift_status != shift.status {
        db::shifts::set_status(&mut *tx, shift.id, shift_status).await?;
    }
    tx.commit().await?;

    metrics::counter!("application_decisions_total", "status" => target.to_string()).increment(1);
    tracing::info!(
        application_id = %id,
        shift_id = %shift.id,
        status = %target,
        shift_status = %shift_status,
        "Application decided"
    );

    Ok(Json(updated))
}

/// POST /api/v1/applications/{id}/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    let worker = caller.require(Role::Worker)?;
    let now = Utc::now();

    let existing = db::applications::get_application(&state.db, id)
        .await?
        .filter(|a| a.worker_id == worker.id)
        .ok_or(AppError::NotFound("Application"))?;

    let mut tx = state.db.begin().await?;
    let shift = db::shifts::lock_shift(&mut tx, existing.shift_id)
        .await?
        .ok_or(AppError::NotFound("Shift"))?;
    let application = db::applications::lock_application(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Application"))?;

    let target = ApplicationStatus::Withdrawn;
    if !application.status.can_transition_to(target) {
        return Err(AppError::InvalidTransition {
            from: application.status,
            to: target,
        });
    }

    let was_accepted = application.status == ApplicationStatus::Accepted;
    if was_accepted && shift.has_started(now) {
        return Err(AppError::conflict("Shift has already started"));
    }

    let updated = db::applications::set_status(&mut *tx, id, target).await?;
    if was_accepted && shift.status == ShiftStatus::Filled {
        db::shifts::set_status(&mut *tx, shift.id, ShiftStatus::Open).await?;
    }
    tx.commit().await?;

    tracing::info!(
        application_id = %id,
        shift_id = %shift.id,
        was_accepted,
        "Application withdrawn"
    );

    Ok(Json(updated))
}
