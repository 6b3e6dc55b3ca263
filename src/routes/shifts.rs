use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use garde::Validate;
use serde::Deserialize;
use uuid::Uuid;

use super::extract::{AuthUser, Caller};
use crate::app_state::AppState;
use crate::db;
use crate::error::AppError;
use crate::models::default_limit;
use crate::models::profile::Role;
use crate::models::shift::{
    self, CreateShiftRequest, ShiftFilter, ShiftStatus, ShiftView, UpdateShiftRequest,
};

#[derive(Debug, Deserialize, Validate)]
pub struct MyShiftsQuery {
    #[garde(skip)]
    pub status: Option<ShiftStatus>,

    #[serde(default = "default_limit")]
    #[garde(range(min = 1, max = 100))]
    pub limit: i64,

    #[serde(default)]
    #[garde(range(min = 0))]
    pub offset: i64,
}

#[derive(Debug, serde::Serialize)]
pub struct CancelShiftResponse {
    pub shift: ShiftView,
    pub cancelled_applications: u64,
}

/// POST /api/v1/shifts
pub async fn create_shift(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateShiftRequest>,
) -> Result<(StatusCode, Json<ShiftView>), AppError> {
    let company = caller.require(Role::Company)?;
    req.validate()?;
    shift::validate_window(req.starts_at, req.ends_at, Utc::now())?;

    let shift = db::shifts::create_shift(&state.db, company.id, &req).await?;

    metrics::counter!("shifts_created_total").increment(1);
    tracing::info!(
        shift_id = %shift.id,
        company_id = %company.id,
        starts_at = %shift.starts_at,
        vacancies = shift.vacancies,
        "Shift posted"
    );

    Ok((StatusCode::CREATED, Json(shift.into())))
}

/// GET /api/v1/shifts: browse shifts (defaults to open ones).
pub async fn list_shifts(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<ShiftFilter>,
) -> Result<Json<Vec<ShiftView>>, AppError> {
    filter.validate()?;
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if to <= from {
            return Err(AppError::validation("`to` must be after `from`"));
        }
    }

    let shifts = db::shifts::list_shifts(&state.db, &filter).await?;
    Ok(Json(shifts.into_iter().map(ShiftView::from).collect()))
}

/// GET /api/v1/shifts/mine: the calling company's shifts.
pub async fn list_my_shifts(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<MyShiftsQuery>,
) -> Result<Json<Vec<ShiftView>>, AppError> {
    let company = caller.require(Role::Company)?;
    query.validate()?;

    let shifts = db::shifts::list_company_shifts(
        &state.db,
        company.id,
        query.status,
        query.limit,
        query.offset,
    )
    .await?;

    Ok(Json(shifts.into_iter().map(ShiftView::from).collect()))
}

/// GET /api/v1/shifts/{id}
pub async fn get_shift(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftView>, AppError> {
    let shift = db::shifts::get_shift(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Shift"))?;
    Ok(Json(shift.into()))
}

/// PATCH /api/v1/shifts/{id}
pub async fn update_shift(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateShiftRequest>,
) -> Result<Json<ShiftView>, AppError> {
    let company = caller.require(Role::Company)?;
    req.validate()?;

    let mut tx = state.db.begin().await?;
    let shift = db::shifts::lock_shift(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Shift"))?;

    if shift.company_id != company.id {
        return Err(AppError::forbidden("Not your shift"));
    }
    if !shift.status.is_active() {
        return Err(AppError::conflict(format!("Shift is {}", shift.status)));
    }

    let vacancies = req.vacancies.unwrap_or(shift.vacancies);
    if i64::from(vacancies) < shift.accepted_count {
        return Err(AppError::conflict(format!(
            "{} workers already accepted; vacancies cannot drop below that",
            shift.accepted_count
        )));
    }

    let status = ShiftStatus::for_occupancy(shift.accepted_count, vacancies);
    db::shifts::update_shift(&mut tx, id, &req, status).await?;
    let updated = db::shifts::get_shift(&mut *tx, id)
        .await?
        .ok_or(AppError::NotFound("Shift"))?;
    tx.commit().await?;

    tracing::info!(shift_id = %id, status = %updated.status, "Shift updated");
    Ok(Json(updated.into()))
}

/// POST /api/v1/shifts/{id}/cancel
pub async fn cancel_shift(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelShiftResponse>, AppError> {
    let company = caller.require(Role::Company)?;

    let mut tx = state.db.begin().await?;
    let shift = db::shifts::lock_shift(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Shift"))?;

    if shift.company_id != company.id {
        return Err(AppError::forbidden("Not your shift"));
    }
    if !shift.status.is_active() {
        return Err(AppError::conflict(format!("Shift is already {}", shift.status)));
    }

    let cancelled_applications = db::shifts::cancel_shift(&mut tx, id).await?;
    let cancelled = db::shifts::get_shift(&mut *tx, id)
        .await?
        .ok_or(AppError::NotFound("Shift"))?;
    tx.commit().await?;

    metrics::counter!("shifts_cancelled_total").increment(1);
    tracing::info!(
        shift_id = %id,
        cancelled_applications,
        "Shift cancelled"
    );

    Ok(Json(CancelShiftResponse {
        shift: cancelled.into(),
        cancelled_applications,
    }))
}
