use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use super::extract::{AuthUser, Caller};
use crate::app_state::AppState;
use crate::db;
use crate::error::AppError;
use crate::models::application::ApplicationStatus;
use crate::models::Page;
use crate::models::profile::Role;
use crate::models::review::{CreateReviewRequest, Review};

/// POST /api/v1/applications/{id}/reviews: each side of a completed shift
/// rates the other once.
pub async fn create_review(
    State(state): State<AppState>,
    caller: Caller,
    Path(application_id): Path<Uuid>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    req.validate()?;

    let application = db::applications::get_application(&state.db, application_id)
        .await?
        .ok_or(AppError::NotFound("Application"))?;
    let shift = db::shifts::get_shift(&state.db, application.shift_id)
        .await?
        .ok_or(AppError::NotFound("Shift"))?;

    let reviewee_id = match caller.0.role {
        Role::Company if shift.company_id == caller.id() => application.worker_id,
        Role::Worker if application.worker_id == caller.id() => shift.company_id,
        _ => {
            return Err(AppError::forbidden(
                "Only the company and worker on this shift can review it",
            ))
        }
    };

    if application.status != ApplicationStatus::Completed {
        return Err(AppError::conflict("Only completed shifts can be reviewed"));
    }

    let review = db::reviews::create_review(
        &state.db,
        application.id,
        caller.id(),
        reviewee_id,
        req.rating,
        req.comment.as_deref(),
    )
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::conflict("You already reviewed this shift"),
        other => other,
    })?;

    metrics::counter!("reviews_created_total", "rating" => review.rating.to_string()).increment(1);
    tracing::info!(
        review_id = %review.id,
        application_id = %application.id,
        reviewee_id = %reviewee_id,
        rating = review.rating,
        "Review posted"
    );

    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /api/v1/profiles/{id}/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(profile_id): Path<Uuid>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<Review>>, AppError> {
    page.validate()?;

    let reviews =
        db::reviews::list_for_reviewee(&state.db, profile_id, page.limit, page.offset).await?;
    Ok(Json(reviews))
}
