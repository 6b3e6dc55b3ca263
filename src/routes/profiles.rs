use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use super::extract::{AuthUser, Caller};
use crate::app_state::AppState;
use crate::db;
use crate::error::AppError;
use crate::models::profile::{
    CreateProfileRequest, Profile, PublicProfile, Role, UpdateProfileRequest,
};

/// POST /api/v1/profiles: onboarding; picks the account role once.
pub async fn create_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    req.validate()?;

    if req.role == Role::Admin {
        return Err(AppError::forbidden("Admin accounts cannot be self-assigned"));
    }
    if req.role == Role::Company && req.company_name.is_none() {
        return Err(AppError::validation("company_name is required for companies"));
    }
    if db::profiles::get_profile(&state.db, user.id).await?.is_some() {
        return Err(AppError::conflict("Profile already exists"));
    }

    let profile = db::profiles::create_profile(&state.db, user.id, &req, user.email.as_deref()).await?;

    metrics::counter!("profiles_created_total", "role" => profile.role.to_string()).increment(1);
    tracing::info!(profile_id = %profile.id, role = %profile.role, "Profile created");

    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/v1/profiles/me
pub async fn get_me(caller: Caller) -> Json<Profile> {
    Json(caller.0)
}

/// PATCH /api/v1/profiles/me: role and verification status are not editable.
pub async fn update_me(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    req.validate()?;

    let profile = db::profiles::update_profile(&state.db, caller.id(), &req)
        .await?
        .ok_or(AppError::NotFound("Profile"))?;

    Ok(Json(profile))
}

/// GET /api/v1/profiles/{id}: public view with rating summary.
pub async fn get_profile(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicProfile>, AppError> {
    let profile = db::profiles::get_profile(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Profile"))?;
    let rating = db::reviews::rating_summary(&state.db, id).await?;

    Ok(Json(PublicProfile::new(profile, rating)))
}
