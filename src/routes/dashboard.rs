use axum::extract::State;
use axum::Json;
use chrono::Utc;

use super::extract::Caller;
use crate::app_state::AppState;
use crate::db;
use crate::error::AppError;
use crate::models::dashboard::Dashboard;
use crate::models::profile::Role;

/// GET /api/v1/dashboard: counters for the caller's role.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Caller(profile): Caller,
) -> Result<Json<Dashboard>, AppError> {
    let now = Utc::now();

    let dashboard = match profile.role {
        Role::Company => {
            Dashboard::Company(db::dashboard::company_dashboard(&state.db, profile.id, now).await?)
        }
        Role::Worker => Dashboard::Worker(
            db::dashboard::worker_dashboard(&state.db, profile.id, profile.verification_status, now)
                .await?,
        ),
        Role::Admin => Dashboard::Admin(db::dashboard::admin_dashboard(&state.db).await?),
    };

    Ok(Json(dashboard))
}
