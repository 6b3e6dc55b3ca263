use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{self, Party};
use crate::error::AppError;
use crate::models::profile::{Profile, Role};
use crate::services::auth::bearer_token;

/// Authenticated caller, identified by a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let token = bearer_token(header).ok_or(AppError::Unauthorized)?;
        let claims = state.tokens.verify(token)?;

        Ok(Self {
            id: claims.sub,
            email: claims.email,
        })
    }
}

/// Authenticated caller with an onboarded profile.
#[derive(Debug, Clone)]
pub struct Caller(pub Profile);

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let profile = db::profiles::get_profile(&state.db, user.id)
            .await?
            .ok_or(AppError::ProfileRequired)?;
        Ok(Self(profile))
    }
}

impl Caller {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    pub fn require(&self, role: Role) -> Result<&Profile, AppError> {
        if self.0.role == role {
            Ok(&self.0)
        } else {
            Err(AppError::forbidden(format!("Only {role} accounts can do this")))
        }
    }

    /// Which side of shift work the caller is on. Admins have none.
    pub fn party(&self) -> Result<Party, AppError> {
        match self.0.role {
            Role::Company => Ok(Party::Company(self.0.id)),
            Role::Worker => Ok(Party::Worker(self.0.id)),
            Role::Admin => Err(AppError::forbidden(
                "Admin accounts have no shift records",
            )),
        }
    }
}
