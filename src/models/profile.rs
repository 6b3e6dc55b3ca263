use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::decode_enum;
use super::review::RatingSummary;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Worker,
    Company,
    Admin,
}

/// Identity verification state of a profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    /// Whether a new verification submission is accepted in this state.
    pub fn accepts_submission(self) -> bool {
        matches!(self, Self::Unverified | Self::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub role: Role,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Profile {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            role: decode_enum(row, "role")?,
            display_name: row.try_get("display_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            bio: row.try_get("bio")?,
            company_name: row.try_get("company_name")?,
            location: row.try_get("location")?,
            verification_status: decode_enum(row, "verification_status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Onboarding request; the role is fixed once chosen.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[garde(skip)]
    pub role: Role,

    #[garde(length(min = 1, max = 120))]
    pub display_name: String,

    #[garde(email)]
    pub email: Option<String>,

    #[garde(length(min = 3, max = 40))]
    pub phone: Option<String>,

    #[garde(length(max = 2000))]
    pub bio: Option<String>,

    #[garde(length(min = 1, max = 200))]
    pub company_name: Option<String>,

    #[garde(length(min = 1, max = 200))]
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[garde(length(min = 1, max = 120))]
    pub display_name: Option<String>,

    #[garde(email)]
    pub email: Option<String>,

    #[garde(length(min = 3, max = 40))]
    pub phone: Option<String>,

    #[garde(length(max = 2000))]
    pub bio: Option<String>,

    #[garde(length(min = 1, max = 200))]
    pub company_name: Option<String>,

    #[garde(length(min = 1, max = 200))]
    pub location: Option<String>,
}

/// What other marketplace members see of a profile.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub role: Role,
    pub display_name: String,
    pub bio: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub verification_status: VerificationStatus,
    pub rating: RatingSummary,
    pub member_since: DateTime<Utc>,
}

impl PublicProfile {
    pub fn new(profile: Profile, rating: RatingSummary) -> Self {
        Self {
            id: profile.id,
            role: profile.role,
            display_name: profile.display_name,
            bio: profile.bio,
            company_name: profile.company_name,
            location: profile.location,
            verification_status: profile.verification_status,
            rating,
            member_since: profile.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_text() {
        assert_eq!("company".parse::<Role>().unwrap(), Role::Company);
        assert_eq!(Role::Worker.to_string(), "worker");
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_submission_allowed_only_when_not_in_flight() {
        assert!(VerificationStatus::Unverified.accepts_submission());
        assert!(VerificationStatus::Rejected.accepts_submission());
        assert!(!VerificationStatus::Pending.accepts_submission());
        assert!(!VerificationStatus::Verified.accepts_submission());
    }

    #[test]
    fn test_create_request_validation() {
        let req: CreateProfileRequest = serde_json::from_value(serde_json::json!({
            "role": "worker",
            "display_name": "",
        }))
        .unwrap();
        assert!(req.validate().is_err());

        let req: CreateProfileRequest = serde_json::from_value(serde_json::json!({
            "role": "company",
            "display_name": "Ops",
            "company_name": "Harbor Logistics",
            "email": "ops@harbor.example",
        }))
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_email_must_be_an_address() {
        let req: CreateProfileRequest = serde_json::from_value(serde_json::json!({
            "role": "worker",
            "display_name": "Noor",
            "email": "not-an-address",
        }))
        .unwrap();
        assert!(req.validate().is_err());

        let update: UpdateProfileRequest = serde_json::from_value(serde_json::json!({
            "email": "noor@example.test",
        }))
        .unwrap();
        assert!(update.validate().is_ok());
    }
}
