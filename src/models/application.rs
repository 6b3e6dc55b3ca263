use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::profile::VerificationStatus;
use super::relation::RelationKind;
use super::review::RatingSummary;
use super::shift::ShiftStatus;
use super::{decode_enum, decode_optional_enum, default_limit};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Waitlisted,
    Withdrawn,
    Completed,
    Cancelled,
    Expired,
}

impl ApplicationStatus {
    /// Allowed moves of the application lifecycle. `Cancelled` from an
    /// undecided state only happens when the whole shift is cancelled.
    pub fn can_transition_to(self, next: Self) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted | Rejected | Waitlisted | Withdrawn | Cancelled | Expired)
                | (Waitlisted, Accepted | Rejected | Withdrawn | Cancelled | Expired)
                | (Accepted, Completed | Withdrawn | Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        use ApplicationStatus::*;
        matches!(self, Rejected | Withdrawn | Completed | Cancelled | Expired)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub worker_id: Uuid,
    pub status: ApplicationStatus,
    pub message: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Application {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            shift_id: row.try_get("shift_id")?,
            worker_id: row.try_get("worker_id")?,
            status: decode_enum(row, "status")?,
            message: row.try_get("message")?,
            decided_at: row.try_get("decided_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// A worker's application together with the shift it targets.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerApplication {
    #[serde(flatten)]
    pub application: Application,
    pub shift_title: String,
    pub shift_location: String,
    pub shift_starts_at: DateTime<Utc>,
    pub shift_ends_at: DateTime<Utc>,
    pub shift_status: ShiftStatus,
    pub hourly_rate_cents: i64,
    pub company_id: Uuid,
}

impl<'r> FromRow<'r, PgRow> for WorkerApplication {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            application: Application::from_row(row)?,
            shift_title: row.try_get("shift_title")?,
            shift_location: row.try_get("shift_location")?,
            shift_starts_at: row.try_get("shift_starts_at")?,
            shift_ends_at: row.try_get("shift_ends_at")?,
            shift_status: decode_enum(row, "shift_status")?,
            hourly_rate_cents: row.try_get("hourly_rate_cents")?,
            company_id: row.try_get("company_id")?,
        })
    }
}

/// An applicant as the shift owner sees them.
#[derive(Debug, Clone, Serialize)]
pub struct Applicant {
    #[serde(flatten)]
    pub application: Application,
    pub worker_name: String,
    pub verification_status: VerificationStatus,
    pub rating: RatingSummary,
    pub relation: Option<RelationKind>,
}

impl<'r> FromRow<'r, PgRow> for Applicant {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            application: Application::from_row(row)?,
            worker_name: row.try_get("worker_name")?,
            verification_status: decode_enum(row, "verification_status")?,
            rating: RatingSummary::from_parts(
                row.try_get("rating_average")?,
                row.try_get("rating_count")?,
            ),
            relation: decode_optional_enum(row, "relation")?,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ApplyRequest {
    #[garde(length(max = 1000))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
    Waitlist,
    /// Revoke an earlier acceptance before the shift starts.
    Cancel,
}

impl Decision {
    pub fn target_status(self) -> ApplicationStatus {
        match self {
            Self::Accept => ApplicationStatus::Accepted,
            Self::Reject => ApplicationStatus::Rejected,
            Self::Waitlist => ApplicationStatus::Waitlisted,
            Self::Cancel => ApplicationStatus::Cancelled,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    #[garde(skip)]
    pub decision: Decision,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApplicationFilter {
    #[garde(skip)]
    pub status: Option<ApplicationStatus>,

    #[serde(default = "default_limit")]
    #[garde(range(min = 1, max = 100))]
    pub limit: i64,

    #[serde(default)]
    #[garde(range(min = 0))]
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;
    use super::*;

    #[test]
    fn test_pending_moves() {
        for next in [Accepted, Rejected, Waitlisted, Withdrawn, Cancelled, Expired] {
            assert!(Pending.can_transition_to(next), "pending -> {next}");
        }
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Waitlisted.can_transition_to(Pending));
    }

    #[test]
    fn test_accepted_moves() {
        assert!(Accepted.can_transition_to(Completed));
        assert!(Accepted.can_transition_to(Withdrawn));
        assert!(Accepted.can_transition_to(Cancelled));
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!Accepted.can_transition_to(Waitlisted));
    }

    #[test]
    fn test_terminal_states_are_final() {
        let all = [
            Pending, Accepted, Rejected, Waitlisted, Withdrawn, Completed, Cancelled, Expired,
        ];
        for from in all.into_iter().filter(|s| s.is_terminal()) {
            for to in all {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_decision_targets() {
        assert_eq!(Decision::Accept.target_status(), Accepted);
        assert_eq!(Decision::Waitlist.target_status(), Waitlisted);
        assert_eq!(Decision::Cancel.target_status(), Cancelled);
    }
}
