use chrono::{DateTime, Duration, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::{decode_enum, default_limit};

/// Longest shift a company may post.
pub const MAX_SHIFT_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShiftStatus {
    Open,
    Filled,
    Cancelled,
    Completed,
}

impl ShiftStatus {
    /// Open or filled: the shift is still live and may change.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::Filled)
    }

    /// Status implied by how many vacancies are taken, for an active shift.
    pub fn for_occupancy(accepted: i64, vacancies: i32) -> Self {
        if accepted >= i64::from(vacancies) {
            Self::Filled
        } else {
            Self::Open
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub hourly_rate_cents: i64,
    pub vacancies: i32,
    pub status: ShiftStatus,
    pub accepted_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shift {
    pub fn remaining_vacancies(&self) -> i64 {
        (i64::from(self.vacancies) - self.accepted_count).max(0)
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.starts_at
    }

    pub fn duration_minutes(&self) -> i64 {
        self.ends_at.signed_duration_since(self.starts_at).num_minutes()
    }
}

impl<'r> FromRow<'r, PgRow> for Shift {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            company_id: row.try_get("company_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            location: row.try_get("location")?,
            starts_at: row.try_get("starts_at")?,
            ends_at: row.try_get("ends_at")?,
            hourly_rate_cents: row.try_get("hourly_rate_cents")?,
            vacancies: row.try_get("vacancies")?,
            status: decode_enum(row, "status")?,
            accepted_count: row.try_get("accepted_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Shift as returned by the API.
#[derive(Debug, Serialize)]
pub struct ShiftView {
    #[serde(flatten)]
    pub shift: Shift,
    pub remaining_vacancies: i64,
    pub duration_minutes: i64,
}

impl From<Shift> for ShiftView {
    fn from(shift: Shift) -> Self {
        Self {
            remaining_vacancies: shift.remaining_vacancies(),
            duration_minutes: shift.duration_minutes(),
            shift,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateShiftRequest {
    #[garde(length(min = 1, max = 200))]
    pub title: String,

    #[garde(length(max = 5000))]
    pub description: Option<String>,

    #[garde(length(min = 1, max = 200))]
    pub location: String,

    #[garde(skip)]
    pub starts_at: DateTime<Utc>,

    #[garde(skip)]
    pub ends_at: DateTime<Utc>,

    #[garde(range(min = 1, max = 1_000_000))]
    pub hourly_rate_cents: i64,

    #[garde(range(min = 1, max = 500))]
    pub vacancies: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateShiftRequest {
    #[garde(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[garde(length(max = 5000))]
    pub description: Option<String>,

    #[garde(length(min = 1, max = 200))]
    pub location: Option<String>,

    #[garde(range(min = 1, max = 1_000_000))]
    pub hourly_rate_cents: Option<i64>,

    #[garde(range(min = 1, max = 500))]
    pub vacancies: Option<i32>,
}

/// Reasons a proposed shift window is unacceptable.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ShiftWindowError {
    #[error("shift must end after it starts")]
    EndsBeforeStart,

    #[error("shift may not be longer than {MAX_SHIFT_HOURS} hours")]
    TooLong,

    #[error("shift must start in the future")]
    StartsInPast,
}

/// Check a new shift's time window against `now`.
pub fn validate_window(
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ShiftWindowError> {
    if ends_at <= starts_at {
        return Err(ShiftWindowError::EndsBeforeStart);
    }
    if ends_at - starts_at > Duration::hours(MAX_SHIFT_HOURS) {
        return Err(ShiftWindowError::TooLong);
    }
    if starts_at <= now {
        return Err(ShiftWindowError::StartsInPast);
    }
    Ok(())
}

fn default_status_filter() -> ShiftStatus {
    ShiftStatus::Open
}

/// Query string for browsing shifts.
#[derive(Debug, Deserialize, Validate)]
pub struct ShiftFilter {
    #[garde(skip)]
    pub from: Option<DateTime<Utc>>,

    #[garde(skip)]
    pub to: Option<DateTime<Utc>>,

    #[garde(length(min = 1, max = 200))]
    pub location: Option<String>,

    #[garde(range(min = 0))]
    pub min_rate_cents: Option<i64>,

    #[garde(skip)]
    pub company_id: Option<Uuid>,

    #[serde(default = "default_status_filter")]
    #[garde(skip)]
    pub status: ShiftStatus,

    #[serde(default = "default_limit")]
    #[garde(range(min = 1, max = 100))]
    pub limit: i64,

    #[serde(default)]
    #[garde(range(min = 0))]
    pub offset: i64,
}

impl Default for ShiftFilter {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            location: None,
            min_rate_cents: None,
            company_id: None,
            status: default_status_filter(),
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl ShiftFilter {
    /// `%term%` pattern for a case-insensitive location match, with LIKE
    /// metacharacters escaped.
    pub fn location_pattern(&self) -> Option<String> {
        self.location.as_deref().map(|term| {
            let escaped = term
                .trim()
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
    }
}
