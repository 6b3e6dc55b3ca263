use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::{decode_enum, default_limit};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimesheetStatus {
    Submitted,
    Approved,
    Disputed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timesheet {
    pub id: Uuid,
    pub application_id: Uuid,
    pub shift_id: Uuid,
    pub worker_id: Uuid,
    pub company_id: Uuid,
    pub clock_in: DateTime<Utc>,
    pub clock_out: DateTime<Utc>,
    pub break_minutes: i32,
    pub approved_clock_in: Option<DateTime<Utc>>,
    pub approved_clock_out: Option<DateTime<Utc>>,
    pub approved_break_minutes: Option<i32>,
    pub status: TimesheetStatus,
    pub worker_note: Option<String>,
    pub dispute_reason: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Timesheet {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            application_id: row.try_get("application_id")?,
            shift_id: row.try_get("shift_id")?,
            worker_id: row.try_get("worker_id")?,
            company_id: row.try_get("company_id")?,
            clock_in: row.try_get("clock_in")?,
            clock_out: row.try_get("clock_out")?,
            break_minutes: row.try_get("break_minutes")?,
            approved_clock_in: row.try_get("approved_clock_in")?,
            approved_clock_out: row.try_get("approved_clock_out")?,
            approved_break_minutes: row.try_get("approved_break_minutes")?,
            status: decode_enum(row, "status")?,
            worker_note: row.try_get("worker_note")?,
            dispute_reason: row.try_get("dispute_reason")?,
            approved_at: row.try_get("approved_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Times a payment is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovedTimes {
    pub clock_in: DateTime<Utc>,
    pub clock_out: DateTime<Utc>,
    pub break_minutes: i32,
}

impl ApprovedTimes {
    /// The worker's submitted times with any company overrides applied.
    pub fn resolve(timesheet: &Timesheet, overrides: &ApproveTimesheetRequest) -> Self {
        Self {
            clock_in: overrides.clock_in.unwrap_or(timesheet.clock_in),
            clock_out: overrides.clock_out.unwrap_or(timesheet.clock_out),
            break_minutes: overrides.break_minutes.unwrap_or(timesheet.break_minutes),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitTimesheetRequest {
    #[garde(skip)]
    pub clock_in: DateTime<Utc>,

    #[garde(skip)]
    pub clock_out: DateTime<Utc>,

    #[serde(default)]
    #[garde(range(min = 0, max = 720))]
    pub break_minutes: i32,

    #[garde(length(max = 1000))]
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ApproveTimesheetRequest {
    #[garde(skip)]
    pub clock_in: Option<DateTime<Utc>>,

    #[garde(skip)]
    pub clock_out: Option<DateTime<Utc>>,

    #[garde(range(min = 0, max = 720))]
    pub break_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DisputeTimesheetRequest {
    #[garde(length(min = 1, max = 1000))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TimesheetFilter {
    #[garde(skip)]
    pub status: Option<TimesheetStatus>,

    #[serde(default = "default_limit")]
    #[garde(range(min = 1, max = 100))]
    pub limit: i64,

    #[serde(default)]
    #[garde(range(min = 0))]
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn timesheet() -> Timesheet {
        let clock_in = Utc.with_ymd_and_hms(2026, 4, 10, 8, 0, 0).unwrap();
        Timesheet {
            id: Uuid::nil(),
            application_id: Uuid::nil(),
            shift_id: Uuid::nil(),
            worker_id: Uuid::nil(),
            company_id: Uuid::nil(),
            clock_in,
            clock_out: clock_in + Duration::hours(8),
            break_minutes: 30,
            approved_clock_in: None,
            approved_clock_out: None,
            approved_break_minutes: None,
            status: TimesheetStatus::Submitted,
            worker_note: None,
            dispute_reason: None,
            approved_at: None,
            created_at: clock_in,
            updated_at: clock_in,
        }
    }

    #[test]
    fn test_resolve_without_overrides_uses_submission() {
        let ts = timesheet();
        let times = ApprovedTimes::resolve(&ts, &ApproveTimesheetRequest::default());

        assert_eq!(times.clock_in, ts.clock_in);
        assert_eq!(times.clock_out, ts.clock_out);
        assert_eq!(times.break_minutes, 30);
    }

    #[test]
    fn test_resolve_applies_partial_overrides() {
        let ts = timesheet();
        let earlier_out = ts.clock_out - Duration::minutes(45);
        let times = ApprovedTimes::resolve(
            &ts,
            &ApproveTimesheetRequest {
                clock_out: Some(earlier_out),
                break_minutes: Some(0),
                ..Default::default()
            },
        );

        assert_eq!(times.clock_in, ts.clock_in);
        assert_eq!(times.clock_out, earlier_out);
        assert_eq!(times.break_minutes, 0);
    }
}
