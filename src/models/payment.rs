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
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
}

/// Ledger row generated when a timesheet is approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub timesheet_id: Uuid,
    pub application_id: Uuid,
    pub shift_id: Uuid,
    pub worker_id: Uuid,
    pub company_id: Uuid,
    pub payable_minutes: i64,
    pub hourly_rate_cents: i64,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Payment {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            timesheet_id: row.try_get("timesheet_id")?,
            application_id: row.try_get("application_id")?,
            shift_id: row.try_get("shift_id")?,
            worker_id: row.try_get("worker_id")?,
            company_id: row.try_get("company_id")?,
            payable_minutes: row.try_get("payable_minutes")?,
            hourly_rate_cents: row.try_get("hourly_rate_cents")?,
            amount_cents: row.try_get("amount_cents")?,
            status: decode_enum(row, "status")?,
            paid_at: row.try_get("paid_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Sum of amounts per payment status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentTotals {
    pub pending_cents: i64,
    pub paid_cents: i64,
    pub cancelled_cents: i64,
}

impl PaymentTotals {
    pub fn add(&mut self, status: PaymentStatus, amount_cents: i64) {
        match status {
            PaymentStatus::Pending => self.pending_cents += amount_cents,
            PaymentStatus::Paid => self.paid_cents += amount_cents,
            PaymentStatus::Cancelled => self.cancelled_cents += amount_cents,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentList {
    pub payments: Vec<Payment>,
    pub totals: PaymentTotals,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentFilter {
    #[garde(skip)]
    pub status: Option<PaymentStatus>,

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

    #[test]
    fn test_totals_accumulate_by_status() {
        let mut totals = PaymentTotals::default();
        totals.add(PaymentStatus::Pending, 1_000);
        totals.add(PaymentStatus::Pending, 250);
        totals.add(PaymentStatus::Paid, 4_000);
        totals.add(PaymentStatus::Cancelled, 99);

        assert_eq!(
            totals,
            PaymentTotals {
                pending_cents: 1_250,
                paid_cents: 4_000,
                cancelled_cents: 99,
            }
        );
    }
}
