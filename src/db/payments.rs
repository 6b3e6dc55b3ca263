use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use super::Party;
use crate::models::payment::{Payment, PaymentFilter, PaymentStatus, PaymentTotals};
use crate::models::timesheet::Timesheet;

const PAYMENT_COLUMNS: &str = r#"
    id, timesheet_id, application_id, shift_id, worker_id, company_id, payable_minutes,
    hourly_rate_cents, amount_cents, status, paid_at, created_at, updated_at
"#;

/// Amounts for a new ledger row.
#[derive(Debug, Clone, Copy)]
pub struct NewPayment {
    pub payable_minutes: i64,
    pub hourly_rate_cents: i64,
    pub amount_cents: i64,
}

pub async fn create_payment(
    conn: &mut PgConnection,
    timesheet: &Timesheet,
    new: NewPayment,
) -> Result<Payment, sqlx::Error> {
    sqlx::query_as::<_, Payment>(&format!(
        r#"
        INSERT INTO payments
            (timesheet_id, application_id, shift_id, worker_id, company_id,
             payable_minutes, hourly_rate_cents, amount_cents)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {PAYMENT_COLUMNS}
        "#
    ))
    .bind(timesheet.id)
    .bind(timesheet.application_id)
    .bind(timesheet.shift_id)
    .bind(timesheet.worker_id)
    .bind(timesheet.company_id)
    .bind(new.payable_minutes)
    .bind(new.hourly_rate_cents)
    .bind(new.amount_cents)
    .fetch_one(conn)
    .await
}

pub async fn get_payment(pool: &PgPool, id: Uuid) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Move a pending payment to `to`. Returns `None` when the payment is no
/// longer pending.
pub async fn settle_pending(
    pool: &PgPool,
    id: Uuid,
    to: PaymentStatus,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(&format!(
        r#"
        UPDATE payments
        SET status = $2,
            paid_at = CASE WHEN $2 = 'paid' THEN NOW() ELSE paid_at END
        WHERE id = $1 AND status = 'pending'
        RETURNING {PAYMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(to.to_string())
    .fetch_optional(pool)
    .await
}

pub async fn list_payments(
    pool: &PgPool,
    party: Party,
    filter: &PaymentFilter,
) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(&format!(
        r#"
        SELECT {PAYMENT_COLUMNS}
        FROM payments
        WHERE {} = $1
          AND ($2::TEXT IS NULL OR status = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
        party.column()
    ))
    .bind(party.id())
    .bind(filter.status.map(|s| s.to_string()))
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

/// Sum of every payment for `party`, grouped by status.
pub async fn totals(pool: &PgPool, party: Party) -> Result<PaymentTotals, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT status, COALESCE(SUM(amount_cents), 0)::BIGINT AS total
        FROM payments
        WHERE {} = $1
        GROUP BY status
        "#,
        party.column()
    ))
    .bind(party.id())
    .fetch_all(pool)
    .await?;

    let mut totals = PaymentTotals::default();
    for row in rows {
        let status: PaymentStatus = crate::models::decode_enum(&row, "status")?;
        totals.add(status, row.try_get("total")?);
    }
    Ok(totals)
}
