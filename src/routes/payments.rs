use axum::extract::{Path, Query, State};
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use super::extract::Caller;
use crate::app_state::AppState;
use crate::db;
use crate::error::AppError;
use crate::models::payment::{Payment, PaymentFilter, PaymentList, PaymentStatus};
use crate::models::profile::Role;
use crate::services::payroll;

/// GET /api/v1/payments: outgoing for companies, incoming for workers.
pub async fn list_payments(
    State(state): State<AppState>,
    caller: Caller,
    Query(filter): Query<PaymentFilter>,
) -> Result<Json<PaymentList>, AppError> {
    let party = caller.party()?;
    filter.validate()?;

    let payments = db::payments::list_payments(&state.db, party, &filter).await?;
    let totals = db::payments::totals(&state.db, party).await?;

    Ok(Json(PaymentList { payments, totals }))
}

/// POST /api/v1/payments/{id}/paid
pub async fn mark_paid(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>, AppError> {
    settle(&state, &caller, id, PaymentStatus::Paid).await.map(Json)
}

/// POST /api/v1/payments/{id}/cancel
pub async fn cancel_payment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>, AppError> {
    settle(&state, &caller, id, PaymentStatus::Cancelled).await.map(Json)
}

async fn settle(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    to: PaymentStatus,
) -> Result<Payment, AppError> {
    let company = caller.require(Role::Company)?;

    let payment = db::payments::get_payment(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Payment"))?;
    if payment.company_id != company.id {
        return Err(AppError::forbidden("Not your payment"));
    }
    if payment.status != PaymentStatus::Pending {
        return Err(AppError::conflict(format!("Payment is already {}", payment.status)));
    }

    // Conditional update; a concurrent settlement leaves nothing to return.
    let settled = db::payments::settle_pending(&state.db, id, to)
        .await?
        .ok_or_else(|| AppError::conflict("Payment is no longer pending"))?;

    metrics::counter!("payments_settled_total", "status" => to.to_string()).increment(1);
    tracing::info!(
        payment_id = %id,
        status = %to,
        amount = %payroll::format_cents(settled.amount_cents),
        "Payment settled"
    );

    Ok(settled)
}
