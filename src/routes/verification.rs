use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use super::extract::Caller;
use crate::app_state::AppState;
use crate::db;
use crate::error::AppError;
use crate::models::profile::{Role, VerificationStatus};
use crate::models::verification::{
    DocumentKind, ReviewOutcome, ReviewVerificationRequest, SubmissionStatus,
    SubmitVerificationResponse, Verification,
};
use crate::models::Page;
use crate::services::queue::ScreeningJob;
use crate::services::{screening, storage};

/// POST /api/v1/verification: the wizard's final step, with ID card and selfie
/// in one multipart upload.
pub async fn submit_verification(
    State(state): State<AppState>,
    caller: Caller,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitVerificationResponse>), AppError> {
    let worker = caller.require(Role::Worker)?;

    if !worker.verification_status.accepts_submission() {
        return Err(AppError::conflict(format!(
            "Verification is already {}",
            worker.verification_status
        )));
    }

    let mut id_card: Option<Vec<u8>> = None;
    let mut selfie: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(kind) = field.name().and_then(|name| name.parse::<DocumentKind>().ok()) else {
            continue;
        };

        let data = field.bytes().await?;
        if data.len() > state.policy.max_upload_bytes {
            return Err(AppError::PayloadTooLarge);
        }
        screening::detect_format(kind, &data)?;

        match kind {
            DocumentKind::IdCard => id_card = Some(data.to_vec()),
            DocumentKind::Selfie => selfie = Some(data.to_vec()),
        }
    }

    let (Some(id_card), Some(selfie)) = (id_card, selfie) else {
        return Err(AppError::validation("Both id_card and selfie images are required"));
    };

    let verification_id = Uuid::new_v4();
    let id_card_key = storage::document_key(worker.id, verification_id, DocumentKind::IdCard);
    let selfie_key = storage::document_key(worker.id, verification_id, DocumentKind::Selfie);

    for (key, plaintext) in [(&id_card_key, &id_card), (&selfie_key, &selfie)] {
        let sealed = state.encryption.seal(key, plaintext)?;
        state.storage.upload(key, &sealed).await?;
    }

    let recorded =
        record_submission(&state, worker.id, verification_id, &id_card_key, &selfie_key).await;
    let verification = match recorded {
        Ok(v) => v,
        Err(e) => {
            for key in [&id_card_key, &selfie_key] {
                if let Err(cleanup) = state.storage.delete(key).await {
                    tracing::warn!(key = %key, error = %cleanup, "Failed to remove orphaned upload");
                }
            }
            return Err(e.into());
        }
    };

    // The row is committed; an admin can still review it if the screening
    // job never lands.
    if let Err(e) = state
        .queue
        .enqueue(&ScreeningJob::new(verification.id, worker.id))
        .await
    {
        tracing::error!(
            verification_id = %verification.id,
            error = %e,
            "Failed to enqueue screening job"
        );
    }

    metrics::counter!("verifications_submitted_total").increment(1);
    tracing::info!(
        verification_id = %verification.id,
        worker_id = %worker.id,
        id_card_bytes = id_card.len(),
        selfie_bytes = selfie.len(),
        "Verification submitted"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitVerificationResponse {
            verification_id: verification.id,
            status: verification.status,
            message: "Verification submitted for review".to_string(),
        }),
    ))
}

/// Insert the submission row and mark the worker pending.
async fn record_submission(
    state: &AppState,
    worker_id: Uuid,
    verification_id: Uuid,
    id_card_key: &str,
    selfie_key: &str,
) -> Result<Verification, sqlx::Error> {
    let mut tx = state.db.begin().await?;
    let verification = db::verifications::create_verification(
        &mut *tx,
        verification_id,
        worker_id,
        id_card_key,
        selfie_key,
    )
    .await?;
    db::profiles::set_verification_status(&mut *tx, worker_id, VerificationStatus::Pending).await?;
    tx.commit().await?;
    Ok(verification)
}

/// GET /api/v1/verification: the caller's latest submission.
pub async fn get_my_verification(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Verification>, AppError> {
    let worker = caller.require(Role::Worker)?;

    let verification = db::verifications::latest_for_worker(&state.db, worker.id)
        .await?
        .ok_or(AppError::NotFound("Verification"))?;
    Ok(Json(verification))
}

/// GET /api/v1/admin/verifications
pub async fn list_pending_verifications(
    State(state): State<AppState>,
    caller: Caller,
    Query(page): Query<Page>,
) -> Result<Json<Vec<Verification>>, AppError> {
    caller.require(Role::Admin)?;
    page.validate()?;

    let pending = db::verifications::list_pending(&state.db, page.limit, page.offset).await?;
    Ok(Json(pending))
}

/// GET /api/v1/admin/verifications/{id}/images/{kind}
pub async fn get_verification_image(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, kind)): Path<(Uuid, DocumentKind)>,
) -> Result<impl IntoResponse, AppError> {
    let admin = caller.require(Role::Admin)?;

    let verification = db::verifications::get_verification(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Verification"))?;

    let key = verification.document_key(kind);
    let sealed = state.storage.download(key).await?;
    let image = state.encryption.open(key, &sealed)?;
    let format = screening::detect_format(kind, &image)?;

    tracing::info!(
        verification_id = %id,
        kind = %kind,
        admin_id = %admin.id,
        "Verification image viewed"
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.to_mime_type()),
            (header::CACHE_CONTROL, "no-store"),
        ],
        image,
    ))
}

/// POST /api/v1/admin/verifications/{id}/review
pub async fn review_verification(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewVerificationRequest>,
) -> Result<Json<Verification>, AppError> {
    let admin = caller.require(Role::Admin)?;
    req.validate()?;

    let (status, profile_status) = match req.outcome {
        ReviewOutcome::Approve => (SubmissionStatus::Approved, VerificationStatus::Verified),
        ReviewOutcome::Reject => (SubmissionStatus::Rejected, VerificationStatus::Rejected),
    };
    if status == SubmissionStatus::Rejected && req.reason.is_none() {
        return Err(AppError::validation("A reason is required to reject"));
    }
    let reason = match req.outcome {
        ReviewOutcome::Approve => None,
        ReviewOutcome::Reject => req.reason.as_deref(),
    };

    let mut tx = state.db.begin().await?;
    let verification = db::verifications::lock_verification(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Verification"))?;
    if verification.status != SubmissionStatus::Pending {
        return Err(AppError::conflict(format!(
            "Verification is already {}",
            verification.status
        )));
    }

    let reviewed =
        db::verifications::record_outcome(&mut *tx, id, status, reason, Some(admin.id)).await?;
    db::profiles::set_verification_status(&mut *tx, verification.worker_id, profile_status)
        .await?;
    tx.commit().await?;

    metrics::counter!("verifications_reviewed_total", "status" => status.to_string()).increment(1);
    tracing::info!(
        verification_id = %id,
        worker_id = %verification.worker_id,
        admin_id = %admin.id,
        status = %status,
        "Verification reviewed"
    );

    Ok(Json(reviewed))
}
