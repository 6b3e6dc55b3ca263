use chrono::Utc;
use staffer::{
    app_state::AppState,
    config::AppConfig,
    db,
    models::profile::VerificationStatus,
    models::verification::{DocumentKind, SubmissionStatus},
    services::{queue::ScreeningJob, screening, storage::StorageError},
};
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

const MAX_RETRIES: u32 = 3;
const POLL_INTERVAL_MS: u64 = 1000;

/// Result of screening one submission.
enum Screening {
    Passed,
    Failed(String),
    /// Submission vanished or was already decided by an admin.
    Skipped,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting staffer background worker");

    let config = AppConfig::from_env()?;
    let state = AppState::from_config(&config).await?;

    let interval = Duration::from_secs(config.housekeeping_interval_secs.max(1));
    tokio::spawn(housekeeping_loop(state.clone(), interval));

    tracing::info!("Worker ready, polling screening queue");

    loop {
        match process_next_job(&state).await {
            Ok(true) => {
                tracing::debug!("Job processed, checking for next job");
            }
            Ok(false) => {
                tracing::trace!("No jobs available, sleeping");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error processing job, will retry");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
        }
    }
}

/// Process the next screening job.
/// Returns Ok(true) if a job was processed, Ok(false) if the queue was empty.
async fn process_next_job(state: &AppState) -> Result<bool, Box<dyn std::error::Error>> {
    let job = match state.queue.dequeue().await? {
        Some(j) => j,
        None => return Ok(false),
    };

    tracing::info!(
        verification_id = %job.verification_id,
        worker_id = %job.worker_id,
        attempt = job.attempt,
        "Screening verification submission"
    );

    match screen_submission(state, &job).await {
        Ok(Screening::Passed) => {
            db::verifications::mark_screened(&state.db, job.verification_id).await?;
            tracing::info!(
                verification_id = %job.verification_id,
                "Screening passed, awaiting admin review"
            );
        }
        Ok(Screening::Failed(reason)) => {
            reject_submission(state, &job, &reason).await?;
            tracing::info!(
                verification_id = %job.verification_id,
                reason = %reason,
                "Screening rejected submission"
            );
        }
        Ok(Screening::Skipped) => {
            tracing::info!(
                verification_id = %job.verification_id,
                "Submission no longer pending, skipping"
            );
        }
        Err(e) if job.retries_exhausted(MAX_RETRIES) => {
            let reason = format!("Screening failed after {MAX_RETRIES} retries: {e}");
            reject_submission(state, &job, &reason).await?;
            tracing::warn!(
                verification_id = %job.verification_id,
                error = %e,
                "Screening failed after max retries"
            );
        }
        Err(e) => {
            state.queue.enqueue(&job.next_attempt()).await?;
            tracing::warn!(
                verification_id = %job.verification_id,
                attempt = job.attempt,
                error = %e,
                "Screening failed, re-queued for retry"
            );
        }
    }

    state.queue.complete(&job).await?;
    Ok(true)
}

/// Download, decrypt and check both photos of a submission.
async fn screen_submission(
    state: &AppState,
    job: &ScreeningJob,
) -> Result<Screening, Box<dyn std::error::Error>> {
    let Some(verification) =
        db::verifications::get_verification(&state.db, job.verification_id).await?
    else {
        return Ok(Screening::Skipped);
    };
    if verification.status != SubmissionStatus::Pending {
        return Ok(Screening::Skipped);
    }

    for kind in [DocumentKind::IdCard, DocumentKind::Selfie] {
        let key = verification.document_key(kind);
        let sealed = match state.storage.download(key).await {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound(_)) => {
                return Ok(Screening::Failed(format!("{kind} image is missing")));
            }
            Err(e) => return Err(e.into()),
        };
        let image = state.encryption.open(key, &sealed)?;

        match screening::screen_document(kind, &image) {
            Ok((width, height)) => {
                tracing::debug!(
                    verification_id = %verification.id,
                    kind = %kind,
                    width,
                    height,
                    "Document passed screening"
                );
            }
            Err(e) => return Ok(Screening::Failed(e.to_string())),
        }
    }

    Ok(Screening::Passed)
}

/// Reject a still-pending submission and flag the worker's profile.
async fn reject_submission(
    state: &AppState,
    job: &ScreeningJob,
    reason: &str,
) -> Result<(), sqlx::Error> {
    let mut tx = state.db.begin().await?;
    let Some(verification) =
        db::verifications::lock_verification(&mut tx, job.verification_id).await?
    else {
        return Ok(());
    };
    if verification.status != SubmissionStatus::Pending {
        return Ok(());
    }

    db::verifications::record_outcome(
        &mut *tx,
        verification.id,
        SubmissionStatus::Rejected,
        Some(reason),
        None,
    )
    .await?;
    db::profiles::set_verification_status(
        &mut *tx,
        verification.worker_id,
        VerificationStatus::Rejected,
    )
    .await?;
    tx.commit().await
}

/// Periodically expire stale applications and close out finished shifts.
async fn housekeeping_loop(state: AppState, every: Duration) {
    let mut ticker = tokio::time::interval(every);

    loop {
        ticker.tick().await;
        let now = Utc::now();

        match db::applications::expire_started(&state.db, now).await {
            Ok(0) => {}
            Ok(expired) => tracing::info!(expired, "Expired undecided applications"),
            Err(e) => tracing::error!(error = %e, "Failed to expire applications"),
        }

        match db::shifts::complete_ended(&state.db, now).await {
            Ok(0) => {}
            Ok(completed) => tracing::info!(completed, "Completed ended shifts"),
            Err(e) => tracing::error!(error = %e, "Failed to complete shifts"),
        }

        match state.queue.queue_depth().await {
            Ok(depth) => tracing::debug!(depth, "Screening queue depth"),
            Err(e) => tracing::warn!(error = %e, "Failed to read queue depth"),
        }
    }
}
