pub mod applications;
pub mod dashboard;
pub mod extract;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod profiles;
pub mod relations;
pub mod reviews;
pub mod shifts;
pub mod timesheets;
pub mod verification;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Headroom for multipart framing around the two verification photos.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/profiles", post(profiles::create_profile))
        .route(
            "/profiles/me",
            get(profiles::get_me).patch(profiles::update_me),
        )
        .route("/profiles/{id}", get(profiles::get_profile))
        .route("/profiles/{id}/reviews", get(reviews::list_reviews))
        .route(
            "/shifts",
            get(shifts::list_shifts).post(shifts::create_shift),
        )
        .route("/shifts/mine", get(shifts::list_my_shifts))
        .route("/shifts/{id}", get(shifts::get_shift).patch(shifts::update_shift))
        .route("/shifts/{id}/cancel", post(shifts::cancel_shift))
        .route(
            "/shifts/{id}/applications",
            get(applications::list_shift_applications).post(applications::apply),
        )
        .route("/applications/mine", get(applications::list_my_applications))
        .route("/applications/{id}/decision", post(applications::decide))
        .route("/applications/{id}/withdraw", post(applications::withdraw))
        .route("/applications/{id}/timesheet", post(timesheets::submit_timesheet))
        .route("/applications/{id}/reviews", post(reviews::create_review))
        .route("/timesheets", get(timesheets::list_timesheets))
        .route("/timesheets/{id}/approve", post(timesheets::approve_timesheet))
        .route("/timesheets/{id}/dispute", post(timesheets::dispute_timesheet))
        .route("/payments", get(payments::list_payments))
        .route("/payments/{id}/paid", post(payments::mark_paid))
        .route("/payments/{id}/cancel", post(payments::cancel_payment))
        .route("/relations", get(relations::list_relations))
        .route(
            "/relations/{worker_id}",
            put(relations::set_relation).delete(relations::remove_relation),
        )
        .route(
            "/verification",
            get(verification::get_my_verification).post(verification::submit_verification),
        )
        .route(
            "/admin/verifications",
            get(verification::list_pending_verifications),
        )
        .route(
            "/admin/verifications/{id}/images/{kind}",
            get(verification::get_verification_image),
        )
        .route(
            "/admin/verifications/{id}/review",
            post(verification::review_verification),
        )
        .route("/dashboard", get(dashboard::get_dashboard))
}

/// Full HTTP surface: health, metrics and the versioned API.
pub fn router(state: AppState, prometheus: Arc<PrometheusHandle>) -> Router {
    let body_limit = state.policy.max_upload_bytes * 2 + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(prometheus),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
}
