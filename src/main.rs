use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use staffer::app_state::AppState;
use staffer::config::AppConfig;
use staffer::{db, routes};

fn describe_metrics() {
    metrics::describe_counter!("profiles_created_total", "Profiles created, by role");
    metrics::describe_counter!("shifts_created_total", "Shifts posted by companies");
    metrics::describe_counter!("shifts_cancelled_total", "Shifts cancelled by companies");
    metrics::describe_counter!("applications_submitted_total", "Applications submitted");
    metrics::describe_counter!(
        "application_decisions_total",
        "Company decisions on applications, by resulting status"
    );
    metrics::describe_counter!("timesheets_submitted_total", "Timesheets submitted or resubmitted");
    metrics::describe_counter!("timesheets_approved_total", "Timesheets approved into payments");
    metrics::describe_counter!(
        "payments_booked_cents_total",
        "Sum of payment amounts booked from approved timesheets"
    );
    metrics::describe_counter!("payments_settled_total", "Payments marked paid or cancelled");
    metrics::describe_counter!("reviews_created_total", "Reviews posted, by star rating");
    metrics::describe_counter!("worker_relations_set_total", "Favorite and blacklist tags set");
    metrics::describe_counter!("verifications_submitted_total", "Verification wizard submissions");
    metrics::describe_counter!(
        "verifications_reviewed_total",
        "Admin verification decisions, by outcome"
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!("Initializing staffer API server");

    let prometheus_handle = Arc::new(PrometheusBuilder::new().install_recorder()?);
    describe_metrics();

    let state = AppState::from_config(&config).await?;

    tracing::info!("Running database migrations");
    db::run_migrations(&state.db).await?;

    let app = routes::router(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        require_worker_verification = config.require_worker_verification,
        "Server listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
