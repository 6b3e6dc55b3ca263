use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use uuid::Uuid;

pub mod applications;
pub mod dashboard;
pub mod payments;
pub mod profiles;
pub mod relations;
pub mod reviews;
pub mod shifts;
pub mod timesheets;
pub mod verifications;

/// Initialize PostgreSQL connection pool
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))
}

/// Side of a shift-work record a caller is on. Selects which owner column
/// a listing filters by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Company(Uuid),
    Worker(Uuid),
}

impl Party {
    pub fn id(self) -> Uuid {
        match self {
            Party::Company(id) | Party::Worker(id) => id,
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            Party::Company(_) => "company_id",
            Party::Worker(_) => "worker_id",
        }
    }
}
