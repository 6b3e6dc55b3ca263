use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    auth::TokenVerifier, encryption::EncryptionService, queue::ScreeningQueue,
    storage::ObjectStorage,
};

/// Marketplace rules that vary per deployment.
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    pub require_worker_verification: bool,
    /// Largest accepted size of a single verification photo.
    pub max_upload_bytes: usize,
}

impl From<&AppConfig> for Policy {
    fn from(config: &AppConfig) -> Self {
        Self {
            require_worker_verification: config.require_worker_verification,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub storage: Arc<ObjectStorage>,
    pub encryption: Arc<EncryptionService>,
    pub queue: Arc<ScreeningQueue>,
    pub tokens: Arc<TokenVerifier>,
    pub policy: Policy,
}

impl AppState {
    pub fn new(
        db: PgPool,
        storage: ObjectStorage,
        encryption: EncryptionService,
        queue: ScreeningQueue,
        tokens: TokenVerifier,
        policy: Policy,
    ) -> Self {
        Self {
            db,
            storage: Arc::new(storage),
            encryption: Arc::new(encryption),
            queue: Arc::new(queue),
            tokens: Arc::new(tokens),
            policy,
        }
    }

    /// Build every client from configuration. Shared by the API server and
    /// the background worker.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        tracing::info!("Connecting to PostgreSQL database");
        let db = crate::db::init_pool(&config.database_url).await?;

        tracing::info!("Initializing object storage client");
        let storage = ObjectStorage::new(
            &config.storage_bucket,
            &config.storage_endpoint,
            &config.storage_region,
            &config.storage_access_key,
            &config.storage_secret_key,
        )?;

        tracing::info!("Initializing AES-256-GCM encryption");
        let encryption = EncryptionService::new(&config.encryption_key)?;

        tracing::info!("Connecting to Redis screening queue");
        let queue = ScreeningQueue::new(&config.redis_url)?;

        let tokens = TokenVerifier::new(&config.jwt_secret, config.jwt_audience.as_deref())?;

        Ok(Self::new(
            db,
            storage,
            encryption,
            queue,
            tokens,
            Policy::from(config),
        ))
    }
}
