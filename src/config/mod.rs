use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Optional for worker processes.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Redis connection string for the screening queue
    pub redis_url: String,

    /// Bucket holding encrypted verification photos
    pub storage_bucket: String,

    /// S3-compatible endpoint URL
    pub storage_endpoint: String,

    #[serde(default = "default_storage_region")]
    pub storage_region: String,

    /// Access key ID (S3-compatible)
    pub storage_access_key: String,

    /// Secret access key (S3-compatible)
    pub storage_secret_key: String,

    /// AES-256-GCM encryption key (base64-encoded, 32 bytes)
    pub encryption_key: String,

    /// HS256 secret shared with the auth provider that issues access tokens
    pub jwt_secret: String,

    /// Expected `aud` claim. Audience is not checked when unset.
    #[serde(default)]
    pub jwt_audience: Option<String>,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Workers must hold an approved verification before applying to shifts.
    #[serde(default)]
    pub require_worker_verification: bool,

    /// Seconds between housekeeping sweeps in the worker process.
    #[serde(default = "default_housekeeping_interval_secs")]
    pub housekeeping_interval_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_storage_region() -> String {
    "auto".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_housekeeping_interval_secs() -> u64 {
    60
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
