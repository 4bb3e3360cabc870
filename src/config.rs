//! Application configuration management.
//!
//! Configuration comes from environment variables, deserialized into a
//! type-safe struct with the `envy` crate. A local `.env` file is loaded
//! first if present.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVICE_API_KEY` (required): bearer key the portal backend presents
///   on issuance/revocation routes
/// - `TOKEN_PEPPER` (required): HMAC key for token hashing; rotating it
///   invalidates every outstanding credential
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `SESSION_LIFETIME_MINUTES` (optional): defaults to 60
/// - `CLEANUP_INTERVAL_SECS` (optional): sweep cadence, defaults to 3600
/// - `RETENTION_DAYS` (optional): how long expired credentials are kept
///   for the audit trail before the sweep deletes them, defaults to 30
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    pub service_api_key: String,

    pub token_pepper: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_session_lifetime_minutes")]
    pub session_lifetime_minutes: i64,

    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,

    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

fn default_port() -> u16 {
    3000
}

fn default_session_lifetime_minutes() -> i64 {
    60
}

fn default_cleanup_interval_secs() -> u64 {
    3600
}

fn default_retention_days() -> i64 {
    30
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing (DATABASE_URL,
    /// SERVICE_API_KEY, TOKEN_PEPPER) or a value cannot be parsed into
    /// the expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        // Load .env if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names map to upper-case variables: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}
