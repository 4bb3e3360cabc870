//! Shared application state.
//!
//! The store, eligibility predicate, and session binder are constructed
//! once at startup and injected into handlers through Axum state, not
//! reached through globals, so tests can swap any of them out.

use std::sync::Arc;

use chrono::Duration;

use crate::config::Config;
use crate::db::DbPool;
use crate::services::eligibility::{EligibilityCheck, PrincipalDirectory};
use crate::session::SessionStore;
use crate::store::{CredentialStore, PgCredentialStore};

#[derive(Clone)]
pub struct AppState {
    /// Pool kept alongside the store for the health check
    pub pool: DbPool,

    pub store: Arc<dyn CredentialStore>,

    pub eligibility: Arc<dyn EligibilityCheck>,

    pub sessions: SessionStore,

    /// Bearer key the portal backend presents on internal routes
    pub service_api_key: String,

    /// HMAC key for token hashing
    pub token_pepper: String,
}

impl AppState {
    pub fn new(pool: DbPool, config: &Config) -> Self {
        Self {
            pool: pool.clone(),
            store: Arc::new(PgCredentialStore::new(pool.clone())),
            eligibility: Arc::new(PrincipalDirectory::new(pool)),
            sessions: SessionStore::new(Duration::minutes(config.session_lifetime_minutes)),
            service_api_key: config.service_api_key.clone(),
            token_pepper: config.token_pepper.clone(),
        }
    }
}
