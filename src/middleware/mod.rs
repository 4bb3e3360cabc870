//! HTTP middleware components.
//!
//! Two authentication layers guard the routes: the service key for
//! portal-internal issuance/revocation calls, and the session bearer for
//! the principal-facing endpoints.

/// Portal-backend service-key check
pub mod service_key;
/// Session bearer resolution
pub mod session;
