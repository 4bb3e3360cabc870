//! HTTP request handlers.
//!
//! Handlers translate between the HTTP surface and the credential
//! services; no security logic lives here.

/// Issuance and revocation (portal-internal)
pub mod credentials;
/// Liveness and store connectivity
pub mod health;
/// Login, session introspection, logout
pub mod sessions;
