//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.
//!
//! Every failure path denies access: nothing here ever resolves an error
//! into an authenticated state, and store failures during validation fail
//! closed as "no session".

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Store errors**: any sqlx::Error; the store being down is a
///   transient failure for the caller, never an authentication success
/// - **Randomness errors**: the OS random source failed; issuance aborts
///   rather than fall back to a weaker generator
/// - **Authentication outcomes**: invalid tokens and replayed tokens are
///   expected, non-exceptional results modeled as variants so handlers
///   can map them uniformly
/// - **Policy errors**: issuance refused for an ineligible principal
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Credential store operation failed (connection error, query error).
    ///
    /// Returns HTTP 500; details are logged, never sent to the client.
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// The OS random source was unavailable while generating a secret.
    ///
    /// Fatal for the request: there is no acceptable weaker fallback.
    /// Returns HTTP 500.
    #[error("Random source unavailable")]
    RandomSourceUnavailable,

    /// The presented token matched no live credential.
    ///
    /// Also returned when the matching principal is no longer eligible,
    /// so a disabled account is indistinguishable from a bad token.
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid token")]
    InvalidToken,

    /// A matching credential was found but had already been consumed or
    /// revoked by the time the atomic mark ran - a replay, or the losing
    /// side of a race between two presentations of the same token.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Token already consumed or revoked")]
    AlreadyConsumedOrRevoked,

    /// Issuance refused: the principal is unknown or deactivated.
    ///
    /// Returns HTTP 403 Forbidden. Only issuance surfaces this variant;
    /// validation collapses it into `InvalidToken`.
    #[error("Principal not eligible")]
    IneligiblePrincipal,

    /// No session, or the session expired or was closed.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("No active session")]
    NoSession,

    /// The service key on a portal-internal route is missing or wrong.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid service key")]
    InvalidServiceKey,

    /// The addressed credential does not exist or belongs to another
    /// principal.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Credential not found")]
    CredentialNotFound,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request; the String says what was wrong.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "invalid_token", self.to_string())
            }
            AppError::AlreadyConsumedOrRevoked => (
                StatusCode::UNAUTHORIZED,
                "already_consumed_or_revoked",
                self.to_string(),
            ),
            AppError::IneligiblePrincipal => (
                StatusCode::FORBIDDEN,
                "ineligible_principal",
                self.to_string(),
            ),
            AppError::NoSession => (StatusCode::UNAUTHORIZED, "no_session", self.to_string()),
            AppError::InvalidServiceKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_service_key",
                self.to_string(),
            ),
            AppError::CredentialNotFound => (
                StatusCode::NOT_FOUND,
                "credential_not_found",
                self.to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Store(_) | AppError::RandomSourceUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
