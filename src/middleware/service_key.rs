//! Service-key authentication middleware.
//!
//! Issuance and revocation routes are portal-internal: the portal backend
//! calls them server-to-server with a shared bearer key. The presented
//! key is compared against the configured one in constant time, after
//! hashing both sides so the comparison length is fixed.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{error::AppError, state::AppState};

/// Reject requests whose `Authorization: Bearer <key>` does not match the
/// configured service key.
pub async fn service_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidServiceKey)?;

    let presented = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidServiceKey)?;

    // Hash both sides to a fixed 32 bytes before the constant-time
    // comparison so neither the key length nor a prefix leaks.
    let presented_digest = Sha256::digest(presented.as_bytes());
    let expected_digest = Sha256::digest(state.service_api_key.as_bytes());

    if !bool::from(presented_digest.as_slice().ct_eq(expected_digest.as_slice())) {
        return Err(AppError::InvalidServiceKey);
    }

    Ok(next.run(request).await)
}
