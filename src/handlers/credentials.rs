//! Credential issuance and revocation HTTP handlers.
//!
//! All routes here are portal-internal (service-key protected):
//! - POST   /api/v1/credentials - issue a token for a principal
//! - DELETE /api/v1/credentials/:id - revoke one credential
//! - DELETE /api/v1/principals/:id/credentials - revoke all for a principal

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::credential::{
        IssueCredentialRequest, IssuedCredentialResponse, RevokeCredentialRequest,
        RevokedResponse,
    },
    services::{revocation, token_service},
    state::AppState,
};

/// Issue a new credential.
///
/// # Endpoint
///
/// `POST /api/v1/credentials`
///
/// # Request Body
///
/// ```json
/// {
///   "principal_id": "550e8400-e29b-41d4-a716-446655440000",
///   "kind": "transient",
///   "lifetime_minutes": 15
/// }
/// ```
///
/// # Response
///
/// - **Success (200)**: credential metadata plus the plaintext token -
///   the only time it is ever returned. The portal embeds it in the
///   magic link and must not log it.
/// - **Error (403)**: principal unknown or deactivated
/// - **Error (401)**: bad service key
pub async fn issue_credential(
    State(state): State<AppState>,
    Json(request): Json<IssueCredentialRequest>,
) -> Result<Json<IssuedCredentialResponse>, AppError> {
    let issued = token_service::issue(
        state.store.as_ref(),
        state.eligibility.as_ref(),
        state.token_pepper.as_bytes(),
        request,
        Utc::now(),
    )
    .await?;

    Ok(Json(IssuedCredentialResponse {
        id: issued.credential.id,
        token: issued.plaintext,
        principal_id: issued.credential.principal_id,
        kind: issued.credential.kind,
        expires_at: issued.credential.expires_at,
    }))
}

/// Revoke a single credential.
///
/// # Endpoint
///
/// `DELETE /api/v1/credentials/:id`
///
/// The body carries the owning principal id; a mismatched principal gets
/// 404, indistinguishable from an id that never existed.
pub async fn revoke_credential(
    State(state): State<AppState>,
    Path(credential_id): Path<Uuid>,
    Json(request): Json<RevokeCredentialRequest>,
) -> Result<Json<RevokedResponse>, AppError> {
    revocation::revoke_one(
        state.store.as_ref(),
        credential_id,
        request.principal_id,
        Utc::now(),
    )
    .await?;

    Ok(Json(RevokedResponse { revoked: 1 }))
}

/// Revoke every live credential of a principal.
///
/// # Endpoint
///
/// `DELETE /api/v1/principals/:id/credentials`
///
/// Used on security events and when re-issuance should supersede all
/// outstanding links. Also closes the principal's open sessions, since a
/// caller revoking everything expects no residual access.
pub async fn revoke_all_credentials(
    State(state): State<AppState>,
    Path(principal_id): Path<Uuid>,
) -> Result<Json<RevokedResponse>, AppError> {
    let revoked = revocation::revoke_all(state.store.as_ref(), principal_id, Utc::now()).await?;
    state.sessions.close_all_for_principal(principal_id).await;

    Ok(Json(RevokedResponse { revoked }))
}
