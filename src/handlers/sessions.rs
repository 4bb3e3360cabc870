//! Session HTTP handlers.
//!
//! - POST   /api/v1/sessions - present a token, open a session (public)
//! - GET    /api/v1/sessions/current - inspect the session (protected)
//! - DELETE /api/v1/sessions/current - close this session (protected)
//! - POST   /api/v1/sessions/logout-everywhere - close all sessions and
//!   revoke all credentials of the principal (protected)

use axum::{Extension, Json, extract::State};
use chrono::Utc;
use serde_json::{Value, json};

use crate::{
    error::AppError,
    middleware::session::SessionContext,
    models::session::{LoginRequest, SessionResponse},
    services::{revocation, token_service},
    state::AppState,
};

/// Log in with a magic-link token.
///
/// # Endpoint
///
/// `POST /api/v1/sessions`
///
/// # Request Body
///
/// ```json
/// { "token": "9f8ce29c..." }
/// ```
///
/// # Response
///
/// - **Success (200)**: a fresh session id and its expiry. Transient
///   tokens are consumed by this call; durable tokens stay valid for
///   future logins.
/// - **Error (401)**: token invalid, expired, replayed, or revoked -
///   uniformly, with no detail about which
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let now = Utc::now();

    let credential = token_service::login(
        state.store.as_ref(),
        state.eligibility.as_ref(),
        state.token_pepper.as_bytes(),
        &request.token,
        now,
    )
    .await?;

    let session = state.sessions.open(credential.principal_id, now).await;

    Ok(Json(session.into()))
}

/// Return the calling session.
///
/// # Endpoint
///
/// `GET /api/v1/sessions/current`
///
/// The middleware already re-checked expiry and principal eligibility;
/// reaching this handler means the session is good.
pub async fn current_session(
    Extension(ctx): Extension<SessionContext>,
) -> Json<SessionResponse> {
    Json(ctx.session.into())
}

/// Close the calling session.
///
/// # Endpoint
///
/// `DELETE /api/v1/sessions/current`
///
/// Clears session state only. A durable credential used to open the
/// session remains valid for a future login.
pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Json<Value> {
    state.sessions.close(ctx.session.id).await;

    Json(json!({ "closed": true }))
}

/// Log out everywhere: close all the principal's sessions and revoke all
/// their live credentials.
///
/// # Endpoint
///
/// `POST /api/v1/sessions/logout-everywhere`
pub async fn logout_everywhere(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<Value>, AppError> {
    let principal_id = ctx.session.principal_id;

    let revoked =
        revocation::revoke_all(state.store.as_ref(), principal_id, Utc::now()).await?;
    let closed = state.sessions.close_all_for_principal(principal_id).await;

    Ok(Json(json!({ "closed_sessions": closed, "revoked_credentials": revoked })))
}
