//! Session authentication middleware.
//!
//! Resolves the bearer session id through the session binder - which
//! enforces expiry and re-checks principal eligibility on every read -
//! and injects the resulting context into the request for handlers to
//! extract.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{error::AppError, models::session::Session, state::AppState};

/// Authenticated context attached to session-protected requests.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session: Session,
}

/// Session middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <session_id>` from the request
/// 2. Look the session up in the binder: expired sessions and sessions
///    of deactivated principals read as absent
/// 3. If present: inject [`SessionContext`], call the next handler
/// 4. Otherwise: 401 with no hint of why
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::NoSession)?;

    let bearer = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::NoSession)?;

    // A malformed id can't correspond to a session.
    let session_id = Uuid::parse_str(bearer).map_err(|_| AppError::NoSession)?;

    let session = state
        .sessions
        .current(session_id, state.eligibility.as_ref(), Utc::now())
        .await?
        .ok_or(AppError::NoSession)?;

    request.extensions_mut().insert(SessionContext { session });

    Ok(next.run(request).await)
}
