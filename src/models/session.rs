//! Session model and API request/response types.
//!
//! A session is the ephemeral authenticated context a successful token
//! validation establishes. Sessions live only in the process-local session
//! store and are bounded by their own fixed lifetime, independent of the
//! credential that opened them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An open session.
///
/// The `id` doubles as the bearer secret the browser presents on each
/// request; it is regenerated on every open, never reused, so a captured
/// pre-login identifier cannot be fixated into an authenticated one.
#[derive(Debug, Clone)]
pub struct Session {
    /// Random session identifier, also the bearer value
    pub id: Uuid,

    /// Copied from the credential that authenticated this session
    pub principal_id: Uuid,

    /// Session start
    pub established_at: DateTime<Utc>,

    /// `established_at` plus the configured session lifetime
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is past its lifetime at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Request body for opening a session (logging in with a token).
///
/// # JSON Example
///
/// ```json
/// { "token": "9f8ce29c...64 hex chars" }
/// ```
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// The plaintext magic-link token being presented
    pub token: String,
}

/// Response body for session endpoints.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Bearer value for subsequent requests
    pub session_id: Uuid,

    pub principal_id: Uuid,
    pub established_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id,
            principal_id: session.principal_id,
            established_at: session.established_at,
            expires_at: session.expires_at,
        }
    }
}
