//! Session binder.
//!
//! A successful token validation opens a session: a short-lived
//! authenticated context scoped to one principal, held in a process-local
//! map keyed by a random session id. Sessions are deliberately not
//! persisted - on restart every principal re-authenticates with a fresh
//! or durable token.
//!
//! State machine per session id: Unauthenticated → Authenticated (open)
//! → Unauthenticated (close, expiry, or the principal losing
//! eligibility). Eligibility is re-checked on every read, so a principal
//! deactivated mid-session is logged out on their next request.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::session::Session;
use crate::services::eligibility::EligibilityCheck;

/// Process-local session store with a fixed per-session lifetime.
///
/// Cheap to clone; all clones share the same map.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            lifetime,
        }
    }

    /// Open a session for a principal.
    ///
    /// The session id is freshly generated on every open - an id chosen
    /// or observed before authentication can never become authenticated,
    /// which defeats fixation.
    pub async fn open(&self, principal_id: Uuid, now: DateTime<Utc>) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            principal_id,
            established_at: now,
            expires_at: now + self.lifetime,
        };

        self.sessions.write().await.insert(session.id, session.clone());

        tracing::info!(
            session_id = %session.id,
            principal_id = %principal_id,
            expires_at = %session.expires_at,
            "Session opened"
        );

        session
    }

    /// Resolve the current session for a presented id.
    ///
    /// Expired sessions and sessions whose principal is no longer
    /// eligible are removed and read as `None`; the caller sees only
    /// "no session", never why.
    pub async fn current(
        &self,
        session_id: Uuid,
        eligibility: &dyn EligibilityCheck,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, AppError> {
        let session = match self.sessions.read().await.get(&session_id) {
            Some(session) => session.clone(),
            None => return Ok(None),
        };

        if session.is_expired(now) {
            self.sessions.write().await.remove(&session_id);
            return Ok(None);
        }

        if !eligibility.is_eligible(session.principal_id).await? {
            self.sessions.write().await.remove(&session_id);
            tracing::info!(
                session_id = %session_id,
                principal_id = %session.principal_id,
                "Session closed: principal no longer eligible"
            );
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Close a session.
    ///
    /// Clears session state only: the credential that opened it keeps its
    /// own consumed/revoked status, so closing a session from a durable
    /// token does not invalidate the token.
    pub async fn close(&self, session_id: Uuid) -> bool {
        self.sessions.write().await.remove(&session_id).is_some()
    }

    /// Close every session belonging to a principal. Returns the count.
    ///
    /// Used by logout-everywhere together with credential revocation.
    pub async fn close_all_for_principal(&self, principal_id: Uuid) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.principal_id != principal_id);
        before - sessions.len()
    }

    /// Drop every session past its lifetime. Returns the count.
    ///
    /// `current` already evicts an expired session when its id is
    /// presented, but abandoned sessions are never presented again; the
    /// cleanup scheduler calls this so the map stays bounded by the
    /// number of genuinely active sessions.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        let purged = before - sessions.len();

        if purged > 0 {
            tracing::info!(purged, "Purged expired sessions");
        }

        purged
    }
}
