//! Credential model and API request/response types.
//!
//! A credential is one issued magic-link token. The plaintext secret is
//! never stored - only its keyed hash - so a credential can be verified
//! but never recovered.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Minimum lifetime a caller may request, in minutes.
///
/// Overrides below this are clamped up, never rejected, so a misconfigured
/// portal cannot issue tokens that are dead on arrival.
pub const MIN_LIFETIME_MINUTES: i64 = 1;

/// Maximum lifetime a caller may request: ten years, in minutes.
///
/// Overrides above this are rejected rather than clamped; a request so far
/// outside policy is a caller bug, and the bound keeps the duration
/// arithmetic (`now + lifetime`) safely in range.
pub const MAX_LIFETIME_MINUTES: i64 = 10 * 365 * 24 * 60;

/// Default lifetime of a `transient` credential: 30 minutes.
const TRANSIENT_LIFETIME_MINUTES: i64 = 30;

/// Default lifetime of a `durable` credential: two years.
const DURABLE_LIFETIME_MINUTES: i64 = 730 * 24 * 60;

/// The two credential variants.
///
/// - `Transient`: one-time login link. Consumed on first successful
///   validation; a second presentation fails.
/// - `Durable`: standing bookmark-style access link. Validated repeatedly
///   until it expires or is revoked; never auto-consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "credential_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Transient,
    Durable,
}

impl CredentialKind {
    /// Default lifetime for this kind, used when the issue request does
    /// not override it.
    pub fn default_lifetime(self) -> Duration {
        match self {
            CredentialKind::Transient => Duration::minutes(TRANSIENT_LIFETIME_MINUTES),
            CredentialKind::Durable => Duration::minutes(DURABLE_LIFETIME_MINUTES),
        }
    }

    /// Resolve the effective lifetime from an optional per-call override.
    ///
    /// Overrides are clamped up to [`MIN_LIFETIME_MINUTES`]; anything above
    /// [`MAX_LIFETIME_MINUTES`] is refused with
    /// [`AppError::InvalidRequest`], never a panic, so an absurd value in
    /// the issue request body denies cleanly.
    pub fn lifetime(self, override_minutes: Option<i64>) -> Result<Duration, AppError> {
        match override_minutes {
            Some(minutes) if minutes > MAX_LIFETIME_MINUTES => {
                Err(AppError::InvalidRequest(format!(
                    "lifetime_minutes must be at most {MAX_LIFETIME_MINUTES}"
                )))
            }
            Some(minutes) => Ok(Duration::minutes(minutes.max(MIN_LIFETIME_MINUTES))),
            None => Ok(self.default_lifetime()),
        }
    }
}

/// Effective state of a credential at a given instant.
///
/// Computed from the lifecycle timestamps; exactly one variant applies.
/// Revocation wins over consumption, consumption over expiry, so a row
/// that was revoked after being consumed still reads as revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// Unused, unrevoked, and not yet expired. The only validatable state.
    Live,
    /// A transient credential already spent by a successful login.
    Consumed,
    /// Invalidated by the revocation service; permanently unusable.
    Revoked,
    /// Past `expires_at` without having been consumed or revoked.
    Expired,
}

/// Represents a credential record from the database.
///
/// # Database Table
///
/// Maps to the `credentials` table. Each credential:
/// - Belongs to one principal (via `principal_id`); a principal may hold
///   several live credentials at once
/// - Carries write-once provenance metadata for audit, never authorization
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Credential {
    /// Store-assigned identifier, immutable
    pub id: Uuid,

    /// The authenticated subject this credential logs in
    pub principal_id: Uuid,

    /// HMAC-SHA256 of the plaintext secret, hex encoded (64 characters)
    ///
    /// Validation re-hashes the presented plaintext and compares in
    /// constant time; this column is never looked up by equality against
    /// caller-supplied input.
    pub token_hash: String,

    /// Transient (one-time link) or durable (standing link)
    pub kind: CredentialKind,

    /// When the credential was issued
    pub issued_at: DateTime<Utc>,

    /// Derived from `kind` at issuance; never mutated afterward
    pub expires_at: DateTime<Utc>,

    /// Set exactly once, the first time a transient credential validates
    pub consumed_at: Option<DateTime<Utc>>,

    /// Set by the revocation service; once set the credential is dead
    /// regardless of the other timestamps
    pub revoked_at: Option<DateTime<Utc>>,

    /// Client IP the portal reported at issuance (audit only)
    pub issued_from_ip: Option<String>,

    /// Client user agent the portal reported at issuance (audit only)
    pub issued_user_agent: Option<String>,
}

impl Credential {
    /// Compute the effective state at `now`.
    pub fn state(&self, now: DateTime<Utc>) -> CredentialState {
        if self.revoked_at.is_some() {
            CredentialState::Revoked
        } else if self.consumed_at.is_some() {
            CredentialState::Consumed
        } else if self.expires_at <= now {
            CredentialState::Expired
        } else {
            CredentialState::Live
        }
    }

    /// Whether the credential can still satisfy a validation at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == CredentialState::Live
    }
}

/// Everything the store needs to persist a freshly issued credential.
///
/// Built by the token issuer after hashing; the plaintext never reaches
/// the store.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub principal_id: Uuid,
    pub token_hash: String,
    pub kind: CredentialKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub issued_from_ip: Option<String>,
    pub issued_user_agent: Option<String>,
}

/// Request body for issuing a credential.
///
/// # JSON Example
///
/// ```json
/// {
///   "principal_id": "550e8400-e29b-41d4-a716-446655440000",
///   "kind": "transient",
///   "lifetime_minutes": 15,
///   "issued_from_ip": "203.0.113.9",
///   "issued_user_agent": "Mozilla/5.0"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct IssueCredentialRequest {
    /// Principal the token will authenticate
    pub principal_id: Uuid,

    /// Which variant to issue
    pub kind: CredentialKind,

    /// Optional lifetime override in minutes, clamped to at least 1
    pub lifetime_minutes: Option<i64>,

    /// End-user IP as seen by the portal, forwarded for audit
    pub issued_from_ip: Option<String>,

    /// End-user agent as seen by the portal, forwarded for audit
    pub issued_user_agent: Option<String>,
}

/// Response body for a successful issuance.
///
/// `token` is the only copy of the plaintext that will ever exist; the
/// caller delivers it out of band and must not log it.
#[derive(Debug, Serialize)]
pub struct IssuedCredentialResponse {
    /// Credential identifier (safe to log and store)
    pub id: Uuid,

    /// The plaintext secret, returned exactly once
    pub token: String,

    pub principal_id: Uuid,
    pub kind: CredentialKind,
    pub expires_at: DateTime<Utc>,
}

/// Request body for revoking a single credential.
///
/// The principal id scopes the revocation so one principal (or a confused
/// caller) cannot revoke another principal's credential by id alone.
#[derive(Debug, Deserialize)]
pub struct RevokeCredentialRequest {
    pub principal_id: Uuid,
}

/// Response body for revocation endpoints.
#[derive(Debug, Serialize)]
pub struct RevokedResponse {
    /// How many credentials were revoked by this call
    pub revoked: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(now: DateTime<Utc>) -> Credential {
        Credential {
            id: Uuid::new_v4(),
            principal_id: Uuid::new_v4(),
            token_hash: "ab".repeat(32),
            kind: CredentialKind::Transient,
            issued_at: now,
            expires_at: now + Duration::minutes(30),
            consumed_at: None,
            revoked_at: None,
            issued_from_ip: None,
            issued_user_agent: None,
        }
    }

    #[test]
    fn state_is_live_before_expiry() {
        let now = Utc::now();
        let cred = credential(now);
        assert_eq!(cred.state(now + Duration::minutes(29)), CredentialState::Live);
        assert!(cred.is_live(now));
    }

    #[test]
    fn state_is_expired_at_and_after_expires_at() {
        let now = Utc::now();
        let cred = credential(now);
        assert_eq!(cred.state(cred.expires_at), CredentialState::Expired);
        assert_eq!(
            cred.state(cred.expires_at + Duration::days(1)),
            CredentialState::Expired
        );
    }

    #[test]
    fn consumed_takes_precedence_over_expiry() {
        let now = Utc::now();
        let mut cred = credential(now);
        cred.consumed_at = Some(now + Duration::minutes(5));
        assert_eq!(cred.state(now + Duration::days(2)), CredentialState::Consumed);
    }

    #[test]
    fn revoked_takes_precedence_over_everything() {
        let now = Utc::now();
        let mut cred = credential(now);
        cred.consumed_at = Some(now + Duration::minutes(5));
        cred.revoked_at = Some(now + Duration::minutes(6));
        assert_eq!(cred.state(now + Duration::days(2)), CredentialState::Revoked);
        assert!(!cred.is_live(now + Duration::minutes(10)));
    }

    #[test]
    fn default_lifetimes_per_kind() {
        assert_eq!(
            CredentialKind::Transient.lifetime(None).unwrap(),
            Duration::minutes(30)
        );
        assert_eq!(
            CredentialKind::Durable.lifetime(None).unwrap(),
            Duration::days(730)
        );
    }

    #[test]
    fn lifetime_override_is_clamped_to_one_minute() {
        assert_eq!(
            CredentialKind::Transient.lifetime(Some(0)).unwrap(),
            Duration::minutes(1)
        );
        assert_eq!(
            CredentialKind::Durable.lifetime(Some(-5)).unwrap(),
            Duration::minutes(1)
        );
        assert_eq!(
            CredentialKind::Transient.lifetime(Some(90)).unwrap(),
            Duration::minutes(90)
        );
    }

    #[test]
    fn oversized_lifetime_override_is_refused_not_panicking() {
        // Values way past the policy ceiling, including ones that would
        // overflow the duration arithmetic, deny with a clean error.
        for minutes in [MAX_LIFETIME_MINUTES + 1, i64::MAX] {
            let result = CredentialKind::Transient.lifetime(Some(minutes));
            assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        }

        // The ceiling itself is still accepted.
        assert_eq!(
            CredentialKind::Durable.lifetime(Some(MAX_LIFETIME_MINUTES)).unwrap(),
            Duration::minutes(MAX_LIFETIME_MINUTES)
        );
    }
}
