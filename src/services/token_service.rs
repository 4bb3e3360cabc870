//! Token issuance and validation.
//!
//! Issuance: eligibility check, lifetime policy, generate, hash, persist,
//! and hand the plaintext back exactly once. Validation: linear scan over
//! the live candidates with a constant-time verify per candidate. The
//! scan is deliberately linear - no lookup prefix of the secret is stored,
//! so there is nothing to index on - and stays cheap because the cleanup
//! sweep keeps the live set small.

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::credential::{
    Credential, CredentialKind, IssueCredentialRequest, NewCredential,
};
use crate::services::eligibility::EligibilityCheck;
use crate::services::secret;
use crate::store::CredentialStore;

/// Result of a successful issuance: the stored row plus the plaintext,
/// which exists nowhere else and is never retrievable again.
#[derive(Debug)]
pub struct IssuedCredential {
    pub credential: Credential,
    pub plaintext: String,
}

/// Issue a new credential for a principal.
///
/// # Process
///
/// 1. Consult the eligibility predicate (refuse with
///    [`AppError::IneligiblePrincipal`] otherwise)
/// 2. Resolve the lifetime: kind default, or the override clamped to
///    at least one minute
/// 3. Generate a secret from the OS random source
/// 4. Persist only the keyed hash, with write-once provenance
/// 5. Return the plaintext once; the caller delivers it out of band
///    and must not log it
///
/// # Errors
///
/// - `IneligiblePrincipal`: the principal is unknown or deactivated
/// - `InvalidRequest`: the lifetime override is above the policy ceiling
/// - `RandomSourceUnavailable`: the OS random source failed
/// - `Store`: the insert failed
pub async fn issue(
    store: &dyn CredentialStore,
    eligibility: &dyn EligibilityCheck,
    pepper: &[u8],
    request: IssueCredentialRequest,
    now: DateTime<Utc>,
) -> Result<IssuedCredential, AppError> {
    if !eligibility.is_eligible(request.principal_id).await? {
        return Err(AppError::IneligiblePrincipal);
    }

    let expires_at = now + request.kind.lifetime(request.lifetime_minutes)?;

    let plaintext = secret::generate()?;
    let token_hash = secret::hash_token(pepper, &plaintext);

    let credential = store
        .insert(NewCredential {
            principal_id: request.principal_id,
            token_hash,
            kind: request.kind,
            issued_at: now,
            expires_at,
            issued_from_ip: request.issued_from_ip,
            issued_user_agent: request.issued_user_agent,
        })
        .await?;

    tracing::info!(
        credential_id = %credential.id,
        principal_id = %credential.principal_id,
        kind = ?credential.kind,
        %expires_at,
        "Issued credential"
    );

    Ok(IssuedCredential {
        credential,
        plaintext,
    })
}

/// Find the live credential matching a presented plaintext.
///
/// Fetches every live candidate and verifies each in constant time; the
/// first match wins. No match across all candidates is the expected,
/// non-exceptional [`AppError::InvalidToken`] outcome.
pub async fn validate(
    store: &dyn CredentialStore,
    pepper: &[u8],
    plaintext: &str,
    now: DateTime<Utc>,
) -> Result<Credential, AppError> {
    let candidates = store.find_live_candidates(now).await?;

    for candidate in candidates {
        if secret::verify(pepper, plaintext, &candidate.token_hash) {
            return Ok(candidate);
        }
    }

    Err(AppError::InvalidToken)
}

/// Validate a presented token for login, consuming it if transient.
///
/// # Process
///
/// 1. [`validate`] the plaintext against the live candidates
/// 2. Re-check principal eligibility; an existing-but-deactivated
///    principal reads as `InvalidToken`, not a distinct error, so the
///    response leaks nothing about the account
/// 3. Transient credentials are atomically marked consumed; the losing
///    side of a replay or a concurrent race gets
///    [`AppError::AlreadyConsumedOrRevoked`]. Durable credentials are
///    never auto-consumed and validate repeatedly until revoked or
///    expired.
pub async fn login(
    store: &dyn CredentialStore,
    eligibility: &dyn EligibilityCheck,
    pepper: &[u8],
    plaintext: &str,
    now: DateTime<Utc>,
) -> Result<Credential, AppError> {
    let credential = validate(store, pepper, plaintext, now).await?;

    if !eligibility.is_eligible(credential.principal_id).await? {
        return Err(AppError::InvalidToken);
    }

    if credential.kind == CredentialKind::Transient {
        let consumed = store.mark_consumed(credential.id, now).await?;
        if !consumed {
            tracing::warn!(
                credential_id = %credential.id,
                principal_id = %credential.principal_id,
                "Replayed or raced transient token"
            );
            return Err(AppError::AlreadyConsumedOrRevoked);
        }
    }

    tracing::info!(
        credential_id = %credential.id,
        principal_id = %credential.principal_id,
        kind = ?credential.kind,
        "Token validated"
    );

    Ok(credential)
}
