//! Credential revocation.
//!
//! Thin policy layer over the store's revoke queries. Revocation is
//! triggered from several call sites (logout-everywhere, re-issuance
//! superseding an old link, administrative action), so the "who may
//! revoke what" rule lives here: single-credential revocation is always
//! scoped to the owning principal.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::CredentialStore;

/// Revoke every live credential of a principal. Returns the count.
pub async fn revoke_all(
    store: &dyn CredentialStore,
    principal_id: Uuid,
    now: DateTime<Utc>,
) -> Result<u64, AppError> {
    let revoked = store.mark_revoked_for_principal(principal_id, now).await?;

    tracing::info!(%principal_id, revoked, "Revoked all live credentials");

    Ok(revoked)
}

/// Revoke a single credential owned by `principal_id`.
///
/// # Errors
///
/// Returns [`AppError::CredentialNotFound`] if no live credential matches
/// both the id and the principal - a wrong principal id cannot revoke
/// someone else's credential, and it cannot learn whether the id exists.
pub async fn revoke_one(
    store: &dyn CredentialStore,
    credential_id: Uuid,
    principal_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let revoked = store
        .mark_revoked_one(credential_id, principal_id, now)
        .await?;

    if !revoked {
        return Err(AppError::CredentialNotFound);
    }

    tracing::info!(%credential_id, %principal_id, "Revoked credential");

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::credential::{CredentialKind, IssueCredentialRequest};
    use crate::services::eligibility::test_support::AlwaysEligible;
    use crate::services::token_service::{self, IssuedCredential};
    use crate::store::memory::MemoryCredentialStore;

    const PEPPER: &[u8] = b"unit-test-pepper";

    async fn issue_at(
        store: &MemoryCredentialStore,
        principal_id: Uuid,
        kind: CredentialKind,
        now: DateTime<Utc>,
    ) -> IssuedCredential {
        token_service::issue(
            store,
            &AlwaysEligible,
            PEPPER,
            IssueCredentialRequest {
                principal_id,
                kind,
                lifetime_minutes: None,
                issued_from_ip: None,
                issued_user_agent: None,
            },
            now,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn revoke_all_kills_every_live_credential() {
        let store = MemoryCredentialStore::new();
        let principal = Uuid::new_v4();
        let t0 = Utc::now();

        for _ in 0..3 {
            issue_at(&store, principal, CredentialKind::Durable, t0).await;
        }

        let count = revoke_all(&store, principal, t0 + Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(count, 3);
        assert!(store
            .find_live_candidates(t0 + Duration::minutes(2))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn revoke_one_is_scoped_to_the_owning_principal() {
        let store = MemoryCredentialStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let t0 = Utc::now();

        let issued = issue_at(&store, owner, CredentialKind::Durable, t0).await;

        // Wrong principal: refused, credential stays live.
        let result = revoke_one(&store, issued.credential.id, other, t0).await;
        assert!(matches!(result, Err(AppError::CredentialNotFound)));
        assert_eq!(store.find_live_candidates(t0).await.unwrap().len(), 1);

        // Owning principal: revoked.
        revoke_one(&store, issued.credential.id, owner, t0).await.unwrap();
        assert!(store.find_live_candidates(t0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn revoking_twice_reports_not_found() {
        let store = MemoryCredentialStore::new();
        let principal = Uuid::new_v4();
        let t0 = Utc::now();

        let issued = issue_at(&store, principal, CredentialKind::Transient, t0).await;

        revoke_one(&store, issued.credential.id, principal, t0).await.unwrap();
        let again = revoke_one(&store, issued.credential.id, principal, t0).await;
        assert!(matches!(again, Err(AppError::CredentialNotFound)));
    }
}
