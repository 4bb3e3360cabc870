//! Expired-credential cleanup.
//!
//! Bounds the storage (and the validator's linear scan) by deleting
//! credentials whose expiry is past a retention margin. The margin keeps
//! a forensic trail: rows are only removed well after they stopped being
//! validatable, so the sweep can run concurrently with issuance and
//! validation without either ever observing a live row disappear.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::error::AppError;
use crate::session::SessionStore;
use crate::store::CredentialStore;

/// Delete credentials that expired more than `retention` ago.
///
/// Idempotent; returns how many rows were removed.
pub async fn sweep(store: &dyn CredentialStore, retention: Duration) -> Result<u64, AppError> {
    let threshold = Utc::now() - retention;
    let deleted = store.delete_expired_older_than(threshold).await?;

    if deleted > 0 {
        tracing::info!(deleted, %threshold, "Swept expired credentials");
    }

    Ok(deleted)
}

/// Run [`sweep`] forever on a fixed interval, purging expired sessions on
/// the same tick so the in-process session map stays bounded too.
///
/// Spawned from startup; a failed sweep is logged and retried on the next
/// tick rather than taking the service down.
pub async fn run(
    store: Arc<dyn CredentialStore>,
    sessions: SessionStore,
    interval_secs: u64,
    retention: Duration,
) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;
        if let Err(err) = sweep(store.as_ref(), retention).await {
            tracing::error!(error = %err, "Cleanup sweep failed");
        }
        sessions.purge_expired(Utc::now()).await;
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::models::credential::{CredentialKind, NewCredential};
    use crate::services::secret;
    use crate::store::memory::MemoryCredentialStore;

    async fn insert_expiring(store: &MemoryCredentialStore, expires_in: Duration) {
        let now = Utc::now();
        store
            .insert(NewCredential {
                principal_id: Uuid::new_v4(),
                token_hash: secret::hash_token(b"pepper", "x"),
                kind: CredentialKind::Transient,
                issued_at: now - Duration::days(1),
                expires_at: now + expires_in,
                issued_from_ip: None,
                issued_user_agent: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sweep_never_deletes_unexpired_credentials() {
        let store = MemoryCredentialStore::new();
        insert_expiring(&store, Duration::minutes(30)).await;

        let deleted = sweep(&store, Duration::days(30)).await.unwrap();
        assert_eq!(deleted, 0);
        assert_eq!(store.all().len(), 1);
    }

    #[tokio::test]
    async fn sweep_keeps_recently_expired_credentials_within_retention() {
        let store = MemoryCredentialStore::new();
        // Expired an hour ago; retention is 30 days.
        insert_expiring(&store, Duration::hours(-1)).await;

        let deleted = sweep(&store, Duration::days(30)).await.unwrap();
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn sweep_deletes_credentials_past_retention() {
        let store = MemoryCredentialStore::new();
        insert_expiring(&store, Duration::days(-40)).await;
        insert_expiring(&store, Duration::minutes(10)).await;

        let deleted = sweep(&store, Duration::days(30)).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.all().len(), 1);

        // Idempotent: a second sweep removes nothing further.
        let again = sweep(&store, Duration::days(30)).await.unwrap();
        assert_eq!(again, 0);
    }
}
