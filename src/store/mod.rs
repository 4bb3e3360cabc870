//! Credential store.
//!
//! The store is the sole shared mutable resource in the service. All
//! mutation is single-row or single-principal scoped, and the consume and
//! revoke operations are atomic conditional updates, so no multi-row
//! transactions are needed: a credential can never be consumed twice or
//! un-revoked, and the sweep only ever deletes rows that are already
//! invisible to `find_live_candidates`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::credential::{Credential, NewCredential};

pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgCredentialStore;

/// Durable CRUD over credential rows.
///
/// Behind a trait so the token services can be exercised against an
/// in-memory implementation with an injected clock; production uses
/// [`PgCredentialStore`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a freshly issued credential and return the stored row.
    async fn insert(&self, new: NewCredential) -> Result<Credential, AppError>;

    /// Every credential that could still satisfy a validation at `now`:
    /// unexpired, unconsumed, unrevoked. Newest first, so the validator
    /// tries recently issued credentials before old durable ones.
    async fn find_live_candidates(&self, now: DateTime<Utc>) -> Result<Vec<Credential>, AppError>;

    /// Atomically flip `consumed_at` from null to `now`.
    ///
    /// Returns `false` if the credential was already consumed, revoked,
    /// or expired - the losing side of a replay or race sees `false`,
    /// never a double consumption.
    async fn mark_consumed(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, AppError>;

    /// Revoke every live credential of a principal. Returns the count.
    async fn mark_revoked_for_principal(
        &self,
        principal_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError>;

    /// Revoke a single live credential, scoped to its owning principal so
    /// an id alone cannot revoke across principals. Returns `false` if no
    /// live row matched both.
    async fn mark_revoked_one(
        &self,
        id: Uuid,
        principal_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Delete credentials whose `expires_at` is before `threshold`.
    /// Returns the number of rows removed.
    async fn delete_expired_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, AppError>;
}
