//! In-memory credential store for tests.
//!
//! Keeps the same atomicity contract as the Postgres store: consume and
//! revoke are check-and-set under one mutex, so racing callers observe
//! exactly one success.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::credential::{Credential, NewCredential};
use crate::store::CredentialStore;

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    rows: Mutex<Vec<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored row, for assertions.
    pub fn all(&self) -> Vec<Credential> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, new: NewCredential) -> Result<Credential, AppError> {
        let credential = Credential {
            id: Uuid::new_v4(),
            principal_id: new.principal_id,
            token_hash: new.token_hash,
            kind: new.kind,
            issued_at: new.issued_at,
            expires_at: new.expires_at,
            consumed_at: None,
            revoked_at: None,
            issued_from_ip: new.issued_from_ip,
            issued_user_agent: new.issued_user_agent,
        };
        self.rows.lock().unwrap().push(credential.clone());
        Ok(credential)
    }

    async fn find_live_candidates(&self, now: DateTime<Utc>) -> Result<Vec<Credential>, AppError> {
        let rows = self.rows.lock().unwrap();
        let mut live: Vec<Credential> = rows.iter().filter(|c| c.is_live(now)).cloned().collect();
        live.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        Ok(live)
    }

    async fn mark_consumed(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|c| c.id == id && c.is_live(now)) {
            Some(row) => {
                row.consumed_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_revoked_for_principal(
        &self,
        principal_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let mut count = 0;
        for row in rows
            .iter_mut()
            .filter(|c| c.principal_id == principal_id && c.is_live(now))
        {
            row.revoked_at = Some(now);
            count += 1;
        }
        Ok(count)
    }

    async fn mark_revoked_one(
        &self,
        id: Uuid,
        principal_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|c| c.id == id && c.principal_id == principal_id && c.is_live(now))
        {
            Some(row) => {
                row.revoked_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expired_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| c.expires_at >= threshold);
        Ok((before - rows.len()) as u64)
    }
}
