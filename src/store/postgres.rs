//! PostgreSQL credential store.
//!
//! Conditional updates carry their liveness predicate in the WHERE clause
//! and report success through `rows_affected`, which makes consume and
//! revoke compare-and-set operations: concurrent callers race on the row
//! lock and exactly one observes an affected row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::credential::{Credential, NewCredential};
use crate::store::CredentialStore;

/// Credential store backed by the shared connection pool.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert(&self, new: NewCredential) -> Result<Credential, AppError> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO credentials (
                principal_id,
                token_hash,
                kind,
                issued_at,
                expires_at,
                issued_from_ip,
                issued_user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, principal_id, token_hash, kind, issued_at, expires_at,
                      consumed_at, revoked_at, issued_from_ip, issued_user_agent
            "#,
        )
        .bind(new.principal_id)
        .bind(&new.token_hash)
        .bind(new.kind)
        .bind(new.issued_at)
        .bind(new.expires_at)
        .bind(&new.issued_from_ip)
        .bind(&new.issued_user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(credential)
    }

    async fn find_live_candidates(&self, now: DateTime<Utc>) -> Result<Vec<Credential>, AppError> {
        // Newest first: the validator checks most-recently-issued
        // credentials before long-lived durable ones.
        let candidates = sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, principal_id, token_hash, kind, issued_at, expires_at,
                   consumed_at, revoked_at, issued_from_ip, issued_user_agent
            FROM credentials
            WHERE expires_at > $1
              AND consumed_at IS NULL
              AND revoked_at IS NULL
            ORDER BY issued_at DESC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates)
    }

    async fn mark_consumed(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, AppError> {
        // The WHERE clause is the compare half of the compare-and-set:
        // a row that is already consumed, revoked, or expired matches
        // nothing and the caller sees false.
        let affected = sqlx::query(
            r#"
            UPDATE credentials
            SET consumed_at = $2
            WHERE id = $1
              AND consumed_at IS NULL
              AND revoked_at IS NULL
              AND expires_at > $2
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn mark_revoked_for_principal(
        &self,
        principal_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        // Only live rows are touched; consumed and expired rows keep
        // their original timestamps for the audit trail.
        let affected = sqlx::query(
            r#"
            UPDATE credentials
            SET revoked_at = $2
            WHERE principal_id = $1
              AND revoked_at IS NULL
              AND consumed_at IS NULL
              AND expires_at > $2
            "#,
        )
        .bind(principal_id)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected)
    }

    async fn mark_revoked_one(
        &self,
        id: Uuid,
        principal_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        // Filtering on BOTH id and principal_id keeps revocation scoped
        // to the owning principal.
        let affected = sqlx::query(
            r#"
            UPDATE credentials
            SET revoked_at = $3
            WHERE id = $1
              AND principal_id = $2
              AND revoked_at IS NULL
              AND consumed_at IS NULL
              AND expires_at > $3
            "#,
        )
        .bind(id)
        .bind(principal_id)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn delete_expired_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, AppError> {
        // Targets only rows already excluded from find_live_candidates,
        // so a concurrent validation can never observe a row mid-delete
        // as live.
        let affected = sqlx::query("DELETE FROM credentials WHERE expires_at < $1")
            .bind(threshold)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected)
    }
}
