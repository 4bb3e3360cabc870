//! Principal eligibility predicate.
//!
//! Whether a principal may hold tokens is the portal's business decision,
//! not this service's. The trait keeps the boundary: we consult it at
//! issuance and on every session read, and the production implementation
//! only reads the `is_active` flag the portal maintains.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;

/// Injected check for "may this principal authenticate right now".
#[async_trait]
pub trait EligibilityCheck: Send + Sync {
    async fn is_eligible(&self, principal_id: Uuid) -> Result<bool, AppError>;
}

/// Eligibility backed by the portal-owned `principals` table.
///
/// Unknown principals and deactivated principals are both ineligible;
/// callers never learn which.
#[derive(Debug, Clone)]
pub struct PrincipalDirectory {
    pool: DbPool,
}

impl PrincipalDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EligibilityCheck for PrincipalDirectory {
    async fn is_eligible(&self, principal_id: Uuid) -> Result<bool, AppError> {
        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM principals WHERE id = $1")
                .bind(principal_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(active.unwrap_or(false))
    }
}
