//! Database connection pool and migration management.
//!
//! The credential store is the only durable state this service owns; both
//! the pool and the startup migrations live here.

use sqlx::{Pool, Postgres};

/// Type alias for the PostgreSQL connection pool shared across requests.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// Connections are created lazily and reused across requests; the pool is
/// capped at 5 concurrent connections, plenty for the single-round-trip
/// queries this service runs.
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the server
/// cannot be reached or refuses authentication.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// Migrations are embedded at compile time and tracked in the
/// `_sqlx_migrations` table, so each file runs exactly once.
///
/// # Errors
///
/// Returns an error on SQL failures during migration execution.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
