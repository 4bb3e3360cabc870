//! Portal Auth - Main Application Entry Point
//!
//! Passwordless authentication service for the self-service portal. It issues magic-link tokens for principals (groomers, shop clients), validates presented tokens against salted one-way hashes, and binds successful validations to short-lived server-side sessions.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Credential Store**: PostgreSQL with sqlx (async queries)
//! - **Token Hashing**: HMAC-SHA256 with a service-wide pepper
//! - **Sessions**: process-local store, fixed lifetime
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool and run migrations
//! 3. Spawn the periodic expired-credential sweep
//! 4. Build HTTP router: public login, session-protected endpoints,
//!    service-key-protected issuance/revocation
//! 5. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod session;
mod state;
mod store;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use chrono::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let app_state = AppState::new(pool, &config);

    // Periodic sweep of credentials past the retention margin and of
    // expired sessions. Runs independently of request handling; safe to
    // overlap with it.
    tokio::spawn(services::cleanup::run(
        Arc::clone(&app_state.store),
        app_state.sessions.clone(),
        config.cleanup_interval_secs,
        Duration::days(config.retention_days),
    ));
    tracing::info!(
        interval_secs = config.cleanup_interval_secs,
        retention_days = config.retention_days,
        "Cleanup scheduler started"
    );

    // Portal-internal routes: the portal backend issues and revokes
    // credentials with the shared service key.
    let internal_routes = Router::new()
        .route(
            "/api/v1/credentials",
            post(handlers::credentials::issue_credential),
        )
        .route(
            "/api/v1/credentials/{id}",
            delete(handlers::credentials::revoke_credential),
        )
        .route(
            "/api/v1/principals/{id}/credentials",
            delete(handlers::credentials::revoke_all_credentials),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::service_key::service_key_middleware,
        ));

    // Principal-facing routes behind an open session.
    let session_routes = Router::new()
        .route(
            "/api/v1/sessions/current",
            get(handlers::sessions::current_session).delete(handlers::sessions::logout),
        )
        .route(
            "/api/v1/sessions/logout-everywhere",
            post(handlers::sessions::logout_everywhere),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::session::session_middleware,
        ));

    let app = Router::new()
        // Public routes: login with a token, health check
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/sessions", post(handlers::sessions::login))
        .merge(internal_routes)
        .merge(session_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
