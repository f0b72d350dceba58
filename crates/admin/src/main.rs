//! Cherlygood Admin - Internal upsell editor API.
//!
//! This binary serves the admin API on port 3001.
//!
//! # Security
//!
//! **This binary must only run on private infrastructure.** It has write
//! access to the shared catalog and no authentication of its own.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};

use cherlygood_admin::config::AdminConfig;
use cherlygood_admin::routes;
use cherlygood_admin::state::AppState;
use cherlygood_storefront::db;
use cherlygood_storefront::server::{self, database_readiness, health, shutdown_signal};

#[tokio::main]
async fn main() {
    let config = AdminConfig::from_env().expect("Failed to load configuration");

    let _sentry_guard = server::init_sentry(&config.sentry());
    server::init_tracing("cherlygood_admin=info,cherlygood_storefront=info,tower_http=debug");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    let addr = config.socket_addr();
    let state = AppState::new(config, pool);

    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes());

    let app = server::observe(app)
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Binds 127.0.0.1 by default; the private network handles external access
    tracing::info!("admin listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Returns 503 Service Unavailable if the catalog database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    database_readiness(state.pool()).await
}
