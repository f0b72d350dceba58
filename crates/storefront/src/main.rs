//! Cherlygood Storefront - Public e-commerce site.
//!
//! This binary serves the public-facing storefront on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Askama templates for server-side rendering
//! - `PostgreSQL` JSONB documents for products, upsells, carts and settings
//! - Anonymous carts keyed by the `device_identifier` cookie

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;

use cherlygood_storefront::config::StorefrontConfig;
use cherlygood_storefront::server::{self, database_readiness, health, shutdown_signal};
use cherlygood_storefront::state::AppState;
use cherlygood_storefront::{db, routes};

/// Directory served under `/static`, relative to the workspace root.
const STATIC_DIR: &str = "crates/storefront/static";

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Sentry first so the tracing layer can forward to it
    let _sentry_guard = server::init_sentry(&config.sentry());
    server::init_tracing("cherlygood_storefront=info,tower_http=debug");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p cherlygood-cli -- migrate

    let addr = config.socket_addr();
    let state = AppState::new(config, pool);

    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR));

    let app = server::observe(app)
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Returns 503 Service Unavailable if the document store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    database_readiness(state.pool()).await
}
