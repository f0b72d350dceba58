//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Health check
//! GET  /health/ready                  - Readiness check (database)
//!
//! # Upsell editor (JSON)
//! GET  /api/upsells/products/{id}     - Constituent summary for a product ID
//! POST /api/upsells/pricing           - Price a prospective bundle
//! POST /api/upsells                   - Create a draft upsell
//! ```

pub mod upsells;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the upsell editor routes router.
pub fn upsell_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(upsells::create))
        .route("/products/{id}", get(upsells::product))
        .route("/pricing", post(upsells::pricing))
}

/// Build the complete admin router.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api/upsells", upsell_routes())
}
