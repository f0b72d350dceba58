//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Cart
//! GET  /cart                   - Cart page with recommendations
//! POST /cart/add               - Add a product or upsell line (JSON)
//! POST /cart/remove            - Remove lines by variant (JSON)
//!
//! # API
//! GET  /api/cart               - Composed cart as JSON
//! ```

pub mod cart;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/cart", get(cart::show_json))
}

/// Build the complete storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart_routes())
        .nest("/api", api_routes())
}
