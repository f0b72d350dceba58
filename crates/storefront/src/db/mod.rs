//! Database operations for the storefront document store.
//!
//! # Schema: `storefront`
//!
//! Catalog and cart documents are stored as JSONB next to the columns used
//! for lookups:
//!
//! ## Tables
//!
//! - `product` - Catalog products (`id`, `visibility`, `document`)
//! - `upsell` - Upsell bundles (`id`, `visibility`, `document`)
//! - `cart` - Shopper carts keyed by device identifier (`items` JSONB)
//! - `setting` - Named settings documents (e.g., `discovery_products`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p cherlygood-cli -- migrate
//! ```

pub mod carts;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod products;
pub mod settings;
pub mod upsells;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use cherlygood_core::{Cart, CatalogProduct, DeviceIdentifier, DiscoveryProductsSettings, Upsell, UpsellId};

use crate::cart::CartStore;
use crate::catalog::{CatalogSource, ProductQuery};

pub use carts::CartRepository;
#[cfg(any(test, feature = "test-support"))]
pub use memory::InMemoryStore;
pub use products::ProductRepository;
pub use settings::{DISCOVERY_PRODUCTS_KEY, SettingsRepository};
pub use upsells::UpsellRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate upsell id).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`].
pub(crate) fn map_unique_violation(error: sqlx::Error, what: &str) -> RepositoryError {
    match error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            RepositoryError::Conflict(format!("{what} already exists"))
        }
        other => RepositoryError::Database(other),
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// `PostgreSQL`-backed catalog and cart store.
///
/// Thin owner of the pool that routes the [`CatalogSource`] and
/// [`CartStore`] seams to the per-table repositories.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl CatalogSource for PgStore {
    async fn find_products(
        &self,
        query: &ProductQuery,
    ) -> Result<Vec<CatalogProduct>, RepositoryError> {
        ProductRepository::new(&self.pool).find(query).await
    }

    async fn find_upsell(&self, id: &UpsellId) -> Result<Option<Upsell>, RepositoryError> {
        UpsellRepository::new(&self.pool).get_by_id(id).await
    }

    async fn discovery_settings(
        &self,
    ) -> Result<Option<DiscoveryProductsSettings>, RepositoryError> {
        SettingsRepository::new(&self.pool)
            .get(DISCOVERY_PRODUCTS_KEY)
            .await
    }
}

impl CartStore for PgStore {
    async fn find_cart(
        &self,
        device_identifier: &DeviceIdentifier,
    ) -> Result<Option<Cart>, RepositoryError> {
        CartRepository::new(&self.pool)
            .get_by_device(device_identifier)
            .await
    }

    async fn save_cart(&self, cart: &Cart) -> Result<(), RepositoryError> {
        CartRepository::new(&self.pool).save(cart).await
    }
}
