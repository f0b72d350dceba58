//! In-memory catalog and cart store.
//!
//! Backs unit tests and the integration-test crate without a database.
//! Compiled only for tests or with the `test-support` feature. Query counters let tests assert that a code path
//! never reached the store, and individual lookups can be made to fail.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cherlygood_core::{
    Cart, CatalogProduct, DeviceIdentifier, DiscoveryProductsSettings, ProductId, Upsell, UpsellId,
};

use super::RepositoryError;
use crate::cart::CartStore;
use crate::catalog::{CatalogSource, ProductQuery};

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<ProductId, CatalogProduct>,
    upsells: HashMap<UpsellId, Upsell>,
    carts: HashMap<DeviceIdentifier, Cart>,
    discovery: Option<DiscoveryProductsSettings>,
    failing_upsells: HashSet<UpsellId>,
    failing_settings: bool,
}

/// Thread-safe in-memory store implementing [`CatalogSource`] and [`CartStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    product_queries: AtomicUsize,
    cart_queries: AtomicUsize,
}

fn simulated_failure() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a product.
    pub fn insert_product(&self, product: CatalogProduct) {
        self.write().products.insert(product.id.clone(), product);
    }

    /// Remove a product, returning it if present.
    pub fn remove_product(&self, id: &ProductId) -> Option<CatalogProduct> {
        self.write().products.remove(id)
    }

    /// Insert or replace an upsell.
    pub fn insert_upsell(&self, upsell: Upsell) {
        self.write().upsells.insert(upsell.id.clone(), upsell);
    }

    /// Insert a new upsell, refusing to replace an existing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the ID is taken.
    pub fn create_upsell(&self, upsell: Upsell) -> Result<(), RepositoryError> {
        let mut state = self.write();
        if state.upsells.contains_key(&upsell.id) {
            return Err(RepositoryError::Conflict(format!("upsell {}", upsell.id)));
        }
        state.upsells.insert(upsell.id.clone(), upsell);
        Ok(())
    }

    /// A product by ID, regardless of visibility.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<CatalogProduct> {
        self.read().products.get(id).cloned()
    }

    /// An upsell by ID.
    #[must_use]
    pub fn upsell(&self, id: &UpsellId) -> Option<Upsell> {
        self.read().upsells.get(id).cloned()
    }

    /// Number of stored upsells.
    #[must_use]
    pub fn upsell_count(&self) -> usize {
        self.read().upsells.len()
    }

    /// Insert or replace a cart.
    pub fn insert_cart(&self, cart: Cart) {
        self.write()
            .carts
            .insert(cart.device_identifier.clone(), cart);
    }

    /// The stored cart for a device.
    #[must_use]
    pub fn cart(&self, device_identifier: &DeviceIdentifier) -> Option<Cart> {
        self.read().carts.get(device_identifier).cloned()
    }

    /// Replace the discovery settings document.
    pub fn set_discovery_settings(&self, settings: Option<DiscoveryProductsSettings>) {
        self.write().discovery = settings;
    }

    /// Make every lookup of this upsell fail.
    pub fn fail_upsell(&self, id: &UpsellId) {
        self.write().failing_upsells.insert(id.clone());
    }

    /// Make every discovery settings read fail.
    pub fn fail_discovery_settings(&self) {
        self.write().failing_settings = true;
    }

    /// Number of product queries that reached the store.
    #[must_use]
    pub fn product_query_count(&self) -> usize {
        self.product_queries.load(Ordering::SeqCst)
    }

    /// Number of cart reads that reached the store.
    #[must_use]
    pub fn cart_query_count(&self) -> usize {
        self.cart_queries.load(Ordering::SeqCst)
    }
}

impl CatalogSource for InMemoryStore {
    async fn find_products(
        &self,
        query: &ProductQuery,
    ) -> Result<Vec<CatalogProduct>, RepositoryError> {
        self.product_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .read()
            .products
            .values()
            .filter(|product| query.matches(product))
            .cloned()
            .collect())
    }

    async fn find_upsell(&self, id: &UpsellId) -> Result<Option<Upsell>, RepositoryError> {
        let state = self.read();
        if state.failing_upsells.contains(id) {
            return Err(simulated_failure());
        }
        Ok(state.upsells.get(id).cloned())
    }

    async fn discovery_settings(
        &self,
    ) -> Result<Option<DiscoveryProductsSettings>, RepositoryError> {
        let state = self.read();
        if state.failing_settings {
            return Err(simulated_failure());
        }
        Ok(state.discovery)
    }
}

impl CartStore for InMemoryStore {
    async fn find_cart(
        &self,
        device_identifier: &DeviceIdentifier,
    ) -> Result<Option<Cart>, RepositoryError> {
        self.cart_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.cart(device_identifier))
    }

    async fn save_cart(&self, cart: &Cart) -> Result<(), RepositoryError> {
        self.insert_cart(cart.clone());
        Ok(())
    }
}
