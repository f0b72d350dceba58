//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use cherlygood_storefront::db::PgStore;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: PgStore,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store: PgStore::new(pool),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// The catalog store shared with the storefront.
    #[must_use]
    pub fn store(&self) -> &PgStore {
        &self.inner.store
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        self.inner.store.pool()
    }
}
