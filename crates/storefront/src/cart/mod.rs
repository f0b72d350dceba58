//! Shopper carts: storage seam, mutations and composition.
//!
//! A cart document only holds references (product/upsell IDs plus the
//! shopper's selections). [`compose`] joins those references against the
//! live catalog for display and [`page`] adds the recommendations.

pub mod compose;
pub mod page;

use std::future::Future;

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use cherlygood_core::{Cart, CartId, CartLineItem, DeviceIdentifier, VariantId};

use crate::db::RepositoryError;

pub use compose::{ComposedCart, compose_cart};
pub use page::{CartPage, load_cart_page};

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The shopper has no device identifier to key the cart by.
    #[error("missing device identifier")]
    MissingDeviceIdentifier,

    /// The underlying store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Persistence for carts, keyed by device identifier.
pub trait CartStore: Send + Sync {
    /// The cart stored for a device, if any.
    fn find_cart(
        &self,
        device_identifier: &DeviceIdentifier,
    ) -> impl Future<Output = Result<Option<Cart>, RepositoryError>> + Send;

    /// Create or overwrite the cart for `cart.device_identifier`.
    fn save_cart(&self, cart: &Cart) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Fetch the cart for a device.
///
/// An empty identifier returns `None` without querying the store.
///
/// # Errors
///
/// Propagates store failures.
#[instrument(skip(store, device_identifier), fields(device = %device_identifier.redacted()))]
pub async fn get_cart<S: CartStore>(
    store: &S,
    device_identifier: &DeviceIdentifier,
) -> Result<Option<Cart>, RepositoryError> {
    if device_identifier.is_empty() {
        return Ok(None);
    }
    store.find_cart(device_identifier).await
}

/// Append a line to the device's cart, creating the cart if needed.
///
/// The line's incoming `index` is ignored; it is placed after every existing
/// line (`max + 1`, starting at 1).
///
/// # Errors
///
/// Returns `CartError::MissingDeviceIdentifier` for an empty identifier and
/// propagates store failures.
#[instrument(
    skip(store, device_identifier, item),
    fields(device = %device_identifier.redacted(), variant_id = %item.variant_id())
)]
pub async fn add_item<S: CartStore>(
    store: &S,
    device_identifier: &DeviceIdentifier,
    mut item: CartLineItem,
) -> Result<Cart, CartError> {
    if device_identifier.is_empty() {
        return Err(CartError::MissingDeviceIdentifier);
    }

    let now = Utc::now();
    let mut cart = store
        .find_cart(device_identifier)
        .await?
        .unwrap_or_else(|| Cart {
            id: CartId::new(Uuid::new_v4().to_string()),
            device_identifier: device_identifier.clone(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        });

    item.set_index(cart.next_index());
    cart.items.push(item);
    cart.updated_at = now;

    store.save_cart(&cart).await?;
    tracing::info!(cart_id = %cart.id, items = cart.items.len(), "Added cart line");
    Ok(cart)
}

/// Remove every line added with `variant_id`.
///
/// Returns `None` when the device has no cart; the store is not written.
///
/// # Errors
///
/// Propagates store failures.
#[instrument(skip(store, device_identifier), fields(device = %device_identifier.redacted()))]
pub async fn remove_item<S: CartStore>(
    store: &S,
    device_identifier: &DeviceIdentifier,
    variant_id: &VariantId,
) -> Result<Option<Cart>, CartError> {
    let Some(mut cart) = get_cart(store, device_identifier).await? else {
        return Ok(None);
    };

    let before = cart.items.len();
    cart.items.retain(|item| item.variant_id() != variant_id);
    if cart.items.len() == before {
        return Ok(Some(cart));
    }

    cart.updated_at = Utc::now();
    store.save_cart(&cart).await?;
    tracing::info!(cart_id = %cart.id, removed = before - cart.items.len(), "Removed cart lines");
    Ok(Some(cart))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::test_support::product_line;

    #[tokio::test]
    async fn test_empty_device_identifier_never_touches_store() {
        let store = InMemoryStore::new();
        let cart = get_cart(&store, &DeviceIdentifier::default()).await.unwrap();
        assert!(cart.is_none());
        assert_eq!(store.cart_query_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_cart_is_none() {
        let store = InMemoryStore::new();
        let cart = get_cart(&store, &DeviceIdentifier::new("nobody")).await.unwrap();
        assert!(cart.is_none());
        assert_eq!(store.cart_query_count(), 1);
    }

    #[tokio::test]
    async fn test_add_creates_cart_and_assigns_increasing_indices() {
        let store = InMemoryStore::new();
        let device = DeviceIdentifier::new("device-1");

        let first = add_item(&store, &device, product_line(0, "11111", "v1")).await.unwrap();
        assert_eq!(first.items.len(), 1);
        assert_eq!(first.items[0].index(), 1);

        let second = add_item(&store, &device, product_line(42, "22222", "v2")).await.unwrap();
        assert_eq!(second.id, first.id);
        let indices: Vec<u32> = second.items.iter().map(CartLineItem::index).collect();
        assert_eq!(indices, [1, 2]);
        assert_eq!(store.cart(&device).unwrap(), second);
    }

    #[tokio::test]
    async fn test_add_requires_device_identifier() {
        let store = InMemoryStore::new();
        let result = add_item(&store, &DeviceIdentifier::default(), product_line(0, "1", "v")).await;
        assert!(matches!(result, Err(CartError::MissingDeviceIdentifier)));
    }

    #[tokio::test]
    async fn test_remove_by_variant() {
        let store = InMemoryStore::new();
        let device = DeviceIdentifier::new("device-1");
        add_item(&store, &device, product_line(0, "11111", "v1")).await.unwrap();
        add_item(&store, &device, product_line(0, "22222", "v2")).await.unwrap();

        let cart = remove_item(&store, &device, &VariantId::new("v1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].variant_id().as_str(), "v2");

        // Index keeps counting from the highest remaining line
        let cart = add_item(&store, &device, product_line(0, "33333", "v3")).await.unwrap();
        assert_eq!(cart.items.last().map(CartLineItem::index), Some(3));
    }

    #[tokio::test]
    async fn test_remove_from_missing_cart_is_noop() {
        let store = InMemoryStore::new();
        let result = remove_item(&store, &DeviceIdentifier::new("nobody"), &VariantId::new("v1"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_logs_carry_only_a_device_prefix() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let store = InMemoryStore::new();
        let device = DeviceIdentifier::new("3f2a9c1e-7b44-4d0a-9e51-0c8d2b6f1a77");
        add_item(&store, &device, product_line(0, "11111", "v1")).await.unwrap();
        remove_item(&store, &device, &VariantId::new("v1")).await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Added cart line"));
        assert!(output.contains("Removed cart lines"));
        assert!(output.contains("device=3f2a9c1e…"));
        assert!(!output.contains(device.as_str()));
    }
}
