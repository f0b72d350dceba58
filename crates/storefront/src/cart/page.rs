//! Everything the cart page shows, loaded in one pass.

use serde::Serialize;
use tracing::instrument;

use cherlygood_core::DeviceIdentifier;

use super::{CartStore, ComposedCart, compose_cart, get_cart};
use crate::catalog::CatalogSource;
use crate::db::RepositoryError;
use crate::discovery::{DiscoverySection, cart_discovery};

/// Composed cart plus recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartPage {
    #[serde(flatten)]
    pub cart: ComposedCart,
    pub discovery: Option<DiscoverySection>,
}

/// Load the cart page for a device.
///
/// Cart composition and the discovery settings read run concurrently. A
/// failed settings read only hides the recommendations.
///
/// # Errors
///
/// Propagates failures of the cart fetch, the product lookups and the
/// discovery catalog lookup.
#[instrument(skip(store, device_identifier), fields(device = %device_identifier.redacted()))]
pub async fn load_cart_page<S: CatalogSource + CartStore>(
    store: &S,
    device_identifier: &DeviceIdentifier,
    discovery_limit: usize,
) -> Result<CartPage, RepositoryError> {
    let cart = get_cart(store, device_identifier).await?;

    let composed = async {
        match &cart {
            Some(cart) => compose_cart(store, cart).await,
            None => Ok(ComposedCart::default()),
        }
    };
    let (composed, settings) = futures::join!(composed, store.discovery_settings());
    let composed = composed?;

    let settings = settings.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to read discovery settings, hiding recommendations");
        None
    });

    let discovery = cart_discovery(
        store,
        settings.as_ref(),
        &composed.excluded_product_ids,
        discovery_limit,
    )
    .await?;

    Ok(CartPage {
        cart: composed,
        discovery,
    })
}
