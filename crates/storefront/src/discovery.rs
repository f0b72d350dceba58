//! "Add These to Your Cart" recommendations.
//!
//! Shown on the cart page when the `discovery_products` setting enables it
//! for the cart and at least [`MIN_DISCOVERY_PRODUCTS`] published products
//! are not already in the cart.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use cherlygood_core::{CatalogProduct, DiscoveryProductsSettings, Pricing, ProductId};

use crate::catalog::{CatalogSource, ProductQuery, get_products};
use crate::db::RepositoryError;

/// Fewest available products for which the section is worth showing.
pub const MIN_DISCOVERY_PRODUCTS: usize = 3;

/// Section heading on the cart page.
pub const CART_HEADING: &str = "Add These to Your Cart";

/// A recommended product card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryProduct {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub pricing: Pricing,
    pub main_image: String,
}

impl From<CatalogProduct> for DiscoveryProduct {
    fn from(product: CatalogProduct) -> Self {
        Self {
            id: product.id,
            name: product.name,
            slug: product.slug,
            pricing: product.pricing,
            main_image: product.images.main,
        }
    }
}

/// The recommendations block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoverySection {
    pub heading: &'static str,
    pub products: Vec<DiscoveryProduct>,
}

/// Whether the settings enable the section on the cart page.
#[must_use]
pub fn enabled_on_cart(settings: Option<&DiscoveryProductsSettings>) -> bool {
    settings.is_some_and(|settings| settings.visible_on_pages.cart)
}

/// Build the cart page recommendations.
///
/// # Errors
///
/// Propagates a failure of the published catalog lookup.
pub async fn cart_discovery<S: CatalogSource>(
    source: &S,
    settings: Option<&DiscoveryProductsSettings>,
    excluded: &[ProductId],
    limit: usize,
) -> Result<Option<DiscoverySection>, RepositoryError> {
    if !enabled_on_cart(settings) || limit == 0 {
        return Ok(None);
    }

    let published = get_products(source, &ProductQuery::all().published()).await?;
    Ok(select_discovery(published, excluded, limit, &mut rand::rng()))
}

/// Pick up to `limit` shuffled products that are not in `excluded`.
///
/// Returns `None` when fewer than [`MIN_DISCOVERY_PRODUCTS`] remain.
pub fn select_discovery<R: Rng + ?Sized>(
    products: Vec<CatalogProduct>,
    excluded: &[ProductId],
    limit: usize,
    rng: &mut R,
) -> Option<DiscoverySection> {
    let excluded: HashSet<&ProductId> = excluded.iter().collect();
    let mut available: Vec<CatalogProduct> = products
        .into_iter()
        .filter(|product| !excluded.contains(&product.id))
        .collect();

    if available.len() < MIN_DISCOVERY_PRODUCTS {
        tracing::debug!(available = available.len(), "Too few products for discovery");
        return None;
    }

    available.shuffle(rng);
    available.truncate(limit);

    Some(DiscoverySection {
        heading: CART_HEADING,
        products: available.into_iter().map(DiscoveryProduct::from).collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::test_support::product;
    use cherlygood_core::{DiscoveryVisibility, Visibility};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn products(ids: &[&str]) -> Vec<CatalogProduct> {
        ids.iter()
            .map(|id| product(id, Visibility::Published))
            .collect()
    }

    fn cart_enabled() -> DiscoveryProductsSettings {
        DiscoveryProductsSettings {
            visible_on_pages: DiscoveryVisibility {
                home: false,
                cart: true,
            },
        }
    }

    #[test]
    fn test_needs_three_available_products() {
        let mut rng = StdRng::seed_from_u64(7);
        let catalog = products(&["1", "2", "3", "4"]);

        let excluded = [ProductId::new("1"), ProductId::new("2")];
        assert!(select_discovery(catalog.clone(), &excluded, 8, &mut rng).is_none());

        let section = select_discovery(catalog, &excluded[..1], 8, &mut rng).unwrap();
        assert_eq!(section.products.len(), 3);
        assert!(section.products.iter().all(|p| p.id.as_str() != "1"));
        assert_eq!(section.heading, CART_HEADING);
    }

    #[test]
    fn test_limit_caps_products() {
        let mut rng = StdRng::seed_from_u64(7);
        let section = select_discovery(products(&["1", "2", "3", "4", "5"]), &[], 4, &mut rng).unwrap();
        assert_eq!(section.products.len(), 4);
    }

    #[test]
    fn test_enabled_on_cart() {
        assert!(!enabled_on_cart(None));
        assert!(!enabled_on_cart(Some(&DiscoveryProductsSettings::default())));
        assert!(enabled_on_cart(Some(&cart_enabled())));
    }

    #[tokio::test]
    async fn test_disabled_setting_skips_catalog_lookup() {
        let store = InMemoryStore::new();
        for p in products(&["1", "2", "3"]) {
            store.insert_product(p);
        }

        let section = cart_discovery(&store, None, &[], 8).await.unwrap();
        assert!(section.is_none());
        assert_eq!(store.product_query_count(), 0);

        let section = cart_discovery(&store, Some(&cart_enabled()), &[], 8).await.unwrap();
        assert_eq!(section.map(|s| s.products.len()), Some(3));
    }

    #[tokio::test]
    async fn test_unpublished_products_are_not_recommended() {
        let store = InMemoryStore::new();
        store.insert_product(product("1", Visibility::Published));
        store.insert_product(product("2", Visibility::Published));
        store.insert_product(product("3", Visibility::Draft));

        let section = cart_discovery(&store, Some(&cart_enabled()), &[], 8).await.unwrap();
        assert!(section.is_none());
    }
}
