//! Integration tests for Cherlygood.
//!
//! The tests under `tests/` drive the storefront cart flows and the admin
//! upsell editor against [`InMemoryStore`], so they run without a database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cherlygood-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Add/remove lines, composition and recommendations
//! - `upsell_editor` - Creating upsells and buying them from the cart

use rust_decimal::Decimal;

use cherlygood_core::{
    CartLineItem, CatalogProduct, ColorOption, DeviceIdentifier, DiscoveryProductsSettings,
    DiscoveryVisibility, Pricing, ProductId, ProductImages, ProductLine, ProductOptions, UpsellId,
    UpsellLine, UpsellSelection, VariantId, Visibility,
};
use cherlygood_storefront::db::InMemoryStore;

/// Device used by single-shopper tests.
#[must_use]
pub fn device() -> DeviceIdentifier {
    DeviceIdentifier::new("integration-device")
}

/// A catalog product priced in cents, with one "Blue" color image.
#[must_use]
pub fn catalog_product(id: &str, cents: i64, visibility: Visibility) -> CatalogProduct {
    CatalogProduct {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        slug: format!("product-{id}"),
        pricing: Pricing {
            base_price: Decimal::new(cents, 2),
            sale_price: Decimal::ZERO,
            discount_percentage: 0,
        },
        images: ProductImages {
            main: format!("/img/{id}.jpg"),
            gallery: Vec::new(),
        },
        options: ProductOptions {
            colors: vec![ColorOption {
                name: "Blue".to_string(),
                image: format!("/img/{id}-blue.jpg"),
            }],
            sizes: vec!["S".to_string(), "M".to_string()],
        },
        visibility,
    }
}

/// A store holding published products with the given IDs.
#[must_use]
pub fn store_with_products(ids: &[&str]) -> InMemoryStore {
    let store = InMemoryStore::new();
    for id in ids {
        store.insert_product(catalog_product(id, 1250, Visibility::Published));
    }
    store
}

/// Discovery settings with the cart section switched on or off.
#[must_use]
pub const fn discovery_on_cart(cart: bool) -> DiscoveryProductsSettings {
    DiscoveryProductsSettings {
        visible_on_pages: DiscoveryVisibility { home: true, cart },
    }
}

/// A product line as posted by the product page (index left for the cart).
#[must_use]
pub fn product_line(product_id: &str, variant_id: &str, color: &str) -> CartLineItem {
    CartLineItem::Product(ProductLine {
        index: 0,
        base_product_id: ProductId::new(product_id),
        variant_id: VariantId::new(variant_id),
        color: color.to_string(),
        size: "M".to_string(),
    })
}

/// An upsell line selecting size M of each constituent.
#[must_use]
pub fn upsell_line(upsell_id: &UpsellId, variant_id: &str, product_ids: &[&str]) -> CartLineItem {
    CartLineItem::Upsell(UpsellLine {
        index: 0,
        base_upsell_id: upsell_id.clone(),
        variant_id: VariantId::new(variant_id),
        products: product_ids
            .iter()
            .map(|id| UpsellSelection {
                id: ProductId::new(*id),
                color: String::new(),
                size: "M".to_string(),
            })
            .collect(),
    })
}
