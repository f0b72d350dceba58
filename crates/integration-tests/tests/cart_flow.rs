//! Cart flows: adding and removing lines, composing the cart page and the
//! "Add These to Your Cart" recommendations.

#![allow(clippy::unwrap_used)]

use cherlygood_core::{ComposedCartItem, DeviceIdentifier, ProductId, VariantId, Visibility};
use cherlygood_integration_tests::{
    catalog_product, device, discovery_on_cart, product_line, store_with_products,
};
use cherlygood_storefront::cart::{self, CartPage, load_cart_page};
use cherlygood_storefront::db::InMemoryStore;

const LIMIT: usize = 8;

async fn page(store: &InMemoryStore) -> CartPage {
    load_cart_page(store, &device(), LIMIT).await.unwrap()
}

fn ids(ids: &[&str]) -> Vec<ProductId> {
    ids.iter().map(|id| ProductId::new(*id)).collect()
}

#[tokio::test]
async fn test_lines_are_shown_newest_first() {
    let store = store_with_products(&["10001", "10002", "10003"]);
    for (product, variant) in [("10001", "v1"), ("10002", "v2"), ("10003", "v3")] {
        cart::add_item(&store, &device(), product_line(product, variant, ""))
            .await
            .unwrap();
    }

    let page = page(&store).await;
    let indices: Vec<u32> = page.cart.items.iter().map(ComposedCartItem::index).collect();
    assert_eq!(indices, vec![3, 2, 1]);
    assert_eq!(page.cart.excluded_product_ids, ids(&["10003", "10002", "10001"]));
}

#[tokio::test]
async fn test_composed_line_uses_color_image() {
    let store = store_with_products(&["10001"]);
    cart::add_item(&store, &device(), product_line("10001", "v1", "Blue"))
        .await
        .unwrap();

    let page = page(&store).await;
    let ComposedCartItem::Product(item) = &page.cart.items[0] else {
        panic!("expected a product line");
    };
    assert_eq!(item.main_image, "/img/10001-blue.jpg");
    assert_eq!(item.name, "Product 10001");
}

#[tokio::test]
async fn test_unavailable_products_drop_out() {
    let store = store_with_products(&["10001", "10002", "10003"]);
    for (product, variant) in [("10001", "v1"), ("10002", "v2"), ("10003", "v3")] {
        cart::add_item(&store, &device(), product_line(product, variant, ""))
            .await
            .unwrap();
    }

    store.remove_product(&ProductId::new("10002"));
    store.insert_product(catalog_product("10003", 1250, Visibility::Hidden));

    let page = page(&store).await;
    assert_eq!(page.cart.items.len(), 1);
    assert_eq!(page.cart.excluded_product_ids, ids(&["10001"]));

    // The stored cart is untouched; the product comes back if republished
    store.insert_product(catalog_product("10003", 1250, Visibility::Published));
    let again = load_cart_page(&store, &device(), LIMIT).await.unwrap();
    assert_eq!(again.cart.items.len(), 2);
}

#[tokio::test]
async fn test_composition_is_idempotent() {
    let store = store_with_products(&["10001", "10002"]);
    cart::add_item(&store, &device(), product_line("10001", "v1", ""))
        .await
        .unwrap();
    cart::add_item(&store, &device(), product_line("10002", "v2", "Blue"))
        .await
        .unwrap();

    let first = page(&store).await;
    let second = page(&store).await;
    assert_eq!(first.cart, second.cart);
}

#[tokio::test]
async fn test_remove_drops_every_line_with_variant() {
    let store = store_with_products(&["10001", "10002"]);
    for (product, variant) in [("10001", "v1"), ("10002", "v2"), ("10001", "v1")] {
        cart::add_item(&store, &device(), product_line(product, variant, ""))
            .await
            .unwrap();
    }

    let cart = cart::remove_item(&store, &device(), &VariantId::new("v1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].variant_id(), &VariantId::new("v2"));

    // Indices keep growing after a removal
    let cart = cart::add_item(&store, &device(), product_line("10001", "v1", ""))
        .await
        .unwrap();
    assert_eq!(cart.items.last().unwrap().index(), 3);
}

#[tokio::test]
async fn test_anonymous_shopper_never_touches_store() {
    let store = store_with_products(&["10001"]);
    let anonymous = DeviceIdentifier::new("");

    let page = load_cart_page(&store, &anonymous, LIMIT).await.unwrap();
    assert!(page.cart.is_empty());
    assert_eq!(store.cart_query_count(), 0);
    assert_eq!(store.product_query_count(), 0);

    let err = cart::add_item(&store, &anonymous, product_line("10001", "v1", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, cart::CartError::MissingDeviceIdentifier));
}

#[tokio::test]
async fn test_discovery_needs_three_available_products() {
    let store = store_with_products(&["10001", "10002", "10003", "10004"]);
    store.set_discovery_settings(Some(discovery_on_cart(true)));

    cart::add_item(&store, &device(), product_line("10001", "v1", ""))
        .await
        .unwrap();
    let page = page(&store).await;
    let discovery = page.discovery.unwrap();
    assert_eq!(discovery.heading, "Add These to Your Cart");
    assert_eq!(discovery.products.len(), 3);
    assert!(
        discovery
            .products
            .iter()
            .all(|product| product.id != ProductId::new("10001"))
    );

    cart::add_item(&store, &device(), product_line("10002", "v2", ""))
        .await
        .unwrap();
    assert!(page_discovery_is_hidden(&store).await);
}

async fn page_discovery_is_hidden(store: &InMemoryStore) -> bool {
    page(store).await.discovery.is_none()
}

#[tokio::test]
async fn test_discovery_respects_setting() {
    let store = store_with_products(&["10001", "10002", "10003", "10004"]);

    store.set_discovery_settings(None);
    assert!(page_discovery_is_hidden(&store).await);

    store.set_discovery_settings(Some(discovery_on_cart(false)));
    assert!(page_discovery_is_hidden(&store).await);

    store.fail_discovery_settings();
    assert!(page_discovery_is_hidden(&store).await);
}

#[tokio::test]
async fn test_cart_page_json_shape() {
    let store = store_with_products(&["10001"]);
    cart::add_item(&store, &device(), product_line("10001", "v1", ""))
        .await
        .unwrap();

    let json = serde_json::to_value(page(&store).await).unwrap();
    assert_eq!(json["excludedProductIds"], serde_json::json!(["10001"]));
    assert_eq!(json["items"][0]["baseProductId"], "10001");
    assert!(json["discovery"].is_null());
}
