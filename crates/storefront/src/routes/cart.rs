//! Cart route handlers.
//!
//! The cart page is server-rendered; add/remove and the JSON view are small
//! JSON endpoints used by the product pages and the cart page script. Carts
//! are keyed by the `device_identifier` cookie, which is issued on the first
//! add.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cherlygood_core::{
    CartId, CartLineItem, ComposedCartItem, Pricing, VariantId, format_usd,
};

use crate::cart::{self, CartPage};
use crate::discovery::{DiscoveryProduct, DiscoverySection};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{Device, device_cookie, new_device_identifier};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Price display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceView {
    /// What the shopper pays.
    pub price: String,
    /// Struck-through base price when on sale.
    pub compare_at: Option<String>,
}

impl From<&Pricing> for PriceView {
    fn from(pricing: &Pricing) -> Self {
        let on_sale = pricing.effective_price() != pricing.base_price;
        Self {
            price: format_usd(pricing.effective_price()),
            compare_at: on_sale.then(|| format_usd(pricing.base_price)),
        }
    }
}

/// One constituent row of a bundle line.
#[derive(Debug, Clone)]
pub struct BundleProductView {
    pub name: String,
    pub href: String,
    pub image: String,
    pub options: String,
}

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub variant_id: String,
    pub name: String,
    pub href: Option<String>,
    pub image: String,
    pub options: String,
    pub price: PriceView,
    pub bundle: Vec<BundleProductView>,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub subtotal: String,
}

/// Recommendation card display data for templates.
#[derive(Debug, Clone)]
pub struct DiscoveryCardView {
    pub name: String,
    pub href: String,
    pub image: String,
    pub price: PriceView,
}

/// Recommendations block display data for templates.
#[derive(Debug, Clone)]
pub struct DiscoveryView {
    pub heading: &'static str,
    pub products: Vec<DiscoveryCardView>,
}

/// Storefront URL of a product page.
fn product_href(slug: &str, id: &impl std::fmt::Display) -> String {
    format!("/{slug}-{id}")
}

/// "Blue / M" style option summary, skipping blanks.
fn option_summary(color: &str, size: &str) -> String {
    [color, size]
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

impl From<&ComposedCartItem> for CartLineView {
    fn from(item: &ComposedCartItem) -> Self {
        match item {
            ComposedCartItem::Product(product) => Self {
                variant_id: product.variant_id.to_string(),
                name: product.name.clone(),
                href: Some(product_href(&product.slug, &product.base_product_id)),
                image: product.main_image.clone(),
                options: option_summary(&product.color, &product.size),
                price: PriceView::from(&product.pricing),
                bundle: Vec::new(),
            },
            ComposedCartItem::Upsell(upsell) => Self {
                variant_id: upsell.variant_id.to_string(),
                name: upsell
                    .products
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(" + "),
                href: None,
                image: upsell.main_image.clone(),
                options: String::new(),
                price: PriceView::from(&upsell.pricing),
                bundle: upsell
                    .products
                    .iter()
                    .map(|p| BundleProductView {
                        name: p.name.clone(),
                        href: product_href(&p.slug, &p.id),
                        image: p.main_image.clone(),
                        options: option_summary(&p.color, &p.size),
                    })
                    .collect(),
            },
        }
    }
}

impl From<&DiscoveryProduct> for DiscoveryCardView {
    fn from(product: &DiscoveryProduct) -> Self {
        Self {
            name: product.name.clone(),
            href: product_href(&product.slug, &product.id),
            image: product.main_image.clone(),
            price: PriceView::from(&product.pricing),
        }
    }
}

impl From<&DiscoverySection> for DiscoveryView {
    fn from(section: &DiscoverySection) -> Self {
        Self {
            heading: section.heading,
            products: section.products.iter().map(DiscoveryCardView::from).collect(),
        }
    }
}

impl From<&CartPage> for CartView {
    fn from(page: &CartPage) -> Self {
        let subtotal = page
            .cart
            .items
            .iter()
            .map(|item| item.pricing().effective_price())
            .sum();
        Self {
            items: page.cart.items.iter().map(CartLineView::from).collect(),
            subtotal: format_usd(subtotal),
        }
    }
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub variant_id: VariantId,
}

/// Response to add/remove.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdatedResponse {
    pub cart_id: Option<CartId>,
    pub item_count: usize,
}

/// Reject lines that could never resolve.
fn validate_line(item: &CartLineItem) -> Result<()> {
    if item.variant_id().is_empty() {
        return Err(AppError::BadRequest("variantId is required".to_string()));
    }
    match item {
        CartLineItem::Product(line) if line.base_product_id.is_empty() => Err(
            AppError::BadRequest("baseProductId is required".to_string()),
        ),
        CartLineItem::Upsell(line) if line.base_upsell_id.is_empty() => Err(
            AppError::BadRequest("baseUpsellId is required".to_string()),
        ),
        CartLineItem::Upsell(line) if line.products.is_empty() => Err(AppError::BadRequest(
            "upsell selections are required".to_string(),
        )),
        _ => Ok(()),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub discovery: Option<DiscoveryView>,
}

impl From<&CartPage> for CartShowTemplate {
    fn from(page: &CartPage) -> Self {
        Self {
            cart: CartView::from(page),
            discovery: page.discovery.as_ref().map(DiscoveryView::from),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, device), fields(device = %device.redacted()))]
pub async fn show(State(state): State<AppState>, Device(device): Device) -> Result<CartShowTemplate> {
    let page = cart::load_cart_page(state.store(), &device, state.config().discovery_limit).await?;
    Ok(CartShowTemplate::from(&page))
}

/// Composed cart as JSON: `{ items, excludedProductIds, discovery }`.
#[instrument(skip(state, device), fields(device = %device.redacted()))]
pub async fn show_json(
    State(state): State<AppState>,
    Device(device): Device,
) -> Result<Json<CartPage>> {
    let page = cart::load_cart_page(state.store(), &device, state.config().discovery_limit).await?;
    Ok(Json(page))
}

/// Add a line to the cart.
///
/// Issues a `device_identifier` cookie when the shopper does not have one.
#[instrument(skip(state, device, item), fields(device = %device.redacted()))]
pub async fn add(
    State(state): State<AppState>,
    Device(device): Device,
    Json(item): Json<CartLineItem>,
) -> Result<Response> {
    validate_line(&item)?;

    let (device, new_cookie) = if device.is_empty() {
        let device = new_device_identifier();
        let cookie = device_cookie(&device, state.config().is_secure());
        (device, Some(cookie))
    } else {
        (device, None)
    };

    let variant_id = item.variant_id().to_string();
    let cart = cart::add_item(state.store(), &device, item).await?;
    add_breadcrumb("cart", "Added line", Some(&[("variant_id", variant_id.as_str())]));

    let body = Json(CartUpdatedResponse {
        cart_id: Some(cart.id),
        item_count: cart.items.len(),
    });

    Ok(match new_cookie {
        Some(cookie) => (
            AppendHeaders([(header::SET_COOKIE, cookie.to_string())]),
            body,
        )
            .into_response(),
        None => body.into_response(),
    })
}

/// Remove every line with the given variant.
#[instrument(skip(state, device), fields(device = %device.redacted()))]
pub async fn remove(
    State(state): State<AppState>,
    Device(device): Device,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartUpdatedResponse>> {
    let cart = cart::remove_item(state.store(), &device, &request.variant_id).await?;

    Ok(Json(CartUpdatedResponse {
        item_count: cart.as_ref().map_or(0, |cart| cart.items.len()),
        cart_id: cart.map(|cart| cart.id),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::ComposedCart;
    use crate::test_support::{product_line, upsell_line};
    use cherlygood_core::{
        ComposedProductItem, ComposedUpsellItem, ComposedUpsellProduct, ProductId, UpsellId,
    };
    use rust_decimal::Decimal;

    fn pricing(base: i64, sale: i64) -> Pricing {
        Pricing {
            base_price: Decimal::new(base, 2),
            sale_price: Decimal::new(sale, 2),
            discount_percentage: 0,
        }
    }

    fn page() -> CartPage {
        CartPage {
            cart: ComposedCart {
                items: vec![
                    ComposedCartItem::Upsell(ComposedUpsellItem {
                        index: 2,
                        base_upsell_id: UpsellId::new("55012"),
                        variant_id: VariantId::new("vu"),
                        main_image: "bundle.jpg".to_string(),
                        pricing: pricing(2099, 1699),
                        products: vec![ComposedUpsellProduct {
                            index: 1,
                            id: ProductId::new("22222"),
                            slug: "tee".to_string(),
                            name: "Tee".to_string(),
                            main_image: "tee.jpg".to_string(),
                            base_price: Decimal::new(1250, 2),
                            color: String::new(),
                            size: "M".to_string(),
                        }],
                    }),
                    ComposedCartItem::Product(ComposedProductItem {
                        index: 1,
                        base_product_id: ProductId::new("11111"),
                        variant_id: VariantId::new("vp"),
                        name: "Skirt".to_string(),
                        slug: "skirt".to_string(),
                        pricing: pricing(1250, 0),
                        main_image: "skirt.jpg".to_string(),
                        color: "Blue".to_string(),
                        size: "M".to_string(),
                    }),
                ],
                excluded_product_ids: vec![ProductId::new("22222"), ProductId::new("11111")],
            },
            discovery: None,
        }
    }

    #[test]
    fn test_cart_view_prices_and_subtotal() {
        let view = CartView::from(&page());
        assert_eq!(view.subtotal, "$29.49");

        assert_eq!(view.items[0].price.price, "$16.99");
        assert_eq!(view.items[0].price.compare_at.as_deref(), Some("$20.99"));
        assert_eq!(view.items[0].bundle[0].href, "/tee-22222");

        assert_eq!(view.items[1].price.compare_at, None);
        assert_eq!(view.items[1].options, "Blue / M");
        assert_eq!(view.items[1].href.as_deref(), Some("/skirt-11111"));
    }

    #[test]
    fn test_cart_page_renders() {
        let html = CartShowTemplate::from(&page()).render().unwrap();
        assert!(html.contains("Skirt"));
        assert!(html.contains("$29.49"));
        assert!(!html.contains("Your cart is empty"));
    }

    #[test]
    fn test_empty_cart_page_renders_empty_state() {
        let empty = CartPage {
            cart: ComposedCart::default(),
            discovery: None,
        };
        let html = CartShowTemplate::from(&empty).render().unwrap();
        assert!(html.contains("Your cart is empty"));
    }

    #[test]
    fn test_validate_line() {
        assert!(validate_line(&product_line(0, "11111", "v1")).is_ok());
        assert!(validate_line(&product_line(0, "", "v1")).is_err());
        assert!(validate_line(&product_line(0, "11111", "")).is_err());
        assert!(validate_line(&upsell_line(0, "55012", "v2", &["11111"])).is_ok());
        assert!(validate_line(&upsell_line(0, "55012", "v2", &[])).is_err());
    }

    #[test]
    fn test_add_body_index_is_optional() {
        let item: CartLineItem = serde_json::from_str(
            r#"{ "type": "product", "baseProductId": "11111", "variantId": "v1", "color": "Blue", "size": "M" }"#,
        )
        .unwrap();
        assert_eq!(item.index(), 0);
    }
}
