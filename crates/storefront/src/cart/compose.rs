//! Cart composition.
//!
//! Joins a persisted cart's references against the live catalog and
//! produces the display list. This is the only place where stale
//! references are dropped: a product line whose product is gone (or no
//! longer published) disappears, as does an upsell line whose upsell is
//! gone or whose selections no longer match any live constituent. The cart
//! document itself is never modified.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use serde::Serialize;
use tracing::instrument;

use cherlygood_core::{
    Cart, CartLineItem, CatalogProduct, ComposedCartItem, ComposedProductItem,
    ComposedUpsellItem, ComposedUpsellProduct, ProductId, ProductLine, Upsell, UpsellId,
    UpsellLine,
};

use crate::catalog::{CatalogSource, ProductQuery, get_products, get_upsell};
use crate::db::RepositoryError;

/// A cart ready for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedCart {
    /// Surviving lines, highest `index` first.
    pub items: Vec<ComposedCartItem>,
    /// Distinct catalog product IDs shown in `items`, in display order.
    pub excluded_product_ids: Vec<ProductId>,
}

impl ComposedCart {
    /// True when nothing in the cart survived composition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Compose a cart for display.
///
/// Product lines are resolved with one batched published lookup; upsell
/// lines are resolved concurrently, one lookup each, alongside it.
///
/// # Errors
///
/// A failure of the batched product lookup propagates. A failed upsell
/// lookup is logged and only drops that line.
#[instrument(skip_all, fields(cart_id = %cart.id, items = cart.items.len()))]
pub async fn compose_cart<S: CatalogSource>(
    source: &S,
    cart: &Cart,
) -> Result<ComposedCart, RepositoryError> {
    let mut product_lines = Vec::new();
    let mut upsell_lines = Vec::new();
    for item in &cart.items {
        match item {
            CartLineItem::Product(line) => product_lines.push(line),
            CartLineItem::Upsell(line) => upsell_lines.push(line),
        }
    }

    let query = ProductQuery::by_ids(
        product_lines
            .iter()
            .map(|line| line.base_product_id.clone()),
    )
    .published();

    let (products, upsells) = futures::join!(
        get_products(source, &query),
        join_all(
            upsell_lines
                .iter()
                .map(|line| resolve_upsell(source, &line.base_upsell_id))
        ),
    );
    let products = products?;

    Ok(assemble(&product_lines, &products, &upsell_lines, upsells))
}

/// Resolve one upsell line's upsell, treating lookup failures as "gone".
async fn resolve_upsell<S: CatalogSource>(source: &S, id: &UpsellId) -> Option<Upsell> {
    match get_upsell(source, id).await {
        Ok(upsell) => upsell,
        Err(e) => {
            tracing::warn!(upsell_id = %id, error = %e, "Upsell lookup failed, dropping cart line");
            None
        }
    }
}

/// Join lines against their resolved documents, sort, and collect IDs.
///
/// `upsells` is positionally aligned with `upsell_lines`.
fn assemble(
    product_lines: &[&ProductLine],
    products: &[CatalogProduct],
    upsell_lines: &[&UpsellLine],
    upsells: Vec<Option<Upsell>>,
) -> ComposedCart {
    let products_by_id: HashMap<&ProductId, &CatalogProduct> =
        products.iter().map(|product| (&product.id, product)).collect();

    let product_items = product_lines.iter().filter_map(|line| {
        products_by_id
            .get(&line.base_product_id)
            .map(|product| ComposedCartItem::Product(compose_product_line(line, product)))
    });

    let upsell_items = upsell_lines
        .iter()
        .zip(upsells)
        .filter_map(|(line, upsell)| compose_upsell_line(line, upsell?))
        .map(ComposedCartItem::Upsell);

    // Products before upsells so that equal indices keep that order
    let mut items: Vec<ComposedCartItem> = product_items.chain(upsell_items).collect();
    items.sort_by(|a, b| b.index().cmp(&a.index()));

    let mut seen = HashSet::new();
    let excluded_product_ids = items
        .iter()
        .flat_map(ComposedCartItem::product_ids)
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect();

    ComposedCart {
        items,
        excluded_product_ids,
    }
}

fn compose_product_line(line: &ProductLine, product: &CatalogProduct) -> ComposedProductItem {
    ComposedProductItem {
        index: line.index,
        base_product_id: product.id.clone(),
        variant_id: line.variant_id.clone(),
        name: product.name.clone(),
        slug: product.slug.clone(),
        pricing: product.pricing,
        main_image: product.image_for_color(&line.color).to_owned(),
        color: line.color.clone(),
        size: line.size.clone(),
    }
}

/// Pair each selection with its constituent; `None` if none survive.
fn compose_upsell_line(line: &UpsellLine, upsell: Upsell) -> Option<ComposedUpsellItem> {
    let products: Vec<ComposedUpsellProduct> = line
        .products
        .iter()
        .filter_map(|selection| {
            let constituent = upsell.products.iter().find(|p| p.id == selection.id)?;
            Some(ComposedUpsellProduct {
                index: constituent.index,
                id: constituent.id.clone(),
                slug: constituent.slug.clone(),
                name: constituent.name.clone(),
                main_image: constituent.image_for_color(&selection.color).to_owned(),
                base_price: constituent.base_price,
                color: selection.color.clone(),
                size: selection.size.clone(),
            })
        })
        .collect();

    if products.is_empty() {
        return None;
    }

    Some(ComposedUpsellItem {
        index: line.index,
        base_upsell_id: line.base_upsell_id.clone(),
        variant_id: line.variant_id.clone(),
        main_image: upsell.main_image,
        pricing: upsell.pricing,
        products,
    })
}
