//! Persisted cart documents and their composed (display) form.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CartId, DeviceIdentifier, ProductId, UpsellId, VariantId};
use super::price::Pricing;

/// A cart line referencing a single product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    #[serde(default)]
    pub index: u32,
    pub base_product_id: ProductId,
    pub variant_id: VariantId,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
}

/// A shopper's color/size pick for one product of an upsell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsellSelection {
    pub id: ProductId,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
}

/// A cart line referencing an upsell bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsellLine {
    #[serde(default)]
    pub index: u32,
    pub base_upsell_id: UpsellId,
    pub variant_id: VariantId,
    #[serde(default)]
    pub products: Vec<UpsellSelection>,
}

/// One entry of a persisted cart. References only; no product data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CartLineItem {
    Product(ProductLine),
    Upsell(UpsellLine),
}

impl CartLineItem {
    /// Display-order key shared by both line kinds.
    #[must_use]
    pub const fn index(&self) -> u32 {
        match self {
            Self::Product(line) => line.index,
            Self::Upsell(line) => line.index,
        }
    }

    /// Overwrite the display-order key.
    pub const fn set_index(&mut self, index: u32) {
        match self {
            Self::Product(line) => line.index = index,
            Self::Upsell(line) => line.index = index,
        }
    }

    /// Variant the line was added with.
    #[must_use]
    pub const fn variant_id(&self) -> &VariantId {
        match self {
            Self::Product(line) => &line.variant_id,
            Self::Upsell(line) => &line.variant_id,
        }
    }
}

/// A shopper's cart, keyed by their anonymous device identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    #[serde(alias = "device_identifier")]
    pub device_identifier: DeviceIdentifier,
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Index to assign to the next added line.
    #[must_use]
    pub fn next_index(&self) -> u32 {
        self.items
            .iter()
            .map(CartLineItem::index)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }
}

/// A product line joined against its live catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedProductItem {
    pub index: u32,
    pub base_product_id: ProductId,
    pub variant_id: VariantId,
    pub name: String,
    pub slug: String,
    pub pricing: Pricing,
    pub main_image: String,
    pub color: String,
    pub size: String,
}

/// A constituent of a composed upsell line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedUpsellProduct {
    pub index: u32,
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub main_image: String,
    pub base_price: Decimal,
    pub color: String,
    pub size: String,
}

/// An upsell line joined against its live upsell document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedUpsellItem {
    pub index: u32,
    pub base_upsell_id: UpsellId,
    pub variant_id: VariantId,
    pub main_image: String,
    pub pricing: Pricing,
    pub products: Vec<ComposedUpsellProduct>,
}

/// A display-ready cart entry. Lives for one request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComposedCartItem {
    Product(ComposedProductItem),
    Upsell(ComposedUpsellItem),
}

impl ComposedCartItem {
    /// Display-order key.
    #[must_use]
    pub const fn index(&self) -> u32 {
        match self {
            Self::Product(item) => item.index,
            Self::Upsell(item) => item.index,
        }
    }

    /// Listed pricing of the line.
    #[must_use]
    pub const fn pricing(&self) -> &Pricing {
        match self {
            Self::Product(item) => &item.pricing,
            Self::Upsell(item) => &item.pricing,
        }
    }

    /// Catalog product IDs shown by this line.
    pub fn product_ids(&self) -> impl Iterator<Item = &ProductId> {
        let (single, bundle) = match self {
            Self::Product(item) => (Some(&item.base_product_id), [].as_slice()),
            Self::Upsell(item) => (None, item.products.as_slice()),
        };
        single.into_iter().chain(bundle.iter().map(|p| &p.id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_items_deserialize_by_type_tag() {
        let json = r#"[
            { "type": "product", "index": 2, "baseProductId": "70465",
              "variantId": "v1", "color": "Blue", "size": "M" },
            { "type": "upsell", "index": 1, "baseUpsellId": "55012", "variantId": "v2",
              "products": [{ "id": "70465", "color": "Blue", "size": "M" }] }
        ]"#;

        let items: Vec<CartLineItem> = serde_json::from_str(json).unwrap();
        assert!(matches!(&items[0], CartLineItem::Product(line) if line.index == 2));
        assert!(matches!(&items[1], CartLineItem::Upsell(line) if line.products.len() == 1));
    }

    #[test]
    fn test_cart_accepts_snake_case_device_identifier() {
        let json = r#"{ "id": "c1", "device_identifier": "abc", "items": [],
                        "createdAt": "2026-01-01T00:00:00Z", "updatedAt": "2026-01-01T00:00:00Z" }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.device_identifier.as_str(), "abc");
    }

    #[test]
    fn test_next_index() {
        let mut cart = Cart {
            id: CartId::new("c1"),
            device_identifier: DeviceIdentifier::new("abc"),
            items: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(cart.next_index(), 1);

        cart.items.push(CartLineItem::Product(ProductLine {
            index: 7,
            base_product_id: ProductId::new("1"),
            variant_id: VariantId::new("v"),
            color: String::new(),
            size: String::new(),
        }));
        assert_eq!(cart.next_index(), 8);
    }
}
