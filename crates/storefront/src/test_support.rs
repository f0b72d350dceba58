//! Fixtures shared by unit tests.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use rust_decimal::Decimal;

use cherlygood_core::{
    Cart, CartId, CartLineItem, CatalogProduct, ColorOption, DeviceIdentifier, Pricing,
    ProductId, ProductImages, ProductLine, ProductOptions, Upsell, UpsellId, UpsellLine,
    UpsellProduct, UpsellSelection, VariantId, Visibility,
};

pub const DEVICE: &str = "device-1";

/// A product priced at $12.50 with a "Blue" color image.
pub fn product(id: &str, visibility: Visibility) -> CatalogProduct {
    CatalogProduct {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        slug: format!("product-{id}"),
        pricing: Pricing {
            base_price: Decimal::new(1250, 2),
            sale_price: Decimal::ZERO,
            discount_percentage: 0,
        },
        images: ProductImages {
            main: format!("{id}.jpg"),
            gallery: vec![],
        },
        options: ProductOptions {
            colors: vec![ColorOption {
                name: "Blue".to_string(),
                image: format!("{id}-blue.jpg"),
            }],
            sizes: vec!["S".to_string(), "M".to_string()],
        },
        visibility,
    }
}

/// A published upsell whose constituents are `(product id, index)` pairs.
pub fn upsell(id: &str, constituents: &[(&str, u32)]) -> Upsell {
    Upsell {
        id: UpsellId::new(id),
        main_image: format!("{id}.jpg"),
        visibility: Visibility::Published,
        pricing: Pricing {
            base_price: Decimal::new(2499, 2),
            sale_price: Decimal::new(1999, 2),
            discount_percentage: 20,
        },
        products: constituents
            .iter()
            .map(|(product_id, index)| UpsellProduct {
                index: *index,
                id: ProductId::new(*product_id),
                slug: format!("product-{product_id}"),
                name: format!("Product {product_id}"),
                base_price: Decimal::new(1250, 2),
                images: ProductImages {
                    main: format!("{product_id}.jpg"),
                    gallery: vec![],
                },
                options: ProductOptions::default(),
            })
            .collect(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn product_line(index: u32, product_id: &str, variant_id: &str) -> CartLineItem {
    colored_product_line(index, product_id, variant_id, "")
}

pub fn colored_product_line(
    index: u32,
    product_id: &str,
    variant_id: &str,
    color: &str,
) -> CartLineItem {
    CartLineItem::Product(ProductLine {
        index,
        base_product_id: ProductId::new(product_id),
        variant_id: VariantId::new(variant_id),
        color: color.to_string(),
        size: "M".to_string(),
    })
}

pub fn upsell_line(index: u32, upsell_id: &str, variant_id: &str, selected: &[&str]) -> CartLineItem {
    CartLineItem::Upsell(UpsellLine {
        index,
        base_upsell_id: UpsellId::new(upsell_id),
        variant_id: VariantId::new(variant_id),
        products: selected
            .iter()
            .map(|id| UpsellSelection {
                id: ProductId::new(*id),
                color: String::new(),
                size: "M".to_string(),
            })
            .collect(),
    })
}

pub fn cart_with(items: Vec<CartLineItem>) -> Cart {
    Cart {
        id: CartId::new("cart-1"),
        device_identifier: DeviceIdentifier::new(DEVICE),
        items,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
