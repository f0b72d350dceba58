//! Catalog documents: products and upsell bundles.
//!
//! These mirror the JSON documents held by the store. Only the fields the
//! cart and upsell flows consume are modelled; unknown fields are ignored
//! on read.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, UpsellId};
use super::price::Pricing;
use super::status::Visibility;

/// Main image plus gallery.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImages {
    pub main: String,
    #[serde(default)]
    pub gallery: Vec<String>,
}

/// A selectable color with its own product shot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOption {
    pub name: String,
    pub image: String,
}

/// Variant options of a product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOptions {
    #[serde(default)]
    pub colors: Vec<ColorOption>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl ProductOptions {
    /// Image for a named color, if the product offers that color.
    #[must_use]
    pub fn color_image(&self, color: &str) -> Option<&str> {
        self.colors
            .iter()
            .find(|option| option.name == color)
            .map(|option| option.image.as_str())
            .filter(|image| !image.is_empty())
    }
}

/// A product as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default)]
    pub images: ProductImages,
    #[serde(default)]
    pub options: ProductOptions,
    #[serde(default)]
    pub visibility: Visibility,
}

impl CatalogProduct {
    /// Display image for a shopper's color selection.
    ///
    /// Falls back to the main image when the color is not (or no longer)
    /// offered.
    #[must_use]
    pub fn image_for_color(&self, color: &str) -> &str {
        self.options
            .color_image(color)
            .unwrap_or(self.images.main.as_str())
    }
}

/// A constituent product inside an upsell document.
///
/// `name`, `slug`, `base_price` and `images` are a snapshot taken when the
/// upsell was created; `options` is refreshed from the live catalog on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsellProduct {
    pub index: u32,
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub base_price: Decimal,
    #[serde(default)]
    pub images: ProductImages,
    #[serde(default)]
    pub options: ProductOptions,
}

impl UpsellProduct {
    /// Display image for a shopper's color selection.
    #[must_use]
    pub fn image_for_color(&self, color: &str) -> &str {
        self.options
            .color_image(color)
            .unwrap_or(self.images.main.as_str())
    }
}

/// A merchant-curated bundle sold at its own price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upsell {
    pub id: UpsellId,
    pub main_image: String,
    #[serde(default)]
    pub visibility: Visibility,
    pub pricing: Pricing,
    #[serde(default)]
    pub products: Vec<UpsellProduct>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Discovery ("you might also like") widget placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryVisibility {
    #[serde(default)]
    pub home: bool,
    #[serde(default)]
    pub cart: bool,
}

/// Stored settings for the discovery widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryProductsSettings {
    #[serde(default)]
    pub visible_on_pages: DiscoveryVisibility,
}
