//! Upsell editor state.
//!
//! [`UpsellDraft`] holds what the operator has entered while composing a new
//! bundle: the bundle image, the ordered constituent products and the raw
//! discount input. Pricing is recomputed from scratch on every read, so the
//! draft never carries a stale total.
//!
//! ```rust
//! use cherlygood_admin::editor::UpsellDraft;
//!
//! let mut draft = UpsellDraft::new();
//! assert_eq!(
//!     draft.clone().finalize().unwrap_err().to_string(),
//!     "Main image is missing"
//! );
//!
//! draft.set_main_image("bundle.jpg");
//! assert_eq!(
//!     draft.finalize().unwrap_err().to_string(),
//!     "At least one product is required"
//! );
//! ```

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use cherlygood_core::{
    BundlePricing, CatalogProduct, DiscountError, DiscountPercent, Pricing, PricingError,
    ProductId, Upsell, UpsellId, UpsellProduct, Visibility, compute_pricing,
};

static PRODUCT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}$").expect("Invalid regex"));

/// Operator input rejected by the editor.
///
/// The messages are shown verbatim in the admin UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Product ID cannot be empty")]
    EmptyProductId,
    #[error("Product ID must be a 5-digit number")]
    MalformedProductId,
    #[error("Product already added")]
    DuplicateProduct,
    #[error("Renamed product is not in the bundle")]
    RenamedProductMissing,
    #[error("Invalid discount: {0}")]
    InvalidDiscount(#[from] DiscountError),
    #[error("Main image is missing")]
    MissingMainImage,
    #[error("At least one product is required")]
    NoProducts,
    #[error("Base price must be greater than zero")]
    ZeroBasePrice,
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Validate a product ID typed by the operator.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`DraftError::EmptyProductId`] or [`DraftError::MalformedProductId`].
pub fn validate_product_id(input: &str) -> Result<ProductId, DraftError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DraftError::EmptyProductId);
    }
    if !PRODUCT_ID_RE.is_match(trimmed) {
        return Err(DraftError::MalformedProductId);
    }
    Ok(ProductId::new(trimmed))
}

/// Snapshot a catalog product as a bundle constituent.
///
/// The index is assigned when the constituent joins a draft.
#[must_use]
pub fn constituent(product: CatalogProduct) -> UpsellProduct {
    UpsellProduct {
        index: 0,
        id: product.id,
        slug: product.slug,
        name: product.name,
        base_price: product.pricing.base_price,
        images: product.images,
        options: product.options,
    }
}

/// An upsell being composed in the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsellDraft {
    main_image: String,
    products: Vec<UpsellProduct>,
    discount: String,
}

impl UpsellDraft {
    /// An empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn main_image(&self) -> &str {
        &self.main_image
    }

    pub fn set_main_image(&mut self, main_image: impl Into<String>) {
        self.main_image = main_image.into();
    }

    /// Constituents in draft order, indexed from 1.
    #[must_use]
    pub fn products(&self) -> &[UpsellProduct] {
        &self.products
    }

    /// The raw discount input.
    #[must_use]
    pub fn discount(&self) -> &str {
        &self.discount
    }

    /// Whether the product is already a constituent.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.products.iter().any(|product| &product.id == id)
    }

    /// Append a constituent.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::DuplicateProduct`] if the product is already in
    /// the draft.
    pub fn add_product(&mut self, mut product: UpsellProduct) -> Result<(), DraftError> {
        if self.contains(&product.id) {
            return Err(DraftError::DuplicateProduct);
        }
        product.index = next_index(self.products.len());
        self.products.push(product);
        Ok(())
    }

    /// Remove a constituent and close the gap in the indices.
    ///
    /// Removing the last constituent also clears the discount. Returns
    /// whether anything was removed.
    pub fn remove_product(&mut self, id: &ProductId) -> bool {
        let before = self.products.len();
        self.products.retain(|product| &product.id != id);
        if self.products.len() == before {
            return false;
        }

        for (position, product) in self.products.iter_mut().enumerate() {
            product.index = next_index(position);
        }
        if self.products.is_empty() {
            self.discount.clear();
        }
        true
    }

    /// Override a constituent's display name for this bundle.
    ///
    /// Returns whether the product is in the draft.
    pub fn rename_product(&mut self, id: &ProductId, name: impl Into<String>) -> bool {
        match self.products.iter_mut().find(|product| &product.id == id) {
            Some(product) => {
                product.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Replace the discount input.
    ///
    /// Accepts `""` or a whole percentage; anything else leaves the current
    /// value untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::InvalidDiscount`] for non-digit input or values
    /// above 100.
    pub fn set_discount(&mut self, input: &str) -> Result<(), DraftError> {
        DiscountPercent::parse(input)?;
        self.discount = input.to_string();
        Ok(())
    }

    /// The parsed discount, if one is set.
    #[must_use]
    pub fn discount_percent(&self) -> Option<DiscountPercent> {
        DiscountPercent::parse(&self.discount).ok().flatten()
    }

    /// Current bundle pricing.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::Pricing`] if the constituent prices overflow.
    pub fn pricing(&self) -> Result<BundlePricing, DraftError> {
        let base_prices: Vec<Decimal> = self
            .products
            .iter()
            .map(|product| product.base_price)
            .collect();
        Ok(compute_pricing(&base_prices, self.discount_percent())?)
    }

    /// Validate the draft and produce the upsell to persist.
    ///
    /// # Errors
    ///
    /// Checked in order: [`DraftError::MissingMainImage`],
    /// [`DraftError::NoProducts`], [`DraftError::ZeroBasePrice`]. An
    /// overflowing total is [`DraftError::Pricing`].
    pub fn finalize(self) -> Result<NewUpsell, DraftError> {
        if self.main_image.trim().is_empty() {
            return Err(DraftError::MissingMainImage);
        }
        if self.products.is_empty() {
            return Err(DraftError::NoProducts);
        }

        let pricing = self.pricing()?;
        if pricing.base_price <= Decimal::ZERO {
            return Err(DraftError::ZeroBasePrice);
        }

        let discount_percentage = self.discount_percent().map_or(0, DiscountPercent::value);
        Ok(NewUpsell {
            main_image: self.main_image,
            pricing: Pricing {
                base_price: pricing.base_price,
                sale_price: pricing.sale_price.max(Decimal::ZERO),
                discount_percentage,
            },
            products: self.products,
        })
    }
}

fn next_index(position: usize) -> u32 {
    u32::try_from(position).map_or(u32::MAX, |position| position.saturating_add(1))
}

/// A validated upsell that has not been assigned an ID yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUpsell {
    pub main_image: String,
    pub pricing: Pricing,
    pub products: Vec<UpsellProduct>,
}

impl NewUpsell {
    /// Build the stored document. New upsells always start as drafts.
    #[must_use]
    pub fn into_upsell(self, id: UpsellId, now: DateTime<Utc>) -> Upsell {
        Upsell {
            id,
            main_image: self.main_image,
            visibility: Visibility::Draft,
            pricing: self.pricing,
            products: self.products,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cherlygood_core::ProductImages;

    fn product(id: &str, base_price: Decimal) -> UpsellProduct {
        UpsellProduct {
            index: 0,
            id: ProductId::new(id),
            slug: format!("product-{id}"),
            name: format!("Product {id}"),
            base_price,
            images: ProductImages {
                main: format!("{id}.jpg"),
                gallery: Vec::new(),
            },
            options: cherlygood_core::ProductOptions::default(),
        }
    }

    fn draft_with(prices: &[(&str, i64)]) -> UpsellDraft {
        let mut draft = UpsellDraft::new();
        draft.set_main_image("bundle.jpg");
        for (id, cents) in prices {
            draft.add_product(product(id, Decimal::new(*cents, 2))).unwrap();
        }
        draft
    }

    #[test]
    fn test_validate_product_id() {
        assert_eq!(validate_product_id(" 12345 ").unwrap(), ProductId::new("12345"));
        assert_eq!(validate_product_id("   "), Err(DraftError::EmptyProductId));
        assert_eq!(validate_product_id("1234"), Err(DraftError::MalformedProductId));
        assert_eq!(validate_product_id("123456"), Err(DraftError::MalformedProductId));
        assert_eq!(validate_product_id("12a45"), Err(DraftError::MalformedProductId));
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            DraftError::EmptyProductId.to_string(),
            "Product ID cannot be empty"
        );
        assert_eq!(
            DraftError::MalformedProductId.to_string(),
            "Product ID must be a 5-digit number"
        );
        assert_eq!(DraftError::DuplicateProduct.to_string(), "Product already added");
    }

    #[test]
    fn test_add_product_assigns_indices_and_rejects_duplicates() {
        let mut draft = draft_with(&[("11111", 1250), ("22222", 825)]);
        let indices: Vec<u32> = draft.products().iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2]);

        let err = draft.add_product(product("11111", Decimal::ONE)).unwrap_err();
        assert_eq!(err, DraftError::DuplicateProduct);
        assert_eq!(draft.products().len(), 2);
    }

    #[test]
    fn test_remove_product_reindexes() {
        let mut draft = draft_with(&[("11111", 100), ("22222", 100), ("33333", 100)]);
        assert!(draft.remove_product(&ProductId::new("11111")));
        assert!(!draft.remove_product(&ProductId::new("99999")));

        let remaining: Vec<(&str, u32)> = draft
            .products()
            .iter()
            .map(|p| (p.id.as_str(), p.index))
            .collect();
        assert_eq!(remaining, vec![("22222", 1), ("33333", 2)]);
    }

    #[test]
    fn test_removing_last_product_clears_discount() {
        let mut draft = draft_with(&[("11111", 1250)]);
        draft.set_discount("20").unwrap();
        draft.remove_product(&ProductId::new("11111"));
        assert_eq!(draft.discount(), "");
    }

    #[test]
    fn test_set_discount_accepts_digits_only() {
        let mut draft = UpsellDraft::new();
        draft.set_discount("15").unwrap();
        assert!(draft.set_discount("1.5").is_err());
        assert!(draft.set_discount("-5").is_err());
        assert!(draft.set_discount("101").is_err());
        assert_eq!(draft.discount(), "15");

        draft.set_discount("").unwrap();
        assert_eq!(draft.discount_percent(), None);
    }

    #[test]
    fn test_pricing_follows_edits() {
        let mut draft = draft_with(&[("11111", 1250), ("22222", 825)]);
        draft.set_discount("20").unwrap();
        let pricing = draft.pricing().unwrap();
        assert_eq!(pricing.base_price, Decimal::new(2099, 2));
        assert_eq!(pricing.sale_price, Decimal::new(1699, 2));

        draft.remove_product(&ProductId::new("22222"));
        let pricing = draft.pricing().unwrap();
        assert_eq!(pricing.base_price, Decimal::new(1299, 2));
        assert_eq!(pricing.sale_price, Decimal::new(1099, 2));
    }

    #[test]
    fn test_overflowing_prices_fail_instead_of_panicking() {
        let mut draft = UpsellDraft::new();
        draft.set_main_image("bundle.jpg");
        draft.add_product(product("11111", Decimal::MAX)).unwrap();
        draft.add_product(product("22222", Decimal::MAX)).unwrap();

        assert_eq!(draft.pricing(), Err(DraftError::Pricing(PricingError::Overflow)));
        let err = draft.finalize().unwrap_err();
        assert_eq!(err.to_string(), "Bundle price is too large");
    }

    #[test]
    fn test_rename_product_only_touches_constituents() {
        let mut draft = draft_with(&[("11111", 1250)]);
        assert!(draft.rename_product(&ProductId::new("11111"), "Everyday Tee"));
        assert!(!draft.rename_product(&ProductId::new("99999"), "Ghost"));
        assert_eq!(draft.products()[0].name, "Everyday Tee");
    }

    #[test]
    fn test_finalize_checks_in_order() {
        let empty = UpsellDraft::new();
        assert_eq!(empty.finalize(), Err(DraftError::MissingMainImage));

        let mut no_products = UpsellDraft::new();
        no_products.set_main_image("bundle.jpg");
        assert_eq!(no_products.finalize(), Err(DraftError::NoProducts));

        let free = draft_with(&[("11111", 0)]);
        assert_eq!(free.finalize(), Err(DraftError::ZeroBasePrice));
    }

    #[test]
    fn test_finalize_builds_upsell() {
        let mut draft = draft_with(&[("11111", 1250), ("22222", 825)]);
        draft.set_discount("20").unwrap();
        draft.rename_product(&ProductId::new("22222"), "Matching Top");

        let new_upsell = draft.finalize().unwrap();
        assert_eq!(new_upsell.pricing.discount_percentage, 20);
        assert_eq!(new_upsell.pricing.sale_price, Decimal::new(1699, 2));
        assert_eq!(new_upsell.products[1].name, "Matching Top");

        let now = Utc::now();
        let upsell = new_upsell.into_upsell(UpsellId::new("55012"), now);
        assert_eq!(upsell.visibility, Visibility::Draft);
        assert_eq!(upsell.created_at, upsell.updated_at);
    }

    #[test]
    fn test_finalize_without_discount() {
        let new_upsell = draft_with(&[("11111", 1250)]).finalize().unwrap();
        assert_eq!(new_upsell.pricing.discount_percentage, 0);
        assert_eq!(new_upsell.pricing.sale_price, Decimal::ZERO);
    }
}
