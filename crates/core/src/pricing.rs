//! Upsell bundle pricing.
//!
//! A bundle's base price is the sum of its constituents' base prices rounded
//! down to the nearest `.99`; its sale price applies the operator's discount
//! to that base price and rounds down to `.99` again.
//!
//! ```rust
//! use cherlygood_core::pricing::{DiscountPercent, compute_pricing};
//! use rust_decimal::Decimal;
//!
//! let prices = [Decimal::new(1250, 2), Decimal::new(825, 2)];
//! let discount = DiscountPercent::parse("20").unwrap();
//! let pricing = compute_pricing(&prices, discount).unwrap();
//!
//! assert_eq!(pricing.base_price, Decimal::new(2099, 2));
//! assert_eq!(pricing.sale_price, Decimal::new(1699, 2));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::price::round_down_to_99;

/// Largest accepted discount.
pub const MAX_DISCOUNT_PERCENT: u8 = 100;

/// Errors from parsing operator discount input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountError {
    #[error("discount must contain digits only")]
    NotDigits,
    #[error("discount must be between 0 and {MAX_DISCOUNT_PERCENT}")]
    OutOfRange,
}

/// Errors from computing bundle prices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// The constituent prices add up to more than a `Decimal` can hold.
    #[error("Bundle price is too large")]
    Overflow,
}

/// A validated discount percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    /// Parse raw operator input.
    ///
    /// An empty string means "no discount" and yields `None`. Anything other
    /// than ASCII digits is rejected, as is a value above 100.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::NotDigits`] for non-digit input and
    /// [`DiscountError::OutOfRange`] for values above 100.
    pub fn parse(input: &str) -> Result<Option<Self>, DiscountError> {
        if input.is_empty() {
            return Ok(None);
        }
        if !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DiscountError::NotDigits);
        }
        // Digits only, so the only possible parse failure is overflow
        let value: u32 = input.parse().map_err(|_| DiscountError::OutOfRange)?;
        let value = u8::try_from(value).map_err(|_| DiscountError::OutOfRange)?;
        Self::try_from(value).map(Some)
    }

    /// The percentage as an integer.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DiscountPercent {
    type Error = DiscountError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > MAX_DISCOUNT_PERCENT {
            return Err(DiscountError::OutOfRange);
        }
        Ok(Self(value))
    }
}

impl From<DiscountPercent> for u8 {
    fn from(value: DiscountPercent) -> Self {
        value.0
    }
}

/// Derived bundle prices.
///
/// A `sale_price` of zero means no sale price is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlePricing {
    pub base_price: Decimal,
    pub sale_price: Decimal,
}

/// Compute a bundle's base and sale price from its constituents.
///
/// Pure function of its inputs; callers recompute from scratch whenever the
/// constituent set or the discount changes.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the prices exceed the `Decimal`
/// range. Constituent prices come from hand-edited catalog documents.
pub fn compute_pricing(
    constituent_base_prices: &[Decimal],
    discount: Option<DiscountPercent>,
) -> Result<BundlePricing, PricingError> {
    let total = constituent_base_prices
        .iter()
        .try_fold(Decimal::ZERO, |total, price| total.checked_add(*price))
        .ok_or(PricingError::Overflow)?;
    let base_price = round_down_to_99(total).ok_or(PricingError::Overflow)?;

    let sale_price = match discount {
        None => Decimal::ZERO,
        Some(discount) if discount.value() == 0 => Decimal::ZERO,
        Some(discount) => {
            let remaining = Decimal::ONE - Decimal::from(discount.value()) / Decimal::ONE_HUNDRED;
            base_price
                .checked_mul(remaining)
                .and_then(round_down_to_99)
                .ok_or(PricingError::Overflow)?
        }
    };

    Ok(BundlePricing {
        base_price,
        sale_price,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    #[test]
    fn test_pricing_example() {
        let pricing = compute_pricing(
            &[dec(1250, 2), dec(825, 2)],
            DiscountPercent::parse("20").unwrap(),
        )
        .unwrap();
        assert_eq!(pricing.base_price, dec(2099, 2));
        assert_eq!(pricing.sale_price, dec(1699, 2));
    }

    #[test]
    fn test_no_constituents_is_free_of_prices() {
        for discount in ["", "0", "20", "100"] {
            let pricing = compute_pricing(&[], DiscountPercent::parse(discount).unwrap()).unwrap();
            assert_eq!(pricing.base_price, Decimal::ZERO);
            assert_eq!(pricing.sale_price, Decimal::ZERO);
        }
    }

    #[test]
    fn test_empty_discount_keeps_base_price() {
        let pricing = compute_pricing(&[dec(1250, 2), dec(825, 2)], None).unwrap();
        assert_eq!(pricing.base_price, dec(2099, 2));
        assert_eq!(pricing.sale_price, Decimal::ZERO);
    }

    #[test]
    fn test_zero_discount_means_no_sale_price() {
        let pricing = compute_pricing(&[dec(3000, 2)], DiscountPercent::parse("0").unwrap()).unwrap();
        assert_eq!(pricing.base_price, dec(3099, 2));
        assert_eq!(pricing.sale_price, Decimal::ZERO);
    }

    #[test]
    fn test_full_discount_yields_zero_sale_price() {
        let pricing = compute_pricing(&[dec(3000, 2)], DiscountPercent::parse("100").unwrap()).unwrap();
        assert_eq!(pricing.sale_price, Decimal::ZERO);
    }

    #[test]
    fn test_whole_dollar_sum_still_ends_in_99() {
        let pricing = compute_pricing(&[dec(10, 0), dec(5, 0)], None).unwrap();
        assert_eq!(pricing.base_price, dec(1599, 2));
    }

    #[test]
    fn test_overflowing_prices_are_rejected() {
        assert_eq!(
            compute_pricing(&[Decimal::MAX, Decimal::MAX], None),
            Err(PricingError::Overflow)
        );
        assert_eq!(
            compute_pricing(&[Decimal::MAX, Decimal::ONE], DiscountPercent::parse("10").unwrap()),
            Err(PricingError::Overflow)
        );
    }

    #[test]
    fn test_parse_discount_input() {
        assert_eq!(DiscountPercent::parse(""), Ok(None));
        assert_eq!(DiscountPercent::parse("020").unwrap().map(DiscountPercent::value), Some(20));
        assert_eq!(DiscountPercent::parse("-5"), Err(DiscountError::NotDigits));
        assert_eq!(DiscountPercent::parse("1.5"), Err(DiscountError::NotDigits));
        assert_eq!(DiscountPercent::parse("101"), Err(DiscountError::OutOfRange));
        assert_eq!(
            DiscountPercent::parse("99999999999"),
            Err(DiscountError::OutOfRange)
        );
    }

    #[test]
    fn test_discount_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<DiscountPercent>("150").is_err());
        assert_eq!(
            serde_json::from_str::<DiscountPercent>("15").unwrap().value(),
            15
        );
    }
}
