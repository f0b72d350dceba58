//! Decimal money helpers.
//!
//! Prices are plain `Decimal` amounts in the store currency (USD). They are
//! serialized as strings so that ".99" endings survive JSON round trips.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Listed pricing of a product or upsell.
///
/// A `sale_price` of zero means "no sale price set", not a free item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub base_price: Decimal,
    #[serde(default)]
    pub sale_price: Decimal,
    #[serde(default)]
    pub discount_percentage: u8,
}

impl Pricing {
    /// The price a shopper actually pays.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        if self.sale_price > Decimal::ZERO {
            self.sale_price
        } else {
            self.base_price
        }
    }
}

/// Round an amount down to the nearest whole unit and add 99 cents.
///
/// Zero stays zero so that "no price" is never displayed as `$0.99`.
/// Returns `None` if the result does not fit in a `Decimal`.
#[must_use]
pub fn round_down_to_99(amount: Decimal) -> Option<Decimal> {
    if amount.is_zero() {
        return Some(Decimal::ZERO);
    }
    amount
        .floor()
        .checked_add(Decimal::new(99, 2))
        .map(|rounded| rounded.round_dp(2))
}

/// Format an amount for display (e.g., `$20.99`).
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_down_to_99() {
        assert_eq!(round_down_to_99(Decimal::new(2075, 2)), Some(Decimal::new(2099, 2)));
        assert_eq!(round_down_to_99(Decimal::new(16792, 3)), Some(Decimal::new(1699, 2)));
        assert_eq!(round_down_to_99(Decimal::new(20, 0)), Some(Decimal::new(2099, 2)));
        assert_eq!(round_down_to_99(Decimal::ZERO), Some(Decimal::ZERO));
    }

    #[test]
    fn test_round_down_below_one() {
        assert_eq!(round_down_to_99(Decimal::new(49, 2)), Some(Decimal::new(99, 2)));
    }


    #[test]
    fn test_effective_price_prefers_sale() {
        let pricing = Pricing {
            base_price: Decimal::new(2099, 2),
            sale_price: Decimal::new(1699, 2),
            discount_percentage: 20,
        };
        assert_eq!(pricing.effective_price(), Decimal::new(1699, 2));

        let no_sale = Pricing {
            sale_price: Decimal::ZERO,
            ..pricing
        };
        assert_eq!(no_sale.effective_price(), Decimal::new(2099, 2));
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(Decimal::new(2099, 2)), "$20.99");
        assert_eq!(format_usd(Decimal::new(5, 0)), "$5.00");
    }
}
