//! Monetary types.
//!
//! Prices are always normalized to `[0, 1]` at the boundary — source-side
//! cent encodings (Kalshi) live only inside that venue's client/DTO layer.
//! Sizes are always USD notional, never raw contract counts; the Kalshi
//! client converts `count * price/100` once, at the boundary.

use rust_decimal::Decimal;

/// A probability-style price in `[0, 1]`.
pub type Price = Decimal;

/// A USD-denominated size.
pub type Size = Decimal;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_and_size_are_decimal() {
        let price: Price = dec!(0.48);
        let size: Size = dec!(150);
        assert_eq!(price * size, dec!(72.00));
    }
}
