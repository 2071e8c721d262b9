//! Pricing calculator
//!
//! Derives the final sale price from a base price and a percentage
//! discount. Uses rust_decimal for precise calculations, stores as f64.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Compute the final sale price: `price * (1 - discount_percent / 100)`,
/// rounded half-up to 2 decimal places.
///
/// A missing discount defaults to 0. Range validation of the discount
/// ([0, 100]) is the caller's responsibility; out-of-range values are not
/// clamped here.
pub fn final_price(price: f64, discount_percent: Option<f64>) -> f64 {
    let discount = to_decimal(discount_percent.unwrap_or(0.0));
    let multiplier = Decimal::ONE - discount / Decimal::ONE_HUNDRED;
    to_f64(to_decimal(price) * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_discount_is_identity() {
        assert_eq!(final_price(100.0, None), 100.0);
        assert_eq!(final_price(100.0, Some(0.0)), 100.0);
        assert_eq!(final_price(0.0, Some(50.0)), 0.0);
    }

    #[test]
    fn test_percentage_discount() {
        // 1000 at 15% off -> 850.00
        assert_eq!(final_price(1000.0, Some(15.0)), 850.0);
        assert_eq!(final_price(100.0, Some(33.0)), 67.0);
    }

    #[test]
    fn test_full_discount() {
        assert_eq!(final_price(49.99, Some(100.0)), 0.0);
    }

    #[test]
    fn test_rounding_to_two_places() {
        // 99.99 * 0.85 = 84.9915 -> 84.99
        assert_eq!(final_price(99.99, Some(15.0)), 84.99);
        // 9.99 * 0.95 = 9.4905 -> 9.49
        assert_eq!(final_price(9.99, Some(5.0)), 9.49);
    }

    #[test]
    fn test_rounding_half_up() {
        // 10.01 * 0.5 = 5.005 -> rounds up to 5.01
        assert_eq!(final_price(10.01, Some(50.0)), 5.01);
        // 0.03 * 0.5 = 0.015 -> 0.02
        assert_eq!(final_price(0.03, Some(50.0)), 0.02);
    }

    #[test]
    fn test_small_amounts() {
        assert_eq!(final_price(0.01, Some(10.0)), 0.01);
        assert_eq!(final_price(0.01, Some(60.0)), 0.0);
    }
}
