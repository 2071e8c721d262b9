//! Stock ledger arithmetic
//!
//! Inventory adjustments at product or variant granularity. The
//! non-negative invariant is enforced here and again by the conditional
//! UPDATE in the db layer, so concurrent "out" adjustments cannot drive a
//! counter below zero.

use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};

/// Direction of a stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockDirection {
    In,
    Out,
}

/// Compute the stock level after an adjustment.
///
/// Fails with `InsufficientStock` when an "out" adjustment would make the
/// level negative; the caller must not apply any write in that case.
pub fn next_stock(current: i32, direction: StockDirection, qty: i32) -> AppResult<i32> {
    let next = match direction {
        StockDirection::In => current.saturating_add(qty),
        StockDirection::Out => current - qty,
    };
    if next < 0 {
        return Err(AppError::insufficient_stock(current, qty));
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_stock_in() {
        assert_eq!(next_stock(0, StockDirection::In, 5).unwrap(), 5);
        assert_eq!(next_stock(10, StockDirection::In, 3).unwrap(), 13);
    }

    #[test]
    fn test_stock_out() {
        assert_eq!(next_stock(10, StockDirection::Out, 3).unwrap(), 7);
        assert_eq!(next_stock(10, StockDirection::Out, 10).unwrap(), 0);
    }

    #[test]
    fn test_out_below_zero_rejected() {
        // 10 on hand, taking 15 out is rejected and the level is unchanged
        let err = next_stock(10, StockDirection::Out, 15).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let details = err.details.unwrap();
        assert_eq!(details.get("current").unwrap(), 10);
        assert_eq!(details.get("requested").unwrap(), 15);
    }

    #[test]
    fn test_adjustment_sequence() {
        // S + sum(in) - sum(out), never negative at any step
        let mut stock = 10;
        let ops = [
            (StockDirection::In, 5),
            (StockDirection::Out, 8),
            (StockDirection::Out, 7),
            (StockDirection::In, 2),
        ];
        for (dir, qty) in ops {
            stock = next_stock(stock, dir, qty).unwrap();
            assert!(stock >= 0);
        }
        assert_eq!(stock, 2);
    }

    #[test]
    fn test_direction_serde() {
        assert_eq!(serde_json::to_string(&StockDirection::In).unwrap(), "\"in\"");
        let dir: StockDirection = serde_json::from_str("\"out\"").unwrap();
        assert_eq!(dir, StockDirection::Out);
    }
}
