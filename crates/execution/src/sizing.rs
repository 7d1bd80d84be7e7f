//! Quantity-type conversion to whole lots.

use ashare_types::{OrderQuantity, OrderSide, LOT_SIZE};

/// Rounds a share count down to a whole number of lots. Negative or
/// non-finite input converts to zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn floor_to_lot(shares: f64) -> u64 {
    if !shares.is_finite() || shares < 0.0 {
        return 0;
    }
    let lots = (shares / LOT_SIZE as f64).floor() as u64;
    lots * LOT_SIZE
}

/// Converts an order's quantity expression into a target share count.
///
/// Pure in `(quantity, side, reference_price, equity, market_value)`:
/// - `Shares(n)`: `n` floored to the lot.
/// - `Cash(c)`: `c / price` floored to the lot, for both sides.
/// - `Weight(w)`: distance from the current market value to `w * equity`,
///   in the direction the order declares; a delta pointing the other way
///   converts to zero and the order is dropped.
#[must_use]
pub fn target_shares(
    quantity: OrderQuantity,
    side: OrderSide,
    reference_price: f64,
    equity: f64,
    market_value: f64,
) -> u64 {
    if reference_price <= 0.0 {
        return 0;
    }
    match quantity {
        OrderQuantity::Shares(n) => floor_to_lot(n),
        OrderQuantity::Cash(c) => floor_to_lot(c / reference_price),
        OrderQuantity::Weight(w) => {
            let delta = match side {
                OrderSide::Buy => w * equity - market_value,
                OrderSide::Sell => market_value - w * equity,
            };
            floor_to_lot(delta / reference_price)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_to_lot() {
        assert_eq!(floor_to_lot(0.0), 0);
        assert_eq!(floor_to_lot(99.0), 0);
        assert_eq!(floor_to_lot(100.0), 100);
        assert_eq!(floor_to_lot(250.0), 200);
        assert_eq!(floor_to_lot(-100.0), 0);
        assert_eq!(floor_to_lot(f64::NAN), 0);
    }

    #[test]
    fn test_shares_conversion() {
        let shares = target_shares(OrderQuantity::Shares(250.0), OrderSide::Buy, 10.0, 0.0, 0.0);
        assert_eq!(shares, 200);
    }

    #[test]
    fn test_cash_conversion() {
        let shares = target_shares(OrderQuantity::Cash(10_000.0), OrderSide::Buy, 10.0, 0.0, 0.0);
        assert_eq!(shares, 1_000);
        // 1050 / 10 = 105 -> one lot
        let shares = target_shares(OrderQuantity::Cash(1_050.0), OrderSide::Sell, 10.0, 0.0, 0.0);
        assert_eq!(shares, 100);
    }

    #[test]
    fn test_weight_rebalance_buy() {
        // Equity 100_000, no position, price 50, target 30% -> 600 shares.
        let shares = target_shares(
            OrderQuantity::Weight(0.3),
            OrderSide::Buy,
            50.0,
            100_000.0,
            0.0,
        );
        assert_eq!(shares, 600);
    }

    #[test]
    fn test_weight_zero_sell_liquidates_exactly() {
        // 600 shares at 50: market value 30_000; weight 0 -> all 600.
        let shares = target_shares(
            OrderQuantity::Weight(0.0),
            OrderSide::Sell,
            50.0,
            100_000.0,
            30_000.0,
        );
        assert_eq!(shares, 600);
    }

    #[test]
    fn test_weight_wrong_direction_converts_to_zero() {
        // Already above target: a declared buy toward 10% converts to zero.
        let shares = target_shares(
            OrderQuantity::Weight(0.1),
            OrderSide::Buy,
            50.0,
            100_000.0,
            30_000.0,
        );
        assert_eq!(shares, 0);
    }

    #[test]
    fn test_non_positive_price_converts_to_zero() {
        let shares = target_shares(OrderQuantity::Shares(100.0), OrderSide::Buy, 0.0, 0.0, 0.0);
        assert_eq!(shares, 0);
    }
}
