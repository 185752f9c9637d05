//! Inventory ledger tests
//!
//! Covers the stock movement arithmetic, the non-negativity invariant, and
//! replay of the movement log.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{replay_movement, weighted_average_cost, StockDirection};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Simulation Helpers
// ============================================================================

/// A recorded movement: (direction, quantity, previous_stock, new_stock)
type RecordedMovement = (StockDirection, Decimal, Decimal, Decimal);

/// Simulate the ledger's guarded movement write: decreases that would go
/// negative are rejected whole, and every accepted movement snapshots the
/// previous and new stock
fn simulate_movement(
    current: Decimal,
    direction: StockDirection,
    quantity: Decimal,
) -> Result<RecordedMovement, &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }

    let new_stock = current + direction.signed(quantity);
    if new_stock < Decimal::ZERO {
        return Err("Insufficient stock");
    }

    Ok((direction, quantity, current, new_stock))
}

/// Replay a movement log from a zero baseline, as recompute_stock does
fn replay_log(movements: &[RecordedMovement]) -> Decimal {
    movements
        .iter()
        .fold(Decimal::ZERO, |stock, (direction, quantity, _, _)| {
            replay_movement(stock, *direction, *quantity)
        })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_stock_in_increases() {
        let (_, _, previous, new) =
            simulate_movement(dec("10"), StockDirection::In, dec("4")).unwrap();
        assert_eq!(previous, dec("10"));
        assert_eq!(new, dec("14"));
    }

    #[test]
    fn test_stock_out_decreases() {
        let (_, _, previous, new) =
            simulate_movement(dec("10"), StockDirection::Out, dec("4")).unwrap();
        assert_eq!(previous, dec("10"));
        assert_eq!(new, dec("6"));
    }

    #[test]
    fn test_out_to_exactly_zero_is_allowed() {
        let (_, _, _, new) = simulate_movement(dec("5"), StockDirection::Out, dec("5")).unwrap();
        assert_eq!(new, Decimal::ZERO);
    }

    #[test]
    fn test_overdraw_is_rejected_whole() {
        let result = simulate_movement(dec("5"), StockDirection::Out, dec("5.0001"));
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert!(simulate_movement(dec("5"), StockDirection::In, Decimal::ZERO).is_err());
        assert!(simulate_movement(dec("5"), StockDirection::In, dec("-1")).is_err());
    }

    /// The snapshot invariant: new_stock = previous_stock +/- quantity
    #[test]
    fn test_snapshot_invariant() {
        let (direction, quantity, previous, new) =
            simulate_movement(dec("12.5"), StockDirection::Out, dec("2.25")).unwrap();
        assert_eq!(new, previous + direction.signed(quantity));
    }

    /// Replaying the log reproduces the final new_stock
    #[test]
    fn test_replay_matches_last_snapshot() {
        let mut stock = Decimal::ZERO;
        let mut log = Vec::new();

        for (direction, qty) in [
            (StockDirection::In, "100"),
            (StockDirection::Out, "30"),
            (StockDirection::In, "12.5"),
            (StockDirection::Out, "45"),
        ] {
            let movement = simulate_movement(stock, direction, dec(qty)).unwrap();
            stock = movement.3;
            log.push(movement);
        }

        assert_eq!(replay_log(&log), stock);
        assert_eq!(replay_log(&log), log.last().unwrap().3);
    }

    /// Recompute applied twice yields the same value
    #[test]
    fn test_replay_is_idempotent() {
        let log = vec![
            simulate_movement(dec("0"), StockDirection::In, dec("50")).unwrap(),
            simulate_movement(dec("50"), StockDirection::Out, dec("20")).unwrap(),
        ];

        let first = replay_log(&log);
        let second = replay_log(&log);
        assert_eq!(first, second);
        assert_eq!(first, dec("30"));
    }

    #[test]
    fn test_weighted_average_cost() {
        // 100 units at avg 20, receive 50 at 30 -> (2000 + 1500) / 150
        let avg = weighted_average_cost(dec("100"), dec("20"), dec("50"), dec("30"));
        assert!(avg > dec("23.3") && avg < dec("23.4"));
    }

    #[test]
    fn test_weighted_average_cost_first_purchase() {
        let avg = weighted_average_cost(Decimal::ZERO, Decimal::ZERO, dec("40"), dec("12.5"));
        assert_eq!(avg, dec("12.5"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for positive quantities
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 1000.00
    }

    /// Strategy for movement directions
    fn direction_strategy() -> impl Strategy<Value = StockDirection> {
        prop_oneof![Just(StockDirection::In), Just(StockDirection::Out)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Stock never goes negative under any accepted movement sequence,
        /// and every accepted movement keeps the snapshot invariant
        #[test]
        fn prop_stock_never_negative(
            movements in prop::collection::vec(
                (direction_strategy(), quantity_strategy()),
                1..30
            )
        ) {
            let mut stock = Decimal::ZERO;

            for (direction, quantity) in movements {
                match simulate_movement(stock, direction, quantity) {
                    Ok((d, q, previous, new)) => {
                        prop_assert_eq!(new, previous + d.signed(q));
                        prop_assert!(new >= Decimal::ZERO);
                        stock = new;
                    }
                    Err(_) => {
                        // Rejected movements leave stock untouched
                        prop_assert!(stock >= Decimal::ZERO);
                    }
                }
            }
        }

        /// Replaying an accepted log always reproduces the running total
        #[test]
        fn prop_replay_reproduces_total(
            movements in prop::collection::vec(
                (direction_strategy(), quantity_strategy()),
                1..30
            )
        ) {
            let mut stock = Decimal::ZERO;
            let mut log = Vec::new();

            for (direction, quantity) in movements {
                if let Ok(movement) = simulate_movement(stock, direction, quantity) {
                    stock = movement.3;
                    log.push(movement);
                }
            }

            prop_assert_eq!(replay_log(&log), stock);
        }

        /// The weighted average cost stays between the old average and the
        /// incoming cost
        #[test]
        fn prop_weighted_average_bounded(
            current_qty in quantity_strategy(),
            current_avg in quantity_strategy(),
            incoming_qty in quantity_strategy(),
            incoming_cost in quantity_strategy()
        ) {
            let avg = weighted_average_cost(current_qty, current_avg, incoming_qty, incoming_cost);

            let low = current_avg.min(incoming_cost);
            let high = current_avg.max(incoming_cost);
            prop_assert!(avg >= low);
            prop_assert!(avg <= high);
        }
    }
}
