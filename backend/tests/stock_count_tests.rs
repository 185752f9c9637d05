//! Stock count reconciliation tests
//!
//! Covers variance computation, the status machine, and the movements a
//! completion applies to the ledger.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{can_transition, count_variance, StockCountStatus, StockDirection};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Simulation Helpers
// ============================================================================

/// The movement a completed count applies for one item, if any:
/// (direction, quantity)
fn variance_movement(variance: Decimal) -> Option<(StockDirection, Decimal)> {
    if variance == Decimal::ZERO {
        None
    } else if variance > Decimal::ZERO {
        Some((StockDirection::In, variance))
    } else {
        Some((StockDirection::Out, variance.abs()))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// system 10, counted 7 -> variance -3 -> one out movement of 3
    #[test]
    fn test_shortage_variance() {
        let variance = count_variance(dec("7"), dec("10"));
        assert_eq!(variance, dec("-3"));

        let movement = variance_movement(variance).unwrap();
        assert_eq!(movement, (StockDirection::Out, dec("3")));
    }

    /// Counted above system credits the difference back
    #[test]
    fn test_surplus_variance() {
        let variance = count_variance(dec("12.5"), dec("10"));
        assert_eq!(variance, dec("2.5"));

        let movement = variance_movement(variance).unwrap();
        assert_eq!(movement, (StockDirection::In, dec("2.5")));
    }

    /// An exact count produces no movement at all
    #[test]
    fn test_zero_variance_no_movement() {
        let variance = count_variance(dec("10"), dec("10"));
        assert_eq!(variance, Decimal::ZERO);
        assert!(variance_movement(variance).is_none());
    }

    /// The normal lifecycle: draft -> submitted -> approved -> completed
    #[test]
    fn test_full_lifecycle_transitions() {
        use StockCountStatus::*;

        assert!(can_transition(Draft, Submitted));
        assert!(can_transition(Submitted, Approved));
        assert!(can_transition(Approved, Completed));
    }

    /// Approval may be skipped by deployment policy
    #[test]
    fn test_approval_step_optional() {
        assert!(can_transition(
            StockCountStatus::Submitted,
            StockCountStatus::Completed
        ));
    }

    /// No edges lead out of completed, and none skip or reverse
    #[test]
    fn test_invalid_transitions() {
        use StockCountStatus::*;

        let invalid = [
            (Draft, Approved),     // Skip submission
            (Draft, Completed),    // Skip straight to completed
            (Completed, Draft),    // Reopen
            (Completed, Submitted),
            (Approved, Draft),     // Backward
            (Submitted, Draft),
            (Approved, Submitted),
        ];

        for (from, to) in invalid {
            assert!(!can_transition(from, to), "{:?} -> {:?}", from, to);
        }
    }

    /// Completing twice is the state machine's defining error
    #[test]
    fn test_cannot_complete_twice() {
        assert!(!can_transition(
            StockCountStatus::Completed,
            StockCountStatus::Completed
        ));
    }

    /// Only drafts may be deleted or edited; completed is immutable
    #[test]
    fn test_completed_is_terminal() {
        use StockCountStatus::*;

        for to in [Draft, Submitted, Approved, Completed] {
            assert!(!can_transition(Completed, to));
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for non-negative quantities
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=100000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// variance = counted - system, always
        #[test]
        fn prop_variance_definition(
            counted in quantity_strategy(),
            system in quantity_strategy()
        ) {
            prop_assert_eq!(count_variance(counted, system), counted - system);
        }

        /// Applying the variance movement to the system quantity always
        /// lands on the counted quantity
        #[test]
        fn prop_variance_movement_reconciles(
            counted in quantity_strategy(),
            system in quantity_strategy()
        ) {
            let variance = count_variance(counted, system);
            let reconciled = match variance_movement(variance) {
                None => system,
                Some((direction, quantity)) => system + direction.signed(quantity),
            };

            prop_assert_eq!(reconciled, counted);
        }

        /// Movement quantities are always positive magnitudes
        #[test]
        fn prop_movement_quantity_positive(
            counted in quantity_strategy(),
            system in quantity_strategy()
        ) {
            if let Some((_, quantity)) = variance_movement(count_variance(counted, system)) {
                prop_assert!(quantity > Decimal::ZERO);
            }
        }

        /// Exactly one status can follow each non-terminal status... except
        /// submitted, which may complete directly when approval is skipped
        #[test]
        fn prop_completed_is_absorbing(to in prop_oneof![
            Just(StockCountStatus::Draft),
            Just(StockCountStatus::Submitted),
            Just(StockCountStatus::Approved),
            Just(StockCountStatus::Completed),
        ]) {
            prop_assert!(!can_transition(StockCountStatus::Completed, to));
        }
    }
}
