//! Order fulfillment and refund tests
//!
//! Covers recipe explosion, the all-or-nothing pre-flight check, refund
//! round-trips, and the conditional-decrement concurrency guarantee.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

type IngredientId = u32;
type ProductId = u32;

/// A recipe line: (product, ingredient, qty_per_unit)
type RecipeLine = (ProductId, IngredientId, Decimal);

/// An order line: (product, quantity)
type OrderLine = (ProductId, i32);

// ============================================================================
// Simulation Helpers
// ============================================================================

/// Sum per-ingredient requirements across all order lines, as the order
/// service does before checking stock
fn aggregate_requirements(
    items: &[OrderLine],
    recipes: &[RecipeLine],
) -> HashMap<IngredientId, Decimal> {
    let mut requirements = HashMap::new();
    for (product_id, quantity) in items {
        for (recipe_product, ingredient, qty_per_unit) in recipes {
            if recipe_product == product_id {
                *requirements.entry(*ingredient).or_insert(Decimal::ZERO) +=
                    *qty_per_unit * Decimal::from(*quantity);
            }
        }
    }
    requirements
}

/// Simulate order fulfillment against a stock table: the whole basket
/// deducts or nothing does
fn fulfill_order(
    stock: &mut HashMap<IngredientId, Decimal>,
    items: &[OrderLine],
    recipes: &[RecipeLine],
) -> Result<(), IngredientId> {
    let requirements = aggregate_requirements(items, recipes);

    // Pre-flight: every ingredient across every item
    for (ingredient, required) in &requirements {
        let available = stock.get(ingredient).copied().unwrap_or(Decimal::ZERO);
        if available < *required {
            return Err(*ingredient);
        }
    }

    // Deduct only after the whole basket has passed
    for (ingredient, required) in &requirements {
        if let Some(available) = stock.get_mut(ingredient) {
            *available -= *required;
        }
    }
    Ok(())
}

/// Re-credit a fulfilled order's ingredients, as a full refund does
fn refund_order(
    stock: &mut HashMap<IngredientId, Decimal>,
    items: &[OrderLine],
    recipes: &[RecipeLine],
) {
    for (ingredient, quantity) in aggregate_requirements(items, recipes) {
        *stock.entry(ingredient).or_insert(Decimal::ZERO) += quantity;
    }
}

/// The storage-layer conditional decrement: succeeds only when stock covers
/// the requested amount at the moment of the write
fn conditional_decrement(stock: &mut Decimal, requested: Decimal) -> bool {
    if *stock >= requested {
        *stock -= requested;
        true
    } else {
        false
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Latte: 0.2 kg beans + 0.25 l milk per cup
    fn latte_recipes() -> Vec<RecipeLine> {
        vec![(1, 10, dec("0.2")), (1, 11, dec("0.25"))]
    }

    #[test]
    fn test_requirements_scale_with_quantity() {
        let requirements = aggregate_requirements(&[(1, 3)], &latte_recipes());
        assert_eq!(requirements[&10], dec("0.6"));
        assert_eq!(requirements[&11], dec("0.75"));
    }

    #[test]
    fn test_requirements_sum_across_items() {
        // Two order lines for the same product accumulate
        let requirements = aggregate_requirements(&[(1, 2), (1, 1)], &latte_recipes());
        assert_eq!(requirements[&10], dec("0.6"));
    }

    #[test]
    fn test_product_without_recipe_needs_nothing() {
        let requirements = aggregate_requirements(&[(99, 5)], &latte_recipes());
        assert!(requirements.is_empty());
    }

    #[test]
    fn test_fulfillment_deducts_stock() {
        let mut stock = HashMap::from([(10, dec("1.0")), (11, dec("1.0"))]);
        fulfill_order(&mut stock, &[(1, 2)], &latte_recipes()).unwrap();

        assert_eq!(stock[&10], dec("0.6"));
        assert_eq!(stock[&11], dec("0.5"));
    }

    /// A shortage in ONE ingredient leaves EVERY ingredient untouched
    #[test]
    fn test_shortage_leaves_all_stock_untouched() {
        let mut stock = HashMap::from([(10, dec("1.0")), (11, dec("0.4"))]);
        let before = stock.clone();

        // 2 lattes need 0.5 l milk but only 0.4 is on hand
        let result = fulfill_order(&mut stock, &[(1, 2)], &latte_recipes());

        assert_eq!(result, Err(11));
        assert_eq!(stock, before);
    }

    /// Order then full refund restores the pre-order stock exactly
    #[test]
    fn test_refund_round_trip_restores_stock() {
        let mut stock = HashMap::from([(10, dec("2.0")), (11, dec("3.0"))]);
        let before = stock.clone();
        let items = [(1, 4)];

        fulfill_order(&mut stock, &items, &latte_recipes()).unwrap();
        assert_ne!(stock, before);

        refund_order(&mut stock, &items, &latte_recipes());
        assert_eq!(stock, before);
    }

    /// Customer counters roll back on full refund, floored at zero
    #[test]
    fn test_customer_counters_floor_at_zero() {
        let order_count: i32 = 0;
        let total_spent = dec("50");

        // A refund larger than the tracked spend still floors at zero
        let after_count = (order_count - 1).max(0);
        let after_spent = (total_spent - dec("80")).max(Decimal::ZERO);

        assert_eq!(after_count, 0);
        assert_eq!(after_spent, Decimal::ZERO);
    }

    /// Refund amount rules: positive, at most the order total, once only
    #[test]
    fn test_refund_amount_rules() {
        let total = dec("250");

        assert!(shared::validate_refund_amount(dec("250"), total).is_ok());
        assert!(shared::validate_refund_amount(dec("100"), total).is_ok());
        assert!(shared::validate_refund_amount(dec("250.01"), total).is_err());
        assert!(shared::validate_refund_amount(Decimal::ZERO, total).is_err());
    }

    /// Two racing 6-unit orders against 10 in stock: the conditional
    /// decrement admits at most one
    #[test]
    fn test_concurrent_orders_cannot_both_succeed() {
        let mut stock = dec("10");

        let first = conditional_decrement(&mut stock, dec("6"));
        let second = conditional_decrement(&mut stock, dec("6"));

        assert!(first);
        assert!(!second);
        assert_eq!(stock, dec("4"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for recipe quantities per unit
    fn qty_per_unit_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=500i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 5.00
    }

    /// Strategy for small order baskets over products 1-3 and ingredients
    /// 10-12
    fn basket_strategy() -> impl Strategy<Value = Vec<OrderLine>> {
        prop::collection::vec(((1u32..=3), (1i32..=5)), 1..5)
    }

    fn recipes_strategy() -> impl Strategy<Value = Vec<RecipeLine>> {
        prop::collection::vec(((1u32..=3), (10u32..=12), qty_per_unit_strategy()), 1..6)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Fulfillment is all-or-nothing: on failure stock is untouched, on
        /// success every ingredient drops by exactly its requirement
        #[test]
        fn prop_fulfillment_all_or_nothing(
            items in basket_strategy(),
            recipes in recipes_strategy(),
            initial in (0i64..=2000i64).prop_map(|n| Decimal::new(n, 2))
        ) {
            let mut stock: HashMap<IngredientId, Decimal> =
                (10..=12).map(|i| (i, initial)).collect();
            let before = stock.clone();
            let requirements = aggregate_requirements(&items, &recipes);

            match fulfill_order(&mut stock, &items, &recipes) {
                Ok(()) => {
                    for (ingredient, required) in &requirements {
                        prop_assert_eq!(stock[ingredient], before[ingredient] - required);
                        prop_assert!(stock[ingredient] >= Decimal::ZERO);
                    }
                }
                Err(_) => {
                    prop_assert_eq!(stock, before);
                }
            }
        }

        /// Fulfillment followed by a full refund is a stock no-op
        #[test]
        fn prop_refund_round_trip(
            items in basket_strategy(),
            recipes in recipes_strategy()
        ) {
            // Plenty of stock so fulfillment always succeeds
            let mut stock: HashMap<IngredientId, Decimal> =
                (10..=12).map(|i| (i, dec("10000"))).collect();
            let before = stock.clone();

            fulfill_order(&mut stock, &items, &recipes).unwrap();
            refund_order(&mut stock, &items, &recipes);

            prop_assert_eq!(stock, before);
        }

        /// Any interleaving of conditional decrements never overdraws
        #[test]
        fn prop_conditional_decrement_never_overdraws(
            initial in (0i64..=10000i64).prop_map(|n| Decimal::new(n, 2)),
            demands in prop::collection::vec(
                (1i64..=5000i64).prop_map(|n| Decimal::new(n, 2)),
                1..10
            )
        ) {
            let mut stock = initial;
            let mut granted = Decimal::ZERO;

            for demand in demands {
                if conditional_decrement(&mut stock, demand) {
                    granted += demand;
                }
            }

            prop_assert!(stock >= Decimal::ZERO);
            prop_assert_eq!(granted + stock, initial);
        }
    }
}
