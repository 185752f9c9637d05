//! Payroll estimation tests
//!
//! Covers hourly and monthly base pay, overtime pay, and pro-rating.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::ot_pay;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Simulation Helpers
// ============================================================================

/// Hourly base pay: worked hours times rate, rounded to satang
fn hourly_base_pay(total_hours: Decimal, hourly_rate: Decimal) -> Decimal {
    (total_hours * hourly_rate).round_dp(2)
}

/// Monthly base pay pro-rated by days worked over the standard month,
/// capped at the full rate
fn monthly_base_pay(monthly_rate: Decimal, days_worked: i64, standard_days: Decimal) -> Decimal {
    if standard_days <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let ratio = (Decimal::from(days_worked) / standard_days).min(Decimal::ONE);
    (monthly_rate * ratio).round_dp(2)
}

/// Hourly-equivalent rate for monthly staff
fn hourly_equivalent(monthly_rate: Decimal, standard_days: Decimal, standard_hours: Decimal) -> Decimal {
    if standard_days <= Decimal::ZERO || standard_hours <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    monthly_rate / (standard_days * standard_hours)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_hourly_base_pay() {
        // 160 hours at 62.50 THB/h
        assert_eq!(hourly_base_pay(dec("160"), dec("62.50")), dec("10000.00"));
    }

    #[test]
    fn test_hourly_ot_pay() {
        // 10 OT hours at 62.50 and 1.5x
        assert_eq!(ot_pay(dec("10"), dec("62.50"), dec("1.5")), dec("937.50"));
    }

    #[test]
    fn test_monthly_full_month() {
        // 26 of 26 standard days earns the full rate
        assert_eq!(
            monthly_base_pay(dec("15000"), 26, dec("26")),
            dec("15000.00")
        );
    }

    #[test]
    fn test_monthly_pro_rated() {
        // 13 of 26 days earns half
        assert_eq!(
            monthly_base_pay(dec("15000"), 13, dec("26")),
            dec("7500.00")
        );
    }

    #[test]
    fn test_monthly_capped_at_full_rate() {
        // Working more days than the standard month never pays extra base
        assert_eq!(
            monthly_base_pay(dec("15000"), 30, dec("26")),
            dec("15000.00")
        );
    }

    #[test]
    fn test_monthly_hourly_equivalent() {
        // 15000 / (26 * 8) = 72.115...
        let rate = hourly_equivalent(dec("15000"), dec("26"), dec("8"));
        assert!(rate > dec("72.11") && rate < dec("72.12"));
    }

    #[test]
    fn test_monthly_ot_uses_hourly_equivalent() {
        let rate = hourly_equivalent(dec("15000"), dec("26"), dec("8"));
        let pay = ot_pay(dec("4"), rate, dec("1.5"));

        // 4 * 72.115... * 1.5 = 432.69
        assert_eq!(pay, dec("432.69"));
    }

    #[test]
    fn test_no_attendance_no_pay() {
        assert_eq!(hourly_base_pay(Decimal::ZERO, dec("62.50")), dec("0.00"));
        assert_eq!(monthly_base_pay(dec("15000"), 0, dec("26")), dec("0.00"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn money_strategy() -> impl Strategy<Value = Decimal> {
        (100i64..=5000000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Base pay is never negative and scales monotonically with hours
        #[test]
        fn prop_hourly_pay_monotonic(
            hours in (0i64..=400).prop_map(Decimal::from),
            extra in (1i64..=40).prop_map(Decimal::from),
            rate in money_strategy()
        ) {
            let less = hourly_base_pay(hours, rate);
            let more = hourly_base_pay(hours + extra, rate);

            prop_assert!(less >= Decimal::ZERO);
            prop_assert!(more >= less);
        }

        /// Monthly base pay never exceeds the monthly rate
        #[test]
        fn prop_monthly_pay_capped(
            monthly in money_strategy(),
            days in 0i64..=60
        ) {
            let pay = monthly_base_pay(monthly, days, dec("26"));
            prop_assert!(pay >= Decimal::ZERO);
            prop_assert!(pay <= monthly);
        }

        /// OT pay at multiplier 1.5 is exactly 1.5x the straight-time pay
        #[test]
        fn prop_ot_multiplier_applied(
            ot_hours in (0i64..=100).prop_map(Decimal::from),
            rate in money_strategy()
        ) {
            let straight = (ot_hours * rate).round_dp(2);
            let ot = ot_pay(ot_hours, rate, dec("1.5"));

            prop_assert_eq!(ot, (straight * dec("1.5")).round_dp(2));
        }
    }
}
