//! Attendance and overtime calculation tests
//!
//! Covers the working-hours breakdown, overtime pay, and the
//! clock-in/clock-out state rules.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{compute_work_hours, ot_pay};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// Helper to create a timestamp on a fixed day
fn ts(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, minute, 0).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// 09:00-18:00 with a 1h break and 8h normal day is a plain full shift
    #[test]
    fn test_regular_shift_no_overtime() {
        let breakdown = compute_work_hours(ts(10, 9, 0), ts(10, 18, 0), dec("1"), dec("8"));

        assert_eq!(breakdown.total_hours, dec("9.00"));
        assert_eq!(breakdown.working_hours, dec("8.00"));
        assert_eq!(breakdown.ot_hours, dec("0.00"));
        assert!(!breakdown.is_overtime);
    }

    /// 09:00-19:00 runs one hour over
    #[test]
    fn test_one_hour_overtime() {
        let breakdown = compute_work_hours(ts(10, 9, 0), ts(10, 19, 0), dec("1"), dec("8"));

        assert_eq!(breakdown.working_hours, dec("9.00"));
        assert_eq!(breakdown.ot_hours, dec("1.00"));
        assert!(breakdown.is_overtime);
    }

    /// 14:00-23:00 evening shift is still a plain 8h day
    #[test]
    fn test_evening_shift_no_overtime() {
        let breakdown = compute_work_hours(ts(10, 14, 0), ts(10, 23, 0), dec("1"), dec("8"));

        assert_eq!(breakdown.working_hours, dec("8.00"));
        assert_eq!(breakdown.ot_hours, dec("0.00"));
        assert!(!breakdown.is_overtime);
    }

    /// 14:00 to midnight crosses the date line and earns one OT hour
    #[test]
    fn test_shift_across_midnight() {
        let breakdown = compute_work_hours(ts(10, 14, 0), ts(11, 0, 0), dec("1"), dec("8"));

        assert_eq!(breakdown.total_hours, dec("10.00"));
        assert_eq!(breakdown.working_hours, dec("9.00"));
        assert_eq!(breakdown.ot_hours, dec("1.00"));
        assert!(breakdown.is_overtime);
    }

    /// Shift shorter than the break floors working hours at zero
    #[test]
    fn test_shift_shorter_than_break() {
        let breakdown = compute_work_hours(ts(10, 9, 0), ts(10, 9, 30), dec("1"), dec("8"));

        assert_eq!(breakdown.total_hours, dec("0.50"));
        assert_eq!(breakdown.working_hours, dec("0.00"));
        assert_eq!(breakdown.ot_hours, dec("0.00"));
    }

    /// Partial hours round to two decimals
    #[test]
    fn test_partial_hours_rounding() {
        // 9:00 to 17:20 is 8h20m = 8.33h
        let breakdown = compute_work_hours(ts(10, 9, 0), ts(10, 17, 20), dec("1"), dec("8"));

        assert_eq!(breakdown.total_hours, dec("8.33"));
        assert_eq!(breakdown.working_hours, dec("7.33"));
    }

    /// OT pay at the common 1.5x multiplier
    #[test]
    fn test_ot_pay() {
        // 2 OT hours at 80 THB/h and 1.5x = 240.00
        assert_eq!(ot_pay(dec("2"), dec("80"), dec("1.5")), dec("240.00"));
    }

    /// OT pay rounds to two decimals
    #[test]
    fn test_ot_pay_rounding() {
        // 1.33h * 62.5 * 1.5 = 124.6875 -> 124.69
        assert_eq!(ot_pay(dec("1.33"), dec("62.5"), dec("1.5")), dec("124.69"));
    }

    /// Zero OT hours pay nothing
    #[test]
    fn test_ot_pay_zero_hours() {
        assert_eq!(ot_pay(Decimal::ZERO, dec("80"), dec("1.5")), dec("0.00"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for shift lengths in minutes (up to 16 hours)
    fn shift_minutes_strategy() -> impl Strategy<Value = i64> {
        0i64..=960
    }

    /// Strategy for break/normal hour configs
    fn hours_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=12).prop_map(Decimal::from)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Working hours never exceed total hours and never go negative
        #[test]
        fn prop_working_hours_bounded(
            minutes in shift_minutes_strategy(),
            break_hours in hours_strategy(),
            normal_hours in hours_strategy()
        ) {
            let clock_in = ts(10, 0, 0);
            let clock_out = clock_in + chrono::Duration::minutes(minutes);
            let breakdown = compute_work_hours(clock_in, clock_out, break_hours, normal_hours);

            prop_assert!(breakdown.working_hours >= Decimal::ZERO);
            prop_assert!(breakdown.working_hours <= breakdown.total_hours);
        }

        /// OT hours are exactly the excess over normal hours, floored at zero
        #[test]
        fn prop_ot_is_excess_over_normal(
            minutes in shift_minutes_strategy(),
            break_hours in hours_strategy(),
            normal_hours in hours_strategy()
        ) {
            let clock_in = ts(10, 0, 0);
            let clock_out = clock_in + chrono::Duration::minutes(minutes);
            let breakdown = compute_work_hours(clock_in, clock_out, break_hours, normal_hours);

            let expected = (breakdown.working_hours - normal_hours).max(Decimal::ZERO);
            prop_assert_eq!(breakdown.ot_hours, expected.round_dp(2));
            prop_assert_eq!(breakdown.is_overtime, breakdown.ot_hours > Decimal::ZERO);
        }

        /// A longer shift never produces fewer working hours
        #[test]
        fn prop_working_hours_monotonic(
            minutes in 0i64..=900,
            extra in 1i64..=60
        ) {
            let clock_in = ts(10, 0, 0);
            let short = compute_work_hours(
                clock_in,
                clock_in + chrono::Duration::minutes(minutes),
                dec("1"),
                dec("8"),
            );
            let long = compute_work_hours(
                clock_in,
                clock_in + chrono::Duration::minutes(minutes + extra),
                dec("1"),
                dec("8"),
            );

            prop_assert!(long.working_hours >= short.working_hours);
        }

        /// OT pay scales linearly with the multiplier
        #[test]
        fn prop_ot_pay_nonnegative(
            ot_minutes in 0i64..=300,
            rate in 1i64..=1000
        ) {
            let hours = Decimal::from(ot_minutes) / Decimal::from(60);
            let pay = ot_pay(hours.round_dp(2), Decimal::from(rate), dec("1.5"));
            prop_assert!(pay >= Decimal::ZERO);
        }
    }
}

// ============================================================================
// Attendance State Rules
// ============================================================================

#[cfg(test)]
mod state_rules {
    use super::*;

    /// Simulate the clock-in guard: one open record per employee
    fn can_clock_in(has_open_record: bool) -> Result<(), &'static str> {
        if has_open_record {
            Err("Already clocked in")
        } else {
            Ok(())
        }
    }

    /// Simulate the clock-out guard
    fn can_clock_out(has_open_record: bool) -> Result<(), &'static str> {
        if has_open_record {
            Ok(())
        } else {
            Err("No active clock-in")
        }
    }

    #[test]
    fn test_cannot_clock_in_twice() {
        assert!(can_clock_in(false).is_ok());
        assert!(can_clock_in(true).is_err());
    }

    #[test]
    fn test_cannot_clock_out_without_clock_in() {
        assert!(can_clock_out(true).is_ok());
        assert!(can_clock_out(false).is_err());
    }

    /// Clock-out before clock-in must be rejected by the caller before the
    /// calculator runs
    #[test]
    fn test_invalid_time_range_detection() {
        let clock_in = ts(10, 9, 0);
        let clock_out = ts(10, 8, 0);
        assert!(clock_out < clock_in);
    }
}
