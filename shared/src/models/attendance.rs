//! Attendance models and working-hours/overtime computation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An attendance record for one employee shift
///
/// `clock_out` is null while the shift is open; at most one open record may
/// exist per employee at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub work_date: NaiveDate,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub clock_in_lat: Option<Decimal>,
    pub clock_in_lng: Option<Decimal>,
    pub clock_out_lat: Option<Decimal>,
    pub clock_out_lng: Option<Decimal>,
    pub total_hours: Option<Decimal>,
    pub working_hours: Option<Decimal>,
    pub ot_hours: Option<Decimal>,
    pub is_late: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Breakdown of worked hours for one clock-in/clock-out pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkHoursBreakdown {
    pub total_hours: Decimal,
    pub break_hours: Decimal,
    pub working_hours: Decimal,
    pub normal_hours: Decimal,
    pub ot_hours: Decimal,
    pub is_overtime: bool,
}

/// Compute worked hours, break deduction, and overtime for a shift
///
/// `total = clock_out − clock_in` in hours; `working = max(0, total − break)`;
/// `ot = max(0, working − normal)`. All hour figures are rounded to 2 decimal
/// places. The caller must reject `clock_out < clock_in` before calling; both
/// timestamps must be in the same reference frame (no timezone normalization
/// happens here).
pub fn compute_work_hours(
    clock_in: DateTime<Utc>,
    clock_out: DateTime<Utc>,
    break_hours: Decimal,
    normal_hours: Decimal,
) -> WorkHoursBreakdown {
    let seconds = (clock_out - clock_in).num_seconds();
    let total_hours = (Decimal::from(seconds) / Decimal::from(3600)).round_dp(2);
    let working_hours = (total_hours - break_hours).max(Decimal::ZERO).round_dp(2);
    let ot_hours = (working_hours - normal_hours).max(Decimal::ZERO).round_dp(2);

    WorkHoursBreakdown {
        total_hours,
        break_hours,
        working_hours,
        normal_hours,
        ot_hours,
        is_overtime: ot_hours > Decimal::ZERO,
    }
}

/// Overtime pay for a number of OT hours at the given rate and multiplier
pub fn ot_pay(ot_hours: Decimal, hourly_rate: Decimal, ot_multiplier: Decimal) -> Decimal {
    (ot_hours * hourly_rate * ot_multiplier).round_dp(2)
}
