//! Payroll estimation service
//!
//! Read-only aggregation over attendance records. Produces an estimate
//! report per employee for a period; nothing is persisted — payroll runs,
//! payslips, and notifications belong to a later stage of the system.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::{ot_pay, PayType};

/// Payroll estimation service
#[derive(Clone)]
pub struct PayrollService {
    db: PgPool,
    config: Arc<Config>,
}

/// Query parameters for a payroll estimate
#[derive(Debug, Deserialize)]
pub struct EstimatePayrollQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub employee_ids: Option<Vec<Uuid>>,
}

/// Estimated pay for one employee over the period
#[derive(Debug, Clone, Serialize)]
pub struct PayrollEstimate {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub pay_type: PayType,
    pub days_worked: i64,
    pub total_hours: Decimal,
    pub ot_hours: Decimal,
    pub base_pay: Decimal,
    pub ot_pay: Decimal,
    pub total_pay: Decimal,
}

/// Aggregated attendance per employee
#[derive(Debug, sqlx::FromRow)]
struct AttendanceAggregate {
    employee_id: Uuid,
    days_worked: i64,
    total_hours: Decimal,
    ot_hours: Decimal,
}

impl PayrollService {
    /// Create a new PayrollService instance
    pub fn new(db: PgPool, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Estimate payroll for a period
    pub async fn estimate(&self, query: EstimatePayrollQuery) -> AppResult<Vec<PayrollEstimate>> {
        if query.end_date < query.start_date {
            return Err(AppError::Validation {
                field: "end_date".to_string(),
                message: "Period end must not be before period start".to_string(),
                message_th: "วันสิ้นสุดต้องไม่อยู่ก่อนวันเริ่มต้น".to_string(),
            });
        }

        let employees = match &query.employee_ids {
            Some(ids) => {
                sqlx::query_as::<_, (Uuid, String, String, Option<Decimal>, Option<Decimal>)>(
                    "SELECT id, name, pay_type, hourly_rate, monthly_rate FROM employees \
                     WHERE is_active AND id = ANY($1) ORDER BY name",
                )
                .bind(ids)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, (Uuid, String, String, Option<Decimal>, Option<Decimal>)>(
                    "SELECT id, name, pay_type, hourly_rate, monthly_rate FROM employees \
                     WHERE is_active ORDER BY name",
                )
                .fetch_all(&self.db)
                .await?
            }
        };

        // One aggregate row per employee with closed shifts in the period
        let aggregates = sqlx::query_as::<_, AttendanceAggregate>(
            r#"
            SELECT employee_id,
                   COUNT(*) as days_worked,
                   COALESCE(SUM(working_hours), 0) as total_hours,
                   COALESCE(SUM(ot_hours), 0) as ot_hours
            FROM attendance
            WHERE clock_out IS NOT NULL AND work_date BETWEEN $1 AND $2
            GROUP BY employee_id
            "#,
        )
        .bind(query.start_date)
        .bind(query.end_date)
        .fetch_all(&self.db)
        .await?;
        let aggregates: HashMap<Uuid, AttendanceAggregate> = aggregates
            .into_iter()
            .map(|a| (a.employee_id, a))
            .collect();

        let ot_multiplier = self.config.attendance.ot_multiplier;
        let standard_days = Decimal::from(self.config.payroll.standard_days_per_month);
        let standard_hours = Decimal::from(self.config.payroll.standard_hours_per_day);

        let mut estimates = Vec::with_capacity(employees.len());
        for (id, name, pay_type, hourly_rate, monthly_rate) in employees {
            let pay_type: PayType = pay_type.parse().map_err(AppError::Internal)?;
            let (days_worked, total_hours, ot_hours) = match aggregates.get(&id) {
                Some(agg) => (agg.days_worked, agg.total_hours, agg.ot_hours),
                None => (0, Decimal::ZERO, Decimal::ZERO),
            };

            let (base_pay, ot_amount) = match pay_type {
                PayType::Hourly => {
                    let rate = hourly_rate.unwrap_or(Decimal::ZERO);
                    let base = (total_hours * rate).round_dp(2);
                    (base, ot_pay(ot_hours, rate, ot_multiplier))
                }
                PayType::Monthly => {
                    let monthly = monthly_rate.unwrap_or(Decimal::ZERO);
                    // Pro-rate by days worked against the standard month,
                    // capped at the full monthly rate
                    let worked_ratio = if standard_days > Decimal::ZERO {
                        (Decimal::from(days_worked) / standard_days).min(Decimal::ONE)
                    } else {
                        Decimal::ZERO
                    };
                    let base = (monthly * worked_ratio).round_dp(2);
                    // OT against the hourly-equivalent rate
                    let hourly_equivalent = if standard_days > Decimal::ZERO
                        && standard_hours > Decimal::ZERO
                    {
                        monthly / (standard_days * standard_hours)
                    } else {
                        Decimal::ZERO
                    };
                    (base, ot_pay(ot_hours, hourly_equivalent, ot_multiplier))
                }
            };

            estimates.push(PayrollEstimate {
                employee_id: id,
                employee_name: name,
                pay_type,
                days_worked,
                total_hours,
                ot_hours,
                base_pay,
                ot_pay: ot_amount,
                total_pay: base_pay + ot_amount,
            });
        }

        Ok(estimates)
    }
}
