//! Reporting service for back-office analytics and data export
//! Provides sales summaries, product rankings, and attendance totals

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Daily sales summary entry
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DailySalesReport {
    pub day: NaiveDate,
    pub order_count: i64,
    pub gross_sales: Decimal,
    pub refund_count: i64,
    pub refund_total: Decimal,
    pub net_sales: Decimal,
}

/// Top-selling product entry
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TopProductReport {
    pub product_id: Uuid,
    pub product_name: String,
    pub units_sold: i64,
    pub revenue: Decimal,
}

/// Attendance totals per employee
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AttendanceSummaryReport {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub days_worked: i64,
    pub late_days: i64,
    pub total_hours: Decimal,
    pub ot_hours: Decimal,
}

/// Report filter parameters
#[derive(Debug, Deserialize)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

impl ReportFilter {
    fn range(&self) -> (NaiveDate, NaiveDate) {
        let start = self
            .start_date
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default());
        let end = self
            .end_date
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2100, 12, 31).unwrap_or_default());
        (start, end)
    }
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Daily sales over a date range
    pub async fn get_daily_sales(&self, filter: &ReportFilter) -> AppResult<Vec<DailySalesReport>> {
        let (start, end) = filter.range();

        let reports = sqlx::query_as::<_, DailySalesReport>(
            r#"
            SELECT
                created_at::date as day,
                COUNT(*) as order_count,
                COALESCE(SUM(total), 0) as gross_sales,
                COUNT(*) FILTER (WHERE refund_amount IS NOT NULL) as refund_count,
                COALESCE(SUM(refund_amount), 0) as refund_total,
                COALESCE(SUM(total), 0) - COALESCE(SUM(refund_amount), 0) as net_sales
            FROM orders
            WHERE created_at::date BETWEEN $1 AND $2
            GROUP BY created_at::date
            ORDER BY day ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(reports)
    }

    /// Best-selling products over a date range
    pub async fn get_top_products(&self, filter: &ReportFilter) -> AppResult<Vec<TopProductReport>> {
        let (start, end) = filter.range();
        let limit = filter.limit.unwrap_or(10).clamp(1, 100);

        let reports = sqlx::query_as::<_, TopProductReport>(
            r#"
            SELECT
                oi.product_id,
                oi.product_name,
                COALESCE(SUM(oi.quantity), 0)::bigint as units_sold,
                COALESCE(SUM(oi.subtotal), 0) as revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.created_at::date BETWEEN $1 AND $2
              AND o.payment_status <> 'refunded'
            GROUP BY oi.product_id, oi.product_name
            ORDER BY units_sold DESC, revenue DESC
            LIMIT $3
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(reports)
    }

    /// Attendance totals per employee over a date range
    pub async fn get_attendance_summary(
        &self,
        filter: &ReportFilter,
    ) -> AppResult<Vec<AttendanceSummaryReport>> {
        let (start, end) = filter.range();

        let reports = sqlx::query_as::<_, AttendanceSummaryReport>(
            r#"
            SELECT
                e.id as employee_id,
                e.name as employee_name,
                COUNT(a.id) as days_worked,
                COUNT(a.id) FILTER (WHERE a.is_late) as late_days,
                COALESCE(SUM(a.working_hours), 0) as total_hours,
                COALESCE(SUM(a.ot_hours), 0) as ot_hours
            FROM employees e
            LEFT JOIN attendance a ON a.employee_id = e.id
                AND a.clock_out IS NOT NULL
                AND a.work_date BETWEEN $1 AND $2
            WHERE e.is_active
            GROUP BY e.id, e.name
            ORDER BY e.name ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(reports)
    }

    /// Export the daily sales report as CSV
    pub async fn export_daily_sales_csv(&self, filter: &ReportFilter) -> AppResult<String> {
        let reports = self.get_daily_sales(filter).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "day",
                "order_count",
                "gross_sales",
                "refund_count",
                "refund_total",
                "net_sales",
            ])
            .map_err(|e| AppError::Internal(e.to_string()))?;

        for report in &reports {
            writer
                .write_record([
                    report.day.to_string(),
                    report.order_count.to_string(),
                    report.gross_sales.to_string(),
                    report.refund_count.to_string(),
                    report.refund_total.to_string(),
                    report.net_sales.to_string(),
                ])
                .map_err(|e| AppError::Internal(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
    }
}
