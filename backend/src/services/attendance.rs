//! Attendance service: clock-in/clock-out with overtime calculation
//!
//! An employee has at most one open attendance record (null clock-out) at a
//! time. Hours are computed by the pure calculator in the shared crate when
//! the shift closes; the configured break and normal-hours values come from
//! the application config.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::{compute_work_hours, Attendance, GpsCoordinates};

/// Attendance service
#[derive(Clone)]
pub struct AttendanceService {
    db: PgPool,
    config: Arc<Config>,
}

/// Database row for an attendance record
#[derive(Debug, sqlx::FromRow)]
struct AttendanceRow {
    id: Uuid,
    employee_id: Uuid,
    work_date: NaiveDate,
    clock_in: DateTime<Utc>,
    clock_out: Option<DateTime<Utc>>,
    clock_in_lat: Option<Decimal>,
    clock_in_lng: Option<Decimal>,
    clock_out_lat: Option<Decimal>,
    clock_out_lng: Option<Decimal>,
    total_hours: Option<Decimal>,
    working_hours: Option<Decimal>,
    ot_hours: Option<Decimal>,
    is_late: bool,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AttendanceRow> for Attendance {
    fn from(row: AttendanceRow) -> Self {
        Attendance {
            id: row.id,
            employee_id: row.employee_id,
            work_date: row.work_date,
            clock_in: row.clock_in,
            clock_out: row.clock_out,
            clock_in_lat: row.clock_in_lat,
            clock_in_lng: row.clock_in_lng,
            clock_out_lat: row.clock_out_lat,
            clock_out_lng: row.clock_out_lng,
            total_hours: row.total_hours,
            working_hours: row.working_hours,
            ot_hours: row.ot_hours,
            is_late: row.is_late,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const ATTENDANCE_COLUMNS: &str = "id, employee_id, work_date, clock_in, clock_out, \
     clock_in_lat, clock_in_lng, clock_out_lat, clock_out_lng, total_hours, working_hours, \
     ot_hours, is_late, notes, created_at, updated_at";

/// Input for clocking in
#[derive(Debug, Deserialize)]
pub struct ClockInInput {
    pub employee_id: Uuid,
    pub location: Option<GpsCoordinates>,
}

/// Input for clocking out
#[derive(Debug, Deserialize)]
pub struct ClockOutInput {
    pub employee_id: Uuid,
    pub location: Option<GpsCoordinates>,
}

/// Query filter for listing attendance
#[derive(Debug, Deserialize)]
pub struct ListAttendanceQuery {
    pub employee_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl AttendanceService {
    /// Create a new AttendanceService instance
    pub fn new(db: PgPool, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Clock an employee in
    pub async fn clock_in(&self, input: ClockInInput) -> AppResult<Attendance> {
        let employee_active = sqlx::query_scalar::<_, bool>(
            "SELECT is_active FROM employees WHERE id = $1",
        )
        .bind(input.employee_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))?;

        if !employee_active {
            return Err(AppError::Validation {
                field: "employee_id".to_string(),
                message: "Employee is not active".to_string(),
                message_th: "พนักงานไม่อยู่ในสถานะทำงาน".to_string(),
            });
        }

        let open_record = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM attendance WHERE employee_id = $1 AND clock_out IS NULL",
        )
        .bind(input.employee_id)
        .fetch_optional(&self.db)
        .await?;

        if open_record.is_some() {
            return Err(AppError::AlreadyClockedIn);
        }

        let now = Utc::now();
        let is_late = self.is_late(now)?;
        let (lat, lng) = match &input.location {
            Some(loc) => (Some(loc.latitude), Some(loc.longitude)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            INSERT INTO attendance (employee_id, work_date, clock_in, clock_in_lat,
                                    clock_in_lng, is_late)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        ))
        .bind(input.employee_id)
        .bind(now.date_naive())
        .bind(now)
        .bind(lat)
        .bind(lng)
        .bind(is_late)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Clock an employee out, computing the hours breakdown
    pub async fn clock_out(&self, input: ClockOutInput) -> AppResult<Attendance> {
        let open = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
             WHERE employee_id = $1 AND clock_out IS NULL"
        ))
        .bind(input.employee_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NoActiveClockIn)?;

        let now = Utc::now();
        if now < open.clock_in {
            return Err(AppError::InvalidTimeRange);
        }

        let breakdown = compute_work_hours(
            open.clock_in,
            now,
            self.config.attendance.break_hours,
            self.config.attendance.normal_hours_per_day,
        );

        let (lat, lng) = match &input.location {
            Some(loc) => (Some(loc.latitude), Some(loc.longitude)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            UPDATE attendance
            SET clock_out = $1, clock_out_lat = $2, clock_out_lng = $3, total_hours = $4,
                working_hours = $5, ot_hours = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        ))
        .bind(now)
        .bind(lat)
        .bind(lng)
        .bind(breakdown.total_hours)
        .bind(breakdown.working_hours)
        .bind(breakdown.ot_hours)
        .bind(open.id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get the open attendance record for an employee, if any
    pub async fn get_active(&self, employee_id: Uuid) -> AppResult<Option<Attendance>> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
             WHERE employee_id = $1 AND clock_out IS NULL"
        ))
        .bind(employee_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Attendance::from))
    }

    /// List attendance records, newest first
    pub async fn list(&self, query: ListAttendanceQuery) -> AppResult<Vec<Attendance>> {
        let start = query
            .start_date
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default());
        let end = query
            .end_date
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2100, 12, 31).unwrap_or_default());

        let rows = match query.employee_id {
            Some(employee_id) => {
                sqlx::query_as::<_, AttendanceRow>(&format!(
                    r#"
                    SELECT {ATTENDANCE_COLUMNS} FROM attendance
                    WHERE employee_id = $1 AND work_date BETWEEN $2 AND $3
                    ORDER BY clock_in DESC
                    "#
                ))
                .bind(employee_id)
                .bind(start)
                .bind(end)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, AttendanceRow>(&format!(
                    r#"
                    SELECT {ATTENDANCE_COLUMNS} FROM attendance
                    WHERE work_date BETWEEN $1 AND $2
                    ORDER BY clock_in DESC
                    "#
                ))
                .bind(start)
                .bind(end)
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(Attendance::from).collect())
    }

    /// Whether a clock-in at `now` counts as late against the configured
    /// shift start plus grace period
    fn is_late(&self, now: DateTime<Utc>) -> AppResult<bool> {
        let shift_start = NaiveTime::parse_from_str(&self.config.attendance.shift_start, "%H:%M")
            .map_err(|e| {
                AppError::Internal(format!(
                    "Invalid attendance.shift_start '{}': {}",
                    self.config.attendance.shift_start, e
                ))
            })?;

        let cutoff = shift_start + chrono::Duration::minutes(self.config.attendance.late_grace_minutes);
        Ok(now.time() > cutoff)
    }
}
