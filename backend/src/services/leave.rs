//! Leave request service
//!
//! Requests move pending -> approved/rejected; only pending requests can be
//! reviewed or withdrawn. No leave balance ledger exists at this stage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{LeaveRequest, LeaveStatus, LeaveType};

/// Leave request service
#[derive(Clone)]
pub struct LeaveService {
    db: PgPool,
}

/// Database row for a leave request
#[derive(Debug, sqlx::FromRow)]
struct LeaveRequestRow {
    id: Uuid,
    employee_id: Uuid,
    leave_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: Option<String>,
    status: String,
    reviewed_by: Option<Uuid>,
    reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeaveRequestRow> for LeaveRequest {
    type Error = AppError;

    fn try_from(row: LeaveRequestRow) -> Result<Self, Self::Error> {
        Ok(LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            leave_type: row.leave_type.parse().map_err(AppError::Internal)?,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            status: row.status.parse().map_err(AppError::Internal)?,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const LEAVE_COLUMNS: &str = "id, employee_id, leave_type, start_date, end_date, reason, status, \
     reviewed_by, reviewed_at, created_at, updated_at";

/// Input for creating a leave request
#[derive(Debug, Deserialize)]
pub struct CreateLeaveRequestInput {
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// Query filter for listing leave requests
#[derive(Debug, Deserialize)]
pub struct ListLeaveQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<LeaveStatus>,
}

impl LeaveService {
    /// Create a new LeaveService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a leave request
    pub async fn create(&self, input: CreateLeaveRequestInput) -> AppResult<LeaveRequest> {
        if input.end_date < input.start_date {
            return Err(AppError::Validation {
                field: "end_date".to_string(),
                message: "Leave end date must not be before the start date".to_string(),
                message_th: "วันสิ้นสุดการลาต้องไม่อยู่ก่อนวันเริ่มลา".to_string(),
            });
        }

        let employee_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = $1)")
                .bind(input.employee_id)
                .fetch_one(&self.db)
                .await?;
        if !employee_exists {
            return Err(AppError::NotFound("Employee".to_string()));
        }

        let row = sqlx::query_as::<_, LeaveRequestRow>(&format!(
            r#"
            INSERT INTO leave_requests (employee_id, leave_type, start_date, end_date, reason,
                                        status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {LEAVE_COLUMNS}
            "#
        ))
        .bind(input.employee_id)
        .bind(input.leave_type.as_str())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.reason)
        .bind(LeaveStatus::Pending.as_str())
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Approve a pending request
    pub async fn approve(&self, request_id: Uuid, reviewed_by: Uuid) -> AppResult<LeaveRequest> {
        self.review(request_id, LeaveStatus::Approved, reviewed_by)
            .await
    }

    /// Reject a pending request
    pub async fn reject(&self, request_id: Uuid, reviewed_by: Uuid) -> AppResult<LeaveRequest> {
        self.review(request_id, LeaveStatus::Rejected, reviewed_by)
            .await
    }

    /// List leave requests, newest first
    pub async fn list(&self, query: ListLeaveQuery) -> AppResult<Vec<LeaveRequest>> {
        let rows = sqlx::query_as::<_, LeaveRequestRow>(&format!(
            r#"
            SELECT {LEAVE_COLUMNS} FROM leave_requests
            WHERE ($1::uuid IS NULL OR employee_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(query.employee_id)
        .bind(query.status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(LeaveRequest::try_from).collect()
    }

    async fn review(
        &self,
        request_id: Uuid,
        decision: LeaveStatus,
        reviewed_by: Uuid,
    ) -> AppResult<LeaveRequest> {
        // Guarded update: only a pending request can be reviewed
        let row = sqlx::query_as::<_, LeaveRequestRow>(&format!(
            r#"
            UPDATE leave_requests
            SET status = $1, reviewed_by = $2, reviewed_at = NOW(), updated_at = NOW()
            WHERE id = $3 AND status = $4
            RETURNING {LEAVE_COLUMNS}
            "#
        ))
        .bind(decision.as_str())
        .bind(reviewed_by)
        .bind(request_id)
        .bind(LeaveStatus::Pending.as_str())
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM leave_requests WHERE id = $1)",
                )
                .bind(request_id)
                .fetch_one(&self.db)
                .await?;

                if exists {
                    Err(AppError::InvalidStateTransition(
                        "Only pending leave requests can be reviewed".to_string(),
                    ))
                } else {
                    Err(AppError::NotFound("Leave request".to_string()))
                }
            }
        }
    }
}
