//! HTTP handlers for attendance endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::attendance::{
    AttendanceService, ClockInInput, ClockOutInput, ListAttendanceQuery,
};
use crate::AppState;
use shared::Attendance;

/// Clock an employee in
pub async fn clock_in(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<ClockInInput>,
) -> AppResult<Json<Attendance>> {
    let service = AttendanceService::new(state.db, state.config.clone());
    let attendance = service.clock_in(input).await?;
    Ok(Json(attendance))
}

/// Clock an employee out
pub async fn clock_out(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<ClockOutInput>,
) -> AppResult<Json<Attendance>> {
    let service = AttendanceService::new(state.db, state.config.clone());
    let attendance = service.clock_out(input).await?;
    Ok(Json(attendance))
}

/// Get the open attendance record for an employee, if any
pub async fn get_active_attendance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Option<Attendance>>> {
    let service = AttendanceService::new(state.db, state.config.clone());
    let attendance = service.get_active(employee_id).await?;
    Ok(Json(attendance))
}

/// List attendance records
pub async fn list_attendance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListAttendanceQuery>,
) -> AppResult<Json<Vec<Attendance>>> {
    let service = AttendanceService::new(state.db, state.config.clone());
    let records = service.list(query).await?;
    Ok(Json(records))
}
