//! HTTP handlers for leave request endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::leave::{CreateLeaveRequestInput, LeaveService, ListLeaveQuery};
use crate::AppState;
use shared::LeaveRequest;

/// Create a leave request
pub async fn create_leave_request(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateLeaveRequestInput>,
) -> AppResult<Json<LeaveRequest>> {
    let service = LeaveService::new(state.db);
    let request = service.create(input).await?;
    Ok(Json(request))
}

/// Approve a pending leave request
pub async fn approve_leave_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<LeaveRequest>> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = LeaveService::new(state.db);
    let request = service.approve(request_id, current_user.0.user_id).await?;
    Ok(Json(request))
}

/// Reject a pending leave request
pub async fn reject_leave_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<LeaveRequest>> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = LeaveService::new(state.db);
    let request = service.reject(request_id, current_user.0.user_id).await?;
    Ok(Json(request))
}

/// List leave requests
pub async fn list_leave_requests(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListLeaveQuery>,
) -> AppResult<Json<Vec<LeaveRequest>>> {
    let service = LeaveService::new(state.db);
    let requests = service.list(query).await?;
    Ok(Json(requests))
}
