//! HTTP handlers for employee endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::employees::{CreateEmployeeInput, EmployeeService, UpdateEmployeeInput};
use crate::AppState;
use shared::Employee;

/// Create an employee
pub async fn create_employee(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateEmployeeInput>,
) -> AppResult<Json<Employee>> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = EmployeeService::new(state.db);
    let employee = service.create(input).await?;
    Ok(Json(employee))
}

/// Update an employee
pub async fn update_employee(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(employee_id): Path<Uuid>,
    Json(input): Json<UpdateEmployeeInput>,
) -> AppResult<Json<Employee>> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = EmployeeService::new(state.db);
    let employee = service.update(employee_id, input).await?;
    Ok(Json(employee))
}

/// Get a single employee
pub async fn get_employee(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    let service = EmployeeService::new(state.db);
    let employee = service.get(employee_id).await?;
    Ok(Json(employee))
}

/// List employees
pub async fn list_employees(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Employee>>> {
    let service = EmployeeService::new(state.db);
    let employees = service.list().await?;
    Ok(Json(employees))
}
