//! HTTP handlers for payroll estimation

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::payroll::{EstimatePayrollQuery, PayrollEstimate, PayrollService};
use crate::AppState;

/// Estimate payroll for a period (read-only, nothing is persisted)
pub async fn estimate_payroll(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(query): Json<EstimatePayrollQuery>,
) -> AppResult<Json<Vec<PayrollEstimate>>> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = PayrollService::new(state.db, state.config.clone());
    let estimates = service.estimate(query).await?;
    Ok(Json(estimates))
}
