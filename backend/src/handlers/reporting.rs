//! Reporting handlers for analytics and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::reporting::{
    AttendanceSummaryReport, DailySalesReport, ReportFilter, ReportingService, TopProductReport,
};
use crate::AppState;

/// Get the daily sales report; `?format=csv` downloads a CSV file
pub async fn get_daily_sales_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
    Query(format): Query<FormatQuery>,
) -> AppResult<impl IntoResponse> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = ReportingService::new(state.db);

    if format.format.as_deref() == Some("csv") {
        let csv = service.export_daily_sales_csv(&filter).await?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"daily_sales.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        let data: Vec<DailySalesReport> = service.get_daily_sales(&filter).await?;
        Ok(Json(data).into_response())
    }
}

/// Get the best-selling products report
pub async fn get_top_products_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<TopProductReport>>> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = ReportingService::new(state.db);
    let data = service.get_top_products(&filter).await?;
    Ok(Json(data))
}

/// Get the attendance summary report
pub async fn get_attendance_summary_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<AttendanceSummaryReport>>> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = ReportingService::new(state.db);
    let data = service.get_attendance_summary(&filter).await?;
    Ok(Json(data))
}

/// Output format selector
#[derive(Debug, serde::Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>, // "json" or "csv"
}
