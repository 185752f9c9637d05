//! HTTP handlers for stock count endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::stock_count::{
    CreateStockCountInput, StockCountService, StockCountWithItems, UpdateCountItemsInput,
};
use crate::AppState;
use shared::StockCount;

/// Query parameters for listing stock counts
#[derive(Debug, Deserialize)]
pub struct ListStockCountsQuery {
    pub limit: Option<i64>,
}

/// Create a stock count (snapshots system quantities now)
pub async fn create_stock_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateStockCountInput>,
) -> AppResult<Json<StockCountWithItems>> {
    let service = StockCountService::new(state.db);
    let count = service.create(input, current_user.0.user_id).await?;
    Ok(Json(count))
}

/// Update counted quantities on a draft count
pub async fn update_stock_count_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(count_id): Path<Uuid>,
    Json(input): Json<UpdateCountItemsInput>,
) -> AppResult<Json<StockCountWithItems>> {
    let service = StockCountService::new(state.db);
    let count = service.update_items(count_id, input).await?;
    Ok(Json(count))
}

/// Submit a draft count
pub async fn submit_stock_count(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(count_id): Path<Uuid>,
) -> AppResult<Json<StockCount>> {
    let service = StockCountService::new(state.db);
    let count = service.submit(count_id).await?;
    Ok(Json(count))
}

/// Approve a submitted count
pub async fn approve_stock_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(count_id): Path<Uuid>,
) -> AppResult<Json<StockCount>> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = StockCountService::new(state.db);
    let count = service.approve(count_id).await?;
    Ok(Json(count))
}

/// Complete a count, applying variances to the ledger
pub async fn complete_stock_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(count_id): Path<Uuid>,
) -> AppResult<Json<StockCountWithItems>> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = StockCountService::new(state.db);
    let count = service.complete(count_id, current_user.0.user_id).await?;
    Ok(Json(count))
}

/// Delete a non-completed count
pub async fn delete_stock_count(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(count_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = StockCountService::new(state.db);
    service.delete(count_id).await?;
    Ok(Json(()))
}

/// Get one count with items
pub async fn get_stock_count(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(count_id): Path<Uuid>,
) -> AppResult<Json<StockCountWithItems>> {
    let service = StockCountService::new(state.db);
    let count = service.get(count_id).await?;
    Ok(Json(count))
}

/// List stock counts, most recent first
pub async fn list_stock_counts(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListStockCountsQuery>,
) -> AppResult<Json<Vec<StockCount>>> {
    let service = StockCountService::new(state.db);
    let counts = service.list(query.limit.unwrap_or(50)).await?;
    Ok(Json(counts))
}
