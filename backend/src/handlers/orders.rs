//! HTTP handlers for order entry and refunds

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::orders::{
    CreateOrderInput, ListOrdersQuery, OrderService, RefundOrderInput,
};
use crate::AppState;
use shared::{Order, OrderWithItems};

/// Create and pay an order
pub async fn create_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<OrderWithItems>> {
    let service = OrderService::new(state.db);
    let order = service.create_order(input, current_user.0.user_id).await?;
    Ok(Json(order))
}

/// Refund an order, fully or partially
pub async fn refund_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<RefundOrderInput>,
) -> AppResult<Json<OrderWithItems>> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = OrderService::new(state.db);
    let order = service
        .refund_order(order_id, input, current_user.0.user_id)
        .await?;
    Ok(Json(order))
}

/// Get one order with its items
pub async fn get_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderWithItems>> {
    let service = OrderService::new(state.db);
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}

/// List orders, most recent first
pub async fn list_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.db);
    let orders = service.list_orders(query).await?;
    Ok(Json(orders))
}
