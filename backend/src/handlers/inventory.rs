//! HTTP handlers for ingredient and stock ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::inventory::{
    AddStockInput, AdjustStockInput, CreateIngredientInput, InventoryService, RecomputeStockInput,
    UpdateIngredientInput,
};
use crate::AppState;
use shared::{Ingredient, StockMovement};

/// Query parameters for listing movements
#[derive(Debug, Deserialize)]
pub struct ListMovementsQuery {
    pub limit: Option<i64>,
}

/// Create an ingredient
pub async fn create_ingredient(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateIngredientInput>,
) -> AppResult<Json<Ingredient>> {
    let service = InventoryService::new(state.db);
    let ingredient = service.create_ingredient(input).await?;
    Ok(Json(ingredient))
}

/// Update an ingredient
pub async fn update_ingredient(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
    Json(input): Json<UpdateIngredientInput>,
) -> AppResult<Json<Ingredient>> {
    let service = InventoryService::new(state.db);
    let ingredient = service.update_ingredient(ingredient_id, input).await?;
    Ok(Json(ingredient))
}

/// Get a single ingredient
pub async fn get_ingredient(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
) -> AppResult<Json<Ingredient>> {
    let service = InventoryService::new(state.db);
    let ingredient = service.get_ingredient(ingredient_id).await?;
    Ok(Json(ingredient))
}

/// List all ingredients
pub async fn list_ingredients(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Ingredient>>> {
    let service = InventoryService::new(state.db);
    let ingredients = service.list_ingredients().await?;
    Ok(Json(ingredients))
}

/// List ingredients at or below their reorder threshold
pub async fn list_low_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Ingredient>>> {
    let service = InventoryService::new(state.db);
    let ingredients = service.list_low_stock().await?;
    Ok(Json(ingredients))
}

/// Receive purchased stock for an ingredient
pub async fn add_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
    Json(input): Json<AddStockInput>,
) -> AppResult<Json<StockMovement>> {
    let service = InventoryService::new(state.db);
    let movement = service
        .add_stock(ingredient_id, input, current_user.0.user_id)
        .await?;
    Ok(Json(movement))
}

/// Manually adjust an ingredient's stock
pub async fn adjust_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<StockMovement>> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = InventoryService::new(state.db);
    let movement = service
        .adjust_stock(ingredient_id, input, current_user.0.user_id)
        .await?;
    Ok(Json(movement))
}

/// Rebuild stock figures from the movement log
pub async fn recompute_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecomputeStockInput>,
) -> AppResult<Json<()>> {
    require_role(&current_user.0, &["owner", "manager"])?;

    let service = InventoryService::new(state.db);
    service.recompute_stock(input).await?;
    Ok(Json(()))
}

/// List an ingredient's movements, most recent first
pub async fn list_movements(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
    Query(query): Query<ListMovementsQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = InventoryService::new(state.db);
    let movements = service
        .list_movements(ingredient_id, query.limit.unwrap_or(50).clamp(1, 500))
        .await?;
    Ok(Json(movements))
}
