//! HTTP handlers for menu catalog endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::catalog::{
    CatalogService, CreateCategoryInput, CreateProductInput, SetRecipeInput, UpdateCategoryInput,
    UpdateProductInput,
};
use crate::AppState;
use shared::{Category, Product, Recipe};

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<Json<Category>> {
    let service = CatalogService::new(state.db, state.reference_cache.clone());
    let category = service.create_category(input).await?;
    Ok(Json(category))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<Json<Category>> {
    let service = CatalogService::new(state.db, state.reference_cache.clone());
    let category = service.update_category(category_id, input).await?;
    Ok(Json(category))
}

/// List categories
pub async fn list_categories(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Category>>> {
    let service = CatalogService::new(state.db, state.reference_cache.clone());
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db, state.reference_cache.clone());
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db, state.reference_cache.clone());
    let product = service.update_product(product_id, input).await?;
    Ok(Json(product))
}

/// Get a single product
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db, state.reference_cache.clone());
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// List products
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    let service = CatalogService::new(state.db, state.reference_cache.clone());
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Replace a product's recipe
pub async fn set_recipe(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<SetRecipeInput>,
) -> AppResult<Json<Vec<Recipe>>> {
    let service = CatalogService::new(state.db, state.reference_cache.clone());
    let recipes = service.set_recipe(product_id, input).await?;
    Ok(Json(recipes))
}

/// Get a product's recipe
pub async fn get_recipe(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<Recipe>>> {
    let service = CatalogService::new(state.db, state.reference_cache.clone());
    let recipes = service.get_recipe(product_id).await?;
    Ok(Json(recipes))
}
