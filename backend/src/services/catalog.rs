//! Menu catalog service: categories, products, and recipes
//!
//! List reads for categories and products go through the reference cache;
//! every mutation invalidates the keys it touches.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache::ReferenceCache;
use crate::error::{AppError, AppResult};
use shared::{validate_money, validate_recipe_quantity, validate_sku, Category, Product, Recipe};

const PRODUCTS_CACHE_KEY: &str = "products";
const CATEGORIES_CACHE_KEY: &str = "categories";

/// Catalog service
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
    cache: ReferenceCache,
}

/// Database row for a category
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    name_th: Option<String>,
    display_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            name_th: row.name_th,
            display_order: row.display_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database row for a product
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    category_id: Uuid,
    sku: String,
    name: String,
    name_th: Option<String>,
    description: Option<String>,
    price: Decimal,
    image_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            category_id: row.category_id,
            sku: row.sku,
            name: row.name,
            name_th: row.name_th,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database row for a recipe line
#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: Uuid,
    product_id: Uuid,
    ingredient_id: Uuid,
    qty_per_unit: Decimal,
    created_at: DateTime<Utc>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            product_id: row.product_id,
            ingredient_id: row.ingredient_id,
            qty_per_unit: row.qty_per_unit,
            created_at: row.created_at,
        }
    }
}

const CATEGORY_COLUMNS: &str =
    "id, name, name_th, display_order, is_active, created_at, updated_at";

const PRODUCT_COLUMNS: &str = "id, category_id, sku, name, name_th, description, price, \
     image_url, is_active, created_at, updated_at";

const RECIPE_COLUMNS: &str = "id, product_id, ingredient_id, qty_per_unit, created_at";

/// Input for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub name_th: Option<String>,
    pub display_order: Option<i32>,
}

/// Input for updating a category
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub name_th: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub category_id: Uuid,
    pub sku: String,
    pub name: String,
    pub name_th: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
}

/// Input for updating a product
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub name_th: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

/// One recipe line in a set-recipe request
#[derive(Debug, Deserialize)]
pub struct RecipeLineInput {
    pub ingredient_id: Uuid,
    pub qty_per_unit: Decimal,
}

/// Input replacing a product's recipe
#[derive(Debug, Deserialize)]
pub struct SetRecipeInput {
    pub lines: Vec<RecipeLineInput>,
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool, cache: ReferenceCache) -> Self {
        Self { db, cache }
    }

    // --- Categories ---

    /// Create a category
    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Category name is required".to_string(),
                message_th: "ต้องระบุชื่อหมวดหมู่".to_string(),
            });
        }

        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r#"
            INSERT INTO categories (name, name_th, display_order)
            VALUES ($1, $2, $3)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.name_th)
        .bind(input.display_order.unwrap_or(0))
        .fetch_one(&self.db)
        .await?;

        self.cache.invalidate(CATEGORIES_CACHE_KEY);
        Ok(row.into())
    }

    /// Update a category
    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        let existing = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r#"
            UPDATE categories
            SET name = $1, name_th = $2, display_order = $3, is_active = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.name_th.or(existing.name_th))
        .bind(input.display_order.unwrap_or(existing.display_order))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;

        self.cache.invalidate(CATEGORIES_CACHE_KEY);
        Ok(row.into())
    }

    /// List categories in display order, cached
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        if let Some(cached) = self.cache.get::<Vec<Category>>(CATEGORIES_CACHE_KEY) {
            return Ok(cached);
        }

        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY display_order ASC, name ASC"
        ))
        .fetch_all(&self.db)
        .await?;

        let categories: Vec<Category> = rows.into_iter().map(Category::from).collect();
        self.cache.put(CATEGORIES_CACHE_KEY, &categories);
        Ok(categories)
    }

    // --- Products ---

    /// Create a product
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        if let Err(msg) = validate_sku(&input.sku) {
            return Err(AppError::Validation {
                field: "sku".to_string(),
                message: msg.to_string(),
                message_th: "รหัสสินค้า (SKU) ไม่ถูกต้อง".to_string(),
            });
        }
        if let Err(msg) = validate_money(input.price) {
            return Err(AppError::Validation {
                field: "price".to_string(),
                message: msg.to_string(),
                message_th: "ราคาต้องไม่ติดลบ".to_string(),
            });
        }

        let category_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(input.category_id)
                .fetch_one(&self.db)
                .await?;
        if !category_exists {
            return Err(AppError::NotFound("Category".to_string()));
        }

        let duplicate =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)")
                .bind(&input.sku)
                .fetch_one(&self.db)
                .await?;
        if duplicate {
            return Err(AppError::DuplicateEntry("SKU".to_string()));
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (category_id, sku, name, name_th, description, price, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(input.category_id)
        .bind(&input.sku)
        .bind(&input.name)
        .bind(&input.name_th)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.image_url)
        .fetch_one(&self.db)
        .await?;

        self.cache.invalidate(PRODUCTS_CACHE_KEY);
        Ok(row.into())
    }

    /// Update a product
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        let existing = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        if let Some(price) = input.price {
            if let Err(msg) = validate_money(price) {
                return Err(AppError::Validation {
                    field: "price".to_string(),
                    message: msg.to_string(),
                    message_th: "ราคาต้องไม่ติดลบ".to_string(),
                });
            }
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET category_id = $1, name = $2, name_th = $3, description = $4, price = $5,
                image_url = $6, is_active = $7, updated_at = NOW()
            WHERE id = $8
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(input.category_id.unwrap_or(existing.category_id))
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.name_th.or(existing.name_th))
        .bind(input.description.or(existing.description))
        .bind(input.price.unwrap_or(existing.price))
        .bind(input.image_url.or(existing.image_url))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        self.cache.invalidate(PRODUCTS_CACHE_KEY);
        Ok(row.into())
    }

    /// Get a single product
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// List all products, cached
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        if let Some(cached) = self.cache.get::<Vec<Product>>(PRODUCTS_CACHE_KEY) {
            return Ok(cached);
        }

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name ASC"
        ))
        .fetch_all(&self.db)
        .await?;

        let products: Vec<Product> = rows.into_iter().map(Product::from).collect();
        self.cache.put(PRODUCTS_CACHE_KEY, &products);
        Ok(products)
    }

    // --- Recipes ---

    /// Replace a product's recipe with the given lines
    pub async fn set_recipe(&self, product_id: Uuid, input: SetRecipeInput) -> AppResult<Vec<Recipe>> {
        for line in &input.lines {
            if let Err(msg) = validate_recipe_quantity(line.qty_per_unit) {
                return Err(AppError::Validation {
                    field: "lines.qty_per_unit".to_string(),
                    message: msg.to_string(),
                    message_th: "ปริมาณวัตถุดิบต่อหน่วยต้องไม่ติดลบ".to_string(),
                });
            }
        }

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;
        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM recipes WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let mut recipes = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let ingredient_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM ingredients WHERE id = $1)",
            )
            .bind(line.ingredient_id)
            .fetch_one(&mut *tx)
            .await?;
            if !ingredient_exists {
                return Err(AppError::NotFound("Ingredient".to_string()));
            }

            let row = sqlx::query_as::<_, RecipeRow>(&format!(
                r#"
                INSERT INTO recipes (product_id, ingredient_id, qty_per_unit)
                VALUES ($1, $2, $3)
                RETURNING {RECIPE_COLUMNS}
                "#
            ))
            .bind(product_id)
            .bind(line.ingredient_id)
            .bind(line.qty_per_unit)
            .fetch_one(&mut *tx)
            .await?;
            recipes.push(row.into());
        }

        tx.commit().await?;
        Ok(recipes)
    }

    /// Get the recipe lines for a product
    pub async fn get_recipe(&self, product_id: Uuid) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE product_id = $1 ORDER BY created_at ASC"
        ))
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }
}
