//! Inventory ledger service
//!
//! The single writer of `ingredients.current_stock`. Every stock change goes
//! through [`record_movement_tx`], which pairs an atomic conditional update
//! of the running total with one immutable `stock_movements` row. Decreases
//! are guarded at the storage layer (`... AND current_stock >= $qty`) so
//! concurrent mutations of the same ingredient cannot drive stock negative.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{
    replay_movement, validate_positive_quantity, weighted_average_cost, Ingredient, MovementType,
    ReferenceType, StockDirection, StockMovement,
};

/// Inventory service owning ingredient stock and the movement ledger
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Database row for an ingredient
#[derive(Debug, sqlx::FromRow)]
struct IngredientRow {
    id: Uuid,
    name: String,
    name_th: Option<String>,
    unit: String,
    current_stock: Decimal,
    min_stock: Decimal,
    cost_per_unit: Decimal,
    avg_cost_per_unit: Option<Decimal>,
    supplier_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Ingredient {
            id: row.id,
            name: row.name,
            name_th: row.name_th,
            unit: row.unit,
            current_stock: row.current_stock,
            min_stock: row.min_stock,
            cost_per_unit: row.cost_per_unit,
            avg_cost_per_unit: row.avg_cost_per_unit,
            supplier_id: row.supplier_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database row for a stock movement
#[derive(Debug, sqlx::FromRow)]
struct StockMovementRow {
    id: Uuid,
    ingredient_id: Uuid,
    movement_type: String,
    direction: String,
    quantity: Decimal,
    previous_stock: Decimal,
    new_stock: Decimal,
    reference_type: Option<String>,
    reference_id: Option<Uuid>,
    unit_cost: Option<Decimal>,
    total_cost: Option<Decimal>,
    notes: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<StockMovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: StockMovementRow) -> Result<Self, Self::Error> {
        Ok(StockMovement {
            id: row.id,
            ingredient_id: row.ingredient_id,
            movement_type: row.movement_type.parse().map_err(AppError::Internal)?,
            direction: row.direction.parse().map_err(AppError::Internal)?,
            quantity: row.quantity,
            previous_stock: row.previous_stock,
            new_stock: row.new_stock,
            reference_type: row
                .reference_type
                .map(|t| t.parse().map_err(AppError::Internal))
                .transpose()?,
            reference_id: row.reference_id,
            unit_cost: row.unit_cost,
            total_cost: row.total_cost,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

const MOVEMENT_COLUMNS: &str = "id, ingredient_id, movement_type, direction, quantity, \
     previous_stock, new_stock, reference_type, reference_id, unit_cost, total_cost, notes, \
     created_by, created_at";

/// Input for creating an ingredient
#[derive(Debug, Deserialize)]
pub struct CreateIngredientInput {
    pub name: String,
    pub name_th: Option<String>,
    pub unit: String,
    pub min_stock: Option<Decimal>,
    pub cost_per_unit: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
}

/// Input for updating an ingredient
///
/// `current_stock` is deliberately absent: the ledger is the only writer.
#[derive(Debug, Deserialize)]
pub struct UpdateIngredientInput {
    pub name: Option<String>,
    pub name_th: Option<String>,
    pub unit: Option<String>,
    pub min_stock: Option<Decimal>,
    pub cost_per_unit: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
}

/// Input for a purchase intake
#[derive(Debug, Deserialize)]
pub struct AddStockInput {
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Input for a manual stock adjustment
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    pub quantity: Decimal,
    pub direction: StockDirection,
    pub reason: String,
}

/// Input for recomputing stock from the movement log
#[derive(Debug, Deserialize)]
pub struct RecomputeStockInput {
    /// Restrict the replay to one ingredient; all ingredients when absent
    pub ingredient_id: Option<Uuid>,
}

/// One stock mutation, applied by [`record_movement_tx`]
#[derive(Debug)]
pub struct MovementInput {
    pub ingredient_id: Uuid,
    pub movement_type: MovementType,
    pub direction: StockDirection,
    pub quantity: Decimal,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<Uuid>,
    pub unit_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Uuid,
}

/// Apply one stock movement inside an open transaction
///
/// Used by the order, refund, and stock-count paths so their ledger writes
/// commit or roll back together with their own rows. Decreases run as a
/// guarded atomic update; a zero-row result means the ingredient either does
/// not exist or has too little stock, and nothing is written.
pub(crate) async fn record_movement_tx(
    tx: &mut Transaction<'_, Postgres>,
    input: &MovementInput,
) -> AppResult<StockMovement> {
    if let Err(msg) = validate_positive_quantity(input.quantity) {
        return Err(AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
            message_th: "ปริมาณต้องเป็นค่าบวก".to_string(),
        });
    }

    let updated = match input.direction {
        StockDirection::Out => {
            sqlx::query_as::<_, (String, Decimal)>(
                r#"
                UPDATE ingredients
                SET current_stock = current_stock - $1, updated_at = NOW()
                WHERE id = $2 AND current_stock >= $1
                RETURNING name, current_stock
                "#,
            )
            .bind(input.quantity)
            .bind(input.ingredient_id)
            .fetch_optional(&mut **tx)
            .await?
        }
        StockDirection::In => {
            sqlx::query_as::<_, (String, Decimal)>(
                r#"
                UPDATE ingredients
                SET current_stock = current_stock + $1, updated_at = NOW()
                WHERE id = $2
                RETURNING name, current_stock
                "#,
            )
            .bind(input.quantity)
            .bind(input.ingredient_id)
            .fetch_optional(&mut **tx)
            .await?
        }
    };

    let (_name, new_stock) = match updated {
        Some(row) => row,
        None => {
            // Distinguish "missing ingredient" from "not enough stock"
            let current = sqlx::query_as::<_, (String, Decimal)>(
                "SELECT name, current_stock FROM ingredients WHERE id = $1",
            )
            .bind(input.ingredient_id)
            .fetch_optional(&mut **tx)
            .await?;

            return match current {
                None => Err(AppError::NotFound("Ingredient".to_string())),
                Some((name, available)) => Err(AppError::InsufficientStock {
                    ingredient: name,
                    available,
                    requested: input.quantity,
                }),
            };
        }
    };

    let previous_stock = new_stock - input.direction.signed(input.quantity);
    let total_cost = input.unit_cost.map(|c| c * input.quantity);

    let row = sqlx::query_as::<_, StockMovementRow>(&format!(
        r#"
        INSERT INTO stock_movements (
            ingredient_id, movement_type, direction, quantity, previous_stock, new_stock,
            reference_type, reference_id, unit_cost, total_cost, notes, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {MOVEMENT_COLUMNS}
        "#
    ))
    .bind(input.ingredient_id)
    .bind(input.movement_type.as_str())
    .bind(input.direction.as_str())
    .bind(input.quantity)
    .bind(previous_stock)
    .bind(new_stock)
    .bind(input.reference_type.map(|t| t.as_str()))
    .bind(input.reference_id)
    .bind(input.unit_cost)
    .bind(total_cost)
    .bind(&input.notes)
    .bind(input.created_by)
    .fetch_one(&mut **tx)
    .await?;

    row.try_into()
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an ingredient
    pub async fn create_ingredient(&self, input: CreateIngredientInput) -> AppResult<Ingredient> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Ingredient name is required".to_string(),
                message_th: "ต้องระบุชื่อวัตถุดิบ".to_string(),
            });
        }
        if input.unit.trim().is_empty() {
            return Err(AppError::Validation {
                field: "unit".to_string(),
                message: "Unit of measure is required".to_string(),
                message_th: "ต้องระบุหน่วยนับ".to_string(),
            });
        }

        let row = sqlx::query_as::<_, IngredientRow>(
            r#"
            INSERT INTO ingredients (name, name_th, unit, min_stock, cost_per_unit, supplier_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, name_th, unit, current_stock, min_stock, cost_per_unit,
                      avg_cost_per_unit, supplier_id, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.name_th)
        .bind(&input.unit)
        .bind(input.min_stock.unwrap_or(Decimal::ZERO))
        .bind(input.cost_per_unit.unwrap_or(Decimal::ZERO))
        .bind(input.supplier_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update ingredient master data
    pub async fn update_ingredient(
        &self,
        ingredient_id: Uuid,
        input: UpdateIngredientInput,
    ) -> AppResult<Ingredient> {
        let existing = self.get_ingredient(ingredient_id).await?;

        let row = sqlx::query_as::<_, IngredientRow>(
            r#"
            UPDATE ingredients
            SET name = $1, name_th = $2, unit = $3, min_stock = $4, cost_per_unit = $5,
                supplier_id = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING id, name, name_th, unit, current_stock, min_stock, cost_per_unit,
                      avg_cost_per_unit, supplier_id, created_at, updated_at
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.name_th.or(existing.name_th))
        .bind(input.unit.unwrap_or(existing.unit))
        .bind(input.min_stock.unwrap_or(existing.min_stock))
        .bind(input.cost_per_unit.unwrap_or(existing.cost_per_unit))
        .bind(input.supplier_id.or(existing.supplier_id))
        .bind(ingredient_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get a single ingredient
    pub async fn get_ingredient(&self, ingredient_id: Uuid) -> AppResult<Ingredient> {
        let row = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT id, name, name_th, unit, current_stock, min_stock, cost_per_unit,
                   avg_cost_per_unit, supplier_id, created_at, updated_at
            FROM ingredients
            WHERE id = $1
            "#,
        )
        .bind(ingredient_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        Ok(row.into())
    }

    /// List all ingredients
    pub async fn list_ingredients(&self) -> AppResult<Vec<Ingredient>> {
        let rows = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT id, name, name_th, unit, current_stock, min_stock, cost_per_unit,
                   avg_cost_per_unit, supplier_id, created_at, updated_at
            FROM ingredients
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    /// List ingredients at or below their reorder threshold
    pub async fn list_low_stock(&self) -> AppResult<Vec<Ingredient>> {
        let rows = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT id, name, name_th, unit, current_stock, min_stock, cost_per_unit,
                   avg_cost_per_unit, supplier_id, created_at, updated_at
            FROM ingredients
            WHERE current_stock <= min_stock
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    /// Receive purchased stock
    ///
    /// Records an `in` movement and folds the purchase cost into the
    /// ingredient's weighted average cost when a unit cost is supplied.
    pub async fn add_stock(
        &self,
        ingredient_id: Uuid,
        input: AddStockInput,
        created_by: Uuid,
    ) -> AppResult<StockMovement> {
        let mut tx = self.db.begin().await?;

        // Snapshot quantity/average before the movement lands
        let before = sqlx::query_as::<_, (Decimal, Option<Decimal>)>(
            "SELECT current_stock, avg_cost_per_unit FROM ingredients WHERE id = $1",
        )
        .bind(ingredient_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        let movement = record_movement_tx(
            &mut tx,
            &MovementInput {
                ingredient_id,
                movement_type: MovementType::In,
                direction: StockDirection::In,
                quantity: input.quantity,
                reference_type: Some(ReferenceType::Purchase),
                reference_id: input.supplier_id,
                unit_cost: input.unit_cost,
                notes: input.notes.clone(),
                created_by,
            },
        )
        .await?;

        if let Some(unit_cost) = input.unit_cost {
            let (prev_qty, prev_avg) = before;
            let new_avg = weighted_average_cost(
                prev_qty,
                prev_avg.unwrap_or(Decimal::ZERO),
                input.quantity,
                unit_cost,
            );
            sqlx::query("UPDATE ingredients SET avg_cost_per_unit = $1 WHERE id = $2")
                .bind(new_avg)
                .bind(ingredient_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(movement)
    }

    /// Manually adjust stock in either direction
    pub async fn adjust_stock(
        &self,
        ingredient_id: Uuid,
        input: AdjustStockInput,
        created_by: Uuid,
    ) -> AppResult<StockMovement> {
        if input.reason.trim().is_empty() {
            return Err(AppError::Validation {
                field: "reason".to_string(),
                message: "Adjustment reason is required".to_string(),
                message_th: "ต้องระบุเหตุผลในการปรับสต๊อก".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;
        let movement = record_movement_tx(
            &mut tx,
            &MovementInput {
                ingredient_id,
                movement_type: MovementType::Adjustment,
                direction: input.direction,
                quantity: input.quantity,
                reference_type: Some(ReferenceType::Manual),
                reference_id: None,
                unit_cost: None,
                notes: Some(input.reason),
                created_by,
            },
        )
        .await?;
        tx.commit().await?;

        Ok(movement)
    }

    /// Rebuild `current_stock` by replaying the movement log
    ///
    /// Replays movements in (created_at, seq) order from a zero baseline and
    /// overwrites the stored total. Used to repair drift; applying it twice
    /// with no intervening movements is a no-op.
    pub async fn recompute_stock(&self, input: RecomputeStockInput) -> AppResult<()> {
        let ingredient_ids: Vec<Uuid> = match input.ingredient_id {
            Some(id) => vec![id],
            None => sqlx::query_scalar::<_, Uuid>("SELECT id FROM ingredients")
                .fetch_all(&self.db)
                .await?,
        };

        for ingredient_id in ingredient_ids {
            let mut tx = self.db.begin().await?;

            let movements = sqlx::query_as::<_, (String, Decimal)>(
                r#"
                SELECT direction, quantity
                FROM stock_movements
                WHERE ingredient_id = $1
                ORDER BY created_at ASC, seq ASC
                "#,
            )
            .bind(ingredient_id)
            .fetch_all(&mut *tx)
            .await?;

            let mut stock = Decimal::ZERO;
            for (direction, quantity) in movements {
                let direction: StockDirection = direction.parse().map_err(AppError::Internal)?;
                stock = replay_movement(stock, direction, quantity);
            }

            let updated = sqlx::query(
                "UPDATE ingredients SET current_stock = $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(stock)
            .bind(ingredient_id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(AppError::NotFound("Ingredient".to_string()));
            }

            tx.commit().await?;
            tracing::info!(%ingredient_id, new_stock = %stock, "Recomputed stock from movement log");
        }

        Ok(())
    }

    /// List movements for an ingredient, most recent first
    pub async fn list_movements(
        &self,
        ingredient_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, StockMovementRow>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM stock_movements
            WHERE ingredient_id = $1
            ORDER BY created_at DESC, seq DESC
            LIMIT $2
            "#
        ))
        .bind(ingredient_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockMovement::try_from).collect()
    }
}
