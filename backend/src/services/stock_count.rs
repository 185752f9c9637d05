//! Stock count service: periodic counts reconciled into the inventory ledger
//!
//! A count snapshots system quantities at creation, carries staff-entered
//! counted quantities, and computes variance immediately so it is visible
//! before finalization. Completing a count is the only path that turns it
//! into authoritative stock: each non-zero variance becomes one ledger
//! movement, all inside a single transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::inventory::{record_movement_tx, MovementInput};
use shared::{
    can_transition, count_variance, MovementType, ReferenceType, StockCount, StockCountItem,
    StockCountStatus, StockCountType, StockDirection,
};

/// Stock count service
#[derive(Clone)]
pub struct StockCountService {
    db: PgPool,
}

/// Database row for a stock count header
#[derive(Debug, sqlx::FromRow)]
struct StockCountRow {
    id: Uuid,
    count_type: String,
    status: String,
    notes: Option<String>,
    created_by: Uuid,
    completed_at: Option<DateTime<Utc>>,
    completed_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StockCountRow> for StockCount {
    type Error = AppError;

    fn try_from(row: StockCountRow) -> Result<Self, Self::Error> {
        Ok(StockCount {
            id: row.id,
            count_type: row.count_type.parse().map_err(AppError::Internal)?,
            status: row.status.parse().map_err(AppError::Internal)?,
            notes: row.notes,
            created_by: row.created_by,
            completed_at: row.completed_at,
            completed_by: row.completed_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for a stock count item
#[derive(Debug, sqlx::FromRow)]
struct StockCountItemRow {
    id: Uuid,
    stock_count_id: Uuid,
    ingredient_id: Uuid,
    system_quantity: Decimal,
    counted_quantity: Decimal,
    variance: Decimal,
    created_at: DateTime<Utc>,
}

impl From<StockCountItemRow> for StockCountItem {
    fn from(row: StockCountItemRow) -> Self {
        StockCountItem {
            id: row.id,
            stock_count_id: row.stock_count_id,
            ingredient_id: row.ingredient_id,
            system_quantity: row.system_quantity,
            counted_quantity: row.counted_quantity,
            variance: row.variance,
            created_at: row.created_at,
        }
    }
}

const COUNT_COLUMNS: &str = "id, count_type, status, notes, created_by, completed_at, \
     completed_by, created_at, updated_at";

const COUNT_ITEM_COLUMNS: &str =
    "id, stock_count_id, ingredient_id, system_quantity, counted_quantity, variance, created_at";

/// One counted line in a create/update request
#[derive(Debug, Deserialize)]
pub struct CountItemInput {
    pub ingredient_id: Uuid,
    pub counted_quantity: Decimal,
}

/// Input for creating a stock count
#[derive(Debug, Deserialize)]
pub struct CreateStockCountInput {
    pub count_type: StockCountType,
    pub notes: Option<String>,
    pub items: Vec<CountItemInput>,
}

/// Input for updating a draft count's lines
#[derive(Debug, Deserialize)]
pub struct UpdateCountItemsInput {
    pub items: Vec<CountItemInput>,
}

/// A stock count with its lines
#[derive(Debug, serde::Serialize)]
pub struct StockCountWithItems {
    #[serde(flatten)]
    pub count: StockCount,
    pub items: Vec<StockCountItem>,
}

impl StockCountService {
    /// Create a new StockCountService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a stock count, snapshotting system quantities now
    pub async fn create(
        &self,
        input: CreateStockCountInput,
        created_by: Uuid,
    ) -> AppResult<StockCountWithItems> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "A stock count needs at least one item".to_string(),
                message_th: "การนับสต๊อกต้องมีรายการอย่างน้อยหนึ่งรายการ".to_string(),
            });
        }
        for item in &input.items {
            if item.counted_quantity < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "items.counted_quantity".to_string(),
                    message: "Counted quantity cannot be negative".to_string(),
                    message_th: "จำนวนที่นับได้ต้องไม่ติดลบ".to_string(),
                });
            }
        }

        let mut tx = self.db.begin().await?;

        let count_row = sqlx::query_as::<_, StockCountRow>(&format!(
            r#"
            INSERT INTO stock_counts (count_type, status, notes, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {COUNT_COLUMNS}
            "#
        ))
        .bind(input.count_type.as_str())
        .bind(StockCountStatus::Draft.as_str())
        .bind(&input.notes)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            // Snapshot the system quantity at creation time; variance is
            // computed here, not deferred to completion
            let system_quantity = sqlx::query_scalar::<_, Decimal>(
                "SELECT current_stock FROM ingredients WHERE id = $1",
            )
            .bind(item.ingredient_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

            let variance = count_variance(item.counted_quantity, system_quantity);

            let item_row = sqlx::query_as::<_, StockCountItemRow>(&format!(
                r#"
                INSERT INTO stock_count_items (stock_count_id, ingredient_id, system_quantity,
                                               counted_quantity, variance)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {COUNT_ITEM_COLUMNS}
                "#
            ))
            .bind(count_row.id)
            .bind(item.ingredient_id)
            .bind(system_quantity)
            .bind(item.counted_quantity)
            .bind(variance)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item_row.into());
        }

        tx.commit().await?;

        Ok(StockCountWithItems {
            count: count_row.try_into()?,
            items,
        })
    }

    /// Update counted quantities while the count is still a draft
    ///
    /// Variance is recomputed against the stored system snapshot, not
    /// against live stock.
    pub async fn update_items(
        &self,
        count_id: Uuid,
        input: UpdateCountItemsInput,
    ) -> AppResult<StockCountWithItems> {
        for item in &input.items {
            if item.counted_quantity < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "items.counted_quantity".to_string(),
                    message: "Counted quantity cannot be negative".to_string(),
                    message_th: "จำนวนที่นับได้ต้องไม่ติดลบ".to_string(),
                });
            }
        }

        let mut tx = self.db.begin().await?;
        let count = self.load_count_tx(&mut tx, count_id).await?;

        let status: StockCountStatus = count.status.parse().map_err(AppError::Internal)?;
        if status != StockCountStatus::Draft {
            return Err(AppError::InvalidStateTransition(
                "Only draft stock counts can be edited".to_string(),
            ));
        }

        for item in &input.items {
            let updated = sqlx::query(
                r#"
                UPDATE stock_count_items
                SET counted_quantity = $1, variance = $1 - system_quantity
                WHERE stock_count_id = $2 AND ingredient_id = $3
                "#,
            )
            .bind(item.counted_quantity)
            .bind(count_id)
            .bind(item.ingredient_id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(AppError::NotFound("Stock count item".to_string()));
            }
        }

        let result = self.load_with_items_tx(&mut tx, count_id).await?;
        tx.commit().await?;
        Ok(result)
    }

    /// Move a count from draft to submitted
    pub async fn submit(&self, count_id: Uuid) -> AppResult<StockCount> {
        self.transition(count_id, StockCountStatus::Submitted).await
    }

    /// Approve a submitted count
    pub async fn approve(&self, count_id: Uuid) -> AppResult<StockCount> {
        self.transition(count_id, StockCountStatus::Approved).await
    }

    /// Complete a count, applying variances to the inventory ledger
    ///
    /// Each non-zero variance becomes one `in`/`out` movement of
    /// `abs(variance)`. The header row is claimed first with a guarded
    /// update, so two racing completions cannot both apply movements.
    pub async fn complete(&self, count_id: Uuid, completed_by: Uuid) -> AppResult<StockCountWithItems> {
        let mut tx = self.db.begin().await?;
        let count = self.load_count_tx(&mut tx, count_id).await?;

        let status: StockCountStatus = count.status.parse().map_err(AppError::Internal)?;
        if status == StockCountStatus::Completed {
            return Err(AppError::AlreadyCompleted);
        }
        if !can_transition(status, StockCountStatus::Completed) {
            return Err(AppError::InvalidStateTransition(format!(
                "Stock count must be submitted before completion, current status: {}",
                status.as_str()
            )));
        }

        // Claim the header before touching the ledger
        let claimed = sqlx::query(
            "UPDATE stock_counts SET status = $1, completed_at = NOW(), completed_by = $2, \
             updated_at = NOW() WHERE id = $3 AND status = $4",
        )
        .bind(StockCountStatus::Completed.as_str())
        .bind(completed_by)
        .bind(count_id)
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            return Err(AppError::AlreadyCompleted);
        }

        let items = self.load_items_tx(&mut tx, count_id).await?;
        for item in &items {
            if item.variance == Decimal::ZERO {
                continue;
            }

            let direction = if item.variance > Decimal::ZERO {
                StockDirection::In
            } else {
                StockDirection::Out
            };
            let movement_type = match direction {
                StockDirection::In => MovementType::In,
                StockDirection::Out => MovementType::Out,
            };

            record_movement_tx(
                &mut tx,
                &MovementInput {
                    ingredient_id: item.ingredient_id,
                    movement_type,
                    direction,
                    quantity: item.variance.abs(),
                    reference_type: Some(ReferenceType::StockCount),
                    reference_id: Some(count_id),
                    unit_cost: None,
                    notes: Some("Stock count variance".to_string()),
                    created_by: completed_by,
                },
            )
            .await?;
        }

        let result = self.load_with_items_tx(&mut tx, count_id).await?;
        tx.commit().await?;
        Ok(result)
    }

    /// Delete a count and its items; completed counts are immutable
    pub async fn delete(&self, count_id: Uuid) -> AppResult<()> {
        let status = sqlx::query_scalar::<_, String>("SELECT status FROM stock_counts WHERE id = $1")
            .bind(count_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock count".to_string()))?;

        let status: StockCountStatus = status.parse().map_err(AppError::Internal)?;
        if status == StockCountStatus::Completed {
            return Err(AppError::CannotDeleteCompleted);
        }

        // Items cascade via the foreign key
        sqlx::query("DELETE FROM stock_counts WHERE id = $1")
            .bind(count_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Get one count with its items
    pub async fn get(&self, count_id: Uuid) -> AppResult<StockCountWithItems> {
        let mut tx = self.db.begin().await?;
        let result = self.load_with_items_tx(&mut tx, count_id).await?;
        tx.commit().await?;
        Ok(result)
    }

    /// List counts, most recent first
    pub async fn list(&self, limit: i64) -> AppResult<Vec<StockCount>> {
        let rows = sqlx::query_as::<_, StockCountRow>(&format!(
            "SELECT {COUNT_COLUMNS} FROM stock_counts ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit.clamp(1, 500))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockCount::try_from).collect()
    }

    async fn transition(&self, count_id: Uuid, to: StockCountStatus) -> AppResult<StockCount> {
        let mut tx = self.db.begin().await?;
        let count = self.load_count_tx(&mut tx, count_id).await?;

        let status: StockCountStatus = count.status.parse().map_err(AppError::Internal)?;
        if !can_transition(status, to) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move stock count from {} to {}",
                status.as_str(),
                to.as_str()
            )));
        }

        let row = sqlx::query_as::<_, StockCountRow>(&format!(
            r#"
            UPDATE stock_counts SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            RETURNING {COUNT_COLUMNS}
            "#
        ))
        .bind(to.as_str())
        .bind(count_id)
        .bind(status.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::InvalidStateTransition("Stock count status changed concurrently".to_string())
        })?;

        tx.commit().await?;
        row.try_into()
    }

    async fn load_count_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        count_id: Uuid,
    ) -> AppResult<StockCountRow> {
        sqlx::query_as::<_, StockCountRow>(&format!(
            "SELECT {COUNT_COLUMNS} FROM stock_counts WHERE id = $1"
        ))
        .bind(count_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock count".to_string()))
    }

    async fn load_items_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        count_id: Uuid,
    ) -> AppResult<Vec<StockCountItem>> {
        let rows = sqlx::query_as::<_, StockCountItemRow>(&format!(
            "SELECT {COUNT_ITEM_COLUMNS} FROM stock_count_items WHERE stock_count_id = $1 \
             ORDER BY created_at ASC"
        ))
        .bind(count_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.into_iter().map(StockCountItem::from).collect())
    }

    async fn load_with_items_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        count_id: Uuid,
    ) -> AppResult<StockCountWithItems> {
        let count = self.load_count_tx(tx, count_id).await?;
        let items = self.load_items_tx(tx, count_id).await?;
        Ok(StockCountWithItems {
            count: count.try_into()?,
            items,
        })
    }
}
