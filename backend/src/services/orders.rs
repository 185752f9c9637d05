//! Order service: checkout with recipe-based stock deduction, and refunds
//!
//! Creating an order explodes each line item into ingredient requirements via
//! the product recipes, pre-checks the whole basket against current stock,
//! then deducts every ingredient and persists the order inside one
//! transaction. The per-ingredient deduction re-checks atomically at the
//! storage layer, so two concurrent orders cannot jointly overdraw an
//! ingredient; if any deduction fails the transaction rolls back and nothing
//! is written.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::inventory::{record_movement_tx, MovementInput};
use shared::{
    validate_order_quantity, validate_refund_amount, MovementType, Order, OrderItem,
    OrderWithItems, PaymentMethod, PaymentStatus, ReferenceType, StockDirection,
};

/// Order service for POS checkout and refunds
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Database row for an order
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    customer_id: Option<Uuid>,
    subtotal: Decimal,
    discount: Decimal,
    total: Decimal,
    payment_method: String,
    payment_status: String,
    refund_amount: Option<Decimal>,
    refund_reason: Option<String>,
    refunded_at: Option<DateTime<Utc>>,
    refunded_by: Option<Uuid>,
    notes: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = AppError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            customer_id: row.customer_id,
            subtotal: row.subtotal,
            discount: row.discount,
            total: row.total,
            payment_method: row.payment_method.parse().map_err(AppError::Internal)?,
            payment_status: row.payment_status.parse().map_err(AppError::Internal)?,
            refund_amount: row.refund_amount,
            refund_reason: row.refund_reason,
            refunded_at: row.refunded_at,
            refunded_by: row.refunded_by,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for an order item
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
    subtotal: Decimal,
    created_at: DateTime<Utc>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            subtotal: row.subtotal,
            created_at: row.created_at,
        }
    }
}

const ORDER_COLUMNS: &str = "id, order_number, customer_id, subtotal, discount, total, \
     payment_method, payment_status, refund_amount, refund_reason, refunded_at, refunded_by, \
     notes, created_by, created_at, updated_at";

const ORDER_ITEM_COLUMNS: &str =
    "id, order_id, product_id, product_name, quantity, unit_price, subtotal, created_at";

/// One line of a checkout request
#[derive(Debug, Deserialize)]
pub struct CreateOrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Input for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub items: Vec<CreateOrderItemInput>,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<Uuid>,
    pub discount: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for refunding an order
#[derive(Debug, Deserialize)]
pub struct RefundOrderInput {
    pub amount: Decimal,
    pub reason: Option<String>,
}

/// Query filter for listing orders
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub payment_status: Option<PaymentStatus>,
    pub limit: Option<i64>,
}

/// Ingredient requirements for a basket: ingredient_id -> total required
type Requirements = HashMap<Uuid, Decimal>;

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create and pay an order, deducting ingredient stock via recipes
    pub async fn create_order(
        &self,
        input: CreateOrderInput,
        created_by: Uuid,
    ) -> AppResult<OrderWithItems> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "An order needs at least one item".to_string(),
                message_th: "ออเดอร์ต้องมีรายการอย่างน้อยหนึ่งรายการ".to_string(),
            });
        }
        for item in &input.items {
            if let Err(msg) = validate_order_quantity(item.quantity) {
                return Err(AppError::Validation {
                    field: "items.quantity".to_string(),
                    message: msg.to_string(),
                    message_th: "จำนวนสินค้าต้องมีอย่างน้อย 1".to_string(),
                });
            }
        }

        let product_ids: Vec<Uuid> = input.items.iter().map(|i| i.product_id).collect();

        // Load the products being sold and snapshot names/prices
        let products = sqlx::query_as::<_, (Uuid, String, Decimal, bool)>(
            "SELECT id, name, price, is_active FROM products WHERE id = ANY($1)",
        )
        .bind(&product_ids)
        .fetch_all(&self.db)
        .await?;
        let products: HashMap<Uuid, (String, Decimal, bool)> = products
            .into_iter()
            .map(|(id, name, price, active)| (id, (name, price, active)))
            .collect();

        for item in &input.items {
            match products.get(&item.product_id) {
                None => return Err(AppError::NotFound("Product".to_string())),
                Some((name, _, false)) => {
                    return Err(AppError::Validation {
                        field: "items.product_id".to_string(),
                        message: format!("Product {} is not available", name),
                        message_th: format!("สินค้า {} ไม่พร้อมขาย", name),
                    })
                }
                Some(_) => {}
            }
        }

        // Validate the customer reference up front
        if let Some(customer_id) = input.customer_id {
            let exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
                    .bind(customer_id)
                    .fetch_one(&self.db)
                    .await?;
            if !exists {
                return Err(AppError::NotFound("Customer".to_string()));
            }
        }

        // Totals
        let subtotal: Decimal = input
            .items
            .iter()
            .map(|i| products[&i.product_id].1 * Decimal::from(i.quantity))
            .sum();
        let discount = input.discount.unwrap_or(Decimal::ZERO);
        if discount < Decimal::ZERO || discount > subtotal {
            return Err(AppError::Validation {
                field: "discount".to_string(),
                message: "Discount must be between 0 and the order subtotal".to_string(),
                message_th: "ส่วนลดต้องอยู่ระหว่าง 0 ถึงยอดรวมก่อนหักส่วนลด".to_string(),
            });
        }
        let total = subtotal - discount;

        // Explode recipes into aggregate ingredient requirements
        let requirements = self.aggregate_requirements(&input.items).await?;

        // Pre-flight: the WHOLE basket must be coverable before anything is
        // deducted, so a shortage reports the exact gap instead of a partial
        // failure mid-deduction
        self.preflight_stock_check(&requirements).await?;

        let mut tx = self.db.begin().await?;

        let order_number = next_order_number(&mut tx).await?;
        let order_row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO orders (order_number, customer_id, subtotal, discount, total,
                                payment_method, payment_status, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(&order_number)
        .bind(input.customer_id)
        .bind(subtotal)
        .bind(discount)
        .bind(total)
        .bind(input.payment_method.as_str())
        .bind(PaymentStatus::Paid.as_str())
        .bind(&input.notes)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let (name, price, _) = &products[&item.product_id];
            let line_subtotal = *price * Decimal::from(item.quantity);
            let item_row = sqlx::query_as::<_, OrderItemRow>(&format!(
                r#"
                INSERT INTO order_items (order_id, product_id, product_name, quantity,
                                         unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {ORDER_ITEM_COLUMNS}
                "#
            ))
            .bind(order_row.id)
            .bind(item.product_id)
            .bind(name)
            .bind(item.quantity)
            .bind(price)
            .bind(line_subtotal)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item_row.into());
        }

        // Deduct every required ingredient; the guarded update inside
        // record_movement_tx re-checks stock atomically, so a concurrent
        // order racing past the pre-flight still cannot overdraw - this
        // whole transaction rolls back instead
        for (ingredient_id, required) in &requirements {
            record_movement_tx(
                &mut tx,
                &MovementInput {
                    ingredient_id: *ingredient_id,
                    movement_type: MovementType::Out,
                    direction: StockDirection::Out,
                    quantity: *required,
                    reference_type: Some(ReferenceType::Order),
                    reference_id: Some(order_row.id),
                    unit_cost: None,
                    notes: Some(format!("Order {}", order_number)),
                    created_by,
                },
            )
            .await?;
        }

        // Keep CRM counters in step with the sale
        if let Some(customer_id) = input.customer_id {
            sqlx::query(
                r#"
                UPDATE customers
                SET order_count = order_count + 1, total_spent = total_spent + $1,
                    updated_at = NOW()
                WHERE id = $2
                "#,
            )
            .bind(total)
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(OrderWithItems {
            order: order_row.try_into()?,
            items,
        })
    }

    /// Refund an order, fully or partially
    ///
    /// A full refund re-credits recipe ingredients and rolls back the
    /// customer's counters; a partial refund records the refund fields only
    /// and does not touch stock (returned money, not returned goods).
    pub async fn refund_order(
        &self,
        order_id: Uuid,
        input: RefundOrderInput,
        refunded_by: Uuid,
    ) -> AppResult<OrderWithItems> {
        let mut tx = self.db.begin().await?;

        let order_row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        if order_row.payment_status == PaymentStatus::Refunded.as_str()
            || order_row.refund_amount.is_some()
        {
            return Err(AppError::AlreadyRefunded);
        }
        if let Err(msg) = validate_refund_amount(input.amount, order_row.total) {
            if input.amount > order_row.total {
                return Err(AppError::RefundExceedsTotal);
            }
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: msg.to_string(),
                message_th: "ยอดคืนเงินต้องเป็นค่าบวก".to_string(),
            });
        }

        let full_refund = input.amount == order_row.total;

        if full_refund {
            // Re-credit every ingredient the sale consumed
            let items = self.load_items_tx(&mut tx, order_id).await?;
            let item_inputs: Vec<CreateOrderItemInput> = items
                .iter()
                .map(|i| CreateOrderItemInput {
                    product_id: i.product_id,
                    quantity: i.quantity,
                })
                .collect();
            let requirements = aggregate_requirements_tx(&mut tx, &item_inputs).await?;

            for (ingredient_id, quantity) in &requirements {
                record_movement_tx(
                    &mut tx,
                    &MovementInput {
                        ingredient_id: *ingredient_id,
                        movement_type: MovementType::In,
                        direction: StockDirection::In,
                        quantity: *quantity,
                        reference_type: Some(ReferenceType::Refund),
                        reference_id: Some(order_id),
                        unit_cost: None,
                        notes: Some(format!("Refund of order {}", order_row.order_number)),
                        created_by: refunded_by,
                    },
                )
                .await?;
            }

            // Roll the customer's counters back, floored at zero
            if let Some(customer_id) = order_row.customer_id {
                sqlx::query(
                    r#"
                    UPDATE customers
                    SET order_count = GREATEST(order_count - 1, 0),
                        total_spent = GREATEST(total_spent - $1, 0),
                        updated_at = NOW()
                    WHERE id = $2
                    "#,
                )
                .bind(order_row.total)
                .bind(customer_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        let new_status = if full_refund {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::Paid
        };

        let updated = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders
            SET payment_status = $1, refund_amount = $2, refund_reason = $3,
                refunded_at = NOW(), refunded_by = $4, updated_at = NOW()
            WHERE id = $5 AND refund_amount IS NULL
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(new_status.as_str())
        .bind(input.amount)
        .bind(&input.reason)
        .bind(refunded_by)
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::AlreadyRefunded)?;

        let items = self.load_items_tx(&mut tx, order_id).await?;
        tx.commit().await?;

        Ok(OrderWithItems {
            order: updated.try_into()?,
            items,
        })
    }

    /// Get one order with its items
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<OrderWithItems> {
        let order_row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let item_rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY created_at ASC"
        ))
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(OrderWithItems {
            order: order_row.try_into()?,
            items: item_rows.into_iter().map(OrderItem::from).collect(),
        })
    }

    /// List orders, most recent first
    pub async fn list_orders(&self, query: ListOrdersQuery) -> AppResult<Vec<Order>> {
        let limit = query.limit.unwrap_or(50).clamp(1, 500);

        let rows = match query.payment_status {
            Some(status) => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    r#"
                    SELECT {ORDER_COLUMNS} FROM orders
                    WHERE payment_status = $1
                    ORDER BY created_at DESC
                    LIMIT $2
                    "#
                ))
                .bind(status.as_str())
                .bind(limit)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(&self.db)
                .await?
            }
        };

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Sum each ingredient's requirement across the whole basket
    async fn aggregate_requirements(
        &self,
        items: &[CreateOrderItemInput],
    ) -> AppResult<Requirements> {
        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let recipe_rows = sqlx::query_as::<_, (Uuid, Uuid, Decimal)>(
            "SELECT product_id, ingredient_id, qty_per_unit FROM recipes WHERE product_id = ANY($1)",
        )
        .bind(&product_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(fold_requirements(items, &recipe_rows))
    }

    async fn load_items_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> AppResult<Vec<OrderItem>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY created_at ASC"
        ))
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    /// Verify every ingredient across every item is in stock before any
    /// deduction happens, reporting the first shortage in full
    async fn preflight_stock_check(&self, requirements: &Requirements) -> AppResult<()> {
        if requirements.is_empty() {
            return Ok(());
        }

        let ingredient_ids: Vec<Uuid> = requirements.keys().copied().collect();
        let stocks = sqlx::query_as::<_, (Uuid, String, Decimal)>(
            "SELECT id, name, current_stock FROM ingredients WHERE id = ANY($1)",
        )
        .bind(&ingredient_ids)
        .fetch_all(&self.db)
        .await?;
        let stocks: HashMap<Uuid, (String, Decimal)> = stocks
            .into_iter()
            .map(|(id, name, stock)| (id, (name, stock)))
            .collect();

        for (ingredient_id, required) in requirements {
            match stocks.get(ingredient_id) {
                None => return Err(AppError::NotFound("Ingredient".to_string())),
                Some((name, available)) if available < required => {
                    return Err(AppError::InsufficientStock {
                        ingredient: name.clone(),
                        available: *available,
                        requested: *required,
                    });
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

/// Sum recipe lines into per-ingredient requirements
///
/// Zero-quantity recipe lines are legal, so ingredients whose total
/// requirement folds to zero are dropped rather than sent to the ledger.
fn fold_requirements(
    items: &[CreateOrderItemInput],
    recipe_rows: &[(Uuid, Uuid, Decimal)],
) -> Requirements {
    let mut requirements = Requirements::new();
    for item in items {
        for (product_id, ingredient_id, qty_per_unit) in recipe_rows {
            if *product_id == item.product_id {
                let required = *qty_per_unit * Decimal::from(item.quantity);
                *requirements.entry(*ingredient_id).or_insert(Decimal::ZERO) += required;
            }
        }
    }
    requirements.retain(|_, required| *required > Decimal::ZERO);
    requirements
}

/// Transaction-scoped variant of requirement aggregation (used by refunds)
async fn aggregate_requirements_tx(
    tx: &mut Transaction<'_, Postgres>,
    items: &[CreateOrderItemInput],
) -> AppResult<Requirements> {
    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let recipe_rows = sqlx::query_as::<_, (Uuid, Uuid, Decimal)>(
        "SELECT product_id, ingredient_id, qty_per_unit FROM recipes WHERE product_id = ANY($1)",
    )
    .bind(&product_ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(fold_requirements(items, &recipe_rows))
}

/// Generate a human-readable order number like ORD-20250807-0042
async fn next_order_number(tx: &mut Transaction<'_, Postgres>) -> AppResult<String> {
    let today_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM orders WHERE created_at::date = CURRENT_DATE",
    )
    .fetch_one(&mut **tx)
    .await?;

    let today = Utc::now().format("%Y%m%d");
    Ok(format!("ORD-{}-{:04}", today, today_count + 1))
}
