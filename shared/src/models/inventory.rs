//! Inventory models: ingredients and the stock movement ledger

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ingredient tracked in inventory
///
/// `current_stock` is a running total owned by the inventory ledger; every
/// change to it is paired with an append-only [`StockMovement`] row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub name_th: Option<String>,
    /// Unit of measure (e.g. "kg", "g", "l", "pcs")
    pub unit: String,
    pub current_stock: Decimal,
    /// Reorder threshold
    pub min_stock: Decimal,
    /// Manually maintained reference cost
    pub cost_per_unit: Decimal,
    /// Weighted average of purchase costs, updated on stock-in
    pub avg_cost_per_unit: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kinds of stock movements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
        }
    }
}

impl std::str::FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementType::In),
            "out" => Ok(MovementType::Out),
            "adjustment" => Ok(MovementType::Adjustment),
            other => Err(format!("unknown movement type: {}", other)),
        }
    }
}

/// Direction of a movement's effect on stock
///
/// `In` and `Out` movements imply their direction; adjustments carry either.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StockDirection {
    In,
    Out,
}

impl StockDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockDirection::In => "in",
            StockDirection::Out => "out",
        }
    }

    /// Signed stock delta for a positive quantity magnitude
    pub fn signed(&self, quantity: Decimal) -> Decimal {
        match self {
            StockDirection::In => quantity,
            StockDirection::Out => -quantity,
        }
    }
}

impl std::str::FromStr for StockDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(StockDirection::In),
            "out" => Ok(StockDirection::Out),
            other => Err(format!("unknown stock direction: {}", other)),
        }
    }
}

/// Entity that originated a stock movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Order,
    Refund,
    Purchase,
    StockCount,
    Manual,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Order => "order",
            ReferenceType::Refund => "refund",
            ReferenceType::Purchase => "purchase",
            ReferenceType::StockCount => "stock_count",
            ReferenceType::Manual => "manual",
        }
    }
}

impl std::str::FromStr for ReferenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(ReferenceType::Order),
            "refund" => Ok(ReferenceType::Refund),
            "purchase" => Ok(ReferenceType::Purchase),
            "stock_count" => Ok(ReferenceType::StockCount),
            "manual" => Ok(ReferenceType::Manual),
            other => Err(format!("unknown reference type: {}", other)),
        }
    }
}

/// An immutable stock ledger entry
///
/// `previous_stock` and `new_stock` are snapshots taken when the movement was
/// written; `new_stock = previous_stock ± quantity` per direction. Corrections
/// are recorded as new movements, never edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub movement_type: MovementType,
    pub direction: StockDirection,
    /// Always a positive magnitude; the sign lives in `direction`
    pub quantity: Decimal,
    pub previous_stock: Decimal,
    pub new_stock: Decimal,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<Uuid>,
    pub unit_cost: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Fold one movement into a running stock figure (used for log replay)
pub fn replay_movement(current: Decimal, direction: StockDirection, quantity: Decimal) -> Decimal {
    current + direction.signed(quantity)
}

/// Weighted average cost after receiving `incoming_qty` at `incoming_cost`
///
/// Returns the incoming cost when there is no prior stock or value.
pub fn weighted_average_cost(
    current_qty: Decimal,
    current_avg: Decimal,
    incoming_qty: Decimal,
    incoming_cost: Decimal,
) -> Decimal {
    let new_total_qty = current_qty + incoming_qty;
    if new_total_qty <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let total_value = current_qty * current_avg + incoming_qty * incoming_cost;
    total_value / new_total_qty
}
