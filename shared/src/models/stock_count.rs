//! Stock count models and status transitions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of stock count
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockCountType {
    Opening,
    Closing,
}

impl StockCountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockCountType::Opening => "opening",
            StockCountType::Closing => "closing",
        }
    }
}

impl std::str::FromStr for StockCountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opening" => Ok(StockCountType::Opening),
            "closing" => Ok(StockCountType::Closing),
            other => Err(format!("unknown stock count type: {}", other)),
        }
    }
}

/// Lifecycle of a stock count
///
/// `draft` is editable; `submitted`/`approved` gate POS operation for the
/// day; `completed` has applied its variance to the ledger and is immutable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockCountStatus {
    Draft,
    Submitted,
    Approved,
    Completed,
}

impl StockCountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockCountStatus::Draft => "draft",
            StockCountStatus::Submitted => "submitted",
            StockCountStatus::Approved => "approved",
            StockCountStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for StockCountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(StockCountStatus::Draft),
            "submitted" => Ok(StockCountStatus::Submitted),
            "approved" => Ok(StockCountStatus::Approved),
            "completed" => Ok(StockCountStatus::Completed),
            other => Err(format!("unknown stock count status: {}", other)),
        }
    }
}

/// Whether a stock count may move from `from` to `to`
///
/// The approval step is optional by deployment policy, so
/// `submitted → completed` is legal alongside `submitted → approved`.
pub fn can_transition(from: StockCountStatus, to: StockCountStatus) -> bool {
    use StockCountStatus::*;
    matches!(
        (from, to),
        (Draft, Submitted) | (Submitted, Approved) | (Submitted, Completed) | (Approved, Completed)
    )
}

/// A stock count header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCount {
    pub id: Uuid,
    pub count_type: StockCountType,
    pub status: StockCountStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A counted line on a stock count
///
/// `system_quantity` is snapshotted from the ingredient when the count is
/// created; `variance = counted_quantity − system_quantity` is computed
/// immediately so it is visible before finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCountItem {
    pub id: Uuid,
    pub stock_count_id: Uuid,
    pub ingredient_id: Uuid,
    pub system_quantity: Decimal,
    pub counted_quantity: Decimal,
    pub variance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Variance of a counted quantity against the system snapshot
pub fn count_variance(counted: Decimal, system: Decimal) -> Decimal {
    counted - system
}
