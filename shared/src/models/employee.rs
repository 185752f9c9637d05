//! Employee models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an employee is paid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayType {
    Hourly,
    Monthly,
}

impl PayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayType::Hourly => "hourly",
            PayType::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for PayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(PayType::Hourly),
            "monthly" => Ok(PayType::Monthly),
            other => Err(format!("unknown pay type: {}", other)),
        }
    }
}

/// A staff member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub name_th: Option<String>,
    /// Authorization role (e.g. "manager", "cashier", "kitchen")
    pub role: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pay_type: PayType,
    pub hourly_rate: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
