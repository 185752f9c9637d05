//! Employee service: staff records used by attendance and payroll

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{validate_email, validate_thai_phone, Employee, PayType};

/// Employee service
#[derive(Clone)]
pub struct EmployeeService {
    db: PgPool,
}

/// Database row for an employee
#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: Uuid,
    name: String,
    name_th: Option<String>,
    role: String,
    phone: Option<String>,
    email: Option<String>,
    pay_type: String,
    hourly_rate: Option<Decimal>,
    monthly_rate: Option<Decimal>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = AppError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(Employee {
            id: row.id,
            name: row.name,
            name_th: row.name_th,
            role: row.role,
            phone: row.phone,
            email: row.email,
            pay_type: row.pay_type.parse().map_err(AppError::Internal)?,
            hourly_rate: row.hourly_rate,
            monthly_rate: row.monthly_rate,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const EMPLOYEE_COLUMNS: &str = "id, name, name_th, role, phone, email, pay_type, hourly_rate, \
     monthly_rate, is_active, created_at, updated_at";

/// Input for creating an employee
#[derive(Debug, Deserialize)]
pub struct CreateEmployeeInput {
    pub name: String,
    pub name_th: Option<String>,
    pub role: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pay_type: PayType,
    pub hourly_rate: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
}

/// Input for updating an employee
#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeInput {
    pub name: Option<String>,
    pub name_th: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pay_type: Option<PayType>,
    pub hourly_rate: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl EmployeeService {
    /// Create a new EmployeeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an employee
    pub async fn create(&self, input: CreateEmployeeInput) -> AppResult<Employee> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Employee name is required".to_string(),
                message_th: "ต้องระบุชื่อพนักงาน".to_string(),
            });
        }
        if let Some(phone) = &input.phone {
            if let Err(msg) = validate_thai_phone(phone) {
                return Err(AppError::Validation {
                    field: "phone".to_string(),
                    message: msg.to_string(),
                    message_th: "รูปแบบเบอร์โทรศัพท์ไม่ถูกต้อง".to_string(),
                });
            }
        }
        if let Some(email) = &input.email {
            if let Err(msg) = validate_email(email) {
                return Err(AppError::Validation {
                    field: "email".to_string(),
                    message: msg.to_string(),
                    message_th: "รูปแบบอีเมลไม่ถูกต้อง".to_string(),
                });
            }
        }

        // The rate matching the pay type must be present
        match input.pay_type {
            PayType::Hourly if input.hourly_rate.is_none() => {
                return Err(AppError::Validation {
                    field: "hourly_rate".to_string(),
                    message: "Hourly employees need an hourly rate".to_string(),
                    message_th: "พนักงานรายชั่วโมงต้องระบุค่าแรงต่อชั่วโมง".to_string(),
                });
            }
            PayType::Monthly if input.monthly_rate.is_none() => {
                return Err(AppError::Validation {
                    field: "monthly_rate".to_string(),
                    message: "Monthly employees need a monthly rate".to_string(),
                    message_th: "พนักงานรายเดือนต้องระบุเงินเดือน".to_string(),
                });
            }
            _ => {}
        }

        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r#"
            INSERT INTO employees (name, name_th, role, phone, email, pay_type, hourly_rate,
                                   monthly_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.name_th)
        .bind(&input.role)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(input.pay_type.as_str())
        .bind(input.hourly_rate)
        .bind(input.monthly_rate)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Update an employee
    pub async fn update(&self, employee_id: Uuid, input: UpdateEmployeeInput) -> AppResult<Employee> {
        let existing = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(employee_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))?;

        let pay_type = match input.pay_type {
            Some(pt) => pt.as_str().to_string(),
            None => existing.pay_type,
        };

        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r#"
            UPDATE employees
            SET name = $1, name_th = $2, role = $3, phone = $4, email = $5, pay_type = $6,
                hourly_rate = $7, monthly_rate = $8, is_active = $9, updated_at = NOW()
            WHERE id = $10
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.name_th.or(existing.name_th))
        .bind(input.role.unwrap_or(existing.role))
        .bind(input.phone.or(existing.phone))
        .bind(input.email.or(existing.email))
        .bind(pay_type)
        .bind(input.hourly_rate.or(existing.hourly_rate))
        .bind(input.monthly_rate.or(existing.monthly_rate))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(employee_id)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Get a single employee
    pub async fn get(&self, employee_id: Uuid) -> AppResult<Employee> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(employee_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))?;

        row.try_into()
    }

    /// List employees, alphabetically
    pub async fn list(&self) -> AppResult<Vec<Employee>> {
        let rows = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY name ASC"
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Employee::try_from).collect()
    }
}
