//! Error handling for the Restaurant POS Management Platform
//!
//! Provides consistent error responses in Thai and English

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_th: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Inventory errors
    #[error("Insufficient stock of {ingredient}: available {available}, requested {requested}")]
    InsufficientStock {
        ingredient: String,
        available: Decimal,
        requested: Decimal,
    },

    // Attendance errors
    #[error("Clock-out must be after clock-in")]
    InvalidTimeRange,

    #[error("Employee is already clocked in")]
    AlreadyClockedIn,

    #[error("Employee has no active clock-in")]
    NoActiveClockIn,

    // Refund errors
    #[error("Order has already been refunded")]
    AlreadyRefunded,

    #[error("Refund amount exceeds the order total")]
    RefundExceedsTotal,

    // Stock count errors
    #[error("Stock count is already completed")]
    AlreadyCompleted,

    #[error("Completed stock counts cannot be deleted")]
    CannotDeleteCompleted,

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_th: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "TOKEN_EXPIRED".to_string(),
                    message_en: "Token has expired".to_string(),
                    message_th: "โทเค็นหมดอายุแล้ว".to_string(),
                    field: None,
                },
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_TOKEN".to_string(),
                    message_en: "Invalid token".to_string(),
                    message_th: "โทเค็นไม่ถูกต้อง".to_string(),
                    field: None,
                },
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "INSUFFICIENT_PERMISSIONS".to_string(),
                    message_en: "You do not have permission to perform this action".to_string(),
                    message_th: "คุณไม่มีสิทธิ์ในการดำเนินการนี้".to_string(),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_th,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_th: message_th.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_th: format!("ข้อมูลไม่ถูกต้อง: {}", msg),
                    field: None,
                },
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message_en: format!("A record with this {} already exists", field),
                    message_th: format!("มีข้อมูล {} นี้อยู่แล้ว", field),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_th: format!("ไม่พบ {}", resource),
                    field: None,
                },
            ),
            AppError::InsufficientStock {
                ingredient,
                available,
                requested,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message_en: format!(
                        "Insufficient stock of {}: available {}, requested {}",
                        ingredient, available, requested
                    ),
                    message_th: format!(
                        "วัตถุดิบ {} ไม่เพียงพอ: คงเหลือ {} ต้องการ {}",
                        ingredient, available, requested
                    ),
                    field: None,
                },
            ),
            AppError::InvalidTimeRange => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_TIME_RANGE".to_string(),
                    message_en: "Clock-out must be after clock-in".to_string(),
                    message_th: "เวลาออกงานต้องอยู่หลังเวลาเข้างาน".to_string(),
                    field: None,
                },
            ),
            AppError::AlreadyClockedIn => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "ALREADY_CLOCKED_IN".to_string(),
                    message_en: "Employee is already clocked in".to_string(),
                    message_th: "พนักงานลงเวลาเข้างานอยู่แล้ว".to_string(),
                    field: None,
                },
            ),
            AppError::NoActiveClockIn => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "NO_ACTIVE_CLOCK_IN".to_string(),
                    message_en: "Employee has no active clock-in".to_string(),
                    message_th: "พนักงานยังไม่ได้ลงเวลาเข้างาน".to_string(),
                    field: None,
                },
            ),
            AppError::AlreadyRefunded => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "ALREADY_REFUNDED".to_string(),
                    message_en: "Order has already been refunded".to_string(),
                    message_th: "ออเดอร์นี้ถูกคืนเงินไปแล้ว".to_string(),
                    field: None,
                },
            ),
            AppError::RefundExceedsTotal => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "REFUND_EXCEEDS_TOTAL".to_string(),
                    message_en: "Refund amount exceeds the order total".to_string(),
                    message_th: "ยอดคืนเงินเกินยอดรวมของออเดอร์".to_string(),
                    field: None,
                },
            ),
            AppError::AlreadyCompleted => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "ALREADY_COMPLETED".to_string(),
                    message_en: "Stock count is already completed".to_string(),
                    message_th: "การนับสต๊อกนี้เสร็จสิ้นไปแล้ว".to_string(),
                    field: None,
                },
            ),
            AppError::CannotDeleteCompleted => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CANNOT_DELETE_COMPLETED".to_string(),
                    message_en: "Completed stock counts cannot be deleted".to_string(),
                    message_th: "ไม่สามารถลบการนับสต๊อกที่เสร็จสิ้นแล้วได้".to_string(),
                    field: None,
                },
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_STATE_TRANSITION".to_string(),
                    message_en: msg.clone(),
                    message_th: format!("ไม่สามารถเปลี่ยนสถานะได้: {}", msg),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_th: "เกิดข้อผิดพลาดกับฐานข้อมูล".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_th: "เกิดข้อผิดพลาดภายในเซิร์ฟเวอร์".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_th: "เกิดข้อผิดพลาดภายในเซิร์ฟเวอร์".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
