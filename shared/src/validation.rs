//! Validation utilities for the Restaurant POS Management Platform
//!
//! Includes Thailand-specific validations for customer and staff records.

use rust_decimal::Decimal;

// ============================================================================
// POS Domain Validations
// ============================================================================

/// Validate that a stock quantity is a positive magnitude
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate that a recipe consumes a non-negative amount per unit sold
pub fn validate_recipe_quantity(qty_per_unit: Decimal) -> Result<(), &'static str> {
    if qty_per_unit < Decimal::ZERO {
        return Err("Recipe quantity per unit cannot be negative");
    }
    Ok(())
}

/// Validate a monetary amount is non-negative
pub fn validate_money(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

/// Validate a refund amount against the order total
pub fn validate_refund_amount(amount: Decimal, order_total: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Refund amount must be positive");
    }
    if amount > order_total {
        return Err("Refund amount cannot exceed the order total");
    }
    Ok(())
}

/// Validate an order line quantity
pub fn validate_order_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Order quantity must be at least 1");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate a product SKU (2-20 uppercase alphanumeric, dashes allowed)
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.len() < 2 {
        return Err("SKU must be at least 2 characters");
    }
    if sku.len() > 20 {
        return Err("SKU must be at most 20 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("SKU must be uppercase alphanumeric (dashes allowed)");
    }
    Ok(())
}

// ============================================================================
// Thailand-Specific Validations
// ============================================================================

/// Validate Thai phone number format
/// Accepts: 0812345678, 081-234-5678, +66812345678
pub fn validate_thai_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Thai mobile: 10 digits starting with 0 (e.g., 0812345678)
    if digits.len() == 10 && digits.starts_with('0') {
        return Ok(());
    }
    // International format without leading 0: 9 digits (e.g., 812345678)
    if digits.len() == 9 && !digits.starts_with('0') {
        return Ok(());
    }
    // International format with country code: 11 digits starting with 66
    if digits.len() == 11 && digits.starts_with("66") {
        return Ok(());
    }

    Err("Invalid Thai phone number format")
}

/// Validate Thai Tax ID (เลขประจำตัวผู้เสียภาษี)
/// 13-digit number for businesses/individuals
pub fn validate_thai_tax_id(tax_id: &str) -> Result<(), &'static str> {
    let digits: String = tax_id.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 13 {
        return Err("Thai Tax ID must be 13 digits");
    }

    // First digit indicates type: 0=individual, 1-9=juristic person
    let first_digit = digits.chars().next().unwrap();
    if !first_digit.is_ascii_digit() {
        return Err("Invalid Thai Tax ID format");
    }

    Ok(())
}
