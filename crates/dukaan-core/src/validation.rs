//! # Validation Module
//!
//! Input validation utilities for Dukaan POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service entry (dukaan-app)                                   │
//! │  ├── THIS MODULE: field validation before any storage call             │
//! │  └── Rejected synchronously, never reaches the database                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL DEFAULT 0 on numerics (missing values count as zero)     │
//! │  ├── UNIQUE constraints (user email)                                   │
//! │  └── Foreign key constraints (sale_lines → sales)                      │
//! │                                                                         │
//! │  Defense in depth: each layer catches different errors                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item or prize name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a customer name. Same rules as item names but a different
/// field label in the error.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Empty is allowed (walk-in customer without a phone)
/// - Otherwise: optional leading `+`, then 7 to 15 digits
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Ok(());
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);

    if digits.len() < 7 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone number".to_string(),
            reason: "must be 7-15 digits, optionally prefixed with +".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address (presence of a single `@` with non-empty
/// local part and a dotted domain; full RFC parsing is not attempted).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain.tld".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale line quantity.
///
/// ## Rules
/// - Must be strictly positive and finite
pub fn validate_quantity(qty: f64) -> ValidationResult<()> {
    if !qty.is_finite() || qty <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a rate (price per unit).
///
/// ## Rules
/// - Must be non-negative and finite (zero allowed for giveaways)
pub fn validate_rate(rate: f64) -> ValidationResult<()> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "rate".to_string(),
        });
    }

    Ok(())
}

/// Validates a price field on an inventory item.
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Parses a user-entered numeric string, treating blank or malformed
/// input as zero.
///
/// ## Why parse-or-zero?
/// Form fields arrive as strings; missing numerics count as zero in every
/// reducer, so entry-side parsing follows the same policy.
pub fn parse_or_zero(input: &str) -> f64 {
    input.trim().parse::<f64>().unwrap_or(0.0)
}

// =============================================================================
// Unit Tests
// =============================================================================
