//! # Validation Module
//!
//! Input validation utilities for TonerDesk.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  ├── Type checks (numbers parse, flags exist)                          │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Command function (Rust)                                      │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  The original dashboard checked these rules ad hoc per form;           │
//! │  here they live in one place and every flow calls through.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use tonerdesk_core::validation::{validate_model_name, validate_quantity};
//!
//! validate_model_name("TK-3160").unwrap();
//! validate_quantity(3).unwrap();
//! ```

use crate::error::ValidationError;
use crate::MAX_SUPPLY_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a printer display name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 100 characters
pub fn validate_printer_name(name: &str) -> ValidationResult<()> {
    require_short_text("name", name, 100)
}

/// Validates a supply model name (manufacturer part code).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores,
///   dots, spaces and slashes (covers codes like "TK-3160" and "C13S050614")
pub fn validate_model_name(name: &str) -> ValidationResult<()> {
    require_short_text("model", name, 50)?;

    if !name
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ' | '/'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "model".to_string(),
            reason: "must contain only letters, numbers, and -_./ separators".to_string(),
        });
    }

    Ok(())
}

/// Validates a printer network address (hostname or IP literal).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 253 characters (DNS name limit)
/// - No whitespace
pub fn validate_address(address: &str) -> ValidationResult<()> {
    require_short_text("address", address, 253)?;

    if address.trim().chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "address".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a person name used in `ordered_by` / `changed_by` snapshots.
pub fn validate_person_name(name: &str) -> ValidationResult<()> {
    require_short_text("name", name, 100)
}

/// Validates a ticket title.
pub fn validate_ticket_title(title: &str) -> ValidationResult<()> {
    require_short_text("title", title, 200)
}

fn require_short_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order or loan quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_SUPPLY_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_SUPPLY_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_SUPPLY_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a fill level reading in whole percent.
///
/// ## Rules
/// - Must be between 0 and 100 inclusive
///
/// Manual meter readings go through here; internally computed levels use
/// the clamping [`crate::level::TonerLevel`] constructors instead.
pub fn validate_level_pct(pct: i64) -> ValidationResult<()> {
    if !(0..=100).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: "level".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a consumable's rated capacity in pages.
///
/// ## Rules
/// - Must be positive (a zero-capacity cartridge breaks forecast math)
pub fn validate_capacity_pages(pages: i64) -> ValidationResult<()> {
    if pages <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "capacity_pages".to_string(),
        });
    }

    Ok(())
}

/// Validates an observed daily page rate.
///
/// ## Rules
/// - Must be non-negative (zero means the printer is idle)
pub fn validate_daily_pages(pages: i64) -> ValidationResult<()> {
    if pages < 0 {
        return Err(ValidationError::OutOfRange {
            field: "daily_pages".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Rules
/// - Must be a valid UUID format
/// - 36 characters with hyphens: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_model_name() {
        assert!(validate_model_name("TK-3160").is_ok());
        assert!(validate_model_name("C13S050614").is_ok());
        assert!(validate_model_name("Brother TN-2420").is_ok());

        assert!(validate_model_name("").is_err());
        assert!(validate_model_name("   ").is_err());
        assert!(validate_model_name(&"A".repeat(80)).is_err());
        assert!(validate_model_name("bad#code").is_err());
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("10.0.0.17").is_ok());
        assert!(validate_address("printer-01.office.lan").is_ok());

        assert!(validate_address("").is_err());
        assert!(validate_address("has space").is_err());
        assert!(validate_address(&"a".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_level_pct() {
        assert!(validate_level_pct(0).is_ok());
        assert!(validate_level_pct(100).is_ok());

        assert!(validate_level_pct(-1).is_err());
        assert!(validate_level_pct(101).is_err());
    }

    #[test]
    fn test_validate_capacity_and_rate() {
        assert!(validate_capacity_pages(4000).is_ok());
        assert!(validate_capacity_pages(0).is_err());

        assert!(validate_daily_pages(0).is_ok());
        assert!(validate_daily_pages(250).is_ok());
        assert!(validate_daily_pages(-1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
