//! # Error Types
//!
//! Domain-specific error types for tonerdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tonerdesk-core errors (this file)                                     │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tonerdesk-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Dashboard API errors (in app)                                         │
//! │  └── ApiError         - What the CLI surface renders                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → CLI output   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (printer name, model name, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Printer cannot be found.
    #[error("Printer not found: {0}")]
    PrinterNotFound(String),

    /// Supply model cannot be found.
    #[error("Supply model not found: {0}")]
    ModelNotFound(String),

    /// The printer has no supply model of the required kind assigned.
    ///
    /// ## When This Occurs
    /// - Recording a toner change on a printer with no toner model set
    /// - Ordering or forecasting for a printer missing the model reference
    #[error("Printer {printer} has no {kind} model assigned")]
    NoModelAssigned { printer: String, kind: String },

    /// No consumable source could satisfy the request.
    ///
    /// ## When This Occurs
    /// - The printer's own inventory is empty AND no other printer holds
    ///   the same model
    ///
    /// ## User Workflow
    /// ```text
    /// Record toner change (printer: "Accounting HP")
    ///      │
    ///      ▼
    /// Rank sources: own row 0, borrowable rows: none
    ///      │
    ///      ▼
    /// OutOfStock { model: "CF287A" }
    ///      │
    ///      ▼
    /// CLI shows: "No CF287A on hand anywhere - order first"
    /// ```
    #[error("No stock of {model} available at any printer")]
    OutOfStock { model: String },

    /// A decrement would drive an inventory row below zero.
    #[error("Insufficient inventory of {model} at {printer}: available {available}, requested {requested}")]
    InsufficientInventory {
        printer: String,
        model: String,
        available: i64,
        requested: i64,
    },

    /// The order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Marking an already-arrived order arrived a second time
    /// - Cancelling an order that already arrived
    #[error("Order {order_id} is {current_status}, cannot perform operation")]
    InvalidOrderStatus {
        order_id: String,
        current_status: String,
    },

    /// The loan is not in a state that allows the requested operation.
    #[error("Loan {loan_id} is {current_status}, cannot perform operation")]
    InvalidLoanStatus {
        loan_id: String,
        current_status: String,
    },

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid address).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate model name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientInventory {
            printer: "Front Desk".to_string(),
            model: "TK-3160".to_string(),
            available: 1,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient inventory of TK-3160 at Front Desk: available 1, requested 2"
        );

        let err = CoreError::OutOfStock {
            model: "CF287A".to_string(),
        };
        assert_eq!(err.to_string(), "No stock of CF287A available at any printer");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 999");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
