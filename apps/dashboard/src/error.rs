//! # API Error Type
//!
//! Unified error type for dashboard commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in TonerDesk                              │
//! │                                                                         │
//! │  CLI surface                  Command layer                             │
//! │  ───────────                  ─────────────                             │
//! │                                                                         │
//! │  tonerdesk order arrive <id>                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │  DbError::NotFound ──────────────────┐                           │  │
//! │  │         │                            ▼                           │  │
//! │  │  CoreError::OutOfStock ─────────── ApiError { code, message } ──►│  │
//! │  │         │                                                        │  │
//! │  │  Success ───────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The original dashboard caught every failure in a try/catch and         │
//! │  raised a toast; here the CLI prints `[CODE] message` and exits         │
//! │  non-zero. The code stays machine-readable for --json consumers.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tonerdesk_core::CoreError;
use tonerdesk_db::DbError;

/// API error returned from dashboard commands.
///
/// ## Serialization
/// With `--json` this is what failure output looks like:
/// ```json
/// {
///   "code": "OUT_OF_STOCK",
///   "message": "No stock of CF287A available at any printer"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business rule violation (already arrived, already returned, …)
    BusinessLogic,

    /// Internal error
    Internal,

    /// No consumable source can satisfy the request
    OutOfStock,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::CheckViolation { message } => {
                ApiError::new(ErrorCode::BusinessLogic, message)
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PrinterNotFound(id) => ApiError::not_found("Printer", &id),
            CoreError::ModelNotFound(id) => ApiError::not_found("Supply model", &id),
            CoreError::NoModelAssigned { printer, kind } => ApiError::new(
                ErrorCode::BusinessLogic,
                format!("Printer {} has no {} model assigned", printer, kind),
            ),
            CoreError::OutOfStock { model } => ApiError::new(
                ErrorCode::OutOfStock,
                format!("No stock of {} available at any printer", model),
            ),
            CoreError::InsufficientInventory {
                printer,
                model,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::OutOfStock,
                format!(
                    "Insufficient inventory of {} at {}: {} available, {} requested",
                    model, printer, available, requested
                ),
            ),
            CoreError::InvalidOrderStatus {
                order_id,
                current_status,
            } => ApiError::new(
                ErrorCode::BusinessLogic,
                format!("Order {} is {}", order_id, current_status),
            ),
            CoreError::InvalidLoanStatus {
                loan_id,
                current_status,
            } => ApiError::new(
                ErrorCode::BusinessLogic,
                format!("Loan {} is {}", loan_id, current_status),
            ),
            CoreError::QuantityTooLarge { requested, max } => ApiError::new(
                ErrorCode::ValidationError,
                format!("Quantity {} exceeds maximum allowed ({})", requested, max),
            ),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<tonerdesk_core::ValidationError> for ApiError {
    fn from(err: tonerdesk_core::ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
