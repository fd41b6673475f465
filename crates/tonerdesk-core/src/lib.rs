//! # tonerdesk-core: Pure Business Logic for TonerDesk
//!
//! This crate is the **heart** of TonerDesk. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       TonerDesk Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   Dashboard App (apps/dashboard)                │   │
//! │  │    printer forms ──► order flow ──► change flow ──► reports    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ tonerdesk-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐ │   │
//! │  │   │   types   │  │   level   │  │ allocation │  │ forecast  │ │   │
//! │  │   │  Printer  │  │ TonerLevel│  │  ranking   │  │ depletion │ │   │
//! │  │   │  Order    │  │ PageCount │  │  sources   │  │ projection│ │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  tonerdesk-db (Database Layer)                  │   │
//! │  │             SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Printer, SupplyModel, TonerOrder, etc.)
//! - [`level`] - Integer toner-level and page-count arithmetic (no floats!)
//! - [`forecast`] - Linear depletion forecasting
//! - [`allocation`] - Consumable source ranking (own stock before borrowed)
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Math**: Levels are whole percent, consumption is whole pages
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use tonerdesk_core::level::TonerLevel;
//! use tonerdesk_core::forecast::DepletionForecast;
//!
//! // A cartridge rated for 4,000 pages, currently at 50%,
//! // on a printer that prints 100 pages per day:
//! let forecast = DepletionForecast::project(TonerLevel::from_pct(50), 4000, 100);
//!
//! // 2,000 pages left -> 20 days until empty
//! assert_eq!(forecast.pages_remaining, 2000);
//! assert_eq!(forecast.days_remaining, Some(20));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod error;
pub mod forecast;
pub mod level;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tonerdesk_core::TonerLevel` instead of
// `use tonerdesk_core::level::TonerLevel`

pub use error::{CoreError, ValidationError};
pub use level::TonerLevel;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity accepted for a single order or loan.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Can be made configurable per office in future versions.
pub const MAX_SUPPLY_QUANTITY: i64 = 999;

/// Default low-level threshold in whole percent.
///
/// A printer at or below this toner level is flagged in fleet reports.
/// The dashboard config can override it.
pub const DEFAULT_LOW_LEVEL_PCT: i64 = 10;

/// Default order lead time in days.
///
/// Printers projected to run dry within this window with no stock on hand
/// get an "order suggested" flag in fleet reports.
pub const DEFAULT_ORDER_LEAD_TIME_DAYS: i64 = 7;
