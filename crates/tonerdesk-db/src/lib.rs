//! # tonerdesk-db: Database Layer for TonerDesk
//!
//! This crate provides database access for the TonerDesk system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TonerDesk Data Flow                              │
//! │                                                                         │
//! │  Dashboard command (mark_order_arrived)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   tonerdesk-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (order.rs,    │    │  (embedded)  │  │   │
//! │  │   │               │    │  loan.rs, …)  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepo     │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ LoanRepo      │    │ 002_outbox   │  │   │
//! │  │   │ Management    │    │ InventoryRepo │    │ .sql         │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode, foreign keys on)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (printer, order, loan, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tonerdesk_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/tonerdesk.db")).await?;
//!
//! // Repositories hang off the database handle
//! let printers = db.printers().list(true).await?;
//! let arrived = db.orders().mark_arrived("order-uuid").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::account::AccountRepository;
pub use repository::history::HistoryRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::loan::LoanRepository;
pub use repository::order::OrderRepository;
pub use repository::outbox::MirrorOutboxRepository;
pub use repository::printer::PrinterRepository;
pub use repository::supply::SupplyModelRepository;
pub use repository::ticket::TicketRepository;
