//! # State Module
//!
//! Explicit application state for the dashboard.
//!
//! ## Why Explicit State Structs?
//! The original dashboard kept everything in one process-wide mutable
//! store that every form reached into. Here state is a pair of focused
//! structs passed by reference into command functions:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐           ┌──────────────────────────────────┐   │
//! │  │     DbState      │           │          ConfigState             │   │
//! │  │                  │           │                                  │   │
//! │  │  Database        │           │  office_name                     │   │
//! │  │  (SQLite pool)   │           │  low_level_pct                   │   │
//! │  │                  │           │  order_lead_time_days            │   │
//! │  └──────────────────┘           └──────────────────────────────────┘   │
//! │                                                                         │
//! │  • Commands declare exactly what they need in their signature           │
//! │  • DbState is thread-safe via the pool; ConfigState is read-only        │
//! │    after startup                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;

pub use config::ConfigState;
pub use db::DbState;
