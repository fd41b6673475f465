//! # Domain Types
//!
//! Core domain types used throughout TonerDesk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Printer      │   │   TonerOrder    │   │    TonerLoan    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  address        │   │  status         │   │  lender (FK)    │       │
//! │  │  daily_pages    │   │  quantity       │   │  borrower (FK)  │       │
//! │  │  toner_level    │   │  arrived_at     │   │  returned_at    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  SupplyModel    │   │  InventoryRow   │   │   TonerChange   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  kind toner|    │   │  printer (FK)   │   │  model_name     │       │
//! │  │       fuser     │   │  model (FK)     │   │  (snapshot)     │       │
//! │  │  capacity_pages │   │  quantity       │   │  append-only    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business name: (printer name, model name) - human-readable, mutable
//!
//! ## Snapshot Pattern
//! Append-only history rows (`TonerChange`, `EmptyToner`) copy the model
//! and printer names at write time. Reference-list CRUD never rewrites
//! history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::level::TonerLevel;

// =============================================================================
// Supply Kind
// =============================================================================

/// The two consumable families the dashboard tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SupplyKind {
    /// Toner cartridge (capacity = rated page yield).
    Toner,
    /// Fuser unit (capacity = rated lifespan in pages).
    Fuser,
}

impl SupplyKind {
    /// Lowercase name, matching the database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SupplyKind::Toner => "toner",
            SupplyKind::Fuser => "fuser",
        }
    }
}

// =============================================================================
// Supply Model
// =============================================================================

/// A consumable part type (toner cartridge or fuser unit).
///
/// The original dashboard kept toner and fuser models as two separate
/// lookup lists; both live in one table here, distinguished by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SupplyModel {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Toner or fuser.
    pub kind: SupplyKind,

    /// Manufacturer part name, e.g. "TK-3160" - unique per kind.
    pub name: String,

    /// Rated page yield (toner) or lifespan (fuser).
    pub capacity_pages: i64,

    /// Toner color, when the model is a color cartridge.
    pub color: Option<String>,

    /// Whether the model is active (soft delete).
    pub is_active: bool,

    /// When the model was created.
    pub created_at: DateTime<Utc>,

    /// When the model was last updated.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Printer
// =============================================================================

/// A tracked office printer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Printer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in lists and history snapshots.
    pub name: String,

    /// Physical location, e.g. "2nd floor, accounting".
    pub location: String,

    /// Network address (hostname or IP).
    pub address: String,

    /// Manufacturer serial number.
    pub serial: Option<String>,

    /// Toner model installed in this printer.
    pub toner_model_id: Option<String>,

    /// Fuser model installed in this printer.
    pub fuser_model_id: Option<String>,

    /// Observed consumption rate in pages per day.
    pub daily_pages: i64,

    /// Current toner level in whole percent (0-100).
    pub toner_level_pct: i64,

    /// Current fuser level in whole percent (0-100).
    pub fuser_level_pct: i64,

    /// Whether the printer is active (soft delete).
    pub is_active: bool,

    /// Free-form notes.
    pub notes: Option<String>,

    /// When the printer was created.
    pub created_at: DateTime<Utc>,

    /// When the printer was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Printer {
    /// Returns the toner level as a typed value.
    #[inline]
    pub fn toner_level(&self) -> TonerLevel {
        TonerLevel::from_pct(self.toner_level_pct)
    }

    /// Returns the fuser level as a typed value.
    #[inline]
    pub fn fuser_level(&self) -> TonerLevel {
        TonerLevel::from_pct(self.fuser_level_pct)
    }

    /// Returns the model id for the given supply kind, if assigned.
    pub fn model_id(&self, kind: SupplyKind) -> Option<&str> {
        match kind {
            SupplyKind::Toner => self.toner_model_id.as_deref(),
            SupplyKind::Fuser => self.fuser_model_id.as_deref(),
        }
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// On-hand quantity of a supply model held at a specific printer.
///
/// Unique on (`printer_id`, `model_id`). Incremented on order arrival,
/// decremented by consumption and outgoing loans.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryRow {
    pub id: String,
    pub printer_id: String,
    pub model_id: String,
    /// On-hand count; never negative.
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of a purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Ordered, not yet delivered.
    #[default]
    Pending,
    /// Delivered and reconciled into inventory.
    Arrived,
}

impl OrderStatus {
    /// Lowercase name, matching the database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Arrived => "arrived",
        }
    }
}

// =============================================================================
// Toner Order
// =============================================================================

/// A purchase request for a supply model, destined for one printer.
///
/// Transitions `pending → arrived` exactly once; arrival adds the ordered
/// quantity to the matching inventory row in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TonerOrder {
    pub id: String,
    pub printer_id: String,
    pub model_id: String,
    pub quantity: i64,
    pub status: OrderStatus,
    /// Name of the person who placed the order (snapshot, not a FK).
    pub ordered_by: String,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub arrived_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Loan Status
// =============================================================================

/// The status of an inter-printer loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Stock moved, return pending.
    #[default]
    Outstanding,
    /// Lender made whole; terminal.
    Returned,
}

impl LoanStatus {
    /// Lowercase name, matching the database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Outstanding => "outstanding",
            LoanStatus::Returned => "returned",
        }
    }
}

// =============================================================================
// Toner Loan
// =============================================================================

/// Records quantity moved from a lender printer's inventory to a borrower.
///
/// Created either explicitly or by the change flow when a printer consumes
/// from another printer's stock. Returning restores the lender's inventory
/// by the loaned quantity, exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TonerLoan {
    pub id: String,
    pub lender_printer_id: String,
    pub borrower_printer_id: String,
    pub model_id: String,
    pub quantity: i64,
    pub status: LoanStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Change Source
// =============================================================================

/// Where the cartridge used in a toner change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ChangeSource {
    /// The printer's own inventory row.
    Stock,
    /// Another printer's inventory, recorded as a loan.
    Borrowed,
}

// =============================================================================
// Toner Change (append-only history)
// =============================================================================

/// One consumable swap. Append-only.
///
/// Uses the snapshot pattern: `model_name` and `changed_by` are copied at
/// write time so reference-list CRUD never rewrites history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TonerChange {
    pub id: String,
    pub printer_id: String,
    /// Model reference; survives as NULL if the model row is ever purged.
    pub model_id: Option<String>,
    /// Model name at time of change (frozen).
    pub model_name: String,
    pub source: ChangeSource,
    /// Set when `source` is borrowed.
    pub lender_printer_id: Option<String>,
    /// Name of the person who swapped the cartridge (frozen).
    pub changed_by: String,
    /// Toner level right before the swap (0-100).
    pub level_before_pct: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Empty Toner (recycling log)
// =============================================================================

/// A swapped-out empty cartridge awaiting recycling pickup. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmptyToner {
    pub id: String,
    pub printer_id: Option<String>,
    /// Printer name at time of swap (frozen).
    pub printer_name: String,
    /// Model name at time of swap (frozen).
    pub model_name: String,
    pub created_at: DateTime<Utc>,
    /// Set when the recycler picked the cartridge up.
    pub collected_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Ticket Status
// =============================================================================

/// The status of a service ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Reported, nobody on it yet.
    #[default]
    Open,
    /// A technician is assigned and working.
    InProgress,
    /// Resolved; terminal unless reopened.
    Closed,
}

impl TicketStatus {
    /// Snake-case name, matching the database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Closed => "closed",
        }
    }
}

// =============================================================================
// Service Ticket
// =============================================================================

/// A repair/service request for a printer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ServiceTicket {
    pub id: String,
    pub printer_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TicketStatus,
    /// Name of the reporter (snapshot, not a FK).
    pub opened_by: String,
    /// Name of the assigned technician (snapshot, not a FK).
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Reference Lists
// =============================================================================

/// A person who orders supplies and swaps cartridges.
///
/// Plain lookup row; flows snapshot the name instead of joining.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An external service technician tickets get assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Operator {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Mirror Outbox
// =============================================================================

/// An entry in the mirror outbox queue.
///
/// The remote store the original dashboard mirrored into is out of scope;
/// the queue records every mutation that would be mirrored, written in the
/// same transaction as the local change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MirrorOutboxEntry {
    pub id: String,
    /// Entity kind being mirrored: "PRINTER", "ORDER", "LOAN", etc.
    pub entity_type: String,
    /// ID of the entity being mirrored.
    pub entity_id: String,
    /// The full entity data as JSON.
    pub payload: String,
    /// Number of mirror attempts.
    pub attempts: i64,
    /// Last error message if a mirror attempt failed.
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    /// When a mirror push was last attempted.
    pub attempted_at: Option<DateTime<Utc>>,
    /// When successfully mirrored.
    pub synced_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(OrderStatus::Arrived.as_str(), "arrived");
    }

    #[test]
    fn test_loan_status_default() {
        assert_eq!(LoanStatus::default(), LoanStatus::Outstanding);
    }

    #[test]
    fn test_ticket_status_as_str() {
        assert_eq!(TicketStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TicketStatus::default(), TicketStatus::Open);
    }

    #[test]
    fn test_printer_model_id_by_kind() {
        let mut printer = Printer {
            id: "p1".to_string(),
            name: "Front Desk".to_string(),
            location: "1st floor".to_string(),
            address: "10.0.0.17".to_string(),
            serial: None,
            toner_model_id: Some("m1".to_string()),
            fuser_model_id: None,
            daily_pages: 120,
            toner_level_pct: 55,
            fuser_level_pct: 90,
            is_active: true,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(printer.model_id(SupplyKind::Toner), Some("m1"));
        assert_eq!(printer.model_id(SupplyKind::Fuser), None);

        printer.fuser_model_id = Some("f1".to_string());
        assert_eq!(printer.model_id(SupplyKind::Fuser), Some("f1"));
    }
}
