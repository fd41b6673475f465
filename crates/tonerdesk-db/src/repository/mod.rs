//! # Repository Module
//!
//! Database repository implementations for TonerDesk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Each repository owns one aggregate and the writes that must be         │
//! │  atomic with it:                                                        │
//! │                                                                         │
//! │  PrinterRepository      printers                                        │
//! │  SupplyModelRepository  supply_models                                   │
//! │  InventoryRepository    inventory                                       │
//! │  OrderRepository        toner_orders  + inventory upsert on arrival     │
//! │  LoanRepository         toner_loans   + lender/borrower adjustments     │
//! │  HistoryRepository      toner_changes + empty_toners + change flow      │
//! │  TicketRepository       service_tickets                                 │
//! │  AccountRepository      users, operators                                │
//! │  MirrorOutboxRepository mirror_outbox                                   │
//! │                                                                         │
//! │  Multi-table flows (arrival, loan return, toner change) run inside      │
//! │  one transaction in their owning repository, with status flips          │
//! │  guarded by conditional UPDATEs so each transition happens exactly      │
//! │  once.                                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod account;
pub mod history;
pub mod inventory;
pub mod loan;
pub mod order;
pub mod outbox;
pub mod printer;
pub mod supply;
pub mod ticket;

// =============================================================================
// Shared Test Fixtures
// =============================================================================

/// Fixture builders shared by the repository test modules.
///
/// Each helper inserts a minimal valid row and returns it, so tests read as
/// scenario setup rather than field-by-field construction.
#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::pool::Database;
    use tonerdesk_core::{Printer, SupplyKind, SupplyModel};

    /// Inserts an active printer with sane defaults.
    pub async fn printer(db: &Database, name: &str) -> Printer {
        let now = Utc::now();
        let printer = Printer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            location: "test office".to_string(),
            address: format!("{}.lan", name.to_lowercase().replace(' ', "-")),
            serial: None,
            toner_model_id: None,
            fuser_model_id: None,
            daily_pages: 100,
            toner_level_pct: 100,
            fuser_level_pct: 100,
            is_active: true,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        db.printers().insert(&printer).await.unwrap();
        printer
    }

    /// Inserts an active toner model.
    pub async fn model(db: &Database, name: &str, capacity_pages: i64) -> SupplyModel {
        let now = Utc::now();
        let model = SupplyModel {
            id: Uuid::new_v4().to_string(),
            kind: SupplyKind::Toner,
            name: name.to_string(),
            capacity_pages,
            color: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.supply_models().insert(&model).await.unwrap();
        model
    }

    /// Assigns a toner model to a printer and returns the updated row.
    pub async fn assign_toner_model(db: &Database, printer: &Printer, model: &SupplyModel) -> Printer {
        let mut updated = printer.clone();
        updated.toner_model_id = Some(model.id.clone());
        db.printers().update(&updated).await.unwrap();
        updated
    }
}
