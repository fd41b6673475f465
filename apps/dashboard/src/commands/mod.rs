//! # Dashboard Commands Module
//!
//! All command functions exposed to the CLI surface.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports + shared resolvers)
//! ├── printer.rs   ◄─── Printer CRUD, meter readings
//! ├── supply.rs    ◄─── Toner/fuser model catalog
//! ├── inventory.rs ◄─── Stock views and corrections
//! ├── order.rs     ◄─── Order flow incl. arrival reconciliation
//! ├── loan.rs      ◄─── Inter-printer loans
//! ├── change.rs    ◄─── Toner change flow + history + recycling log
//! ├── ticket.rs    ◄─── Service tickets
//! ├── account.rs   ◄─── Users and operators reference lists
//! └── report.rs    ◄─── Fleet forecast report, mirror backlog
//! ```
//!
//! ## How Commands Work
//! Each command is a plain async function over `&DbState` (plus
//! `&ConfigState` where thresholds matter) returning a serializable
//! response DTO or [`ApiError`](crate::error::ApiError). The CLI renders
//! the DTO as a table or, with `--json`, verbatim. Commands own the
//! original dashboard's form logic: validate → resolve references →
//! delegate the writes to a repository flow → shape the response.
//!
//! ## Identifier Resolution
//! The original forms bound to dropdowns; a CLI gets names typed by
//! humans. Every command therefore accepts either a UUID or the unique
//! display name and resolves it here.

pub mod account;
pub mod change;
pub mod inventory;
pub mod loan;
pub mod order;
pub mod printer;
pub mod report;
pub mod supply;
pub mod ticket;

use crate::error::ApiError;
use crate::state::DbState;
use tonerdesk_core::{Printer, SupplyKind, SupplyModel};

/// Resolves a printer by UUID or display name.
pub(crate) async fn resolve_printer(db: &DbState, ident: &str) -> Result<Printer, ApiError> {
    let repo = db.inner().printers();

    if let Some(printer) = repo.get_by_id(ident).await? {
        return Ok(printer);
    }
    if let Some(printer) = repo.get_by_name(ident).await? {
        return Ok(printer);
    }

    Err(ApiError::not_found("Printer", ident))
}

/// Resolves a supply model by UUID or name within a kind.
pub(crate) async fn resolve_model(
    db: &DbState,
    kind: SupplyKind,
    ident: &str,
) -> Result<SupplyModel, ApiError> {
    let repo = db.inner().supply_models();

    if let Some(model) = repo.get_by_id(ident).await? {
        if model.kind == kind {
            return Ok(model);
        }
    }
    if let Some(model) = repo.get_by_name(kind, ident).await? {
        return Ok(model);
    }

    Err(ApiError::not_found("Supply model", ident))
}

/// The model a printer consumes for the given kind, or a typed error.
pub(crate) async fn assigned_model(
    db: &DbState,
    printer: &Printer,
    kind: SupplyKind,
) -> Result<SupplyModel, ApiError> {
    let model_id = printer.model_id(kind).ok_or_else(|| {
        ApiError::from(tonerdesk_core::CoreError::NoModelAssigned {
            printer: printer.name.clone(),
            kind: kind.as_str().to_string(),
        })
    })?;

    db.inner()
        .supply_models()
        .get_by_id(model_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Supply model", model_id))
}

// =============================================================================
// Shared Test Fixtures
// =============================================================================

/// Fixture builders shared by the command test modules.
#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::state::DbState;
    use tonerdesk_core::{Printer, SupplyKind, SupplyModel};
    use tonerdesk_db::{Database, DbConfig};

    /// A fresh in-memory database wrapped as application state.
    pub async fn seeded_state() -> DbState {
        DbState::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    /// Creates a toner model plus a printer consuming it.
    pub async fn toner_printer(
        db: &DbState,
        printer_name: &str,
        model_name: &str,
    ) -> (Printer, SupplyModel) {
        let now = Utc::now();

        let model = SupplyModel {
            id: Uuid::new_v4().to_string(),
            kind: SupplyKind::Toner,
            name: model_name.to_string(),
            capacity_pages: 9_000,
            color: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.inner().supply_models().insert(&model).await.unwrap();

        let printer = Printer {
            id: Uuid::new_v4().to_string(),
            name: printer_name.to_string(),
            location: "test office".to_string(),
            address: format!("{}.lan", printer_name.to_lowercase().replace(' ', "-")),
            serial: None,
            toner_model_id: Some(model.id.clone()),
            fuser_model_id: None,
            daily_pages: 120,
            toner_level_pct: 40,
            fuser_level_pct: 100,
            is_active: true,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        db.inner().printers().insert(&printer).await.unwrap();

        (printer, model)
    }

    /// On-hand quantity shorthand.
    pub async fn stock(db: &DbState, printer_id: &str, model_id: &str) -> i64 {
        db.inner()
            .inventory()
            .quantity_at(printer_id, model_id)
            .await
            .unwrap()
    }
}
