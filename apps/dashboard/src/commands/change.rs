//! # Toner Change Commands
//!
//! The consumption flow: pick a source by the allocation preference, swap
//! the cartridge, log everything.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commands::{assigned_model, resolve_printer};
use crate::error::ApiError;
use crate::state::DbState;
use tonerdesk_core::allocation::{choose_source, rank_sources, AllocationCandidate};
use tonerdesk_core::{validation, ChangeSource, CoreError, EmptyToner, SupplyKind, TonerChange};
use tonerdesk_db::repository::history::ChangeRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRow {
    pub id: String,
    pub printer_id: String,
    pub model_name: String,
    pub source: ChangeSource,
    pub changed_by: String,
    pub level_before_pct: i64,
    pub created_at: String,
}

/// What the change flow did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeOutcome {
    pub change: ChangeRow,
    /// Name of the printer whose shelf the cartridge came from.
    pub source_printer: String,
    /// Stock left at that source after the swap.
    pub remaining_at_source: i64,
    /// True when the swap opened a loan against another printer.
    pub loan_opened: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeTonerRequest {
    /// Printer getting the fresh cartridge (name or UUID).
    pub printer: String,
    /// Who swapped it (name snapshot for the history row).
    pub changed_by: String,
    /// Explicit source printer; when absent the allocation preference
    /// picks one (own stock first, then the biggest borrowable pile).
    pub from_printer: Option<String>,
}

/// Ranked candidate sources for a printer's next cartridge.
///
/// This is the "offer" behind the original dashboard's source dropdown:
/// own stock first, then other printers holding the same model, most
/// available quantity first.
pub async fn change_sources(
    db: &DbState,
    printer_ident: &str,
) -> Result<Vec<AllocationCandidate>, ApiError> {
    let printer = resolve_printer(db, printer_ident).await?;
    let model = assigned_model(db, &printer, SupplyKind::Toner).await?;

    let stock = db.inner().inventory().stock_of_model(&model.id).await?;
    Ok(rank_sources(&printer.id, stock))
}

/// Swaps the cartridge in a printer, consuming from the preferred source.
pub async fn change_toner(
    db: &DbState,
    req: ChangeTonerRequest,
) -> Result<ChangeOutcome, ApiError> {
    debug!(printer = %req.printer, "change_toner command");

    validation::validate_person_name(&req.changed_by)?;

    let printer = resolve_printer(db, &req.printer).await?;
    let model = assigned_model(db, &printer, SupplyKind::Toner).await?;

    let stock = db.inner().inventory().stock_of_model(&model.id).await?;

    let source = match &req.from_printer {
        // Explicit source: honor the pick but verify it actually has stock.
        Some(ident) => {
            let source_printer = resolve_printer(db, ident).await?;
            rank_sources(&printer.id, stock)
                .into_iter()
                .find(|c| c.printer_id == source_printer.id)
                .ok_or_else(|| {
                    ApiError::from(CoreError::InsufficientInventory {
                        printer: source_printer.name.clone(),
                        model: model.name.clone(),
                        available: 0,
                        requested: 1,
                    })
                })?
        }
        None => choose_source(&printer.id, stock).ok_or_else(|| {
            ApiError::from(CoreError::OutOfStock {
                model: model.name.clone(),
            })
        })?,
    };

    let change = db
        .inner()
        .history()
        .record_change(&ChangeRequest {
            printer_id: printer.id.clone(),
            printer_name: printer.name.clone(),
            model_id: model.id.clone(),
            model_name: model.name.clone(),
            source_printer_id: source.printer_id.clone(),
            changed_by: req.changed_by.trim().to_string(),
            level_before_pct: printer.toner_level_pct,
        })
        .await?;

    let remaining = db
        .inner()
        .inventory()
        .quantity_at(&source.printer_id, &model.id)
        .await?;

    info!(
        printer = %printer.name,
        model = %model.name,
        source = %source.printer_name,
        borrowed = %!source.is_own,
        "Toner changed"
    );

    Ok(ChangeOutcome {
        change: to_row(&change),
        source_printer: source.printer_name,
        remaining_at_source: remaining,
        loan_opened: change.source == ChangeSource::Borrowed,
    })
}

/// Lists change history, newest first.
pub async fn change_history(
    db: &DbState,
    printer_ident: Option<&str>,
    limit: u32,
) -> Result<Vec<ChangeRow>, ApiError> {
    let printer_id = match printer_ident {
        Some(ident) => Some(resolve_printer(db, ident).await?.id),
        None => None,
    };

    let changes = db
        .inner()
        .history()
        .list_changes(printer_id.as_deref(), limit)
        .await?;

    Ok(changes.iter().map(to_row).collect())
}

/// Lists the recycling log.
pub async fn list_empties(db: &DbState, uncollected_only: bool) -> Result<Vec<EmptyToner>, ApiError> {
    Ok(db.inner().history().list_empties(uncollected_only).await?)
}

/// Marks an empty cartridge as picked up by the recycler.
pub async fn collect_empty(db: &DbState, id: &str) -> Result<(), ApiError> {
    db.inner().history().mark_collected(id).await?;
    info!(id = %id, "Empty cartridge collected");
    Ok(())
}

/// Deletes a recycling-log row.
pub async fn delete_empty(db: &DbState, id: &str) -> Result<(), ApiError> {
    db.inner().history().delete_empty(id).await?;
    Ok(())
}

fn to_row(change: &TonerChange) -> ChangeRow {
    ChangeRow {
        id: change.id.clone(),
        printer_id: change.printer_id.clone(),
        model_name: change.model_name.clone(),
        source: change.source,
        changed_by: change.changed_by.clone(),
        level_before_pct: change.level_before_pct,
        created_at: change.created_at.to_rfc3339(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{seeded_state, stock, toner_printer};

    #[tokio::test]
    async fn test_change_prefers_own_stock() {
        let db = seeded_state().await;
        let (printer, model) = toner_printer(&db, "Accounting HP", "CF287A").await;
        let (other, _) = toner_printer(&db, "Warehouse HP", "CF287A-DUP").await;

        db.inner().inventory().set_quantity(&printer.id, &model.id, 1).await.unwrap();
        db.inner().inventory().set_quantity(&other.id, &model.id, 5).await.unwrap();

        let outcome = change_toner(
            &db,
            ChangeTonerRequest {
                printer: printer.name.clone(),
                changed_by: "bernd".to_string(),
                from_printer: None,
            },
        )
        .await
        .unwrap();

        // Own single cartridge wins over the bigger pile elsewhere
        assert_eq!(outcome.source_printer, "Accounting HP");
        assert!(!outcome.loan_opened);
        assert_eq!(outcome.remaining_at_source, 0);
        assert_eq!(stock(&db, &other.id, &model.id).await, 5);

        // Level reset and history row recorded
        let reloaded = db.inner().printers().get_by_id(&printer.id).await.unwrap().unwrap();
        assert_eq!(reloaded.toner_level_pct, 100);
        let history = change_history(&db, Some("Accounting HP"), 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].level_before_pct, 40);
    }

    #[tokio::test]
    async fn test_change_borrows_biggest_pile_and_opens_loan() {
        let db = seeded_state().await;
        let (printer, model) = toner_printer(&db, "Accounting HP", "CF287A").await;
        let (small, _) = toner_printer(&db, "Reception HP", "CF287A-D1").await;
        let (big, _) = toner_printer(&db, "Warehouse HP", "CF287A-D2").await;

        db.inner().inventory().set_quantity(&small.id, &model.id, 2).await.unwrap();
        db.inner().inventory().set_quantity(&big.id, &model.id, 4).await.unwrap();

        let outcome = change_toner(
            &db,
            ChangeTonerRequest {
                printer: printer.name.clone(),
                changed_by: "bernd".to_string(),
                from_printer: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.source_printer, "Warehouse HP");
        assert!(outcome.loan_opened);
        assert_eq!(outcome.remaining_at_source, 3);

        // The debt is on the books
        let loans = db.inner().loans().outstanding_for(&printer.id, &model.id).await.unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].lender_printer_id, big.id);
    }

    #[tokio::test]
    async fn test_change_with_no_stock_anywhere_fails_clean() {
        let db = seeded_state().await;
        let (printer, model) = toner_printer(&db, "Accounting HP", "CF287A").await;

        let err = change_toner(
            &db,
            ChangeTonerRequest {
                printer: printer.name.clone(),
                changed_by: "bernd".to_string(),
                from_printer: None,
            },
        )
        .await
        .unwrap_err();
        assert!(err.message.contains("CF287A"));

        // Nothing recorded, level untouched
        assert!(change_history(&db, None, 10).await.unwrap().is_empty());
        let reloaded = db.inner().printers().get_by_id(&printer.id).await.unwrap().unwrap();
        assert_eq!(reloaded.toner_level_pct, 40);
        assert_eq!(stock(&db, &printer.id, &model.id).await, 0);
    }

    #[tokio::test]
    async fn test_explicit_source_must_hold_stock() {
        let db = seeded_state().await;
        let (printer, model) = toner_printer(&db, "Accounting HP", "CF287A").await;
        let (other, _) = toner_printer(&db, "Warehouse HP", "CF287A-DUP").await;

        db.inner().inventory().set_quantity(&printer.id, &model.id, 1).await.unwrap();

        let err = change_toner(
            &db,
            ChangeTonerRequest {
                printer: printer.name.clone(),
                changed_by: "bernd".to_string(),
                from_printer: Some(other.name.clone()),
            },
        )
        .await
        .unwrap_err();
        assert!(err.message.contains("Warehouse HP"));
    }

    #[tokio::test]
    async fn test_sources_ranking_surface() {
        let db = seeded_state().await;
        let (printer, model) = toner_printer(&db, "Accounting HP", "CF287A").await;
        let (other, _) = toner_printer(&db, "Warehouse HP", "CF287A-DUP").await;

        db.inner().inventory().set_quantity(&printer.id, &model.id, 1).await.unwrap();
        db.inner().inventory().set_quantity(&other.id, &model.id, 9).await.unwrap();

        let sources = change_sources(&db, "Accounting HP").await.unwrap();
        assert_eq!(sources.len(), 2);
        assert!(sources[0].is_own);
        assert_eq!(sources[1].printer_name, "Warehouse HP");
    }
}
