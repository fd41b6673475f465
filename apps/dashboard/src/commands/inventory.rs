//! # Inventory Commands
//!
//! Stock views and manual corrections. The flows (arrival, loans, changes)
//! adjust stock themselves; these commands exist for the overview tables
//! and for fixing up reality after a stocktake.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::commands::{resolve_model, resolve_printer};
use crate::error::ApiError;
use crate::state::DbState;
use tonerdesk_core::SupplyKind;
use tonerdesk_db::repository::inventory::ModelStockTotal;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub model_id: String,
    pub model_name: String,
    pub kind: SupplyKind,
    pub quantity: i64,
}

/// Fleet-wide totals per model.
pub async fn stock_overview(db: &DbState) -> Result<Vec<ModelStockTotal>, ApiError> {
    Ok(db.inner().inventory().totals_by_model().await?)
}

/// Stock held at one printer, with model names resolved.
pub async fn printer_stock(db: &DbState, ident: &str) -> Result<Vec<StockRow>, ApiError> {
    let printer = resolve_printer(db, ident).await?;
    let rows = db.inner().inventory().list_for_printer(&printer.id).await?;
    let models = db.inner().supply_models().list(None).await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            models.iter().find(|m| m.id == row.model_id).map(|m| StockRow {
                model_id: row.model_id,
                model_name: m.name.clone(),
                kind: m.kind,
                quantity: row.quantity,
            })
        })
        .collect())
}

/// Sets the absolute on-hand quantity after a stocktake.
pub async fn set_stock(
    db: &DbState,
    printer_ident: &str,
    kind: SupplyKind,
    model_ident: &str,
    quantity: i64,
) -> Result<(), ApiError> {
    if quantity < 0 {
        return Err(ApiError::validation("quantity must not be negative"));
    }

    let printer = resolve_printer(db, printer_ident).await?;
    let model = resolve_model(db, kind, model_ident).await?;

    db.inner()
        .inventory()
        .set_quantity(&printer.id, &model.id, quantity)
        .await?;

    info!(
        printer = %printer.name,
        model = %model.name,
        quantity = %quantity,
        "Stock corrected"
    );

    Ok(())
}
