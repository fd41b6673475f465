//! # Order Commands
//!
//! Placing orders and the arrival reconciliation flow.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::commands::loan::{rows_for, LoanRow};
use crate::commands::{assigned_model, resolve_model, resolve_printer};
use crate::error::ApiError;
use crate::state::DbState;
use tonerdesk_core::{validation, OrderStatus, SupplyKind, TonerOrder};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRow {
    pub id: String,
    pub printer: String,
    pub model: String,
    pub quantity: i64,
    pub status: OrderStatus,
    pub ordered_by: String,
    pub supplier: Option<String>,
    pub created_at: String,
    pub arrived_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    /// Destination printer (name or UUID).
    pub printer: String,
    /// Model name or UUID; defaults to the printer's toner model.
    pub model: Option<String>,
    pub quantity: i64,
    pub ordered_by: String,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

/// What came out of confirming an arrival.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalOutcome {
    pub order: OrderRow,
    /// On-hand quantity at the printer after booking the stock in.
    pub on_hand: i64,
    /// Outstanding loans this printer owes for the same model - the
    /// reconciliation candidates the original dashboard prompted about.
    pub open_loans: Vec<LoanRow>,
    /// Loans settled out of the arrived stock (only with settle_loans).
    pub settled_loans: Vec<LoanRow>,
}

/// Places a pending order.
pub async fn place_order(db: &DbState, req: PlaceOrderRequest) -> Result<OrderRow, ApiError> {
    debug!(printer = %req.printer, quantity = %req.quantity, "place_order command");

    validation::validate_quantity(req.quantity)?;
    validation::validate_person_name(&req.ordered_by)?;

    let printer = resolve_printer(db, &req.printer).await?;
    let model = match &req.model {
        Some(ident) => resolve_model(db, SupplyKind::Toner, ident).await?,
        None => assigned_model(db, &printer, SupplyKind::Toner).await?,
    };

    let now = Utc::now();
    let order = TonerOrder {
        id: Uuid::new_v4().to_string(),
        printer_id: printer.id.clone(),
        model_id: model.id.clone(),
        quantity: req.quantity,
        status: OrderStatus::Pending,
        ordered_by: req.ordered_by.trim().to_string(),
        supplier: req.supplier,
        notes: req.notes,
        created_at: now,
        updated_at: now,
        arrived_at: None,
    };

    db.inner().orders().insert(&order).await?;

    info!(id = %order.id, printer = %printer.name, model = %model.name, "Order placed");

    Ok(to_row(&order, &printer.name, &model.name))
}

/// Lists orders with names resolved.
pub async fn list_orders(
    db: &DbState,
    status: Option<OrderStatus>,
    printer_ident: Option<&str>,
) -> Result<Vec<OrderRow>, ApiError> {
    let printer_id = match printer_ident {
        Some(ident) => Some(resolve_printer(db, ident).await?.id),
        None => None,
    };

    let orders = db.inner().orders().list(status, printer_id.as_deref()).await?;
    let printers = db.inner().printers().list(false).await?;
    let models = db.inner().supply_models().list(None).await?;

    Ok(orders
        .iter()
        .map(|order| {
            let printer = printers
                .iter()
                .find(|p| p.id == order.printer_id)
                .map(|p| p.name.as_str())
                .unwrap_or(order.printer_id.as_str());
            let model = models
                .iter()
                .find(|m| m.id == order.model_id)
                .map(|m| m.name.as_str())
                .unwrap_or(order.model_id.as_str());
            to_row(order, printer, model)
        })
        .collect())
}

/// Confirms an arrival: books the stock in (exactly once) and surfaces
/// outstanding loans of the same model at the ordering printer.
///
/// ## The Original Flow
/// The dashboard's arrival dialog did three things: flip the order, bump
/// inventory, then pop a "you still owe Warehouse 1 cartridge - return it
/// now?" prompt. `settle_loans` is that prompt answered with yes: each
/// open loan is paid out of the newly arrived stock until it runs out.
pub async fn mark_order_arrived(
    db: &DbState,
    order_id: &str,
    settle_loans: bool,
) -> Result<ArrivalOutcome, ApiError> {
    debug!(id = %order_id, settle_loans = %settle_loans, "mark_order_arrived command");

    let order = db.inner().orders().mark_arrived(order_id).await?;

    let on_hand = db
        .inner()
        .inventory()
        .quantity_at(&order.printer_id, &order.model_id)
        .await?;

    // Scan for unreturned loans matching printer + model.
    let open = db
        .inner()
        .loans()
        .outstanding_for(&order.printer_id, &order.model_id)
        .await?;

    let mut settled = Vec::new();
    let mut remaining_stock = on_hand;

    if settle_loans {
        for loan in &open {
            if loan.quantity > remaining_stock {
                // Not enough arrived stock left to pay this one back.
                continue;
            }
            let loan = db.inner().loans().settle_from_stock(&loan.id).await?;
            remaining_stock -= loan.quantity;
            settled.push(loan);
        }
    }

    let settled_ids: Vec<&str> = settled.iter().map(|l| l.id.as_str()).collect();
    let still_open: Vec<_> = open
        .into_iter()
        .filter(|l| !settled_ids.contains(&l.id.as_str()))
        .collect();

    info!(
        id = %order.id,
        on_hand = %remaining_stock,
        open_loans = still_open.len(),
        settled = settled.len(),
        "Order arrived"
    );

    let printer = resolve_printer(db, &order.printer_id).await?;
    let model = resolve_model(db, SupplyKind::Toner, &order.model_id).await?;

    Ok(ArrivalOutcome {
        order: to_row(&order, &printer.name, &model.name),
        on_hand: remaining_stock,
        open_loans: rows_for(db, still_open).await?,
        settled_loans: rows_for(db, settled).await?,
    })
}

/// Cancels a pending order.
pub async fn cancel_order(db: &DbState, order_id: &str) -> Result<(), ApiError> {
    db.inner().orders().delete_pending(order_id).await?;

    info!(id = %order_id, "Order cancelled");

    Ok(())
}

fn to_row(order: &TonerOrder, printer: &str, model: &str) -> OrderRow {
    OrderRow {
        id: order.id.clone(),
        printer: printer.to_string(),
        model: model.to_string(),
        quantity: order.quantity,
        status: order.status,
        ordered_by: order.ordered_by.clone(),
        supplier: order.supplier.clone(),
        created_at: order.created_at.to_rfc3339(),
        arrived_at: order.arrived_at.map(|t| t.to_rfc3339()),
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
    async fn test_place_and_arrive_books_stock_once() {
        let db = seeded_state().await;
        let (printer, model) = toner_printer(&db, "Accounting HP", "CF287A").await;

        let order = place_order(
            &db,
            PlaceOrderRequest {
                printer: printer.name.clone(),
                model: None, // defaults to the printer's toner model
                quantity: 3,
                ordered_by: "bernd".to_string(),
                supplier: None,
                notes: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(order.model, model.name);
        assert_eq!(order.status, OrderStatus::Pending);

        let outcome = mark_order_arrived(&db, &order.id, false).await.unwrap();
        assert_eq!(outcome.on_hand, 3);
        assert!(outcome.open_loans.is_empty());

        // A second confirmation fails and books nothing
        assert!(mark_order_arrived(&db, &order.id, false).await.is_err());
        assert_eq!(stock(&db, &printer.id, &model.id).await, 3);
    }

    #[tokio::test]
    async fn test_arrival_surfaces_open_loans() {
        let db = seeded_state().await;
        let (borrower, model) = toner_printer(&db, "Accounting HP", "CF287A").await;
        let (lender, _) = toner_printer(&db, "Warehouse HP", "CF287A-DUP").await;

        // The borrower owes the lender one cartridge of its model
        db.inner()
            .inventory()
            .set_quantity(&lender.id, &model.id, 1)
            .await
            .unwrap();
        crate::commands::loan::lend(
            &db,
            crate::commands::loan::LendRequest {
                lender: lender.name.clone(),
                borrower: borrower.name.clone(),
                model: Some(model.name.clone()),
                quantity: 1,
                notes: None,
            },
        )
        .await
        .unwrap();

        let order = place_order(
            &db,
            PlaceOrderRequest {
                printer: borrower.name.clone(),
                model: Some(model.name.clone()),
                quantity: 2,
                ordered_by: "bernd".to_string(),
                supplier: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        // Without settling, the loan is surfaced but untouched
        let outcome = mark_order_arrived(&db, &order.id, false).await.unwrap();
        assert_eq!(outcome.open_loans.len(), 1);
        assert!(outcome.settled_loans.is_empty());
        assert_eq!(outcome.on_hand, 2);
    }

    #[tokio::test]
    async fn test_arrival_settles_loans_from_new_stock() {
        let db = seeded_state().await;
        let (borrower, model) = toner_printer(&db, "Accounting HP", "CF287A").await;
        let (lender, _) = toner_printer(&db, "Warehouse HP", "CF287A-DUP").await;

        db.inner()
            .inventory()
            .set_quantity(&lender.id, &model.id, 1)
            .await
            .unwrap();
        crate::commands::loan::lend(
            &db,
            crate::commands::loan::LendRequest {
                lender: lender.name.clone(),
                borrower: borrower.name.clone(),
                model: Some(model.name.clone()),
                quantity: 1,
                notes: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(stock(&db, &lender.id, &model.id).await, 0);

        let order = place_order(
            &db,
            PlaceOrderRequest {
                printer: borrower.name.clone(),
                model: Some(model.name.clone()),
                quantity: 2,
                ordered_by: "bernd".to_string(),
                supplier: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        let outcome = mark_order_arrived(&db, &order.id, true).await.unwrap();
        assert_eq!(outcome.settled_loans.len(), 1);
        assert!(outcome.open_loans.is_empty());
        // One of the two arrived cartridges went back to the lender
        assert_eq!(outcome.on_hand, 1);
        assert_eq!(stock(&db, &lender.id, &model.id).await, 1);
    }

    #[tokio::test]
    async fn test_cancel_pending_only() {
        let db = seeded_state().await;
        let (printer, _) = toner_printer(&db, "Accounting HP", "CF287A").await;

        let order = place_order(
            &db,
            PlaceOrderRequest {
                printer: printer.name.clone(),
                model: None,
                quantity: 1,
                ordered_by: "bernd".to_string(),
                supplier: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        mark_order_arrived(&db, &order.id, false).await.unwrap();
        assert!(cancel_order(&db, &order.id).await.is_err());
    }
}
