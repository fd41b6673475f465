//! # Loan Commands

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::commands::{assigned_model, resolve_model, resolve_printer};
use crate::error::ApiError;
use crate::state::DbState;
use tonerdesk_core::{validation, LoanStatus, SupplyKind, TonerLoan};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRow {
    pub id: String,
    pub lender: String,
    pub borrower: String,
    pub model: String,
    pub quantity: i64,
    pub status: LoanStatus,
    pub created_at: String,
    pub returned_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LendRequest {
    /// Printer giving up stock (name or UUID).
    pub lender: String,
    /// Printer receiving it (name or UUID).
    pub borrower: String,
    /// Model name or UUID; defaults to the borrower's toner model.
    pub model: Option<String>,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// Moves stock from one printer to another, recording the debt.
pub async fn lend(db: &DbState, req: LendRequest) -> Result<LoanRow, ApiError> {
    debug!(lender = %req.lender, borrower = %req.borrower, "lend command");

    validation::validate_quantity(req.quantity)?;

    let lender = resolve_printer(db, &req.lender).await?;
    let borrower = resolve_printer(db, &req.borrower).await?;

    if lender.id == borrower.id {
        return Err(ApiError::validation("lender and borrower must differ"));
    }

    let model = match &req.model {
        Some(ident) => resolve_model(db, SupplyKind::Toner, ident).await?,
        None => assigned_model(db, &borrower, SupplyKind::Toner).await?,
    };

    let now = Utc::now();
    let loan = TonerLoan {
        id: Uuid::new_v4().to_string(),
        lender_printer_id: lender.id.clone(),
        borrower_printer_id: borrower.id.clone(),
        model_id: model.id.clone(),
        quantity: req.quantity,
        status: LoanStatus::Outstanding,
        notes: req.notes,
        created_at: now,
        updated_at: now,
        returned_at: None,
    };

    db.inner().loans().create(&loan).await?;

    info!(
        id = %loan.id,
        lender = %lender.name,
        borrower = %borrower.name,
        quantity = %loan.quantity,
        "Loan created"
    );

    Ok(LoanRow {
        id: loan.id,
        lender: lender.name,
        borrower: borrower.name,
        model: model.name,
        quantity: loan.quantity,
        status: loan.status,
        created_at: loan.created_at.to_rfc3339(),
        returned_at: None,
    })
}

/// Lists loans with names resolved.
pub async fn list_loans(
    db: &DbState,
    outstanding_only: bool,
    printer_ident: Option<&str>,
) -> Result<Vec<LoanRow>, ApiError> {
    let printer_id = match printer_ident {
        Some(ident) => Some(resolve_printer(db, ident).await?.id),
        None => None,
    };

    let loans = db
        .inner()
        .loans()
        .list(outstanding_only, printer_id.as_deref())
        .await?;

    rows_for(db, loans).await
}

/// Marks a loan returned (physical hand-back; lender restored exactly once).
pub async fn return_loan(db: &DbState, loan_id: &str) -> Result<LoanRow, ApiError> {
    let loan = db.inner().loans().mark_returned(loan_id).await?;

    info!(id = %loan.id, "Loan returned");

    Ok(rows_for(db, vec![loan]).await?.remove(0))
}

/// Settles a loan out of the borrower's stock (arrival reconciliation).
pub async fn settle_loan(db: &DbState, loan_id: &str) -> Result<LoanRow, ApiError> {
    let loan = db.inner().loans().settle_from_stock(loan_id).await?;

    info!(id = %loan.id, "Loan settled from borrower stock");

    Ok(rows_for(db, vec![loan]).await?.remove(0))
}

/// Resolves printer and model names for display.
pub(crate) async fn rows_for(db: &DbState, loans: Vec<TonerLoan>) -> Result<Vec<LoanRow>, ApiError> {
    let printers = db.inner().printers().list(false).await?;
    let models = db.inner().supply_models().list(None).await?;

    let printer_name = |id: &str| -> String {
        printers
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    Ok(loans
        .into_iter()
        .map(|loan| LoanRow {
            lender: printer_name(&loan.lender_printer_id),
            borrower: printer_name(&loan.borrower_printer_id),
            model: models
                .iter()
                .find(|m| m.id == loan.model_id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| loan.model_id.clone()),
            id: loan.id,
            quantity: loan.quantity,
            status: loan.status,
            created_at: loan.created_at.to_rfc3339(),
            returned_at: loan.returned_at.map(|t| t.to_rfc3339()),
        })
        .collect())
}
