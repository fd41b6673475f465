//! # Loan Repository
//!
//! Database operations for inter-printer loans.
//!
//! ## Loan Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Loan Lifecycle                                    │
//! │                                                                         │
//! │  CREATE (one transaction)                                              │
//! │    ├── lender inventory −quantity (guarded, never below zero)          │
//! │    └── INSERT toner_loans { status: Outstanding }                      │
//! │                                                                         │
//! │  RETURN (one transaction)              SETTLE FROM STOCK (one tx)      │
//! │    ├── flip outstanding → returned       ├── flip outstanding→returned │
//! │    │   (guarded, exactly once)           ├── borrower −quantity        │
//! │    └── lender inventory +quantity        └── lender  +quantity         │
//! │                                                                         │
//! │  RETURN is the physical hand-back; SETTLE pays the lender out of       │
//! │  stock that just arrived at the borrower (arrival reconciliation).     │
//! │  Either way the lender is restored exactly once.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::outbox::MirrorOutboxRepository;
use tonerdesk_core::{LoanStatus, TonerLoan};

const LOAN_COLUMNS: &str = "id, lender_printer_id, borrower_printer_id, model_id, quantity, \
     status, notes, created_at, updated_at, returned_at";

/// Repository for loan database operations.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: SqlitePool,
}

impl LoanRepository {
    /// Creates a new LoanRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LoanRepository { pool }
    }

    /// Creates a loan, moving stock out of the lender's inventory.
    ///
    /// ## What Happens (one transaction)
    /// 1. The lender's inventory row is decremented by the loaned quantity;
    ///    insufficient stock fails the whole flow
    /// 2. The loan row is inserted as outstanding
    /// 3. A mirror outbox entry is queued
    pub async fn create(&self, loan: &TonerLoan) -> DbResult<()> {
        debug!(
            lender = %loan.lender_printer_id,
            borrower = %loan.borrower_printer_id,
            quantity = %loan.quantity,
            "Creating loan"
        );

        let mut tx = self.pool.begin().await?;

        decrement_inventory(
            &mut tx,
            &loan.lender_printer_id,
            &loan.model_id,
            loan.quantity,
        )
        .await?;

        sqlx::query(
            r#"
            INSERT INTO toner_loans (
                id, lender_printer_id, borrower_printer_id, model_id, quantity,
                status, notes, created_at, updated_at, returned_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&loan.id)
        .bind(&loan.lender_printer_id)
        .bind(&loan.borrower_printer_id)
        .bind(&loan.model_id)
        .bind(loan.quantity)
        .bind(loan.status)
        .bind(&loan.notes)
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .bind(loan.returned_at)
        .execute(&mut *tx)
        .await?;

        let payload = serde_json::to_string(loan)
            .map_err(|e| DbError::Internal(format!("loan serialization failed: {e}")))?;
        MirrorOutboxRepository::queue_on(&mut *tx, "LOAN", &loan.id, &payload).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Gets a loan by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TonerLoan>> {
        let loan = sqlx::query_as::<_, TonerLoan>(&format!(
            "SELECT {LOAN_COLUMNS} FROM toner_loans WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    /// Lists loans, newest first.
    ///
    /// ## Arguments
    /// * `outstanding_only` - restrict to unreturned loans
    /// * `printer_id` - restrict to loans where the printer is lender or
    ///   borrower
    pub async fn list(
        &self,
        outstanding_only: bool,
        printer_id: Option<&str>,
    ) -> DbResult<Vec<TonerLoan>> {
        // Empty string means "no filter"; ids are never empty.
        let loans = sqlx::query_as::<_, TonerLoan>(&format!(
            "SELECT {LOAN_COLUMNS} FROM toner_loans \
             WHERE (?1 = 0 OR status = 'outstanding') \
               AND (?2 = '' OR lender_printer_id = ?2 OR borrower_printer_id = ?2) \
             ORDER BY created_at DESC"
        ))
        .bind(outstanding_only)
        .bind(printer_id.unwrap_or(""))
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Outstanding loans owed by a borrower for one model.
    ///
    /// These are the reconciliation candidates surfaced when an order for
    /// that printer and model arrives.
    pub async fn outstanding_for(
        &self,
        borrower_printer_id: &str,
        model_id: &str,
    ) -> DbResult<Vec<TonerLoan>> {
        let loans = sqlx::query_as::<_, TonerLoan>(&format!(
            "SELECT {LOAN_COLUMNS} FROM toner_loans \
             WHERE borrower_printer_id = ?1 AND model_id = ?2 AND status = 'outstanding' \
             ORDER BY created_at ASC"
        ))
        .bind(borrower_printer_id)
        .bind(model_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Marks a loan returned and restores the lender's inventory.
    ///
    /// The status flip is guarded, so the lender is credited exactly once
    /// no matter how often the return is confirmed.
    pub async fn mark_returned(&self, loan_id: &str) -> DbResult<TonerLoan> {
        debug!(id = %loan_id, "Returning loan");

        let mut tx = self.pool.begin().await?;
        let loan = flip_to_returned(&mut tx, loan_id).await?;

        increment_inventory(
            &mut tx,
            &loan.lender_printer_id,
            &loan.model_id,
            loan.quantity,
        )
        .await?;

        let payload = serde_json::to_string(&loan)
            .map_err(|e| DbError::Internal(format!("loan serialization failed: {e}")))?;
        MirrorOutboxRepository::queue_on(&mut *tx, "LOAN", &loan.id, &payload).await?;

        tx.commit().await?;

        Ok(loan)
    }

    /// Settles a loan out of the borrower's (newly arrived) stock.
    ///
    /// Same terminal state as [`mark_returned`](Self::mark_returned), but
    /// the repayment comes off the borrower's shelf: borrower −q, lender +q.
    /// Fails without writing when the borrower lacks the stock.
    pub async fn settle_from_stock(&self, loan_id: &str) -> DbResult<TonerLoan> {
        debug!(id = %loan_id, "Settling loan from borrower stock");

        let mut tx = self.pool.begin().await?;
        let loan = flip_to_returned(&mut tx, loan_id).await?;

        decrement_inventory(
            &mut tx,
            &loan.borrower_printer_id,
            &loan.model_id,
            loan.quantity,
        )
        .await?;
        increment_inventory(
            &mut tx,
            &loan.lender_printer_id,
            &loan.model_id,
            loan.quantity,
        )
        .await?;

        let payload = serde_json::to_string(&loan)
            .map_err(|e| DbError::Internal(format!("loan serialization failed: {e}")))?;
        MirrorOutboxRepository::queue_on(&mut *tx, "LOAN", &loan.id, &payload).await?;

        tx.commit().await?;

        Ok(loan)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Flips `outstanding → returned` exactly once and returns the loan row.
async fn flip_to_returned(
    tx: &mut Transaction<'_, Sqlite>,
    loan_id: &str,
) -> DbResult<TonerLoan> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE toner_loans SET
            status = 'returned',
            returned_at = ?2,
            updated_at = ?2
        WHERE id = ?1 AND status = 'outstanding'
        "#,
    )
    .bind(loan_id)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Loan (outstanding)", loan_id));
    }

    let loan = sqlx::query_as::<_, TonerLoan>(&format!(
        "SELECT {LOAN_COLUMNS} FROM toner_loans WHERE id = ?1"
    ))
    .bind(loan_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(loan)
}

/// Guarded in-transaction decrement; never drives a row below zero.
async fn decrement_inventory(
    tx: &mut Transaction<'_, Sqlite>,
    printer_id: &str,
    model_id: &str,
    quantity: i64,
) -> DbResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE inventory SET
            quantity = quantity - ?3,
            updated_at = ?4
        WHERE printer_id = ?1 AND model_id = ?2 AND quantity >= ?3
        "#,
    )
    .bind(printer_id)
    .bind(model_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::CheckViolation {
            message: format!(
                "printer {printer_id} does not hold {quantity} of model {model_id}"
            ),
        });
    }

    Ok(())
}

/// In-transaction upsert increment.
async fn increment_inventory(
    tx: &mut Transaction<'_, Sqlite>,
    printer_id: &str,
    model_id: &str,
    quantity: i64,
) -> DbResult<()> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO inventory (id, printer_id, model_id, quantity, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        ON CONFLICT (printer_id, model_id) DO UPDATE SET
            quantity = quantity + excluded.quantity,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(printer_id)
    .bind(model_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Helper to generate a new loan ID.
pub fn generate_loan_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{model, printer};

    fn new_loan(lender: &str, borrower: &str, model_id: &str, quantity: i64) -> TonerLoan {
        let now = Utc::now();
        TonerLoan {
            id: generate_loan_id(),
            lender_printer_id: lender.to_string(),
            borrower_printer_id: borrower.to_string(),
            model_id: model_id.to_string(),
            quantity,
            status: LoanStatus::Outstanding,
            notes: None,
            created_at: now,
            updated_at: now,
            returned_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_moves_stock_out_of_lender() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let lender = printer(&db, "Warehouse").await;
        let borrower = printer(&db, "Accounting").await;
        let m = model(&db, "TK-3160", 12_000).await;

        db.inventory().set_quantity(&lender.id, &m.id, 3).await.unwrap();

        let loan = new_loan(&lender.id, &borrower.id, &m.id, 2);
        db.loans().create(&loan).await.unwrap();

        assert_eq!(db.inventory().quantity_at(&lender.id, &m.id).await.unwrap(), 1);
        let outstanding = db.loans().outstanding_for(&borrower.id, &m.id).await.unwrap();
        assert_eq!(outstanding.len(), 1);
    }

    #[tokio::test]
    async fn test_create_fails_without_lender_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let lender = printer(&db, "Warehouse").await;
        let borrower = printer(&db, "Accounting").await;
        let m = model(&db, "TK-3160", 12_000).await;

        db.inventory().set_quantity(&lender.id, &m.id, 1).await.unwrap();

        let loan = new_loan(&lender.id, &borrower.id, &m.id, 2);
        let err = db.loans().create(&loan).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));

        // The whole flow rolled back: no loan row, stock untouched
        assert!(db.loans().get_by_id(&loan.id).await.unwrap().is_none());
        assert_eq!(db.inventory().quantity_at(&lender.id, &m.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_return_restores_lender_exactly_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let lender = printer(&db, "Warehouse").await;
        let borrower = printer(&db, "Accounting").await;
        let m = model(&db, "TK-3160", 12_000).await;

        db.inventory().set_quantity(&lender.id, &m.id, 2).await.unwrap();

        let loan = new_loan(&lender.id, &borrower.id, &m.id, 2);
        db.loans().create(&loan).await.unwrap();
        assert_eq!(db.inventory().quantity_at(&lender.id, &m.id).await.unwrap(), 0);

        let returned = db.loans().mark_returned(&loan.id).await.unwrap();
        assert_eq!(returned.status, LoanStatus::Returned);
        assert!(returned.returned_at.is_some());
        assert_eq!(db.inventory().quantity_at(&lender.id, &m.id).await.unwrap(), 2);

        // A second return finds no outstanding loan and credits nothing
        let err = db.loans().mark_returned(&loan.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.inventory().quantity_at(&lender.id, &m.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_settle_pays_lender_from_borrower_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let lender = printer(&db, "Warehouse").await;
        let borrower = printer(&db, "Accounting").await;
        let m = model(&db, "TK-3160", 12_000).await;

        db.inventory().set_quantity(&lender.id, &m.id, 1).await.unwrap();
        let loan = new_loan(&lender.id, &borrower.id, &m.id, 1);
        db.loans().create(&loan).await.unwrap();

        // An order arrived at the borrower in the meantime
        db.inventory().set_quantity(&borrower.id, &m.id, 3).await.unwrap();

        db.loans().settle_from_stock(&loan.id).await.unwrap();

        assert_eq!(db.inventory().quantity_at(&borrower.id, &m.id).await.unwrap(), 2);
        assert_eq!(db.inventory().quantity_at(&lender.id, &m.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_settle_without_borrower_stock_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let lender = printer(&db, "Warehouse").await;
        let borrower = printer(&db, "Accounting").await;
        let m = model(&db, "TK-3160", 12_000).await;

        db.inventory().set_quantity(&lender.id, &m.id, 1).await.unwrap();
        let loan = new_loan(&lender.id, &borrower.id, &m.id, 1);
        db.loans().create(&loan).await.unwrap();

        let err = db.loans().settle_from_stock(&loan.id).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));

        // Rollback: the loan is still outstanding and can be settled later
        let still_there = db.loans().get_by_id(&loan.id).await.unwrap().unwrap();
        assert_eq!(still_there.status, LoanStatus::Outstanding);
    }
}
