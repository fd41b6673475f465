//! # Consumption History Repository
//!
//! The toner change flow and its append-only logs.
//!
//! ## The Change Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Toner Change Flow                                  │
//! │                                                                         │
//! │  "Swap the cartridge in Accounting HP" (source already chosen by       │
//! │  the allocation ranking in the app layer)                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. source inventory −1 (guarded, never below zero)            │   │
//! │  │  2. borrowed? INSERT outstanding loan (lender = source)        │   │
//! │  │  3. INSERT toner_changes  (model/operator name snapshots)      │   │
//! │  │  4. INSERT empty_toners   (the swapped-out cartridge)          │   │
//! │  │  5. UPDATE printers SET toner_level_pct = 100                  │   │
//! │  │  6. INSERT mirror_outbox entry                                 │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  History rows snapshot names. Soft-deleting a model or printer          │
//! │  later never rewrites what was recorded here.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::outbox::MirrorOutboxRepository;
use tonerdesk_core::{ChangeSource, EmptyToner, LoanStatus, TonerChange};

const CHANGE_COLUMNS: &str = "id, printer_id, model_id, model_name, source, \
     lender_printer_id, changed_by, level_before_pct, created_at";

const EMPTY_COLUMNS: &str = "id, printer_id, printer_name, model_name, created_at, collected_at";

/// Everything the change flow needs, resolved by the app layer.
///
/// `source_printer_id == printer_id` means the printer consumed its own
/// stock; any other source printer records the swap as borrowed and opens
/// a loan.
#[derive(Debug, Clone)]
pub struct ChangeRequest {
    pub printer_id: String,
    pub printer_name: String,
    pub model_id: String,
    pub model_name: String,
    pub source_printer_id: String,
    pub changed_by: String,
    /// Toner level right before the swap, for the history row.
    pub level_before_pct: i64,
}

/// Repository for the change flow and its history tables.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
}

impl HistoryRepository {
    /// Creates a new HistoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        HistoryRepository { pool }
    }

    /// Records a toner change: consumes one cartridge from the chosen
    /// source, logs the swap, and resets the printer's level to full.
    ///
    /// All writes share one transaction; if anything fails (most commonly
    /// the source row lacking stock) nothing is recorded.
    pub async fn record_change(&self, req: &ChangeRequest) -> DbResult<TonerChange> {
        let borrowed = req.source_printer_id != req.printer_id;

        debug!(
            printer = %req.printer_name,
            model = %req.model_name,
            borrowed = %borrowed,
            "Recording toner change"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // 1. Consume one unit from the source row.
        let result = sqlx::query(
            r#"
            UPDATE inventory SET
                quantity = quantity - 1,
                updated_at = ?3
            WHERE printer_id = ?1 AND model_id = ?2 AND quantity >= 1
            "#,
        )
        .bind(&req.source_printer_id)
        .bind(&req.model_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::CheckViolation {
                message: format!(
                    "no stock of {} at source printer {}",
                    req.model_name, req.source_printer_id
                ),
            });
        }

        // 2. Borrowed stock opens a loan so the debt is tracked.
        if borrowed {
            sqlx::query(
                r#"
                INSERT INTO toner_loans (
                    id, lender_printer_id, borrower_printer_id, model_id, quantity,
                    status, notes, created_at, updated_at, returned_at
                ) VALUES (?1, ?2, ?3, ?4, 1, ?5, NULL, ?6, ?6, NULL)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&req.source_printer_id)
            .bind(&req.printer_id)
            .bind(&req.model_id)
            .bind(LoanStatus::Outstanding)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        // 3. The history row, with name snapshots.
        let change = TonerChange {
            id: Uuid::new_v4().to_string(),
            printer_id: req.printer_id.clone(),
            model_id: Some(req.model_id.clone()),
            model_name: req.model_name.clone(),
            source: if borrowed {
                ChangeSource::Borrowed
            } else {
                ChangeSource::Stock
            },
            lender_printer_id: borrowed.then(|| req.source_printer_id.clone()),
            changed_by: req.changed_by.clone(),
            level_before_pct: req.level_before_pct,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO toner_changes (
                id, printer_id, model_id, model_name, source,
                lender_printer_id, changed_by, level_before_pct, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&change.id)
        .bind(&change.printer_id)
        .bind(&change.model_id)
        .bind(&change.model_name)
        .bind(change.source)
        .bind(&change.lender_printer_id)
        .bind(&change.changed_by)
        .bind(change.level_before_pct)
        .bind(change.created_at)
        .execute(&mut *tx)
        .await?;

        // 4. The swapped-out cartridge goes to the recycling log.
        sqlx::query(
            r#"
            INSERT INTO empty_toners (
                id, printer_id, printer_name, model_name, created_at, collected_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, NULL)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&req.printer_id)
        .bind(&req.printer_name)
        .bind(&req.model_name)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // 5. Fresh cartridge: the printer reads full again.
        sqlx::query(
            "UPDATE printers SET toner_level_pct = 100, updated_at = ?2 WHERE id = ?1",
        )
        .bind(&req.printer_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // 6. Mirror the history row.
        let payload = serde_json::to_string(&change)
            .map_err(|e| DbError::Internal(format!("change serialization failed: {e}")))?;
        MirrorOutboxRepository::queue_on(&mut *tx, "TONER_CHANGE", &change.id, &payload).await?;

        tx.commit().await?;

        Ok(change)
    }

    /// Lists change history, newest first.
    pub async fn list_changes(
        &self,
        printer_id: Option<&str>,
        limit: u32,
    ) -> DbResult<Vec<TonerChange>> {
        let changes = sqlx::query_as::<_, TonerChange>(&format!(
            "SELECT {CHANGE_COLUMNS} FROM toner_changes \
             WHERE (?1 = '' OR printer_id = ?1) \
             ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(printer_id.unwrap_or(""))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(changes)
    }

    /// Lists the recycling log, oldest first.
    pub async fn list_empties(&self, uncollected_only: bool) -> DbResult<Vec<EmptyToner>> {
        let empties = sqlx::query_as::<_, EmptyToner>(&format!(
            "SELECT {EMPTY_COLUMNS} FROM empty_toners \
             WHERE (?1 = 0 OR collected_at IS NULL) \
             ORDER BY created_at ASC"
        ))
        .bind(uncollected_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(empties)
    }

    /// Marks an empty cartridge as collected by the recycler, exactly once.
    pub async fn mark_collected(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE empty_toners SET collected_at = ?2 WHERE id = ?1 AND collected_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Empty cartridge (uncollected)", id));
        }

        Ok(())
    }

    /// Deletes a recycling-log row.
    pub async fn delete_empty(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM empty_toners WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Empty cartridge", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{assign_toner_model, model, printer};

    fn change_request(
        printer: &tonerdesk_core::Printer,
        model: &tonerdesk_core::SupplyModel,
        source_printer_id: &str,
    ) -> ChangeRequest {
        ChangeRequest {
            printer_id: printer.id.clone(),
            printer_name: printer.name.clone(),
            model_id: model.id.clone(),
            model_name: model.name.clone(),
            source_printer_id: source_printer_id.to_string(),
            changed_by: "bernd".to_string(),
            level_before_pct: 4,
        }
    }

    #[tokio::test]
    async fn test_change_from_own_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let m = model(&db, "TK-3160", 12_000).await;
        let p = assign_toner_model(&db, &printer(&db, "Accounting").await, &m).await;

        db.printers().set_toner_level(&p.id, 4).await.unwrap();
        db.inventory().set_quantity(&p.id, &m.id, 2).await.unwrap();

        let change = db
            .history()
            .record_change(&change_request(&p, &m, &p.id))
            .await
            .unwrap();

        assert_eq!(change.source, ChangeSource::Stock);
        assert_eq!(change.model_name, "TK-3160");
        assert_eq!(change.level_before_pct, 4);

        // Stock consumed, level reset, empty logged, no loan opened
        assert_eq!(db.inventory().quantity_at(&p.id, &m.id).await.unwrap(), 1);
        let reloaded = db.printers().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(reloaded.toner_level_pct, 100);
        assert_eq!(db.history().list_empties(true).await.unwrap().len(), 1);
        assert!(db.loans().list(true, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_change_from_borrowed_stock_opens_loan() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let m = model(&db, "TK-3160", 12_000).await;
        let p = assign_toner_model(&db, &printer(&db, "Accounting").await, &m).await;
        let lender = printer(&db, "Warehouse").await;

        db.inventory().set_quantity(&lender.id, &m.id, 3).await.unwrap();

        let change = db
            .history()
            .record_change(&change_request(&p, &m, &lender.id))
            .await
            .unwrap();

        assert_eq!(change.source, ChangeSource::Borrowed);
        assert_eq!(change.lender_printer_id.as_deref(), Some(lender.id.as_str()));

        assert_eq!(db.inventory().quantity_at(&lender.id, &m.id).await.unwrap(), 2);
        let loans = db.loans().outstanding_for(&p.id, &m.id).await.unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].quantity, 1);
        assert_eq!(loans[0].lender_printer_id, lender.id);
    }

    #[tokio::test]
    async fn test_change_without_stock_writes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let m = model(&db, "TK-3160", 12_000).await;
        let p = assign_toner_model(&db, &printer(&db, "Accounting").await, &m).await;

        db.printers().set_toner_level(&p.id, 4).await.unwrap();

        let err = db
            .history()
            .record_change(&change_request(&p, &m, &p.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));

        // Nothing was recorded and the level did not reset
        assert!(db.history().list_changes(None, 10).await.unwrap().is_empty());
        assert!(db.history().list_empties(false).await.unwrap().is_empty());
        let reloaded = db.printers().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(reloaded.toner_level_pct, 4);
    }

    #[tokio::test]
    async fn test_model_soft_delete_leaves_history_untouched() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let m = model(&db, "TK-3160", 12_000).await;
        let p = assign_toner_model(&db, &printer(&db, "Accounting").await, &m).await;

        db.inventory().set_quantity(&p.id, &m.id, 1).await.unwrap();
        db.history()
            .record_change(&change_request(&p, &m, &p.id))
            .await
            .unwrap();

        db.supply_models().soft_delete(&m.id).await.unwrap();

        let history = db.history().list_changes(Some(&p.id), 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].model_name, "TK-3160");
        assert_eq!(history[0].model_id.as_deref(), Some(m.id.as_str()));
    }

    #[tokio::test]
    async fn test_mark_collected_exactly_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let m = model(&db, "TK-3160", 12_000).await;
        let p = assign_toner_model(&db, &printer(&db, "Accounting").await, &m).await;

        db.inventory().set_quantity(&p.id, &m.id, 1).await.unwrap();
        db.history()
            .record_change(&change_request(&p, &m, &p.id))
            .await
            .unwrap();

        let empty = &db.history().list_empties(true).await.unwrap()[0];
        db.history().mark_collected(&empty.id).await.unwrap();

        let err = db.history().mark_collected(&empty.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(db.history().list_empties(true).await.unwrap().is_empty());
    }
}
