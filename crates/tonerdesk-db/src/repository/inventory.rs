//! # Inventory Repository
//!
//! Database operations for per-printer supply stock.
//!
//! ## Delta Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Quantity Update Strategy                             │
//! │                                                                         │
//! │  Flows adjust stock by delta, not by absolute value:                    │
//! │     UPDATE inventory SET quantity = quantity + ?delta                   │
//! │                                                                         │
//! │  A guard keeps quantities non-negative at the statement level:          │
//! │     … WHERE printer_id = ? AND model_id = ? AND quantity + ?delta >= 0  │
//! │                                                                         │
//! │  rows_affected = 0 then means "row missing or would go negative";       │
//! │  callers resolve which by reading the row. The CHECK (quantity >= 0)    │
//! │  constraint backstops anything that slips through.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tonerdesk_core::allocation::StockAtPrinter;
use tonerdesk_core::{InventoryRow, SupplyKind};

const INVENTORY_COLUMNS: &str = "id, printer_id, model_id, quantity, created_at, updated_at";

/// Fleet-wide stock total for one model, for the inventory overview table.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ModelStockTotal {
    pub model_id: String,
    pub model_name: String,
    pub kind: SupplyKind,
    pub total_quantity: i64,
}

/// Repository for inventory database operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets the row for one (printer, model) pair.
    pub async fn get(&self, printer_id: &str, model_id: &str) -> DbResult<Option<InventoryRow>> {
        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE printer_id = ?1 AND model_id = ?2"
        ))
        .bind(printer_id)
        .bind(model_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists all stock rows held at one printer.
    pub async fn list_for_printer(&self, printer_id: &str) -> DbResult<Vec<InventoryRow>> {
        let rows = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE printer_id = ?1 ORDER BY model_id"
        ))
        .bind(printer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// On-hand quantity of a model at one printer (0 when no row exists).
    pub async fn quantity_at(&self, printer_id: &str, model_id: &str) -> DbResult<i64> {
        Ok(self
            .get(printer_id, model_id)
            .await?
            .map(|row| row.quantity)
            .unwrap_or(0))
    }

    /// Where a model is stocked across the fleet, for allocation ranking.
    ///
    /// Joins printer names so the allocation module can present candidates;
    /// only active printers count as sources.
    pub async fn stock_of_model(&self, model_id: &str) -> DbResult<Vec<StockAtPrinter>> {
        let stock = sqlx::query_as::<_, StockAtPrinter>(
            r#"
            SELECT i.printer_id AS printer_id,
                   p.name       AS printer_name,
                   i.quantity   AS quantity
            FROM inventory i
            INNER JOIN printers p ON p.id = i.printer_id
            WHERE i.model_id = ?1 AND p.is_active = 1
            ORDER BY p.name
            "#,
        )
        .bind(model_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stock)
    }

    /// Fleet-wide totals per model, for the inventory overview.
    pub async fn totals_by_model(&self) -> DbResult<Vec<ModelStockTotal>> {
        let totals = sqlx::query_as::<_, ModelStockTotal>(
            r#"
            SELECT m.id            AS model_id,
                   m.name          AS model_name,
                   m.kind          AS kind,
                   SUM(i.quantity) AS total_quantity
            FROM inventory i
            INNER JOIN supply_models m ON m.id = i.model_id
            GROUP BY m.id, m.name, m.kind
            ORDER BY m.kind, m.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    /// Sets the absolute quantity for a (printer, model) pair, creating the
    /// row when absent.
    pub async fn set_quantity(
        &self,
        printer_id: &str,
        model_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        debug!(printer_id = %printer_id, model_id = %model_id, quantity = %quantity, "Setting inventory quantity");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO inventory (id, printer_id, model_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT (printer_id, model_id) DO UPDATE SET
                quantity = excluded.quantity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(printer_id)
        .bind(model_id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Adjusts a row by delta.
    ///
    /// ## Behavior
    /// - Positive delta on a missing row creates it
    /// - A decrement that would go negative fails with
    ///   [`DbError::CheckViolation`] and writes nothing
    ///
    /// ## Returns
    /// The new quantity.
    pub async fn adjust(&self, printer_id: &str, model_id: &str, delta: i64) -> DbResult<i64> {
        debug!(printer_id = %printer_id, model_id = %model_id, delta = %delta, "Adjusting inventory");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory SET
                quantity = quantity + ?3,
                updated_at = ?4
            WHERE printer_id = ?1 AND model_id = ?2 AND quantity + ?3 >= 0
            "#,
        )
        .bind(printer_id)
        .bind(model_id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Missing row: create it for a non-negative delta.
            if delta >= 0 && self.get(printer_id, model_id).await?.is_none() {
                self.set_quantity(printer_id, model_id, delta).await?;
                return Ok(delta);
            }

            return Err(DbError::CheckViolation {
                message: format!(
                    "inventory of model {model_id} at printer {printer_id} cannot go below zero"
                ),
            });
        }

        self.quantity_at(printer_id, model_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{model, printer};

    #[tokio::test]
    async fn test_upsert_and_adjust() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = printer(&db, "Front Desk").await;
        let m = model(&db, "TK-3160", 12_000).await;

        let repo = db.inventory();

        assert_eq!(repo.quantity_at(&p.id, &m.id).await.unwrap(), 0);

        repo.set_quantity(&p.id, &m.id, 3).await.unwrap();
        assert_eq!(repo.quantity_at(&p.id, &m.id).await.unwrap(), 3);

        // Upsert replaces, adjust is relative
        repo.set_quantity(&p.id, &m.id, 5).await.unwrap();
        assert_eq!(repo.adjust(&p.id, &m.id, -2).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_adjust_creates_missing_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = printer(&db, "Front Desk").await;
        let m = model(&db, "TK-3160", 12_000).await;

        let new_qty = db.inventory().adjust(&p.id, &m.id, 4).await.unwrap();
        assert_eq!(new_qty, 4);
    }

    #[tokio::test]
    async fn test_adjust_never_goes_negative() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = printer(&db, "Front Desk").await;
        let m = model(&db, "TK-3160", 12_000).await;

        db.inventory().set_quantity(&p.id, &m.id, 1).await.unwrap();

        let err = db.inventory().adjust(&p.id, &m.id, -2).await.unwrap_err();
        assert!(matches!(err, crate::DbError::CheckViolation { .. }));

        // Nothing was written
        assert_eq!(db.inventory().quantity_at(&p.id, &m.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stock_of_model_joins_printer_names() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = printer(&db, "Accounting").await;
        let b = printer(&db, "Warehouse").await;
        let m = model(&db, "CF287A", 9_000).await;

        db.inventory().set_quantity(&a.id, &m.id, 1).await.unwrap();
        db.inventory().set_quantity(&b.id, &m.id, 4).await.unwrap();

        let stock = db.inventory().stock_of_model(&m.id).await.unwrap();
        assert_eq!(stock.len(), 2);
        assert!(stock.iter().any(|s| s.printer_name == "Warehouse" && s.quantity == 4));
    }
}
