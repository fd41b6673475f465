//! # Printer Repository
//!
//! Database operations for printers.
//!
//! ## Key Operations
//! - CRUD with soft delete
//! - Level updates (manual meter readings; the change flow resets to full)
//!
//! Printer rows are soft-deleted so history rows referencing them stay
//! resolvable.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tonerdesk_core::Printer;

/// Every printer column, in struct-field order. Shared by the SELECTs below.
const PRINTER_COLUMNS: &str = "id, name, location, address, serial, toner_model_id, \
     fuser_model_id, daily_pages, toner_level_pct, fuser_level_pct, is_active, \
     notes, created_at, updated_at";

/// Repository for printer database operations.
#[derive(Debug, Clone)]
pub struct PrinterRepository {
    pool: SqlitePool,
}

impl PrinterRepository {
    /// Creates a new PrinterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PrinterRepository { pool }
    }

    /// Inserts a new printer.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - Printer name already exists
    pub async fn insert(&self, printer: &Printer) -> DbResult<()> {
        debug!(name = %printer.name, "Inserting printer");

        sqlx::query(
            r#"
            INSERT INTO printers (
                id, name, location, address, serial,
                toner_model_id, fuser_model_id,
                daily_pages, toner_level_pct, fuser_level_pct,
                is_active, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&printer.id)
        .bind(&printer.name)
        .bind(&printer.location)
        .bind(&printer.address)
        .bind(&printer.serial)
        .bind(&printer.toner_model_id)
        .bind(&printer.fuser_model_id)
        .bind(printer.daily_pages)
        .bind(printer.toner_level_pct)
        .bind(printer.fuser_level_pct)
        .bind(printer.is_active)
        .bind(&printer.notes)
        .bind(printer.created_at)
        .bind(printer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a printer by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Printer>> {
        let printer = sqlx::query_as::<_, Printer>(&format!(
            "SELECT {PRINTER_COLUMNS} FROM printers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(printer)
    }

    /// Gets a printer by its display name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Printer>> {
        let printer = sqlx::query_as::<_, Printer>(&format!(
            "SELECT {PRINTER_COLUMNS} FROM printers WHERE name = ?1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(printer)
    }

    /// Lists printers sorted by name.
    ///
    /// ## Arguments
    /// * `active_only` - when true, soft-deleted printers are excluded
    pub async fn list(&self, active_only: bool) -> DbResult<Vec<Printer>> {
        let sql = if active_only {
            format!("SELECT {PRINTER_COLUMNS} FROM printers WHERE is_active = 1 ORDER BY name")
        } else {
            format!("SELECT {PRINTER_COLUMNS} FROM printers ORDER BY name")
        };

        let printers = sqlx::query_as::<_, Printer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(printers)
    }

    /// Updates an existing printer.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Printer doesn't exist
    pub async fn update(&self, printer: &Printer) -> DbResult<()> {
        debug!(id = %printer.id, "Updating printer");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE printers SET
                name = ?2,
                location = ?3,
                address = ?4,
                serial = ?5,
                toner_model_id = ?6,
                fuser_model_id = ?7,
                daily_pages = ?8,
                toner_level_pct = ?9,
                fuser_level_pct = ?10,
                is_active = ?11,
                notes = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(&printer.id)
        .bind(&printer.name)
        .bind(&printer.location)
        .bind(&printer.address)
        .bind(&printer.serial)
        .bind(&printer.toner_model_id)
        .bind(&printer.fuser_model_id)
        .bind(printer.daily_pages)
        .bind(printer.toner_level_pct)
        .bind(printer.fuser_level_pct)
        .bind(printer.is_active)
        .bind(&printer.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Printer", &printer.id));
        }

        Ok(())
    }

    /// Records a manual toner meter reading.
    ///
    /// The change flow resets the level to 100 itself; this is for operators
    /// keying in what the printer's panel reports.
    pub async fn set_toner_level(&self, id: &str, level_pct: i64) -> DbResult<()> {
        debug!(id = %id, level_pct = %level_pct, "Setting toner level");
        self.set_level_column(id, "toner_level_pct", level_pct).await
    }

    /// Records a manual fuser meter reading.
    pub async fn set_fuser_level(&self, id: &str, level_pct: i64) -> DbResult<()> {
        debug!(id = %id, level_pct = %level_pct, "Setting fuser level");
        self.set_level_column(id, "fuser_level_pct", level_pct).await
    }

    async fn set_level_column(&self, id: &str, column: &str, level_pct: i64) -> DbResult<()> {
        let now = Utc::now();

        // column name comes from the two callers above, never from input
        let result = sqlx::query(&format!(
            "UPDATE printers SET {column} = ?2, updated_at = ?3 WHERE id = ?1"
        ))
        .bind(id)
        .bind(level_pct)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Printer", id));
        }

        Ok(())
    }

    /// Soft-deletes a printer by setting is_active = false.
    ///
    /// Historical change records keep pointing at the row; it just stops
    /// appearing in lists and reports.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting printer");

        let now = Utc::now();

        let result =
            sqlx::query("UPDATE printers SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Printer", id));
        }

        Ok(())
    }

    /// Counts active printers (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM printers WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new printer ID.
pub fn generate_printer_id() -> String {
    Uuid::new_v4().to_string()
}
