//! # Database State
//!
//! Wraps the `Database` connection for use in dashboard commands.
//!
//! ## Thread Safety
//! The `Database` struct from `tonerdesk-db` contains a `SqlitePool` which
//! is inherently thread-safe. Commands run sequentially per user action,
//! but nothing here would break under concurrency.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn list_printers(db: &DbState) -> Result<Vec<PrinterRow>, ApiError> {
//!     let printers = db.inner().printers().list(true).await?;
//!     Ok(printers.into_iter().map(PrinterRow::from).collect())
//! }
//! ```

use tonerdesk_db::Database;

/// Wrapper around `Database` for the application state.
///
/// ## Why a Wrapper?
/// Keeps the command signatures honest: a command taking `&DbState` is a
/// command that talks to storage, nothing else.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
