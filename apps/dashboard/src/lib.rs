//! # TonerDesk Dashboard Library
//!
//! Core library for the TonerDesk dashboard application.
//! This wires config, logging and the database together and exposes the
//! command functions the CLI surface dispatches to.
//!
//! ## Module Organization
//! ```text
//! tonerdesk_dashboard/
//! ├── lib.rs          ◄─── You are here (startup wiring)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/       ◄─── One module per dashboard area
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: WARN on the CLI, override with RUST_LOG                  │
//! │                                                                         │
//! │  2. Load Config ──────────────────────────────────────────────────────► │
//! │     • Defaults + TONERDESK_* environment overrides                      │
//! │                                                                         │
//! │  3. Determine Database Path ──────────────────────────────────────────► │
//! │     • TONERDESK_DB_PATH override, else the platform data dir            │
//! │                                                                         │
//! │  4. Connect to Database ──────────────────────────────────────────────► │
//! │     • SQLite with WAL mode, run pending migrations                      │
//! │                                                                         │
//! │  5. Dispatch the requested command                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use state::{ConfigState, DbState};
use tonerdesk_db::{Database, DbConfig};

/// Everything a command needs, wired once at startup.
///
/// The original dashboard's process-wide mutable store, made explicit:
/// commands borrow this instead of reaching into globals.
pub struct AppContext {
    pub db: DbState,
    pub config: ConfigState,
}

impl AppContext {
    /// Connects the database (running migrations) and loads config.
    pub async fn init() -> Result<Self, Box<dyn std::error::Error>> {
        let config = ConfigState::from_env();

        let db_path = database_path()?;
        info!(path = %db_path.display(), "Opening database");

        let db = Database::new(DbConfig::new(db_path)).await?;

        Ok(AppContext {
            db: DbState::new(db),
            config,
        })
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tonerdesk=trace` - Trace the tonerdesk crates only
/// - Default: WARN, so tables stay readable on the terminal
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,tonerdesk=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Resolution Order
/// 1. `TONERDESK_DB_PATH` environment variable
/// 2. The platform data directory:
///    - **Linux**: `~/.local/share/tonerdesk/tonerdesk.db`
///    - **macOS**: `~/Library/Application Support/com.tonerdesk.dashboard/tonerdesk.db`
///    - **Windows**: `%APPDATA%\tonerdesk\dashboard\tonerdesk.db`
fn database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(path) = std::env::var("TONERDESK_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "tonerdesk", "dashboard")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("tonerdesk.db"))
}
