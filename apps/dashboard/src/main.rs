//! # TonerDesk CLI Entry Point
//!
//! The original dashboard's forms and tables, rendered as subcommands.
//! Every subcommand maps onto one command function; `--json` emits the
//! response DTO verbatim for scripting.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::process::ExitCode;

use tonerdesk_core::{OrderStatus, SupplyKind, TicketStatus};
use tonerdesk_dashboard::error::ApiError;
use tonerdesk_dashboard::{commands, init_tracing, AppContext};

#[derive(Parser)]
#[command(name = "tonerdesk")]
#[command(about = "Printer consumables dashboard", version)]
struct Cli {
    /// Emit responses as JSON instead of tables.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Printers: register, list, meter readings
    Printer {
        #[command(subcommand)]
        command: PrinterCommand,
    },
    /// Toner and fuser model catalog
    Model {
        #[command(subcommand)]
        command: ModelCommand,
    },
    /// Stock views and corrections
    Stock {
        #[command(subcommand)]
        command: StockCommand,
    },
    /// Purchase orders and arrival reconciliation
    Order {
        #[command(subcommand)]
        command: OrderCommand,
    },
    /// Inter-printer loans
    Loan {
        #[command(subcommand)]
        command: LoanCommand,
    },
    /// Toner changes (the consumption flow)
    Change {
        #[command(subcommand)]
        command: ChangeCommand,
    },
    /// Recycling log of swapped-out cartridges
    Empty {
        #[command(subcommand)]
        command: EmptyCommand,
    },
    /// Service tickets
    Ticket {
        #[command(subcommand)]
        command: TicketCommand,
    },
    /// Users reference list
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Operators reference list
    Operator {
        #[command(subcommand)]
        command: OperatorCommand,
    },
    /// Fleet forecast and mirror backlog
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

#[derive(Subcommand)]
enum PrinterCommand {
    /// Register a new printer
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        serial: Option<String>,
        /// Toner model name or UUID
        #[arg(long)]
        toner_model: Option<String>,
        /// Fuser model name or UUID
        #[arg(long)]
        fuser_model: Option<String>,
        #[arg(long, default_value_t = 0)]
        daily_pages: i64,
        #[arg(long, default_value_t = 100)]
        level: i64,
    },
    /// List printers
    List {
        /// Include retired printers
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Show one printer with stock and forecast
    Show { printer: String },
    /// Update printer master data
    Update {
        printer: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        serial: Option<String>,
        #[arg(long)]
        toner_model: Option<String>,
        #[arg(long)]
        fuser_model: Option<String>,
        #[arg(long)]
        daily_pages: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Record manual meter readings
    Level {
        printer: String,
        #[arg(long)]
        toner: Option<i64>,
        #[arg(long)]
        fuser: Option<i64>,
    },
    /// Retire a printer
    Retire { printer: String },
}

#[derive(Subcommand)]
enum ModelCommand {
    /// Add a model to the catalog
    Add {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        name: String,
        /// Rated page yield (toner) or lifespan (fuser)
        #[arg(long)]
        capacity: i64,
        #[arg(long)]
        color: Option<String>,
    },
    /// List catalog entries
    List {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
    /// Update a catalog entry
    Update {
        model: String,
        #[arg(long, value_enum, default_value_t = KindArg::Toner)]
        kind: KindArg,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        capacity: Option<i64>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Retire a catalog entry
    Retire {
        model: String,
        #[arg(long, value_enum, default_value_t = KindArg::Toner)]
        kind: KindArg,
    },
}

#[derive(Subcommand)]
enum StockCommand {
    /// Fleet-wide totals per model
    Overview,
    /// Stock held at one printer
    Printer { printer: String },
    /// Set an absolute quantity after a stocktake
    Set {
        #[arg(long)]
        printer: String,
        #[arg(long, value_enum, default_value_t = KindArg::Toner)]
        kind: KindArg,
        #[arg(long)]
        model: String,
        #[arg(long)]
        quantity: i64,
    },
}

#[derive(Subcommand)]
enum OrderCommand {
    /// Place a pending order
    Place {
        #[arg(long)]
        printer: String,
        /// Model name or UUID; defaults to the printer's toner model
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        quantity: i64,
        /// Who placed the order
        #[arg(long)]
        by: String,
        #[arg(long)]
        supplier: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List orders
    List {
        #[arg(long, value_enum)]
        status: Option<OrderStatusArg>,
        #[arg(long)]
        printer: Option<String>,
    },
    /// Confirm an arrival (books stock in, surfaces open loans)
    Arrive {
        order_id: String,
        /// Pay open loans back out of the arrived stock
        #[arg(long, default_value_t = false)]
        settle_loans: bool,
    },
    /// Cancel a pending order
    Cancel { order_id: String },
}

#[derive(Subcommand)]
enum LoanCommand {
    /// Move stock between printers, recording the debt
    Create {
        #[arg(long)]
        lender: String,
        #[arg(long)]
        borrower: String,
        /// Model name or UUID; defaults to the borrower's toner model
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        quantity: i64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List loans
    List {
        /// Include returned loans
        #[arg(long, default_value_t = false)]
        all: bool,
        #[arg(long)]
        printer: Option<String>,
    },
    /// Mark a loan returned (physical hand-back)
    Return { loan_id: String },
    /// Settle a loan out of the borrower's stock
    Settle { loan_id: String },
}

#[derive(Subcommand)]
enum ChangeCommand {
    /// Swap the cartridge in a printer
    Perform {
        #[arg(long)]
        printer: String,
        /// Who swapped it
        #[arg(long)]
        by: String,
        /// Take the cartridge from this printer instead of the preferred source
        #[arg(long)]
        from: Option<String>,
    },
    /// Show ranked candidate sources for a printer
    Sources { printer: String },
    /// Change history
    History {
        #[arg(long)]
        printer: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum EmptyCommand {
    /// List swapped-out cartridges
    List {
        /// Include collected cartridges
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Mark a cartridge picked up by the recycler
    Collect { id: String },
    /// Delete a recycling-log row
    Delete { id: String },
}

#[derive(Subcommand)]
enum TicketCommand {
    /// Open a ticket
    Open {
        #[arg(long)]
        printer: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Who reported the problem
        #[arg(long)]
        by: String,
    },
    /// List tickets
    List {
        #[arg(long, value_enum)]
        status: Option<TicketStatusArg>,
        #[arg(long)]
        printer: Option<String>,
    },
    /// Update title or description
    Update {
        ticket_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Assign a technician
    Assign {
        ticket_id: String,
        #[arg(long)]
        operator: String,
    },
    /// Close a ticket
    Close { ticket_id: String },
    /// Reopen a closed ticket
    Reopen { ticket_id: String },
}

#[derive(Subcommand)]
enum UserCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
    },
    List,
    Remove { user: String },
}

#[derive(Subcommand)]
enum OperatorCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    List,
    Remove { operator: String },
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Fleet forecast report
    Fleet {
        #[arg(long, value_enum, default_value_t = KindArg::Toner)]
        kind: KindArg,
    },
    /// Mirror outbox backlog
    Mirror,
    /// Drop mirrored entries past the retention window
    Cleanup,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Toner,
    Fuser,
}

impl From<KindArg> for SupplyKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Toner => SupplyKind::Toner,
            KindArg::Fuser => SupplyKind::Fuser,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderStatusArg {
    Pending,
    Arrived,
}

impl From<OrderStatusArg> for OrderStatus {
    fn from(arg: OrderStatusArg) -> Self {
        match arg {
            OrderStatusArg::Pending => OrderStatus::Pending,
            OrderStatusArg::Arrived => OrderStatus::Arrived,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TicketStatusArg {
    Open,
    InProgress,
    Closed,
}

impl From<TicketStatusArg> for TicketStatus {
    fn from(arg: TicketStatusArg) -> Self {
        match arg {
            TicketStatusArg::Open => TicketStatus::Open,
            TicketStatusArg::InProgress => TicketStatus::InProgress,
            TicketStatusArg::Closed => TicketStatus::Closed,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    let ctx = match AppContext::init().await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("startup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    match dispatch(&ctx, cli.command, cli.json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                // Error DTO on stdout so scripts see one JSON document either way
                println!("{}", serde_json::to_string_pretty(&e).unwrap_or_default());
            } else {
                eprintln!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Prints a response: JSON verbatim, or the human rendering.
fn emit<T: Serialize>(json: bool, value: &T, human: String) {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!("{human}");
    }
}

async fn dispatch(ctx: &AppContext, command: Commands, json: bool) -> Result<(), ApiError> {
    let db = &ctx.db;
    let config = &ctx.config;

    match command {
        Commands::Printer { command } => match command {
            PrinterCommand::Add {
                name,
                location,
                address,
                serial,
                toner_model,
                fuser_model,
                daily_pages,
                level,
            } => {
                let row = commands::printer::register_printer(
                    db,
                    commands::printer::RegisterPrinterRequest {
                        name,
                        location,
                        address,
                        serial,
                        toner_model,
                        fuser_model,
                        daily_pages,
                        toner_level_pct: level,
                    },
                )
                .await?;
                emit(json, &row, format!("registered printer {} ({})", row.name, row.id));
            }
            PrinterCommand::List { all } => {
                let rows = commands::printer::list_printers(db, all).await?;
                let mut out = format!(
                    "{:<24} {:<22} {:<16} {:<12} {:>6} {:>6}\n",
                    "NAME", "LOCATION", "ADDRESS", "TONER", "LVL%", "PPD"
                );
                for r in &rows {
                    out.push_str(&format!(
                        "{:<24} {:<22} {:<16} {:<12} {:>6} {:>6}\n",
                        r.name,
                        r.location,
                        r.address,
                        r.toner_model.as_deref().unwrap_or("-"),
                        r.toner_level_pct,
                        r.daily_pages
                    ));
                }
                emit(json, &rows, out.trim_end().to_string());
            }
            PrinterCommand::Show { printer } => {
                let detail = commands::printer::show_printer(db, &printer).await?;
                let human = format!(
                    "{} @ {} ({})\n  toner: {} at {}%, {} on hand, {} pages / {} days left",
                    detail.row.name,
                    detail.row.location,
                    detail.row.address,
                    detail.row.toner_model.as_deref().unwrap_or("unassigned"),
                    detail.row.toner_level_pct,
                    detail.toner_on_hand,
                    detail
                        .pages_remaining
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "?".to_string()),
                    detail
                        .days_remaining
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "∞".to_string()),
                );
                emit(json, &detail, human);
            }
            PrinterCommand::Update {
                printer,
                location,
                address,
                serial,
                toner_model,
                fuser_model,
                daily_pages,
                notes,
            } => {
                let row = commands::printer::update_printer(
                    db,
                    &printer,
                    commands::printer::UpdatePrinterRequest {
                        location,
                        address,
                        serial,
                        toner_model,
                        fuser_model,
                        daily_pages,
                        notes,
                    },
                )
                .await?;
                emit(json, &row, format!("updated printer {}", row.name));
            }
            PrinterCommand::Level { printer, toner, fuser } => {
                commands::printer::set_levels(db, &printer, toner, fuser).await?;
                emit(json, &"ok", "levels recorded".to_string());
            }
            PrinterCommand::Retire { printer } => {
                commands::printer::retire_printer(db, &printer).await?;
                emit(json, &"ok", format!("retired printer {printer}"));
            }
        },

        Commands::Model { command } => match command {
            ModelCommand::Add {
                kind,
                name,
                capacity,
                color,
            } => {
                let row =
                    commands::supply::add_model(db, kind.into(), &name, capacity, color).await?;
                emit(json, &row, format!("added {} model {}", row.kind.as_str(), row.name));
            }
            ModelCommand::List { kind } => {
                let rows = commands::supply::list_models(db, kind.map(Into::into)).await?;
                let mut out = format!("{:<8} {:<20} {:>10} {:<8}\n", "KIND", "NAME", "PAGES", "COLOR");
                for r in &rows {
                    out.push_str(&format!(
                        "{:<8} {:<20} {:>10} {:<8}\n",
                        r.kind.as_str(),
                        r.name,
                        r.capacity_pages,
                        r.color.as_deref().unwrap_or("-")
                    ));
                }
                emit(json, &rows, out.trim_end().to_string());
            }
            ModelCommand::Update {
                model,
                kind,
                name,
                capacity,
                color,
            } => {
                let row = commands::supply::update_model(db, kind.into(), &model, name, capacity, color)
                    .await?;
                emit(json, &row, format!("updated model {}", row.name));
            }
            ModelCommand::Retire { model, kind } => {
                commands::supply::retire_model(db, kind.into(), &model).await?;
                emit(json, &"ok", format!("retired model {model}"));
            }
        },

        Commands::Stock { command } => match command {
            StockCommand::Overview => {
                let totals = commands::inventory::stock_overview(db).await?;
                let mut out = format!("{:<8} {:<20} {:>8}\n", "KIND", "MODEL", "TOTAL");
                for t in &totals {
                    out.push_str(&format!(
                        "{:<8} {:<20} {:>8}\n",
                        t.kind.as_str(),
                        t.model_name,
                        t.total_quantity
                    ));
                }
                emit(json, &totals, out.trim_end().to_string());
            }
            StockCommand::Printer { printer } => {
                let rows = commands::inventory::printer_stock(db, &printer).await?;
                let mut out = format!("{:<8} {:<20} {:>8}\n", "KIND", "MODEL", "QTY");
                for r in &rows {
                    out.push_str(&format!(
                        "{:<8} {:<20} {:>8}\n",
                        r.kind.as_str(),
                        r.model_name,
                        r.quantity
                    ));
                }
                emit(json, &rows, out.trim_end().to_string());
            }
            StockCommand::Set {
                printer,
                kind,
                model,
                quantity,
            } => {
                commands::inventory::set_stock(db, &printer, kind.into(), &model, quantity).await?;
                emit(json, &"ok", format!("stock of {model} at {printer} set to {quantity}"));
            }
        },

        Commands::Order { command } => match command {
            OrderCommand::Place {
                printer,
                model,
                quantity,
                by,
                supplier,
                notes,
            } => {
                let row = commands::order::place_order(
                    db,
                    commands::order::PlaceOrderRequest {
                        printer,
                        model,
                        quantity,
                        ordered_by: by,
                        supplier,
                        notes,
                    },
                )
                .await?;
                emit(
                    json,
                    &row,
                    format!("ordered {}x {} for {} ({})", row.quantity, row.model, row.printer, row.id),
                );
            }
            OrderCommand::List { status, printer } => {
                let rows =
                    commands::order::list_orders(db, status.map(Into::into), printer.as_deref())
                        .await?;
                let mut out = format!(
                    "{:<38} {:<20} {:<14} {:>4} {:<8}\n",
                    "ID", "PRINTER", "MODEL", "QTY", "STATUS"
                );
                for r in &rows {
                    out.push_str(&format!(
                        "{:<38} {:<20} {:<14} {:>4} {:<8}\n",
                        r.id,
                        r.printer,
                        r.model,
                        r.quantity,
                        r.status.as_str()
                    ));
                }
                emit(json, &rows, out.trim_end().to_string());
            }
            OrderCommand::Arrive {
                order_id,
                settle_loans,
            } => {
                let outcome = commands::order::mark_order_arrived(db, &order_id, settle_loans).await?;
                let mut human = format!(
                    "order arrived: {}x {} for {} ({} now on hand)",
                    outcome.order.quantity, outcome.order.model, outcome.order.printer, outcome.on_hand
                );
                for loan in &outcome.settled_loans {
                    human.push_str(&format!("\n  settled loan from {} ({}x)", loan.lender, loan.quantity));
                }
                for loan in &outcome.open_loans {
                    human.push_str(&format!(
                        "\n  still owes {} {}x {} (loan {}) - settle with `tonerdesk loan settle`",
                        loan.lender, loan.quantity, loan.model, loan.id
                    ));
                }
                emit(json, &outcome, human);
            }
            OrderCommand::Cancel { order_id } => {
                commands::order::cancel_order(db, &order_id).await?;
                emit(json, &"ok", format!("cancelled order {order_id}"));
            }
        },

        Commands::Loan { command } => match command {
            LoanCommand::Create {
                lender,
                borrower,
                model,
                quantity,
                notes,
            } => {
                let row = commands::loan::lend(
                    db,
                    commands::loan::LendRequest {
                        lender,
                        borrower,
                        model,
                        quantity,
                        notes,
                    },
                )
                .await?;
                emit(
                    json,
                    &row,
                    format!("{} lent {}x {} to {} ({})", row.lender, row.quantity, row.model, row.borrower, row.id),
                );
            }
            LoanCommand::List { all, printer } => {
                let rows = commands::loan::list_loans(db, !all, printer.as_deref()).await?;
                let mut out = format!(
                    "{:<38} {:<18} {:<18} {:<14} {:>4} {:<12}\n",
                    "ID", "LENDER", "BORROWER", "MODEL", "QTY", "STATUS"
                );
                for r in &rows {
                    out.push_str(&format!(
                        "{:<38} {:<18} {:<18} {:<14} {:>4} {:<12}\n",
                        r.id,
                        r.lender,
                        r.borrower,
                        r.model,
                        r.quantity,
                        r.status.as_str()
                    ));
                }
                emit(json, &rows, out.trim_end().to_string());
            }
            LoanCommand::Return { loan_id } => {
                let row = commands::loan::return_loan(db, &loan_id).await?;
                emit(json, &row, format!("loan returned, {} restored by {}", row.lender, row.quantity));
            }
            LoanCommand::Settle { loan_id } => {
                let row = commands::loan::settle_loan(db, &loan_id).await?;
                emit(
                    json,
                    &row,
                    format!("loan settled from {}'s stock, {} restored by {}", row.borrower, row.lender, row.quantity),
                );
            }
        },

        Commands::Change { command } => match command {
            ChangeCommand::Perform { printer, by, from } => {
                let printer_label = printer.clone();
                let outcome = commands::change::change_toner(
                    db,
                    commands::change::ChangeTonerRequest {
                        printer,
                        changed_by: by,
                        from_printer: from,
                    },
                )
                .await?;
                let mut human = format!(
                    "changed {} with a {} cartridge from {} ({} left there)",
                    printer_label,
                    outcome.change.model_name,
                    outcome.source_printer,
                    outcome.remaining_at_source
                );
                if outcome.loan_opened {
                    human.push_str("\n  a loan was opened - return it when fresh stock arrives");
                }
                emit(json, &outcome, human);
            }
            ChangeCommand::Sources { printer } => {
                let sources = commands::change::change_sources(db, &printer).await?;
                let mut out = format!("{:<24} {:>4} {:<6}\n", "SOURCE", "QTY", "OWN");
                for s in &sources {
                    out.push_str(&format!(
                        "{:<24} {:>4} {:<6}\n",
                        s.printer_name,
                        s.quantity,
                        if s.is_own { "yes" } else { "no" }
                    ));
                }
                emit(json, &sources, out.trim_end().to_string());
            }
            ChangeCommand::History { printer, limit } => {
                let rows = commands::change::change_history(db, printer.as_deref(), limit).await?;
                let mut out = format!(
                    "{:<26} {:<14} {:<10} {:<14} {:>5}\n",
                    "WHEN", "MODEL", "SOURCE", "BY", "LVL%"
                );
                for r in &rows {
                    out.push_str(&format!(
                        "{:<26} {:<14} {:<10} {:<14} {:>5}\n",
                        r.created_at,
                        r.model_name,
                        match r.source {
                            tonerdesk_core::ChangeSource::Stock => "stock",
                            tonerdesk_core::ChangeSource::Borrowed => "borrowed",
                        },
                        r.changed_by,
                        r.level_before_pct
                    ));
                }
                emit(json, &rows, out.trim_end().to_string());
            }
        },

        Commands::Empty { command } => match command {
            EmptyCommand::List { all } => {
                let rows = commands::change::list_empties(db, !all).await?;
                let mut out = format!("{:<38} {:<20} {:<14} {:<10}\n", "ID", "PRINTER", "MODEL", "COLLECTED");
                for r in &rows {
                    out.push_str(&format!(
                        "{:<38} {:<20} {:<14} {:<10}\n",
                        r.id,
                        r.printer_name,
                        r.model_name,
                        if r.collected_at.is_some() { "yes" } else { "no" }
                    ));
                }
                emit(json, &rows, out.trim_end().to_string());
            }
            EmptyCommand::Collect { id } => {
                commands::change::collect_empty(db, &id).await?;
                emit(json, &"ok", format!("cartridge {id} collected"));
            }
            EmptyCommand::Delete { id } => {
                commands::change::delete_empty(db, &id).await?;
                emit(json, &"ok", format!("cartridge {id} deleted"));
            }
        },

        Commands::Ticket { command } => match command {
            TicketCommand::Open {
                printer,
                title,
                description,
                by,
            } => {
                let row = commands::ticket::open_ticket(
                    db,
                    commands::ticket::OpenTicketRequest {
                        printer,
                        title,
                        description,
                        opened_by: by,
                    },
                )
                .await?;
                emit(json, &row, format!("opened ticket {} for {}", row.id, row.printer));
            }
            TicketCommand::List { status, printer } => {
                let rows =
                    commands::ticket::list_tickets(db, status.map(Into::into), printer.as_deref())
                        .await?;
                let mut out = format!(
                    "{:<38} {:<20} {:<30} {:<12} {:<14}\n",
                    "ID", "PRINTER", "TITLE", "STATUS", "ASSIGNED"
                );
                for r in &rows {
                    out.push_str(&format!(
                        "{:<38} {:<20} {:<30} {:<12} {:<14}\n",
                        r.id,
                        r.printer,
                        r.title,
                        r.status.as_str(),
                        r.assigned_to.as_deref().unwrap_or("-")
                    ));
                }
                emit(json, &rows, out.trim_end().to_string());
            }
            TicketCommand::Update {
                ticket_id,
                title,
                description,
            } => {
                commands::ticket::update_ticket(db, &ticket_id, title.as_deref(), description.as_deref())
                    .await?;
                emit(json, &"ok", format!("ticket {ticket_id} updated"));
            }
            TicketCommand::Assign {
                ticket_id,
                operator,
            } => {
                commands::ticket::assign_ticket(db, &ticket_id, &operator).await?;
                emit(json, &"ok", format!("ticket {ticket_id} assigned to {operator}"));
            }
            TicketCommand::Close { ticket_id } => {
                commands::ticket::close_ticket(db, &ticket_id).await?;
                emit(json, &"ok", format!("ticket {ticket_id} closed"));
            }
            TicketCommand::Reopen { ticket_id } => {
                commands::ticket::reopen_ticket(db, &ticket_id).await?;
                emit(json, &"ok", format!("ticket {ticket_id} reopened"));
            }
        },

        Commands::User { command } => match command {
            UserCommand::Add { name, email } => {
                let user = commands::account::add_user(db, &name, email.as_deref()).await?;
                emit(json, &user, format!("added user {}", user.name));
            }
            UserCommand::List => {
                let users = commands::account::list_users(db).await?;
                let mut out = String::new();
                for u in &users {
                    out.push_str(&format!("{:<20} {}\n", u.name, u.email.as_deref().unwrap_or("-")));
                }
                emit(json, &users, out.trim_end().to_string());
            }
            UserCommand::Remove { user } => {
                commands::account::remove_user(db, &user).await?;
                emit(json, &"ok", format!("removed user {user}"));
            }
        },

        Commands::Operator { command } => match command {
            OperatorCommand::Add {
                name,
                company,
                phone,
            } => {
                let operator =
                    commands::account::add_operator(db, &name, company.as_deref(), phone.as_deref())
                        .await?;
                emit(json, &operator, format!("added operator {}", operator.name));
            }
            OperatorCommand::List => {
                let operators = commands::account::list_operators(db).await?;
                let mut out = String::new();
                for o in &operators {
                    out.push_str(&format!(
                        "{:<20} {:<20} {}\n",
                        o.name,
                        o.company.as_deref().unwrap_or("-"),
                        o.phone.as_deref().unwrap_or("-")
                    ));
                }
                emit(json, &operators, out.trim_end().to_string());
            }
            OperatorCommand::Remove { operator } => {
                commands::account::remove_operator(db, &operator).await?;
                emit(json, &"ok", format!("removed operator {operator}"));
            }
        },

        Commands::Report { command } => match command {
            ReportCommand::Fleet { kind } => {
                let report = commands::report::fleet_report(db, config, kind.into()).await?;
                let mut out = format!(
                    "{} - {} forecast ({})\n{:<24} {:<14} {:>5} {:>6} {:>6} {:<12} {:<16}\n",
                    report.office,
                    report.kind.as_str(),
                    report.generated_on,
                    "PRINTER",
                    "MODEL",
                    "LVL%",
                    "DAYS",
                    "STOCK",
                    "EMPTY ON",
                    "STATUS"
                );
                for r in &report.rows {
                    out.push_str(&format!(
                        "{:<24} {:<14} {:>5} {:>6} {:>6} {:<12} {:<16}\n",
                        r.printer,
                        r.model.as_deref().unwrap_or("unassigned"),
                        r.level_pct,
                        r.days_remaining
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "∞".to_string()),
                        r.on_hand,
                        r.empty_on.as_deref().unwrap_or("-"),
                        match r.status {
                            tonerdesk_core::forecast::SupplyStatus::Ok => "ok",
                            tonerdesk_core::forecast::SupplyStatus::LowLevel => "LOW LEVEL",
                            tonerdesk_core::forecast::SupplyStatus::OrderSuggested =>
                                "ORDER SUGGESTED",
                        }
                    ));
                }
                emit(json, &report, out.trim_end().to_string());
            }
            ReportCommand::Mirror => {
                let backlog = commands::report::mirror_backlog(db).await?;
                emit(json, &backlog, format!("{} entries waiting for the mirror", backlog.pending));
            }
            ReportCommand::Cleanup => {
                let dropped = commands::report::cleanup_mirror(db, config).await?;
                emit(json, &dropped, format!("dropped {dropped} mirrored entries"));
            }
        },
    }

    Ok(())
}
