//! # Seed Data Generator
//!
//! Populates the database with a small realistic fleet for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p tonerdesk-db --bin seed
//!
//! # Specify database path
//! cargo run -p tonerdesk-db --bin seed -- --db ./data/tonerdesk.db
//! ```
//!
//! ## Generated Data
//! - Common toner and fuser models with their rated page yields
//! - A handful of printers across locations, with models assigned
//! - Starting inventory at each printer
//! - One pending order and one outstanding loan, so the arrival and
//!   reconciliation flows have something to chew on

use chrono::Utc;
use std::env;
use uuid::Uuid;

use tonerdesk_core::{
    LoanStatus, OrderStatus, Printer, SupplyKind, SupplyModel, TonerLoan, TonerOrder,
};
use tonerdesk_db::{Database, DbConfig};

/// (kind, name, capacity_pages, color)
const MODELS: &[(SupplyKind, &str, i64, Option<&str>)] = &[
    (SupplyKind::Toner, "TK-3160", 12_500, None),
    (SupplyKind::Toner, "CF287A", 9_000, None),
    (SupplyKind::Toner, "TN-2420", 3_000, None),
    (SupplyKind::Toner, "106R03624", 15_000, None),
    (SupplyKind::Toner, "CLT-K404S", 1_500, Some("black")),
    (SupplyKind::Fuser, "FK-3130", 300_000, None),
    (SupplyKind::Fuser, "RM2-5425", 100_000, None),
];

/// (name, location, address, toner model, fuser model, daily pages, toner level)
const PRINTERS: &[(&str, &str, &str, &str, Option<&str>, i64, i64)] = &[
    ("Accounting HP", "2nd floor, accounting", "10.0.10.21", "CF287A", Some("RM2-5425"), 180, 34),
    ("Front Desk Kyocera", "1st floor, reception", "10.0.10.11", "TK-3160", Some("FK-3130"), 90, 67),
    ("Warehouse Kyocera", "warehouse office", "10.0.20.5", "TK-3160", Some("FK-3130"), 40, 81),
    ("HR Brother", "3rd floor, HR", "10.0.10.33", "TN-2420", None, 25, 12),
    ("Design Xerox", "3rd floor, design", "10.0.10.41", "106R03624", None, 310, 48),
];

/// (printer, model, quantity)
const STOCK: &[(&str, &str, i64)] = &[
    ("Front Desk Kyocera", "TK-3160", 2),
    ("Warehouse Kyocera", "TK-3160", 4),
    ("Accounting HP", "CF287A", 1),
    ("Design Xerox", "106R03624", 2),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./tonerdesk_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("TonerDesk Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./tonerdesk_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 TonerDesk Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.printers().count().await? > 0 {
        println!("⚠ Database already has printers");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    // Supply models
    let mut model_ids: Vec<(&str, String)> = Vec::new();
    for &(kind, name, capacity, color) in MODELS {
        let model = SupplyModel {
            id: Uuid::new_v4().to_string(),
            kind,
            name: name.to_string(),
            capacity_pages: capacity,
            color: color.map(str::to_string),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.supply_models().insert(&model).await?;
        model_ids.push((name, model.id));
    }
    println!("✓ Inserted {} supply models", MODELS.len());

    let model_id = |name: &str| -> String {
        model_ids
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, id)| id.clone())
            .expect("seed model exists")
    };

    // Printers
    let mut printer_ids: Vec<(&str, String)> = Vec::new();
    for &(name, location, address, toner, fuser, daily, level) in PRINTERS {
        let printer = Printer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            location: location.to_string(),
            address: address.to_string(),
            serial: Some(format!("SN-{:08}", printer_ids.len() + 1)),
            toner_model_id: Some(model_id(toner)),
            fuser_model_id: fuser.map(&model_id),
            daily_pages: daily,
            toner_level_pct: level,
            fuser_level_pct: 90,
            is_active: true,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        db.printers().insert(&printer).await?;
        printer_ids.push((name, printer.id));
    }
    println!("✓ Inserted {} printers", PRINTERS.len());

    let printer_id = |name: &str| -> String {
        printer_ids
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, id)| id.clone())
            .expect("seed printer exists")
    };

    // Starting inventory
    for &(printer, model, quantity) in STOCK {
        db.inventory()
            .set_quantity(&printer_id(printer), &model_id(model), quantity)
            .await?;
    }
    println!("✓ Stocked {} inventory rows", STOCK.len());

    // Reference lists
    db.accounts().insert_user("bernd", Some("bernd@office.lan")).await?;
    db.accounts().insert_user("petra", None).await?;
    db.accounts()
        .insert_operator("PrintCare GmbH", Some("PrintCare"), Some("+49 30 5550 123"))
        .await?;
    println!("✓ Inserted reference lists");

    // A pending order for the low HR printer
    let order = TonerOrder {
        id: Uuid::new_v4().to_string(),
        printer_id: printer_id("HR Brother"),
        model_id: model_id("TN-2420"),
        quantity: 2,
        status: OrderStatus::Pending,
        ordered_by: "bernd".to_string(),
        supplier: Some("office-supplies.example".to_string()),
        notes: None,
        created_at: now,
        updated_at: now,
        arrived_at: None,
    };
    db.orders().insert(&order).await?;
    println!("✓ Created pending order ({})", order.id);

    // An outstanding loan: accounting borrowed from the warehouse pile
    let loan = TonerLoan {
        id: Uuid::new_v4().to_string(),
        lender_printer_id: printer_id("Warehouse Kyocera"),
        borrower_printer_id: printer_id("Front Desk Kyocera"),
        model_id: model_id("TK-3160"),
        quantity: 1,
        status: LoanStatus::Outstanding,
        notes: Some("ran dry over the weekend".to_string()),
        created_at: now,
        updated_at: now,
        returned_at: None,
    };
    db.loans().create(&loan).await?;
    println!("✓ Created outstanding loan ({})", loan.id);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
