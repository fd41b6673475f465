//! # Printer Commands

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::commands::{assigned_model, resolve_model, resolve_printer};
use crate::error::ApiError;
use crate::state::DbState;
use tonerdesk_core::forecast::DepletionForecast;
use tonerdesk_core::{validation, Printer, SupplyKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterRow {
    pub id: String,
    pub name: String,
    pub location: String,
    pub address: String,
    pub serial: Option<String>,
    pub toner_model: Option<String>,
    pub fuser_model: Option<String>,
    pub daily_pages: i64,
    pub toner_level_pct: i64,
    pub fuser_level_pct: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterDetail {
    #[serde(flatten)]
    pub row: PrinterRow,
    pub notes: Option<String>,
    /// Own stock of the assigned toner model.
    pub toner_on_hand: i64,
    /// Pages left in the installed cartridge.
    pub pages_remaining: Option<i64>,
    /// Whole days until the cartridge runs dry (None when idle or no model).
    pub days_remaining: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterPrinterRequest {
    pub name: String,
    pub location: String,
    pub address: String,
    pub serial: Option<String>,
    /// Toner model name or UUID.
    pub toner_model: Option<String>,
    /// Fuser model name or UUID.
    pub fuser_model: Option<String>,
    pub daily_pages: i64,
    pub toner_level_pct: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePrinterRequest {
    pub location: Option<String>,
    pub address: Option<String>,
    pub serial: Option<String>,
    pub toner_model: Option<String>,
    pub fuser_model: Option<String>,
    pub daily_pages: Option<i64>,
    pub notes: Option<String>,
}

/// Registers a new printer.
pub async fn register_printer(
    db: &DbState,
    req: RegisterPrinterRequest,
) -> Result<PrinterRow, ApiError> {
    debug!(name = %req.name, "register_printer command");

    validation::validate_printer_name(&req.name)?;
    validation::validate_address(&req.address)?;
    validation::validate_daily_pages(req.daily_pages)?;
    validation::validate_level_pct(req.toner_level_pct)?;

    let toner_model = match &req.toner_model {
        Some(ident) => Some(resolve_model(db, SupplyKind::Toner, ident).await?),
        None => None,
    };
    let fuser_model = match &req.fuser_model {
        Some(ident) => Some(resolve_model(db, SupplyKind::Fuser, ident).await?),
        None => None,
    };

    let now = Utc::now();
    let printer = Printer {
        id: Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        location: req.location.trim().to_string(),
        address: req.address.trim().to_string(),
        serial: req.serial,
        toner_model_id: toner_model.as_ref().map(|m| m.id.clone()),
        fuser_model_id: fuser_model.as_ref().map(|m| m.id.clone()),
        daily_pages: req.daily_pages,
        toner_level_pct: req.toner_level_pct,
        fuser_level_pct: 100,
        is_active: true,
        notes: None,
        created_at: now,
        updated_at: now,
    };

    db.inner().printers().insert(&printer).await?;

    info!(id = %printer.id, name = %printer.name, "Printer registered");

    Ok(to_row(
        &printer,
        toner_model.map(|m| m.name),
        fuser_model.map(|m| m.name),
    ))
}

/// Lists printers with their model names resolved.
pub async fn list_printers(db: &DbState, include_inactive: bool) -> Result<Vec<PrinterRow>, ApiError> {
    let printers = db.inner().printers().list(!include_inactive).await?;
    let models = db.inner().supply_models().list(None).await?;

    let model_name = |id: &Option<String>| -> Option<String> {
        id.as_ref()
            .and_then(|id| models.iter().find(|m| &m.id == id))
            .map(|m| m.name.clone())
    };

    Ok(printers
        .iter()
        .map(|p| to_row(p, model_name(&p.toner_model_id), model_name(&p.fuser_model_id)))
        .collect())
}

/// Shows one printer with stock and forecast.
pub async fn show_printer(db: &DbState, ident: &str) -> Result<PrinterDetail, ApiError> {
    let printer = resolve_printer(db, ident).await?;

    let mut toner_name = None;
    let mut toner_on_hand = 0;
    let mut pages_remaining = None;
    let mut days_remaining = None;

    if printer.toner_model_id.is_some() {
        let model = assigned_model(db, &printer, SupplyKind::Toner).await?;
        toner_on_hand = db.inner().inventory().quantity_at(&printer.id, &model.id).await?;

        let forecast = DepletionForecast::project(
            printer.toner_level(),
            model.capacity_pages,
            printer.daily_pages,
        );
        pages_remaining = Some(forecast.pages_remaining);
        days_remaining = forecast.days_remaining;
        toner_name = Some(model.name);
    }

    let fuser_name = match printer.fuser_model_id.as_deref() {
        Some(id) => db
            .inner()
            .supply_models()
            .get_by_id(id)
            .await?
            .map(|m| m.name),
        None => None,
    };

    Ok(PrinterDetail {
        row: to_row(&printer, toner_name, fuser_name),
        notes: printer.notes.clone(),
        toner_on_hand,
        pages_remaining,
        days_remaining,
    })
}

/// Updates printer master data; only the provided fields change.
pub async fn update_printer(
    db: &DbState,
    ident: &str,
    req: UpdatePrinterRequest,
) -> Result<PrinterRow, ApiError> {
    let mut printer = resolve_printer(db, ident).await?;

    if let Some(location) = req.location {
        printer.location = location;
    }
    if let Some(address) = req.address {
        validation::validate_address(&address)?;
        printer.address = address;
    }
    if let Some(serial) = req.serial {
        printer.serial = Some(serial);
    }
    if let Some(daily_pages) = req.daily_pages {
        validation::validate_daily_pages(daily_pages)?;
        printer.daily_pages = daily_pages;
    }
    if let Some(notes) = req.notes {
        printer.notes = Some(notes);
    }
    if let Some(ident) = req.toner_model {
        let model = resolve_model(db, SupplyKind::Toner, &ident).await?;
        printer.toner_model_id = Some(model.id);
    }
    if let Some(ident) = req.fuser_model {
        let model = resolve_model(db, SupplyKind::Fuser, &ident).await?;
        printer.fuser_model_id = Some(model.id);
    }

    db.inner().printers().update(&printer).await?;

    info!(id = %printer.id, "Printer updated");

    // Re-read through the list path so model names come out resolved
    let rows = list_printers(db, true).await?;
    rows.into_iter()
        .find(|r| r.id == printer.id)
        .ok_or_else(|| ApiError::internal("updated printer vanished"))
}

/// Records manual meter readings.
pub async fn set_levels(
    db: &DbState,
    ident: &str,
    toner_level_pct: Option<i64>,
    fuser_level_pct: Option<i64>,
) -> Result<(), ApiError> {
    let printer = resolve_printer(db, ident).await?;

    if let Some(pct) = toner_level_pct {
        validation::validate_level_pct(pct)?;
        db.inner().printers().set_toner_level(&printer.id, pct).await?;
    }
    if let Some(pct) = fuser_level_pct {
        validation::validate_level_pct(pct)?;
        db.inner().printers().set_fuser_level(&printer.id, pct).await?;
    }

    info!(id = %printer.id, ?toner_level_pct, ?fuser_level_pct, "Levels recorded");

    Ok(())
}

/// Retires (soft-deletes) a printer.
pub async fn retire_printer(db: &DbState, ident: &str) -> Result<(), ApiError> {
    let printer = resolve_printer(db, ident).await?;
    db.inner().printers().soft_delete(&printer.id).await?;

    info!(id = %printer.id, name = %printer.name, "Printer retired");

    Ok(())
}

fn to_row(printer: &Printer, toner_model: Option<String>, fuser_model: Option<String>) -> PrinterRow {
    PrinterRow {
        id: printer.id.clone(),
        name: printer.name.clone(),
        location: printer.location.clone(),
        address: printer.address.clone(),
        serial: printer.serial.clone(),
        toner_model,
        fuser_model,
        daily_pages: printer.daily_pages,
        toner_level_pct: printer.toner_level_pct,
        fuser_level_pct: printer.fuser_level_pct,
        is_active: printer.is_active,
    }
}
