//! # Report Commands
//!
//! The fleet forecast report - the dashboard's landing table - plus the
//! mirror backlog view.

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};
use tonerdesk_core::forecast::{classify_supply, DepletionForecast, SupplyStatus};
use tonerdesk_core::SupplyKind;

/// One printer's line in the fleet report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetRow {
    pub printer: String,
    pub location: String,
    pub model: Option<String>,
    pub level_pct: i64,
    pub daily_pages: i64,
    pub pages_remaining: Option<i64>,
    pub days_remaining: Option<i64>,
    /// Projected date the consumable runs dry (ISO date).
    pub empty_on: Option<String>,
    /// Own stock of the consumable's model.
    pub on_hand: i64,
    pub status: SupplyStatus,
}

/// The whole fleet report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetReport {
    pub office: String,
    pub kind: SupplyKind,
    pub generated_on: String,
    pub rows: Vec<FleetRow>,
}

/// Mirror outbox backlog summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorBacklog {
    pub pending: i64,
}

/// Builds the fleet forecast report for one consumable kind.
///
/// ## Ordering
/// Most urgent first: printers projected to run dry soonest lead the
/// table, idle printers (no projection) trail it. That matches how the
/// original dashboard sorted its landing page.
pub async fn fleet_report(
    db: &DbState,
    config: &ConfigState,
    kind: SupplyKind,
) -> Result<FleetReport, ApiError> {
    debug!(kind = %kind.as_str(), "fleet_report command");

    let today = Utc::now().date_naive();
    let printers = db.inner().printers().list(true).await?;
    let models = db.inner().supply_models().list(None).await?;

    let mut rows = Vec::new();

    for printer in &printers {
        let Some(model_id) = printer.model_id(kind) else {
            // Printers without the model reference cannot be forecast;
            // they still show up so nobody forgets to assign one.
            rows.push(FleetRow {
                printer: printer.name.clone(),
                location: printer.location.clone(),
                model: None,
                level_pct: level_for(printer, kind),
                daily_pages: printer.daily_pages,
                pages_remaining: None,
                days_remaining: None,
                empty_on: None,
                on_hand: 0,
                status: SupplyStatus::Ok,
            });
            continue;
        };

        let Some(model) = models.iter().find(|m| m.id == model_id) else {
            continue; // model retired; printer needs a new assignment
        };

        let level = match kind {
            SupplyKind::Toner => printer.toner_level(),
            SupplyKind::Fuser => printer.fuser_level(),
        };

        let forecast = DepletionForecast::project(level, model.capacity_pages, printer.daily_pages);
        let on_hand = db.inner().inventory().quantity_at(&printer.id, &model.id).await?;
        let status = classify_supply(
            &forecast,
            on_hand,
            config.low_level_pct,
            config.order_lead_time_days,
        );

        rows.push(FleetRow {
            printer: printer.name.clone(),
            location: printer.location.clone(),
            model: Some(model.name.clone()),
            level_pct: level.pct(),
            daily_pages: printer.daily_pages,
            pages_remaining: Some(forecast.pages_remaining),
            days_remaining: forecast.days_remaining,
            empty_on: forecast.empty_on(today).map(|d| d.to_string()),
            on_hand,
            status,
        });
    }

    // Soonest-dry first; idle/unassigned printers sink to the bottom.
    rows.sort_by_key(|row| row.days_remaining.unwrap_or(i64::MAX));

    Ok(FleetReport {
        office: config.office_name.clone(),
        kind,
        generated_on: today.to_string(),
        rows,
    })
}

/// Current mirror backlog.
pub async fn mirror_backlog(db: &DbState) -> Result<MirrorBacklog, ApiError> {
    let pending = db.inner().mirror_outbox().count_pending().await?;
    Ok(MirrorBacklog { pending })
}

/// Drops mirrored entries older than the configured retention.
pub async fn cleanup_mirror(db: &DbState, config: &ConfigState) -> Result<u64, ApiError> {
    Ok(db
        .inner()
        .mirror_outbox()
        .cleanup_old_entries(config.outbox_retention_days)
        .await?)
}

fn level_for(printer: &tonerdesk_core::Printer, kind: SupplyKind) -> i64 {
    match kind {
        SupplyKind::Toner => printer.toner_level_pct,
        SupplyKind::Fuser => printer.fuser_level_pct,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{seeded_state, toner_printer};

    #[tokio::test]
    async fn test_fleet_report_orders_by_urgency() {
        let db = seeded_state().await;
        let config = ConfigState::default();

        // toner_printer fixtures start at 40% / 120 pages per day / 9,000 capacity
        let (urgent, um) = toner_printer(&db, "Busy HP", "M-BUSY").await;
        let (relaxed, _) = toner_printer(&db, "Quiet HP", "M-QUIET").await;

        // Make one printer nearly dry and the other barely used
        db.inner().printers().set_toner_level(&urgent.id, 2).await.unwrap();
        db.inner().printers().set_toner_level(&relaxed.id, 95).await.unwrap();

        let report = fleet_report(&db, &config, SupplyKind::Toner).await.unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].printer, "Busy HP");

        // Nearly dry with nothing on hand: the report says order now
        assert_eq!(report.rows[0].status, SupplyStatus::OrderSuggested);
        assert_eq!(report.rows[1].status, SupplyStatus::Ok);

        // A spare on the shelf downgrades the flag to low-level only
        db.inner().inventory().set_quantity(&urgent.id, &um.id, 1).await.unwrap();
        let report = fleet_report(&db, &config, SupplyKind::Toner).await.unwrap();
        assert_eq!(report.rows[0].status, SupplyStatus::LowLevel);
    }

    #[tokio::test]
    async fn test_fleet_report_includes_unassigned_printers() {
        let db = seeded_state().await;
        let config = ConfigState::default();

        let (p, _) = toner_printer(&db, "Assigned HP", "M1").await;
        // A printer with no fuser model shows up without a forecast
        let report = fleet_report(&db, &config, SupplyKind::Fuser).await.unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].printer, p.name);
        assert!(report.rows[0].model.is_none());
        assert!(report.rows[0].days_remaining.is_none());
    }
}
