//! # Service Ticket Commands

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::commands::resolve_printer;
use crate::error::ApiError;
use crate::state::DbState;
use tonerdesk_core::{validation, ServiceTicket, TicketStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRow {
    pub id: String,
    pub printer: String,
    pub title: String,
    pub status: TicketStatus,
    pub opened_by: String,
    pub assigned_to: Option<String>,
    pub created_at: String,
    pub closed_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenTicketRequest {
    /// Affected printer (name or UUID).
    pub printer: String,
    pub title: String,
    pub description: Option<String>,
    pub opened_by: String,
}

/// Opens a ticket.
pub async fn open_ticket(db: &DbState, req: OpenTicketRequest) -> Result<TicketRow, ApiError> {
    debug!(printer = %req.printer, title = %req.title, "open_ticket command");

    validation::validate_ticket_title(&req.title)?;
    validation::validate_person_name(&req.opened_by)?;

    let printer = resolve_printer(db, &req.printer).await?;

    let now = Utc::now();
    let ticket = ServiceTicket {
        id: Uuid::new_v4().to_string(),
        printer_id: printer.id.clone(),
        title: req.title.trim().to_string(),
        description: req.description,
        status: TicketStatus::Open,
        opened_by: req.opened_by.trim().to_string(),
        assigned_to: None,
        created_at: now,
        updated_at: now,
        closed_at: None,
    };

    db.inner().tickets().insert(&ticket).await?;

    info!(id = %ticket.id, printer = %printer.name, "Ticket opened");

    Ok(to_row(&ticket, &printer.name))
}

/// Lists tickets with printer names resolved.
pub async fn list_tickets(
    db: &DbState,
    status: Option<TicketStatus>,
    printer_ident: Option<&str>,
) -> Result<Vec<TicketRow>, ApiError> {
    let printer_id = match printer_ident {
        Some(ident) => Some(resolve_printer(db, ident).await?.id),
        None => None,
    };

    let tickets = db.inner().tickets().list(status, printer_id.as_deref()).await?;
    let printers = db.inner().printers().list(false).await?;

    Ok(tickets
        .iter()
        .map(|t| {
            let printer = printers
                .iter()
                .find(|p| p.id == t.printer_id)
                .map(|p| p.name.as_str())
                .unwrap_or(t.printer_id.as_str());
            to_row(t, printer)
        })
        .collect())
}

/// Updates a ticket's title and/or description.
pub async fn update_ticket(
    db: &DbState,
    ticket_id: &str,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<(), ApiError> {
    let ticket = db
        .inner()
        .tickets()
        .get_by_id(ticket_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ticket", ticket_id))?;

    let title = title.unwrap_or(ticket.title.as_str());
    validation::validate_ticket_title(title)?;

    db.inner()
        .tickets()
        .update_details(
            ticket_id,
            title,
            description.or(ticket.description.as_deref()),
        )
        .await?;

    info!(id = %ticket_id, "Ticket updated");

    Ok(())
}

/// Assigns a technician; an open ticket moves to in_progress.
pub async fn assign_ticket(db: &DbState, ticket_id: &str, operator: &str) -> Result<(), ApiError> {
    validation::validate_person_name(operator)?;

    db.inner().tickets().assign(ticket_id, operator.trim()).await?;

    info!(id = %ticket_id, operator = %operator, "Ticket assigned");

    Ok(())
}

/// Closes a ticket (stamps closed_at exactly once).
pub async fn close_ticket(db: &DbState, ticket_id: &str) -> Result<(), ApiError> {
    db.inner().tickets().close(ticket_id).await?;

    info!(id = %ticket_id, "Ticket closed");

    Ok(())
}

/// Reopens a closed ticket.
pub async fn reopen_ticket(db: &DbState, ticket_id: &str) -> Result<(), ApiError> {
    db.inner().tickets().reopen(ticket_id).await?;

    info!(id = %ticket_id, "Ticket reopened");

    Ok(())
}

fn to_row(ticket: &ServiceTicket, printer: &str) -> TicketRow {
    TicketRow {
        id: ticket.id.clone(),
        printer: printer.to_string(),
        title: ticket.title.clone(),
        status: ticket.status,
        opened_by: ticket.opened_by.clone(),
        assigned_to: ticket.assigned_to.clone(),
        created_at: ticket.created_at.to_rfc3339(),
        closed_at: ticket.closed_at.map(|t| t.to_rfc3339()),
    }
}
