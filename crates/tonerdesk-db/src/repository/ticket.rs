//! # Service Ticket Repository
//!
//! Database operations for printer service tickets.
//!
//! Tickets move `open → in_progress → closed`; closing stamps `closed_at`
//! exactly once, and a closed ticket can be reopened.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tonerdesk_core::{ServiceTicket, TicketStatus};

const TICKET_COLUMNS: &str = "id, printer_id, title, description, status, opened_by, \
     assigned_to, created_at, updated_at, closed_at";

/// Repository for service ticket database operations.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

impl TicketRepository {
    /// Creates a new TicketRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TicketRepository { pool }
    }

    /// Inserts a new ticket.
    pub async fn insert(&self, ticket: &ServiceTicket) -> DbResult<()> {
        debug!(id = %ticket.id, title = %ticket.title, "Opening ticket");

        sqlx::query(
            r#"
            INSERT INTO service_tickets (
                id, printer_id, title, description, status,
                opened_by, assigned_to, created_at, updated_at, closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&ticket.id)
        .bind(&ticket.printer_id)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.status)
        .bind(&ticket.opened_by)
        .bind(&ticket.assigned_to)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .bind(ticket.closed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a ticket by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ServiceTicket>> {
        let ticket = sqlx::query_as::<_, ServiceTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM service_tickets WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    /// Lists tickets, newest first, with optional filters.
    pub async fn list(
        &self,
        status: Option<TicketStatus>,
        printer_id: Option<&str>,
    ) -> DbResult<Vec<ServiceTicket>> {
        // Empty string means "no filter"; ids and statuses are never empty.
        let tickets = sqlx::query_as::<_, ServiceTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM service_tickets \
             WHERE (?1 = '' OR status = ?1) \
               AND (?2 = '' OR printer_id = ?2) \
             ORDER BY created_at DESC"
        ))
        .bind(status.map(|s| s.as_str()).unwrap_or(""))
        .bind(printer_id.unwrap_or(""))
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    /// Updates title and description.
    pub async fn update_details(
        &self,
        id: &str,
        title: &str,
        description: Option<&str>,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE service_tickets SET title = ?2, description = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ticket", id));
        }

        Ok(())
    }

    /// Assigns a technician and moves an open ticket to in_progress.
    pub async fn assign(&self, id: &str, operator_name: &str) -> DbResult<()> {
        debug!(id = %id, operator = %operator_name, "Assigning ticket");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE service_tickets SET
                assigned_to = ?2,
                status = CASE WHEN status = 'open' THEN 'in_progress' ELSE status END,
                updated_at = ?3
            WHERE id = ?1 AND status != 'closed'
            "#,
        )
        .bind(id)
        .bind(operator_name)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ticket (open)", id));
        }

        Ok(())
    }

    /// Closes a ticket, stamping `closed_at` exactly once.
    pub async fn close(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Closing ticket");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE service_tickets SET
                status = 'closed',
                closed_at = ?2,
                updated_at = ?2
            WHERE id = ?1 AND status != 'closed'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ticket (open)", id));
        }

        Ok(())
    }

    /// Reopens a closed ticket.
    pub async fn reopen(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Reopening ticket");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE service_tickets SET
                status = 'open',
                closed_at = NULL,
                updated_at = ?2
            WHERE id = ?1 AND status = 'closed'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ticket (closed)", id));
        }

        Ok(())
    }

    /// Counts tickets that are not closed (for diagnostics).
    pub async fn count_open(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM service_tickets WHERE status != 'closed'")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new ticket ID.
pub fn generate_ticket_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::printer;

    fn new_ticket(printer_id: &str, title: &str) -> ServiceTicket {
        let now = Utc::now();
        ServiceTicket {
            id: generate_ticket_id(),
            printer_id: printer_id.to_string(),
            title: title.to_string(),
            description: None,
            status: TicketStatus::Open,
            opened_by: "bernd".to_string(),
            assigned_to: None,
            created_at: now,
            updated_at: now,
            closed_at: None,
        }
    }

    #[tokio::test]
    async fn test_assign_moves_open_to_in_progress() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = printer(&db, "Accounting").await;

        let ticket = new_ticket(&p.id, "paper jam in tray 2");
        db.tickets().insert(&ticket).await.unwrap();

        db.tickets().assign(&ticket.id, "PrintCare GmbH").await.unwrap();

        let reloaded = db.tickets().get_by_id(&ticket.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, TicketStatus::InProgress);
        assert_eq!(reloaded.assigned_to.as_deref(), Some("PrintCare GmbH"));
    }

    #[tokio::test]
    async fn test_close_exactly_once_then_reopen() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = printer(&db, "Accounting").await;

        let ticket = new_ticket(&p.id, "streaky output");
        db.tickets().insert(&ticket).await.unwrap();

        db.tickets().close(&ticket.id).await.unwrap();
        let closed = db.tickets().get_by_id(&ticket.id).await.unwrap().unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);
        assert!(closed.closed_at.is_some());

        // Second close fails; reopen clears the stamp
        assert!(db.tickets().close(&ticket.id).await.is_err());
        db.tickets().reopen(&ticket.id).await.unwrap();
        let reopened = db.tickets().get_by_id(&ticket.id).await.unwrap().unwrap();
        assert_eq!(reopened.status, TicketStatus::Open);
        assert!(reopened.closed_at.is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = printer(&db, "Accounting").await;

        let open = new_ticket(&p.id, "paper jam");
        let closed = new_ticket(&p.id, "old issue");
        db.tickets().insert(&open).await.unwrap();
        db.tickets().insert(&closed).await.unwrap();
        db.tickets().close(&closed.id).await.unwrap();

        let open_list = db.tickets().list(Some(TicketStatus::Open), None).await.unwrap();
        assert_eq!(open_list.len(), 1);
        assert_eq!(open_list[0].id, open.id);

        assert_eq!(db.tickets().count_open().await.unwrap(), 1);
    }
}
