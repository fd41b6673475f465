//! # Order Repository
//!
//! Database operations for purchase orders.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert() → TonerOrder { status: Pending }                      │
//! │                                                                         │
//! │  2. ARRIVAL (single transaction)                                       │
//! │     └── mark_arrived()                                                 │
//! │         ├── UPDATE … SET status='arrived' WHERE status='pending'       │
//! │         │   (rows_affected = 0 ⇒ already arrived ⇒ error, no writes)   │
//! │         ├── UPSERT inventory (+ ordered quantity)                      │
//! │         └── INSERT mirror_outbox entry                                 │
//! │                                                                         │
//! │  3. (ALTERNATIVE) CANCEL                                               │
//! │     └── delete_pending() → hard delete, pending orders only            │
//! │                                                                         │
//! │  The guarded UPDATE is what makes "inventory incremented exactly       │
//! │  once per order" hold even if arrival is confirmed twice.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::outbox::MirrorOutboxRepository;
use tonerdesk_core::{OrderStatus, TonerOrder};

const ORDER_COLUMNS: &str = "id, printer_id, model_id, quantity, status, ordered_by, \
     supplier, notes, created_at, updated_at, arrived_at";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a new order.
    pub async fn insert(&self, order: &TonerOrder) -> DbResult<()> {
        debug!(id = %order.id, model_id = %order.model_id, quantity = %order.quantity, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO toner_orders (
                id, printer_id, model_id, quantity, status,
                ordered_by, supplier, notes,
                created_at, updated_at, arrived_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&order.id)
        .bind(&order.printer_id)
        .bind(&order.model_id)
        .bind(order.quantity)
        .bind(order.status)
        .bind(&order.ordered_by)
        .bind(&order.supplier)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.arrived_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TonerOrder>> {
        let order = sqlx::query_as::<_, TonerOrder>(&format!(
            "SELECT {ORDER_COLUMNS} FROM toner_orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lists orders, newest first, with optional filters.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        printer_id: Option<&str>,
    ) -> DbResult<Vec<TonerOrder>> {
        // Empty string means "no filter"; ids and statuses are never empty.
        let orders = sqlx::query_as::<_, TonerOrder>(&format!(
            "SELECT {ORDER_COLUMNS} FROM toner_orders \
             WHERE (?1 = '' OR status = ?1) \
               AND (?2 = '' OR printer_id = ?2) \
             ORDER BY created_at DESC"
        ))
        .bind(status.map(|s| s.as_str()).unwrap_or(""))
        .bind(printer_id.unwrap_or(""))
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Marks a pending order as arrived and books the stock in.
    ///
    /// ## What Happens (one transaction)
    /// 1. Guarded status flip `pending → arrived` - a second call finds no
    ///    pending row and fails without writing
    /// 2. The ordered quantity is added to the (printer, model) inventory
    ///    row, creating it if absent
    /// 3. A mirror outbox entry is queued for the updated order
    ///
    /// ## Returns
    /// The arrived order.
    pub async fn mark_arrived(&self, order_id: &str) -> DbResult<TonerOrder> {
        debug!(id = %order_id, "Marking order arrived");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE toner_orders SET
                status = 'arrived',
                arrived_at = ?2,
                updated_at = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (pending)", order_id));
        }

        let order = sqlx::query_as::<_, TonerOrder>(&format!(
            "SELECT {ORDER_COLUMNS} FROM toner_orders WHERE id = ?1"
        ))
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO inventory (id, printer_id, model_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT (printer_id, model_id) DO UPDATE SET
                quantity = quantity + excluded.quantity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&order.printer_id)
        .bind(&order.model_id)
        .bind(order.quantity)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let payload = serde_json::to_string(&order)
            .map_err(|e| DbError::Internal(format!("order serialization failed: {e}")))?;
        MirrorOutboxRepository::queue_on(&mut *tx, "ORDER", &order.id, &payload).await?;

        tx.commit().await?;

        Ok(order)
    }

    /// Deletes a pending order (cancel).
    ///
    /// Arrived orders are history and cannot be deleted.
    pub async fn delete_pending(&self, order_id: &str) -> DbResult<()> {
        debug!(id = %order_id, "Cancelling pending order");

        let result = sqlx::query("DELETE FROM toner_orders WHERE id = ?1 AND status = 'pending'")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (pending)", order_id));
        }

        Ok(())
    }

    /// Counts pending orders (for diagnostics).
    pub async fn count_pending(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM toner_orders WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{model, printer};

    fn new_order(printer_id: &str, model_id: &str, quantity: i64) -> TonerOrder {
        let now = Utc::now();
        TonerOrder {
            id: generate_order_id(),
            printer_id: printer_id.to_string(),
            model_id: model_id.to_string(),
            quantity,
            status: OrderStatus::Pending,
            ordered_by: "bernd".to_string(),
            supplier: None,
            notes: None,
            created_at: now,
            updated_at: now,
            arrived_at: None,
        }
    }

    #[tokio::test]
    async fn test_arrival_books_stock_exactly_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = printer(&db, "Front Desk").await;
        let m = model(&db, "TK-3160", 12_000).await;

        let order = new_order(&p.id, &m.id, 3);
        db.orders().insert(&order).await.unwrap();

        let arrived = db.orders().mark_arrived(&order.id).await.unwrap();
        assert_eq!(arrived.status, OrderStatus::Arrived);
        assert!(arrived.arrived_at.is_some());
        assert_eq!(db.inventory().quantity_at(&p.id, &m.id).await.unwrap(), 3);

        // Second confirmation must fail and must not touch inventory
        let err = db.orders().mark_arrived(&order.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.inventory().quantity_at(&p.id, &m.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_arrival_adds_to_existing_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = printer(&db, "Front Desk").await;
        let m = model(&db, "TK-3160", 12_000).await;

        db.inventory().set_quantity(&p.id, &m.id, 2).await.unwrap();

        let order = new_order(&p.id, &m.id, 3);
        db.orders().insert(&order).await.unwrap();
        db.orders().mark_arrived(&order.id).await.unwrap();

        assert_eq!(db.inventory().quantity_at(&p.id, &m.id).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_arrival_queues_mirror_entry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = printer(&db, "Front Desk").await;
        let m = model(&db, "TK-3160", 12_000).await;

        let order = new_order(&p.id, &m.id, 1);
        db.orders().insert(&order).await.unwrap();
        db.orders().mark_arrived(&order.id).await.unwrap();

        let pending = db.mirror_outbox().get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].entity_type, "ORDER");
        assert_eq!(pending[0].entity_id, order.id);
    }

    #[tokio::test]
    async fn test_cancel_only_while_pending() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = printer(&db, "Front Desk").await;
        let m = model(&db, "TK-3160", 12_000).await;

        let order = new_order(&p.id, &m.id, 1);
        db.orders().insert(&order).await.unwrap();
        db.orders().mark_arrived(&order.id).await.unwrap();

        let err = db.orders().delete_pending(&order.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = printer(&db, "Front Desk").await;
        let m = model(&db, "TK-3160", 12_000).await;

        let pending = new_order(&p.id, &m.id, 1);
        let arrived = new_order(&p.id, &m.id, 2);
        db.orders().insert(&pending).await.unwrap();
        db.orders().insert(&arrived).await.unwrap();
        db.orders().mark_arrived(&arrived.id).await.unwrap();

        let only_pending = db.orders().list(Some(OrderStatus::Pending), None).await.unwrap();
        assert_eq!(only_pending.len(), 1);
        assert_eq!(only_pending[0].id, pending.id);

        let all = db.orders().list(None, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
