//! # Mirror Outbox Repository
//!
//! Manages the queue of mutations destined for the remote store.
//!
//! ## The Outbox Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Outbox Pattern Implementation                        │
//! │                                                                         │
//! │  LOCAL FLOW (e.g., mark_arrived)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. UPDATE toner_orders SET status = 'arrived' WHERE id = ?    │   │
//! │  │  2. UPSERT inventory (+ ordered quantity)                      │   │
//! │  │  3. INSERT INTO mirror_outbox (entity_type, entity_id, payload)│   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← All three succeed or none do                                 │
//! │                                                                         │
//! │  The original dashboard wrote local state, then fired the remote        │
//! │  mirror call and hoped; a failed mirror silently diverged the two.      │
//! │  Queuing the mirror write in the same transaction means the worst       │
//! │  case is a visible backlog, never a silent fork.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Draining the queue over the network is out of scope; `get_pending`,
//! `mark_synced` and `mark_failed` are the hooks a drainer would use.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use tonerdesk_core::MirrorOutboxEntry;

const OUTBOX_COLUMNS: &str =
    "id, entity_type, entity_id, payload, attempts, last_error, created_at, attempted_at, synced_at";

/// Repository for mirror outbox operations.
#[derive(Debug, Clone)]
pub struct MirrorOutboxRepository {
    pool: SqlitePool,
}

impl MirrorOutboxRepository {
    /// Creates a new MirrorOutboxRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MirrorOutboxRepository { pool }
    }

    /// Queues an entity for mirroring, on any executor.
    ///
    /// Flow repositories call this with their open transaction so the
    /// outbox row commits (or rolls back) together with the local change.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let payload = serde_json::to_string(&order)?;
    /// MirrorOutboxRepository::queue_on(&mut *tx, "ORDER", &order.id, &payload).await?;
    /// ```
    pub async fn queue_on<'e, E>(
        executor: E,
        entity_type: &str,
        entity_id: &str,
        payload: &str,
    ) -> DbResult<MirrorOutboxEntry>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();

        debug!(
            entity_type = %entity_type,
            entity_id = %entity_id,
            "Queuing for mirror"
        );

        let entry = MirrorOutboxEntry {
            id: Uuid::new_v4().to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            payload: payload.to_string(),
            attempts: 0,
            last_error: None,
            created_at: now,
            attempted_at: None,
            synced_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO mirror_outbox (
                id, entity_type, entity_id, payload,
                attempts, last_error, created_at, attempted_at, synced_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(&entry.payload)
        .bind(entry.attempts)
        .bind(&entry.last_error)
        .bind(entry.created_at)
        .bind(entry.attempted_at)
        .bind(entry.synced_at)
        .execute(executor)
        .await?;

        Ok(entry)
    }

    /// Queues an entity for mirroring outside any flow transaction.
    pub async fn queue(
        &self,
        entity_type: &str,
        entity_id: &str,
        payload: &str,
    ) -> DbResult<MirrorOutboxEntry> {
        Self::queue_on(&self.pool, entity_type, entity_id, payload).await
    }

    /// Gets pending entries (oldest first).
    pub async fn get_pending(&self, limit: u32) -> DbResult<Vec<MirrorOutboxEntry>> {
        let entries = sqlx::query_as::<_, MirrorOutboxEntry>(&format!(
            "SELECT {OUTBOX_COLUMNS} FROM mirror_outbox \
             WHERE synced_at IS NULL ORDER BY created_at ASC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Marks an entry as successfully mirrored.
    pub async fn mark_synced(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query("UPDATE mirror_outbox SET synced_at = ?2, attempted_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Records a failed mirror attempt.
    pub async fn mark_failed(&self, id: &str, error: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE mirror_outbox SET
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts pending entries.
    pub async fn count_pending(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM mirror_outbox WHERE synced_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Deletes old mirrored entries (cleanup).
    ///
    /// ## Returns
    /// Number of deleted entries.
    pub async fn cleanup_old_entries(&self, days_old: u32) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM mirror_outbox
            WHERE synced_at IS NOT NULL
            AND synced_at < datetime('now', '-' || ?1 || ' days')
            "#,
        )
        .bind(days_old)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_queue_and_drain_cycle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.mirror_outbox();

        let entry = repo.queue("PRINTER", "p-1", "{}").await.unwrap();
        assert_eq!(repo.count_pending().await.unwrap(), 1);

        repo.mark_failed(&entry.id, "remote unreachable").await.unwrap();
        let pending = repo.get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].attempts, 1);
        assert_eq!(pending[0].last_error.as_deref(), Some("remote unreachable"));

        repo.mark_synced(&entry.id).await.unwrap();
        assert_eq!(repo.count_pending().await.unwrap(), 0);
    }
}
