//! # Supply Model Repository
//!
//! Database operations for the consumable part catalog (toner cartridges
//! and fuser units, distinguished by `kind`).
//!
//! Models are soft-deleted: history rows snapshot the model name, so a
//! deactivated model disappears from pick lists without rewriting history.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tonerdesk_core::{SupplyKind, SupplyModel};

const MODEL_COLUMNS: &str =
    "id, kind, name, capacity_pages, color, is_active, created_at, updated_at";

/// Repository for supply model database operations.
#[derive(Debug, Clone)]
pub struct SupplyModelRepository {
    pool: SqlitePool,
}

impl SupplyModelRepository {
    /// Creates a new SupplyModelRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplyModelRepository { pool }
    }

    /// Inserts a new supply model.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - name already exists for the kind
    pub async fn insert(&self, model: &SupplyModel) -> DbResult<()> {
        debug!(kind = %model.kind.as_str(), name = %model.name, "Inserting supply model");

        sqlx::query(
            r#"
            INSERT INTO supply_models (
                id, kind, name, capacity_pages, color, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&model.id)
        .bind(model.kind)
        .bind(&model.name)
        .bind(model.capacity_pages)
        .bind(&model.color)
        .bind(model.is_active)
        .bind(model.created_at)
        .bind(model.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a model by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SupplyModel>> {
        let model = sqlx::query_as::<_, SupplyModel>(&format!(
            "SELECT {MODEL_COLUMNS} FROM supply_models WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(model)
    }

    /// Gets a model by kind and name.
    pub async fn get_by_name(&self, kind: SupplyKind, name: &str) -> DbResult<Option<SupplyModel>> {
        let model = sqlx::query_as::<_, SupplyModel>(&format!(
            "SELECT {MODEL_COLUMNS} FROM supply_models WHERE kind = ?1 AND name = ?2"
        ))
        .bind(kind)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(model)
    }

    /// Lists active models, optionally restricted to one kind, sorted by name.
    pub async fn list(&self, kind: Option<SupplyKind>) -> DbResult<Vec<SupplyModel>> {
        let models = match kind {
            Some(kind) => {
                sqlx::query_as::<_, SupplyModel>(&format!(
                    "SELECT {MODEL_COLUMNS} FROM supply_models \
                     WHERE is_active = 1 AND kind = ?1 ORDER BY name"
                ))
                .bind(kind)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, SupplyModel>(&format!(
                    "SELECT {MODEL_COLUMNS} FROM supply_models \
                     WHERE is_active = 1 ORDER BY kind, name"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(models)
    }

    /// Updates an existing model.
    pub async fn update(&self, model: &SupplyModel) -> DbResult<()> {
        debug!(id = %model.id, "Updating supply model");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE supply_models SET
                name = ?2,
                capacity_pages = ?3,
                color = ?4,
                is_active = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&model.id)
        .bind(&model.name)
        .bind(model.capacity_pages)
        .bind(&model.color)
        .bind(model.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supply model", &model.id));
        }

        Ok(())
    }

    /// Soft-deletes a model by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// - Historical change records snapshot the name but keep the FK
    /// - Inventory and open orders may still reference the row
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting supply model");

        let now = Utc::now();

        let result =
            sqlx::query("UPDATE supply_models SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supply model", id));
        }

        Ok(())
    }

    /// Counts active models (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM supply_models WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new supply model ID.
pub fn generate_model_id() -> String {
    Uuid::new_v4().to_string()
}
