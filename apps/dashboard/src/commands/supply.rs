//! # Supply Model Commands
//!
//! The toner/fuser catalog the rest of the dashboard references.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::commands::resolve_model;
use crate::error::ApiError;
use crate::state::DbState;
use tonerdesk_core::{validation, SupplyKind, SupplyModel};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRow {
    pub id: String,
    pub kind: SupplyKind,
    pub name: String,
    pub capacity_pages: i64,
    pub color: Option<String>,
}

/// Adds a model to the catalog.
pub async fn add_model(
    db: &DbState,
    kind: SupplyKind,
    name: &str,
    capacity_pages: i64,
    color: Option<String>,
) -> Result<ModelRow, ApiError> {
    debug!(kind = %kind.as_str(), name = %name, "add_model command");

    validation::validate_model_name(name)?;
    validation::validate_capacity_pages(capacity_pages)?;

    let now = Utc::now();
    let model = SupplyModel {
        id: Uuid::new_v4().to_string(),
        kind,
        name: name.trim().to_string(),
        capacity_pages,
        color,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    db.inner().supply_models().insert(&model).await?;

    info!(id = %model.id, name = %model.name, "Supply model added");

    Ok(to_row(&model))
}

/// Lists active catalog entries, optionally one kind only.
pub async fn list_models(db: &DbState, kind: Option<SupplyKind>) -> Result<Vec<ModelRow>, ApiError> {
    let models = db.inner().supply_models().list(kind).await?;
    Ok(models.iter().map(to_row).collect())
}

/// Updates a catalog entry; only the provided fields change.
pub async fn update_model(
    db: &DbState,
    kind: SupplyKind,
    ident: &str,
    new_name: Option<String>,
    capacity_pages: Option<i64>,
    color: Option<String>,
) -> Result<ModelRow, ApiError> {
    let mut model = resolve_model(db, kind, ident).await?;

    if let Some(name) = new_name {
        validation::validate_model_name(&name)?;
        model.name = name.trim().to_string();
    }
    if let Some(capacity) = capacity_pages {
        validation::validate_capacity_pages(capacity)?;
        model.capacity_pages = capacity;
    }
    if let Some(color) = color {
        model.color = Some(color);
    }

    db.inner().supply_models().update(&model).await?;

    info!(id = %model.id, "Supply model updated");

    Ok(to_row(&model))
}

/// Retires (soft-deletes) a catalog entry.
///
/// Historical change records keep their name snapshots; inventory rows and
/// open orders referencing the model remain valid.
pub async fn retire_model(db: &DbState, kind: SupplyKind, ident: &str) -> Result<(), ApiError> {
    let model = resolve_model(db, kind, ident).await?;
    db.inner().supply_models().soft_delete(&model.id).await?;

    info!(id = %model.id, name = %model.name, "Supply model retired");

    Ok(())
}

fn to_row(model: &SupplyModel) -> ModelRow {
    ModelRow {
        id: model.id.clone(),
        kind: model.kind,
        name: model.name.clone(),
        capacity_pages: model.capacity_pages,
        color: model.color.clone(),
    }
}
