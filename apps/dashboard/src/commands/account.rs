//! # Reference List Commands
//!
//! Users and operators. Plain CRUD - flows snapshot names, so nothing
//! here cascades into history.

use tracing::info;

use crate::error::ApiError;
use crate::state::DbState;
use tonerdesk_core::{validation, Operator, User};

/// Adds a user.
pub async fn add_user(db: &DbState, name: &str, email: Option<&str>) -> Result<User, ApiError> {
    validation::validate_person_name(name)?;

    let user = db.inner().accounts().insert_user(name.trim(), email).await?;

    info!(id = %user.id, name = %user.name, "User added");

    Ok(user)
}

/// Lists users.
pub async fn list_users(db: &DbState) -> Result<Vec<User>, ApiError> {
    Ok(db.inner().accounts().list_users().await?)
}

/// Removes a user by name or UUID.
pub async fn remove_user(db: &DbState, ident: &str) -> Result<(), ApiError> {
    let accounts = db.inner().accounts();

    let id = match accounts.get_user_by_name(ident).await? {
        Some(user) => user.id,
        None => ident.to_string(),
    };

    accounts.delete_user(&id).await?;

    info!(id = %id, "User removed");

    Ok(())
}

/// Adds an operator.
pub async fn add_operator(
    db: &DbState,
    name: &str,
    company: Option<&str>,
    phone: Option<&str>,
) -> Result<Operator, ApiError> {
    validation::validate_person_name(name)?;

    let operator = db
        .inner()
        .accounts()
        .insert_operator(name.trim(), company, phone)
        .await?;

    info!(id = %operator.id, name = %operator.name, "Operator added");

    Ok(operator)
}

/// Lists operators.
pub async fn list_operators(db: &DbState) -> Result<Vec<Operator>, ApiError> {
    Ok(db.inner().accounts().list_operators().await?)
}

/// Removes an operator by name or UUID.
pub async fn remove_operator(db: &DbState, ident: &str) -> Result<(), ApiError> {
    let accounts = db.inner().accounts();

    let id = accounts
        .list_operators()
        .await?
        .into_iter()
        .find(|o| o.name == ident)
        .map(|o| o.id)
        .unwrap_or_else(|| ident.to_string());

    accounts.delete_operator(&id).await?;

    info!(id = %id, "Operator removed");

    Ok(())
}
