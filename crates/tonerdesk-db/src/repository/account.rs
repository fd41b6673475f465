//! # Account Repository
//!
//! CRUD for the two reference lists: users (people who order and swap
//! supplies) and operators (external service technicians).
//!
//! These lists carry no downstream consistency checks: flows snapshot
//! names into history rows instead of joining, so deleting a user never
//! rewrites what they did.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tonerdesk_core::{Operator, User};

/// Repository for the users and operators reference lists.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// Inserts a new user.
    pub async fn insert_user(&self, name: &str, email: Option<&str>) -> DbResult<User> {
        debug!(name = %name, "Inserting user");

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO users (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    /// Lists users sorted by name.
    pub async fn list_users(&self) -> DbResult<Vec<User>> {
        let users =
            sqlx::query_as::<_, User>("SELECT id, name, email, created_at FROM users ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(users)
    }

    /// Gets a user by name.
    pub async fn get_user_by_name(&self, name: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM users WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Deletes a user. History rows keep their name snapshots.
    pub async fn delete_user(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Operators
    // -------------------------------------------------------------------------

    /// Inserts a new operator.
    pub async fn insert_operator(
        &self,
        name: &str,
        company: Option<&str>,
        phone: Option<&str>,
    ) -> DbResult<Operator> {
        debug!(name = %name, "Inserting operator");

        let operator = Operator {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            company: company.map(str::to_string),
            phone: phone.map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO operators (id, name, company, phone, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&operator.id)
        .bind(&operator.name)
        .bind(&operator.company)
        .bind(&operator.phone)
        .bind(operator.created_at)
        .execute(&self.pool)
        .await?;

        Ok(operator)
    }

    /// Lists operators sorted by name.
    pub async fn list_operators(&self) -> DbResult<Vec<Operator>> {
        let operators = sqlx::query_as::<_, Operator>(
            "SELECT id, name, company, phone, created_at FROM operators ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(operators)
    }

    /// Deletes an operator. Assigned tickets keep their name snapshots.
    pub async fn delete_operator(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM operators WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Operator", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_user_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.accounts();

        let user = repo.insert_user("bernd", Some("bernd@office.lan")).await.unwrap();
        assert_eq!(repo.list_users().await.unwrap().len(), 1);
        assert!(repo.get_user_by_name("bernd").await.unwrap().is_some());

        repo.delete_user(&user.id).await.unwrap();
        assert!(repo.list_users().await.unwrap().is_empty());
        assert!(repo.delete_user(&user.id).await.is_err());
    }

    #[tokio::test]
    async fn test_operator_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.accounts();

        let op = repo
            .insert_operator("PrintCare GmbH", Some("PrintCare"), Some("+49 30 1234"))
            .await
            .unwrap();
        assert_eq!(repo.list_operators().await.unwrap().len(), 1);

        repo.delete_operator(&op.id).await.unwrap();
        assert!(repo.list_operators().await.unwrap().is_empty());
    }
}
