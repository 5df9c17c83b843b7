//! SQLite user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::domain::user::{
    email_not_found, email_taken, user_not_found, NewUser, User, UserId, UserRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::storage::is_unique_violation;

/// SQLite implementation of UserRepository
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the users table when it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create users table: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_by_id(&self, id: UserId) -> Result<User, DomainError> {
        let row = sqlx::query(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(user_not_found(id)),
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<User, DomainError> {
        let row = sqlx::query(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(email_not_found(email)),
        }
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user.name())
        .bind(user.email())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                email_taken(user.email())
            } else {
                DomainError::storage(format!("Failed to create user: {}", e))
            }
        })?;

        let rowid = result.last_insert_rowid();
        let id = UserId::new(rowid).ok_or_else(|| {
            DomainError::storage(format!("Database assigned invalid id {}", rowid))
        })?;

        Ok(user.with_id(id))
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let result =
            sqlx::query("UPDATE users SET name = ?, email = ?, updated_at = ? WHERE id = ?")
                .bind(user.name())
                .bind(user.email())
                .bind(user.updated_at())
                .bind(user.id().value())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        email_taken(user.email())
                    } else {
                        DomainError::storage(format!("Failed to update user: {}", e))
                    }
                })?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user.id()));
        }

        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }

        Ok(())
    }

    async fn list(&self, limit: u32, offset: u64) -> Result<Vec<User>, DomainError> {
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let rows = sqlx::query(
            r#"
            SELECT id, name, email, created_at, updated_at
            FROM users
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, DomainError> {
    let decode = |e: sqlx::Error| DomainError::storage(format!("Failed to decode user row: {}", e));

    let id: i64 = row.try_get("id").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let email: String = row.try_get("email").map_err(decode)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(decode)?;

    let id = UserId::new(id)
        .ok_or_else(|| DomainError::storage(format!("Invalid user ID in database: {}", id)))?;

    User::from_parts(id, name, email, created_at, updated_at)
}
