//! Storage factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::domain::user::UserRepository;
use crate::domain::DomainError;
use crate::infrastructure::user::{
    InMemoryUserRepository, PostgresUserRepository, SqliteUserRepository,
};

use super::pool::{connect_postgres, connect_sqlite, DatabaseConfig};

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// SQLite file or in-memory database
    Sqlite,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage configuration
    InMemory,
    /// SQLite storage configuration
    Sqlite(DatabaseConfig),
    /// PostgreSQL storage configuration
    Postgres(DatabaseConfig),
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn sqlite_url(url: impl Into<String>) -> Self {
        Self::Sqlite(DatabaseConfig::new(url))
    }

    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::Postgres(DatabaseConfig::new(url))
    }

    /// Build from a backend name and pool settings
    pub fn from_parts(backend: &str, database: DatabaseConfig) -> Result<Self, DomainError> {
        match StorageType::from_str(backend) {
            Some(StorageType::InMemory) => Ok(Self::InMemory),
            Some(StorageType::Sqlite) => Ok(Self::Sqlite(database)),
            Some(StorageType::Postgres) => Ok(Self::Postgres(database)),
            None => Err(DomainError::internal(format!(
                "Unknown storage backend '{}'",
                backend
            ))),
        }
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Sqlite(_) => StorageType::Sqlite,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Factory for creating user repositories
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Connect the configured backend and make sure its schema exists
    pub async fn create_user_repository(
        config: &StorageConfig,
    ) -> Result<Arc<dyn UserRepository>, DomainError> {
        info!(backend = ?config.storage_type(), "Initializing user storage");

        match config {
            StorageConfig::InMemory => Ok(Arc::new(InMemoryUserRepository::new())),
            StorageConfig::Sqlite(db_config) => {
                let pool = connect_sqlite(db_config).await?;
                let repository = SqliteUserRepository::new(pool);
                repository.ensure_schema().await?;
                Ok(Arc::new(repository))
            }
            StorageConfig::Postgres(db_config) => {
                let pool = connect_postgres(db_config).await?;
                let repository = PostgresUserRepository::new(pool);
                repository.ensure_schema().await?;
                Ok(Arc::new(repository))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewUser;

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!(StorageType::from_str("memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::from_str("In-Memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::from_str("sqlite"), Some(StorageType::Sqlite));
        assert_eq!(StorageType::from_str("postgresql"), Some(StorageType::Postgres));
        assert_eq!(StorageType::from_str("pg"), Some(StorageType::Postgres));
        assert_eq!(StorageType::from_str("mongo"), None);
    }

    #[test]
    fn test_storage_config_from_parts() {
        let db = DatabaseConfig::new("postgres://localhost/users").with_max_connections(4);

        let config = StorageConfig::from_parts("postgres", db.clone()).unwrap();
        assert_eq!(config.storage_type(), StorageType::Postgres);

        if let StorageConfig::Postgres(pg) = config {
            assert_eq!(pg.max_connections, 4);
        } else {
            panic!("Expected Postgres config");
        }

        assert!(StorageConfig::from_parts("redis", db).is_err());
    }

    #[tokio::test]
    async fn test_create_in_memory_repository() {
        let repo = StorageFactory::create_user_repository(&StorageConfig::in_memory())
            .await
            .unwrap();

        let user = repo
            .create(NewUser::new("A", "a@example.com").unwrap())
            .await
            .unwrap();
        assert_eq!(user.id().value(), 1);
    }

    #[tokio::test]
    async fn test_create_sqlite_repository_bootstraps_schema() {
        let repo = StorageFactory::create_user_repository(&StorageConfig::sqlite_url(
            "sqlite::memory:",
        ))
        .await
        .unwrap();

        assert!(repo.list(10, 0).await.unwrap().is_empty());
    }
}
