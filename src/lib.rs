//! User registry API
//!
//! CRUD service for user records with validation, email uniqueness and
//! newest-first paging over in-memory, SQLite or PostgreSQL storage.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use api::state::AppState;
use infrastructure::storage::StorageFactory;
use tracing::info;

/// Create the application state with the default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage = config.storage.storage_config()?;
    info!("Storage backend: {:?}", storage.storage_type());

    let repository = StorageFactory::create_user_repository(&storage).await?;

    Ok(AppState::new(repository, config.server.request_timeout()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_app_state_with_memory_backend() {
        let mut config = AppConfig::default();
        config.storage.backend = "memory".to_string();
        config.server.request_timeout_secs = 3;

        let state = create_app_state_with_config(&config).await.unwrap();

        assert_eq!(state.request_timeout.as_secs(), 3);
        let ctx = state.operation_context();
        assert!(state
            .user_service
            .list_users(&ctx, None, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_backend_fails_wiring() {
        let mut config = AppConfig::default();
        config.storage.backend = "etcd".to_string();

        assert!(create_app_state_with_config(&config).await.is_err());
    }
}
