//! Storage infrastructure - backend selection and connection pooling

mod factory;
mod pool;

pub use factory::{StorageConfig, StorageFactory, StorageType};
pub use pool::{connect_postgres, connect_sqlite, DatabaseConfig};

/// True when a write failed because it would break a unique constraint
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.is_unique_violation(),
        _ => false,
    }
}
