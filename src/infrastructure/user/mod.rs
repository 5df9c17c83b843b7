//! User infrastructure module
//!
//! Storage backends for user records and the service that owns the
//! user business rules.

mod postgres_repository;
pub(crate) mod repository;
mod service;
mod sqlite_repository;

pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{
    CreateUserRequest, PageRequest, UpdateUserRequest, UserService, DEFAULT_LIST_LIMIT,
    MAX_LIST_LIMIT,
};
pub use sqlite_repository::SqliteUserRepository;
