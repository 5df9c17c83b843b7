//! Domain layer - Core business logic and entities

pub mod context;
pub mod error;
pub mod user;

pub use context::OperationContext;
pub use error::DomainError;
pub use user::{NewUser, User, UserId, UserRepository, UserValidationError};
