//! User repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{NewUser, User, UserId};
use crate::domain::DomainError;

/// Durable storage for user records.
///
/// Every backend must enforce email uniqueness atomically and report a
/// violation as [`DomainError::Conflict`]; the service's own pre-check is
/// only a fast path. A missing row is always [`DomainError::NotFound`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by ID
    async fn get_by_id(&self, id: UserId) -> Result<User, DomainError>;

    /// Get a user by exact (case-sensitive) email
    async fn get_by_email(&self, email: &str) -> Result<User, DomainError>;

    /// Persist a new user and return it with its assigned ID
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Replace the mutable fields of an existing user
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Permanently delete a user; `NotFound` when no row matched
    async fn delete(&self, id: UserId) -> Result<(), DomainError>;

    /// Most recently created first; empty when `offset` is past the end
    async fn list(&self, limit: u32, offset: u64) -> Result<Vec<User>, DomainError>;
}

pub(crate) fn user_not_found(id: UserId) -> DomainError {
    DomainError::not_found(format!("user {} not found", id))
}

pub(crate) fn email_not_found(email: &str) -> DomainError {
    DomainError::not_found(format!("no user with email '{}'", email))
}

pub(crate) fn email_taken(email: &str) -> DomainError {
    DomainError::conflict(format!("user with email '{}' already exists", email))
}
