//! User service: validation, uniqueness and repository orchestration

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::user::{email_taken, validate_user, NewUser, User, UserId, UserRepository};
use crate::domain::{DomainError, OperationContext};

pub const DEFAULT_LIST_LIMIT: u32 = 10;
pub const MAX_LIST_LIMIT: u32 = 100;

/// Request for creating a new user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

impl CreateUserRequest {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Partial update; a `None` field is left untouched, never cleared
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// Clamped page window handed to the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u64,
}

impl PageRequest {
    /// Non-positive or absent limits become the default, large ones are
    /// capped, negative offsets become zero.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => u32::try_from(l.min(i64::from(MAX_LIST_LIMIT)))
                .unwrap_or(MAX_LIST_LIMIT),
            _ => DEFAULT_LIST_LIMIT,
        };
        let offset = offset.and_then(|o| u64::try_from(o).ok()).unwrap_or(0);

        Self { limit, offset }
    }
}

/// User service, the sole holder of the user business rules
#[derive(Debug)]
pub struct UserService<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> UserService<R> {
    /// Create a new user service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Get a user by ID
    pub async fn get_user(&self, ctx: &OperationContext, id: UserId) -> Result<User, DomainError> {
        debug!(id = %id, "Getting user");
        ctx.run("get_by_id", self.repository.get_by_id(id)).await
    }

    /// Create a new user
    pub async fn create_user(
        &self,
        ctx: &OperationContext,
        request: CreateUserRequest,
    ) -> Result<User, DomainError> {
        debug!(email = %request.email, "Creating user");

        validate_user(&request.name, &request.email)?;
        self.ensure_email_available(ctx, &request.email).await?;

        let user = NewUser::new(request.name, request.email)?;
        let created = ctx.run("create", self.repository.create(user)).await;

        match &created {
            Ok(user) => info!(id = %user.id(), "User created"),
            Err(e) if e.is_conflict() => warn!("Email claimed concurrently, create rejected"),
            Err(_) => {}
        }

        created
    }

    /// Apply a partial update to an existing user
    pub async fn update_user(
        &self,
        ctx: &OperationContext,
        id: UserId,
        request: UpdateUserRequest,
    ) -> Result<User, DomainError> {
        info!(id = %id, "Updating user");

        let mut user = ctx.run("get_by_id", self.repository.get_by_id(id)).await?;

        if let Some(email) = request.email.as_deref() {
            if email != user.email() {
                self.ensure_email_available(ctx, email).await?;
            }
        }

        if let Some(name) = request.name {
            user.set_name(name);
        }

        if let Some(email) = request.email {
            user.set_email(email);
        }

        user.touch();
        user.validate()?;

        ctx.run("update", self.repository.update(&user)).await
    }

    /// Delete a user, reporting `NotFound` before touching storage
    pub async fn delete_user(&self, ctx: &OperationContext, id: UserId) -> Result<(), DomainError> {
        info!(id = %id, "Deleting user");

        ctx.run("get_by_id", self.repository.get_by_id(id)).await?;
        ctx.run("delete", self.repository.delete(id)).await
    }

    /// List users, newest first, with the paging window clamped
    pub async fn list_users(
        &self,
        ctx: &OperationContext,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, DomainError> {
        let page = PageRequest::clamped(limit, offset);
        debug!(limit = page.limit, offset = page.offset, "Listing users");

        ctx.run("list", self.repository.list(page.limit, page.offset))
            .await
    }

    /// Fast-path uniqueness check; the backend constraint stays authoritative
    async fn ensure_email_available(
        &self,
        ctx: &OperationContext,
        email: &str,
    ) -> Result<(), DomainError> {
        match ctx.run("get_by_email", self.repository.get_by_email(email)).await {
            Ok(existing) => {
                warn!(existing_id = %existing.id(), "Email already in use");
                Err(email_taken(email))
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }
}
