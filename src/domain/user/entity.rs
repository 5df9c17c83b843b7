//! User entity and related types

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_user, UserValidationError};
use crate::domain::DomainError;

/// Current instant at microsecond precision, the finest every backend keeps
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Storage-assigned user identifier, always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier, rejecting zero and negative values
    pub fn new(id: i64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated record that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NewUser {
    /// Build a new record stamped with the current instant
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        let email = email.into();
        validate_user(&name, &email)?;

        let stamp = now();

        Ok(Self {
            name,
            email,
            created_at: stamp,
            updated_at: stamp,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Attach the identifier assigned by storage
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A persisted user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Rehydrate a record read back from storage.
    ///
    /// A row whose `updated_at` precedes `created_at` is corrupt and is
    /// reported as a storage error.
    pub fn from_parts(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if updated_at < created_at {
            return Err(DomainError::storage(format!(
                "user {} has updated_at {} before created_at {}",
                id, updated_at, created_at
            )));
        }

        Ok(Self {
            id,
            name: name.into(),
            email: email.into(),
            created_at,
            updated_at,
        })
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Replace the name; validity is checked by `validate` after merging
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    /// Refresh `updated_at`, never moving it backwards
    pub fn touch(&mut self) {
        self.updated_at = now().max(self.updated_at);
    }

    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_user(&self.name, &self.email)
    }
}
