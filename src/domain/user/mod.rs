//! User domain
//!
//! Entity, validation rules and the storage contract for user records.

mod entity;
mod repository;
mod validation;

pub use entity::{NewUser, User, UserId};
pub use repository::UserRepository;
pub(crate) use repository::{email_not_found, email_taken, user_not_found};
pub use validation::{
    validate_email, validate_name, validate_user, UserValidationError, MAX_EMAIL_LENGTH,
    MAX_NAME_LENGTH, MIN_EMAIL_LENGTH, MIN_NAME_LENGTH,
};

#[cfg(test)]
pub use repository::MockUserRepository;
