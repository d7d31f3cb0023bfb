use thiserror::Error;

use super::entities::UserStatus;
use super::events::EventError;
use crate::domain::auth::errors::RepositoryError;
use crate::domain::auth::value_objects::ValueObjectError;

/// Main user-management error type
#[derive(Debug, Error)]
pub enum UserError {
  #[error("User not found")]
  NotFound,

  #[error("A user with this email already exists")]
  AlreadyExists,

  #[error("Stale version: the user was modified by another writer")]
  OptimisticLock,

  #[error("Unknown user status: {0}")]
  InvalidStatus(String),

  #[error("User is already in status {0}")]
  StatusUnchanged(UserStatus),

  #[error("User is already active")]
  AlreadyActive,

  #[error("Activation token not found")]
  ActivationTokenInvalid,

  #[error("Activation token has expired")]
  ActivationTokenExpired,

  #[error("Activation token has already been used")]
  ActivationTokenUsed,

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),

  #[error("Hash error: {0}")]
  Hash(#[from] crate::domain::auth::errors::HashError),

  #[error("Value object error: {0}")]
  ValueObject(#[from] ValueObjectError),

  #[error("Event publish error: {0}")]
  Event(#[from] EventError),
}

impl From<sqlx::Error> for UserError {
  fn from(error: sqlx::Error) -> Self {
    UserError::Repository(RepositoryError::from(error))
  }
}
