use thiserror::Error;

use super::value_objects::ValueObjectError;
use crate::domain::user::errors::UserError;
use crate::domain::user::events::EventError;

/// Main authentication error type
#[derive(Debug, Error)]
pub enum AuthError {
  #[error("Invalid credentials provided")]
  InvalidCredentials,

  #[error("Account is not active")]
  AccountSuspended,

  #[error("Email already exists")]
  EmailAlreadyExists,

  #[error("User not found")]
  UserNotFound,

  #[error("Session not found")]
  SessionNotFound,

  #[error("Session has expired")]
  SessionExpired,

  #[error("Invalid session")]
  InvalidSession,

  #[error("New password must differ from the old password")]
  PasswordReused,

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),

  #[error("Hash error: {0}")]
  Hash(#[from] HashError),

  #[error("Value object error: {0}")]
  ValueObject(#[from] ValueObjectError),

  #[error("Event publish error: {0}")]
  Event(#[from] EventError),
}

/// Repository-related errors shared by all Postgres adapters
#[derive(Debug, Error)]
pub enum RepositoryError {
  #[error("Database connection failed: {0}")]
  ConnectionFailed(String),

  #[error("Query execution failed: {0}")]
  QueryFailed(String),

  #[error("Transaction failed: {0}")]
  TransactionFailed(String),

  #[error("Record not found")]
  NotFound,

  #[error("Duplicate key violation: {0}")]
  DuplicateKey(String),

  #[error("Database error: {0}")]
  DatabaseError(String),

  #[error("Invalid IP address: {0}")]
  InvalidIpAddress(#[from] std::net::AddrParseError),
}

/// Password hashing and verification errors
#[derive(Debug, Error)]
pub enum HashError {
  #[error("Failed to hash password: {0}")]
  HashingFailed(String),

  #[error("Failed to verify password: {0}")]
  VerificationFailed(String),

  #[error("Invalid hash format")]
  InvalidFormat,
}

// Automatic conversions from external error types

impl From<sqlx::Error> for RepositoryError {
  fn from(error: sqlx::Error) -> Self {
    match error {
      sqlx::Error::RowNotFound => RepositoryError::NotFound,
      sqlx::Error::Database(db_err) => {
        if db_err.is_unique_violation() {
          RepositoryError::DuplicateKey(db_err.message().to_string())
        } else {
          RepositoryError::DatabaseError(db_err.message().to_string())
        }
      }
      sqlx::Error::PoolTimedOut => RepositoryError::ConnectionFailed("Pool timed out".to_string()),
      sqlx::Error::PoolClosed => RepositoryError::ConnectionFailed("Pool closed".to_string()),
      _ => RepositoryError::QueryFailed(error.to_string()),
    }
  }
}

impl From<sqlx::Error> for AuthError {
  fn from(error: sqlx::Error) -> Self {
    AuthError::Repository(RepositoryError::from(error))
  }
}

impl From<UserError> for AuthError {
  fn from(error: UserError) -> Self {
    match error {
      UserError::NotFound => AuthError::UserNotFound,
      UserError::AlreadyExists => AuthError::EmailAlreadyExists,
      UserError::Repository(e) => AuthError::Repository(e),
      UserError::Hash(e) => AuthError::Hash(e),
      UserError::ValueObject(e) => AuthError::ValueObject(e),
      UserError::Event(e) => AuthError::Event(e),
      other => AuthError::Repository(RepositoryError::QueryFailed(other.to_string())),
    }
  }
}
