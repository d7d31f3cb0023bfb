use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entities::Session;
use super::errors::{AuthError, HashError};
use super::value_objects::Password;

/// Repository trait for session persistence operations
#[async_trait]
pub trait SessionRepository: Send + Sync {
  /// Creates a new session in the repository
  async fn create(&self, session: Session) -> Result<Session, AuthError>;

  /// Finds a session by its token hash
  async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AuthError>;

  /// Finds all sessions for a specific user
  async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Session>, AuthError>;

  /// Moves the expiry of a session (same id, new expires_at)
  async fn refresh(&self, session_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), AuthError>;

  /// Deletes a specific session
  async fn delete(&self, session_id: Uuid) -> Result<(), AuthError>;

  /// Deletes all sessions for a specific user
  async fn delete_all_for_user(&self, user_id: Uuid) -> Result<(), AuthError>;

  /// Deletes expired sessions, returning the number removed
  async fn delete_expired(&self) -> Result<u64, AuthError>;
}

/// Service trait for password hashing operations
#[async_trait]
pub trait PasswordHasher: Send + Sync {
  /// Hashes a plain text password into a PHC hash string
  async fn hash(&self, password: &Password) -> Result<String, HashError>;

  /// Verifies a plain text password against a stored hash
  async fn verify(&self, password: &Password, password_hash: &str) -> Result<bool, HashError>;
}

/// Service trait for secure token generation
pub trait TokenGenerator: Send + Sync {
  /// Generates a cryptographically secure random 256-bit token (hex-encoded)
  fn generate(&self) -> String;
}
