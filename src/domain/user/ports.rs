use async_trait::async_trait;
use uuid::Uuid;

use super::entities::{ActivationToken, User};
use super::errors::UserError;
use super::events::{DomainEvent, EventError};
use crate::domain::auth::value_objects::Email;

/// Repository trait for user persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
  /// Creates a new user; duplicate emails map to `UserError::AlreadyExists`
  async fn create(&self, user: User) -> Result<User, UserError>;

  /// Finds a user by their unique identifier
  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError>;

  /// Finds a user by their email address
  async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserError>;

  /// Lists users ordered by creation time
  async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, UserError>;

  /// Updates an existing user with an optimistic version check.
  ///
  /// The row is written with `version = version + 1` guarded by
  /// `WHERE version = $expected`; a stale expected version yields
  /// `UserError::OptimisticLock`, a missing row `UserError::NotFound`.
  /// The returned entity carries the incremented version.
  async fn update(&self, user: User) -> Result<User, UserError>;

  /// Deletes a user; sessions and activation tokens cascade
  async fn delete(&self, id: Uuid) -> Result<(), UserError>;
}

/// Repository trait for activation token persistence operations
#[async_trait]
pub trait ActivationTokenRepository: Send + Sync {
  /// Deletes any prior token for the user and inserts the new one,
  /// atomically, so at most one active token exists per user
  async fn replace_for_user(&self, token: ActivationToken) -> Result<ActivationToken, UserError>;

  /// Finds a token by its value
  async fn find_by_token(&self, token: &str) -> Result<Option<ActivationToken>, UserError>;

  /// Consumes a token and activates its user in a single transaction.
  ///
  /// Fails with `ActivationTokenInvalid` for unknown tokens,
  /// `ActivationTokenUsed` / `ActivationTokenExpired` for tokens that are
  /// no longer valid. On success the token is marked used and the user row
  /// is set active with its version incremented.
  async fn consume(&self, token: &str) -> Result<(ActivationToken, User), UserError>;

  /// Deletes expired tokens, returning the number removed
  async fn delete_expired(&self) -> Result<u64, UserError>;
}

/// Port for publishing domain events to the in-process bus
pub trait EventPublisher: Send + Sync {
  /// Publishes an event; an error fails the surrounding operation
  fn publish(&self, event: DomainEvent) -> Result<(), EventError>;
}
