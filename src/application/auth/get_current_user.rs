use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::user::entities::{User, UserStatus};

/// Response describing the authenticated user
#[derive(Debug, Clone)]
pub struct GetCurrentUserResponse {
  /// Unique identifier of the user
  pub user_id: Uuid,
  /// User's email address
  pub email: String,
  /// User's first name
  pub first_name: String,
  /// User's last name
  pub last_name: String,
  /// Account status
  pub status: UserStatus,
  /// Timestamp when the user was created
  pub created_at: DateTime<Utc>,
  /// Timestamp when the user was last updated
  pub updated_at: DateTime<Utc>,
  /// Current optimistic locking version
  pub version: i64,
}

/// Use case for fetching the authenticated user's profile
///
/// The session middleware already resolved the user, so this is a pure
/// projection with no further repository access.
pub struct GetCurrentUserUseCase;

impl GetCurrentUserUseCase {
  pub fn execute(&self, user: &User) -> GetCurrentUserResponse {
    GetCurrentUserResponse {
      user_id: user.id,
      email: user.email.clone(),
      first_name: user.first_name.clone(),
      last_name: user.last_name.clone(),
      status: user.status,
      created_at: user.created_at,
      updated_at: user.updated_at,
      version: user.version,
    }
  }
}
