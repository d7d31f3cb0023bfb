//! User-management use cases
//!
//! Thin orchestration around the user domain service: parse raw input
//! into value objects, call the service, project the result.

mod activate_user;
mod change_user_status;
mod cleanup_expired;
mod create_user;
mod delete_user;
mod get_user;
mod list_users;
mod request_activation;
mod update_user;

pub use activate_user::{ActivateUserCommand, ActivateUserUseCase};
pub use change_user_status::{ChangeUserStatusCommand, ChangeUserStatusUseCase};
pub use cleanup_expired::{CleanupExpiredResponse, CleanupExpiredUseCase};
pub use create_user::{CreateUserCommand, CreateUserResponse, CreateUserUseCase};
pub use delete_user::DeleteUserUseCase;
pub use get_user::GetUserUseCase;
pub use list_users::{ListUsersCommand, ListUsersResponse, ListUsersUseCase};
pub use request_activation::{RequestActivationResponse, RequestActivationUseCase};
pub use update_user::{UpdateUserCommand, UpdateUserUseCase};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::user::entities::{User, UserStatus};

/// Full projection of a user, shared by the read-style use cases
#[derive(Debug, Clone)]
pub struct UserDetails {
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

impl From<User> for UserDetails {
  fn from(user: User) -> Self {
    Self {
      user_id: user.id,
      email: user.email,
      first_name: user.first_name,
      last_name: user.last_name,
      status: user.status,
      created_at: user.created_at,
      updated_at: user.updated_at,
      version: user.version,
    }
  }
}
