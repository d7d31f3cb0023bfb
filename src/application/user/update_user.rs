use std::sync::Arc;
use uuid::Uuid;

use super::UserDetails;
use crate::domain::auth::value_objects::{Email, PersonName};
use crate::domain::user::errors::UserError;
use crate::domain::user::services::{UserChanges, UserService};

/// Command for updating a user's profile
///
/// `expected_version` must match the version the client last read; a
/// mismatch means another writer got there first.
#[derive(Debug, Clone)]
pub struct UpdateUserCommand {
  /// New email address, if changing
  pub email: Option<String>,
  /// New first name, if changing
  pub first_name: Option<String>,
  /// New last name, if changing
  pub last_name: Option<String>,
  /// The version the client based its edit on
  pub expected_version: i64,
}

/// Use case for updating a user
pub struct UpdateUserUseCase {
  user_service: Arc<UserService>,
}

impl UpdateUserUseCase {
  /// Creates a new instance of UpdateUserUseCase
  pub fn new(user_service: Arc<UserService>) -> Self {
    Self { user_service }
  }

  /// Executes the update under an optimistic version check
  ///
  /// # Errors
  /// Returns `UserError::OptimisticLock` when the expected version is
  /// stale and `UserError::AlreadyExists` when the new email is taken.
  pub async fn execute(
    &self,
    id: Uuid,
    command: UpdateUserCommand,
  ) -> Result<UserDetails, UserError> {
    let changes = UserChanges {
      email: command.email.map(Email::new).transpose()?,
      first_name: command.first_name.map(PersonName::new).transpose()?,
      last_name: command.last_name.map(PersonName::new).transpose()?,
    };

    let user = self
      .user_service
      .update_user(id, command.expected_version, changes)
      .await?;

    Ok(UserDetails::from(user))
  }
}
