use std::sync::Arc;
use uuid::Uuid;

use super::UserDetails;
use crate::domain::user::entities::UserStatus;
use crate::domain::user::errors::UserError;
use crate::domain::user::services::UserService;

/// Command for transitioning a user to a new account status
#[derive(Debug, Clone)]
pub struct ChangeUserStatusCommand {
  /// Target status ("active", "inactive" or "suspended")
  pub status: String,
  /// The version the client based its edit on
  pub expected_version: i64,
}

/// Use case for changing a user's status
pub struct ChangeUserStatusUseCase {
  user_service: Arc<UserService>,
}

impl ChangeUserStatusUseCase {
  /// Creates a new instance of ChangeUserStatusUseCase
  pub fn new(user_service: Arc<UserService>) -> Self {
    Self { user_service }
  }

  /// Executes the status transition
  ///
  /// # Errors
  /// Returns `UserError::InvalidStatus` for unknown status strings and
  /// `UserError::StatusUnchanged` for a no-op transition.
  pub async fn execute(
    &self,
    id: Uuid,
    command: ChangeUserStatusCommand,
  ) -> Result<UserDetails, UserError> {
    let status = UserStatus::parse(&command.status)?;

    let user = self
      .user_service
      .change_status(id, status, command.expected_version)
      .await?;

    Ok(UserDetails::from(user))
  }
}
