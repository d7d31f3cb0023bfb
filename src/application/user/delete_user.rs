use std::sync::Arc;
use uuid::Uuid;

use crate::domain::user::errors::UserError;
use crate::domain::user::services::UserService;

/// Use case for permanently deleting a user
pub struct DeleteUserUseCase {
  user_service: Arc<UserService>,
}

impl DeleteUserUseCase {
  /// Creates a new instance of DeleteUserUseCase
  pub fn new(user_service: Arc<UserService>) -> Self {
    Self { user_service }
  }

  /// Executes the deletion; the user's sessions and activation tokens go
  /// with them
  ///
  /// # Errors
  /// Returns `UserError::NotFound` if no such user exists.
  pub async fn execute(&self, id: Uuid) -> Result<(), UserError> {
    self.user_service.delete_user(id).await
  }
}
