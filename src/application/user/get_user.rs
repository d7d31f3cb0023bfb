use std::sync::Arc;
use uuid::Uuid;

use super::UserDetails;
use crate::domain::user::errors::UserError;
use crate::domain::user::services::UserService;

/// Use case for fetching a single user by id
pub struct GetUserUseCase {
  user_service: Arc<UserService>,
}

impl GetUserUseCase {
  /// Creates a new instance of GetUserUseCase
  pub fn new(user_service: Arc<UserService>) -> Self {
    Self { user_service }
  }

  /// Executes the user lookup
  ///
  /// # Errors
  /// Returns `UserError::NotFound` if no such user exists.
  pub async fn execute(&self, id: Uuid) -> Result<UserDetails, UserError> {
    let user = self.user_service.get_user(id).await?;
    Ok(UserDetails::from(user))
  }
}
