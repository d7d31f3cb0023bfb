use std::sync::Arc;

use super::UserDetails;
use crate::domain::user::errors::UserError;
use crate::domain::user::services::UserService;

/// Command for redeeming an activation token
#[derive(Clone)]
pub struct ActivateUserCommand {
  /// The raw activation token to redeem
  pub token: String,
}

/// Use case for activating a user account via token
pub struct ActivateUserUseCase {
  user_service: Arc<UserService>,
}

impl ActivateUserUseCase {
  /// Creates a new instance of ActivateUserUseCase
  pub fn new(user_service: Arc<UserService>) -> Self {
    Self { user_service }
  }

  /// Executes the activation; the token is consumed and the user flips to
  /// active in one transaction
  ///
  /// # Errors
  /// Returns `ActivationTokenInvalid`, `ActivationTokenUsed` or
  /// `ActivationTokenExpired` depending on the token's state.
  pub async fn execute(&self, command: ActivateUserCommand) -> Result<UserDetails, UserError> {
    let user = self.user_service.activate_user(&command.token).await?;
    Ok(UserDetails::from(user))
  }
}
