use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::Password;

/// Command for changing a user's password
#[derive(Clone)]
pub struct ChangePasswordCommand {
  /// The user's current password
  pub current_password: String,
  /// The replacement password
  pub new_password: String,
}

/// Response after a successful password change
#[derive(Debug, Clone)]
pub struct ChangePasswordResponse {
  /// Number of sessions that were invalidated
  pub sessions_invalidated: usize,
}

/// Use case for changing the authenticated user's password
pub struct ChangePasswordUseCase {
  auth_service: Arc<AuthService>,
}

impl ChangePasswordUseCase {
  /// Creates a new instance of ChangePasswordUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the password change use case
  ///
  /// All sessions of the user are invalidated on success, including the
  /// one that carried this request.
  ///
  /// # Errors
  /// Returns `AuthError::InvalidCredentials` if the current password does
  /// not verify, `AuthError::PasswordReused` if nothing would change.
  pub async fn execute(
    &self,
    user_id: Uuid,
    command: ChangePasswordCommand,
  ) -> Result<ChangePasswordResponse, AuthError> {
    // A current password that fails the complexity rules can never have
    // been stored, so report it as a credential mismatch.
    let current_password =
      Password::new(command.current_password).map_err(|_| AuthError::InvalidCredentials)?;
    let new_password = Password::new(command.new_password)?;

    let sessions_invalidated = self
      .auth_service
      .change_password(user_id, current_password, new_password)
      .await?;

    Ok(ChangePasswordResponse {
      sessions_invalidated,
    })
  }
}
