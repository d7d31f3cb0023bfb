use std::sync::Arc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::SessionToken;

/// Use case for logging out a user
pub struct LogoutUserUseCase {
  auth_service: Arc<AuthService>,
}

impl LogoutUserUseCase {
  /// Creates a new instance of LogoutUserUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the logout use case, deleting the session behind the token
  ///
  /// # Errors
  /// Returns `AuthError::InvalidSession` for malformed or unknown tokens.
  pub async fn execute(&self, token: String) -> Result<(), AuthError> {
    let token = SessionToken::from_string(token).map_err(|_| AuthError::InvalidSession)?;
    self.auth_service.logout(token).await
  }
}
