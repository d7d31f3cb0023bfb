use chrono::{DateTime, Utc};
use std::net::IpAddr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::{Email, Password};

/// Command for logging in a user
#[derive(Debug, Clone)]
pub struct LoginUserCommand {
  /// User's email address
  pub email: String,
  /// User's password (plain text)
  pub password: String,
}

/// Response after successful user login
#[derive(Debug, Clone)]
pub struct LoginUserResponse {
  /// Unique identifier of the user
  pub user_id: Uuid,
  /// User's email address
  pub email: String,
  /// User's first name
  pub first_name: String,
  /// User's last name
  pub last_name: String,
  /// Session token for authentication
  pub session_token: String,
  /// Session expiration timestamp
  pub expires_at: DateTime<Utc>,
}

/// Use case for logging in a user
pub struct LoginUserUseCase {
  auth_service: Arc<AuthService>,
}

impl LoginUserUseCase {
  /// Creates a new instance of LoginUserUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the user login use case
  ///
  /// # Errors
  /// Returns `AuthError::InvalidCredentials` for bad credentials and
  /// `AuthError::AccountSuspended` for non-active accounts.
  pub async fn execute(
    &self,
    command: LoginUserCommand,
    ip_address: Option<IpAddr>,
    user_agent: Option<String>,
  ) -> Result<LoginUserResponse, AuthError> {
    let email = Email::new(command.email)?;

    // A malformed password can never match a stored hash, so report it
    // the same way as a wrong one.
    let password = Password::new(command.password).map_err(|_| AuthError::InvalidCredentials)?;

    let (user, session, session_token) = self
      .auth_service
      .login(email, password, ip_address, user_agent)
      .await?;

    Ok(LoginUserResponse {
      user_id: user.id,
      email: user.email,
      first_name: user.first_name,
      last_name: user.last_name,
      session_token: session_token.into_inner(),
      expires_at: session.expires_at,
    })
  }
}
