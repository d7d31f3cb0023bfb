use chrono::{DateTime, Utc};
use std::net::IpAddr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::{Email, Password, PersonName};
use crate::domain::user::entities::UserStatus;

/// Command for registering a new user
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
  /// User's email address
  pub email: String,
  /// User's password (plain text)
  pub password: String,
  /// User's first name
  pub first_name: String,
  /// User's last name
  pub last_name: String,
}

/// Response after successful user registration
#[derive(Debug, Clone)]
pub struct RegisterUserResponse {
  /// Unique identifier of the new user
  pub user_id: Uuid,
  /// User's email address
  pub email: String,
  /// User's first name
  pub first_name: String,
  /// User's last name
  pub last_name: String,
  /// Account status of the new user
  pub status: UserStatus,
  /// Session token for authentication
  pub session_token: String,
  /// Session expiration timestamp
  pub expires_at: DateTime<Utc>,
}

/// Use case for registering a new user
pub struct RegisterUserUseCase {
  auth_service: Arc<AuthService>,
}

impl RegisterUserUseCase {
  /// Creates a new instance of RegisterUserUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the registration use case
  ///
  /// # Errors
  /// Returns `AuthError::EmailAlreadyExists` if the email is taken, or a
  /// `ValueObjectError` wrapped in `AuthError` for invalid input.
  pub async fn execute(
    &self,
    command: RegisterUserCommand,
    ip_address: Option<IpAddr>,
    user_agent: Option<String>,
  ) -> Result<RegisterUserResponse, AuthError> {
    let email = Email::new(command.email)?;
    let password = Password::new(command.password)?;
    let first_name = PersonName::new(command.first_name)?;
    let last_name = PersonName::new(command.last_name)?;

    let (user, session, session_token) = self
      .auth_service
      .register(email, password, first_name, last_name, ip_address, user_agent)
      .await?;

    Ok(RegisterUserResponse {
      user_id: user.id,
      email: user.email,
      first_name: user.first_name,
      last_name: user.last_name,
      status: user.status,
      session_token: session_token.into_inner(),
      expires_at: session.expires_at,
    })
  }
}
