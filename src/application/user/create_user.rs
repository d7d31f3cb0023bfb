use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::value_objects::{Email, Password, PersonName};
use crate::domain::user::entities::UserStatus;
use crate::domain::user::errors::UserError;
use crate::domain::user::services::UserService;

/// Command for creating a user through the management interface
#[derive(Debug, Clone)]
pub struct CreateUserCommand {
  /// New user's email address
  pub email: String,
  /// New user's password (plain text)
  pub password: String,
  /// New user's first name
  pub first_name: String,
  /// New user's last name
  pub last_name: String,
  /// Initial account status; defaults to inactive when omitted
  pub status: Option<String>,
}

/// Response after successful user creation
#[derive(Debug, Clone)]
pub struct CreateUserResponse {
  /// Unique identifier of the new user
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
  /// Initial optimistic locking version
  pub version: i64,
}

/// Use case for creating a user
pub struct CreateUserUseCase {
  user_service: Arc<UserService>,
}

impl CreateUserUseCase {
  /// Creates a new instance of CreateUserUseCase
  pub fn new(user_service: Arc<UserService>) -> Self {
    Self { user_service }
  }

  /// Executes the user creation use case
  ///
  /// # Errors
  /// Returns `UserError::AlreadyExists` for duplicate emails and
  /// `UserError::InvalidStatus` for unknown status strings.
  pub async fn execute(&self, command: CreateUserCommand) -> Result<CreateUserResponse, UserError> {
    let email = Email::new(command.email)?;
    let password = Password::new(command.password)?;
    let first_name = PersonName::new(command.first_name)?;
    let last_name = PersonName::new(command.last_name)?;
    let status = command
      .status
      .map(|s| UserStatus::parse(&s))
      .transpose()?;

    let user = self
      .user_service
      .create_user(email, password, first_name, last_name, status)
      .await?;

    Ok(CreateUserResponse {
      user_id: user.id,
      email: user.email,
      first_name: user.first_name,
      last_name: user.last_name,
      status: user.status,
      created_at: user.created_at,
      version: user.version,
    })
  }
}
