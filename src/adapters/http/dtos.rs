use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::application::auth::{
  GetCurrentUserResponse, LoginUserResponse, RegisterUserResponse, ValidateSessionResponse,
};
use crate::application::user::{CreateUserResponse, UserDetails};
use crate::domain::user::entities::UserStatus;

lazy_static! {
  static ref NAME_PATTERN: Regex = Regex::new(r"^[A-Za-z \-']+$").expect("valid name regex");
}

/// Password complexity check shared by the request DTOs: at least one
/// uppercase letter, one lowercase letter and one digit
fn validate_password_complexity(password: &str) -> Result<(), ValidationError> {
  let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
  let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
  let has_digit = password.chars().any(|c| c.is_ascii_digit());

  if has_upper && has_lower && has_digit {
    Ok(())
  } else {
    Err(
      ValidationError::new("password_complexity").with_message(
        "Password must contain at least one uppercase letter, one lowercase letter and one digit"
          .into(),
      ),
    )
  }
}

fn validate_person_name(name: &str) -> Result<(), ValidationError> {
  if NAME_PATTERN.is_match(name) {
    Ok(())
  } else {
    Err(
      ValidationError::new("person_name")
        .with_message("Name may only contain letters, spaces, hyphens and apostrophes".into()),
    )
  }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request for user registration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
  /// User's email address
  #[validate(email(message = "Invalid email format"))]
  pub email: String,

  /// User's password
  #[validate(
    length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"),
    custom(function = validate_password_complexity)
  )]
  pub password: String,

  /// User's first name
  #[validate(
    length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"),
    custom(function = validate_person_name)
  )]
  pub first_name: String,

  /// User's last name
  #[validate(
    length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"),
    custom(function = validate_person_name)
  )]
  pub last_name: String,
}

/// Request for user login
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
  /// User's email address
  #[validate(email(message = "Invalid email format"))]
  pub email: String,

  /// User's password
  #[validate(length(min = 1, message = "Password is required"))]
  pub password: String,
}

/// Request for changing the authenticated user's password
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
  /// The user's current password
  #[validate(length(min = 1, message = "Current password is required"))]
  pub current_password: String,

  /// The replacement password
  #[validate(
    length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"),
    custom(function = validate_password_complexity)
  )]
  pub new_password: String,
}

/// Request for creating a user through the management interface
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
  /// New user's email address
  #[validate(email(message = "Invalid email format"))]
  pub email: String,

  /// New user's password
  #[validate(
    length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"),
    custom(function = validate_password_complexity)
  )]
  pub password: String,

  /// New user's first name
  #[validate(
    length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"),
    custom(function = validate_person_name)
  )]
  pub first_name: String,

  /// New user's last name
  #[validate(
    length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"),
    custom(function = validate_person_name)
  )]
  pub last_name: String,

  /// Initial account status; defaults to inactive when omitted
  pub status: Option<String>,
}

/// Request for updating a user's profile
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserRequest {
  /// New email address, if changing
  #[validate(email(message = "Invalid email format"))]
  pub email: Option<String>,

  /// New first name, if changing
  #[validate(
    length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"),
    custom(function = validate_person_name)
  )]
  pub first_name: Option<String>,

  /// New last name, if changing
  #[validate(
    length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"),
    custom(function = validate_person_name)
  )]
  pub last_name: Option<String>,

  /// The version the client based its edit on
  pub version: i64,
}

/// Request for changing a user's account status
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeStatusRequest {
  /// Target status ("active", "inactive" or "suspended")
  #[validate(length(min = 1, message = "Status is required"))]
  pub status: String,

  /// The version the client based its edit on
  pub version: i64,
}

/// Request for redeeming an activation token
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActivateRequest {
  /// The raw activation token
  #[validate(length(equal = 64, message = "Activation token must be 64 characters"))]
  pub token: String,
}

/// Query parameters for listing users
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListUsersQuery {
  /// Maximum number of users to return
  pub limit: Option<i64>,
  /// Number of users to skip
  pub offset: Option<i64>,
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Response after successful registration or login
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
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

impl From<RegisterUserResponse> for AuthResponse {
  fn from(r: RegisterUserResponse) -> Self {
    Self {
      user_id: r.user_id,
      email: r.email,
      first_name: r.first_name,
      last_name: r.last_name,
      session_token: r.session_token,
      expires_at: r.expires_at,
    }
  }
}

impl From<LoginUserResponse> for AuthResponse {
  fn from(r: LoginUserResponse) -> Self {
    Self {
      user_id: r.user_id,
      email: r.email,
      first_name: r.first_name,
      last_name: r.last_name,
      session_token: r.session_token,
      expires_at: r.expires_at,
    }
  }
}

/// Response describing a validated session
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
  /// Unique identifier of the session owner
  pub user_id: Uuid,

  /// Owner's email address
  pub email: String,

  /// Owner's account status
  pub status: UserStatus,

  /// Session expiration timestamp
  pub expires_at: DateTime<Utc>,
}

impl From<ValidateSessionResponse> for SessionResponse {
  fn from(r: ValidateSessionResponse) -> Self {
    Self {
      user_id: r.user_id,
      email: r.email,
      status: r.status,
      expires_at: r.expires_at,
    }
  }
}

/// Response after a session refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
  /// New session expiration timestamp
  pub expires_at: DateTime<Utc>,
}

/// Response containing a user's full profile
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
  /// Unique identifier of the user
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

  /// Timestamp when the user was last updated
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,

  /// Current optimistic locking version
  pub version: i64,
}

impl From<UserDetails> for UserResponse {
  fn from(u: UserDetails) -> Self {
    Self {
      user_id: u.user_id,
      email: u.email,
      first_name: u.first_name,
      last_name: u.last_name,
      status: u.status,
      created_at: u.created_at,
      updated_at: Some(u.updated_at),
      version: u.version,
    }
  }
}

impl From<CreateUserResponse> for UserResponse {
  fn from(u: CreateUserResponse) -> Self {
    Self {
      user_id: u.user_id,
      email: u.email,
      first_name: u.first_name,
      last_name: u.last_name,
      status: u.status,
      created_at: u.created_at,
      updated_at: None,
      version: u.version,
    }
  }
}

impl From<GetCurrentUserResponse> for UserResponse {
  fn from(u: GetCurrentUserResponse) -> Self {
    Self {
      user_id: u.user_id,
      email: u.email,
      first_name: u.first_name,
      last_name: u.last_name,
      status: u.status,
      created_at: u.created_at,
      updated_at: Some(u.updated_at),
      version: u.version,
    }
  }
}

/// Response containing a page of users
#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
  /// The users on this page
  pub users: Vec<UserResponse>,

  /// The effective limit after clamping
  pub limit: i64,

  /// The effective offset
  pub offset: i64,
}

/// Response carrying a freshly issued activation token
#[derive(Debug, Clone, Serialize)]
pub struct ActivationTokenResponse {
  /// The raw activation token, shown exactly once
  pub token: String,

  /// When the token stops being redeemable
  pub expires_at: DateTime<Utc>,
}

/// Response containing a CSRF token for unsafe requests
#[derive(Debug, Clone, Serialize)]
pub struct CsrfTokenResponse {
  /// The token to echo back in the X-CSRF-Token header
  pub csrf_token: String,
}

/// Response summarizing a cleanup sweep
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
  /// Number of expired sessions removed
  pub sessions_removed: u64,

  /// Number of expired activation tokens removed
  pub tokens_removed: u64,
}

/// Standard success response for operations without data
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
  /// Success message
  pub message: String,
}

/// One violation inside a validation error response
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
  /// The offending field
  pub field: String,

  /// What was wrong with it
  pub message: String,
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
  /// Stable machine-readable error code
  pub error: String,

  /// Human-readable description
  pub message: String,

  /// The offending field, when the error concerns a single one
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,

  /// Every collected violation, when there is more than one
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<Vec<FieldError>>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_register_request_validation() {
    let valid = RegisterRequest {
      email: "test@example.com".to_string(),
      password: "Password123".to_string(),
      first_name: "John".to_string(),
      last_name: "Doe".to_string(),
    };
    assert!(valid.validate().is_ok());

    let bad_email = RegisterRequest {
      email: "not-an-email".to_string(),
      ..valid.clone()
    };
    assert!(bad_email.validate().is_err());

    let weak_password = RegisterRequest {
      password: "password".to_string(),
      ..valid.clone()
    };
    assert!(weak_password.validate().is_err());

    let bad_name = RegisterRequest {
      first_name: "John42".to_string(),
      ..valid
    };
    assert!(bad_name.validate().is_err());
  }

  #[test]
  fn test_update_request_allows_partial_input() {
    let partial = UpdateUserRequest {
      email: None,
      first_name: Some("Johnny".to_string()),
      last_name: None,
      version: 3,
    };
    assert!(partial.validate().is_ok());

    let bad = UpdateUserRequest {
      email: Some("broken".to_string()),
      first_name: None,
      last_name: None,
      version: 3,
    };
    assert!(bad.validate().is_err());
  }

  #[test]
  fn test_activate_request_token_length() {
    let ok = ActivateRequest {
      token: "a".repeat(64),
    };
    assert!(ok.validate().is_ok());

    let short = ActivateRequest {
      token: "a".repeat(10),
    };
    assert!(short.validate().is_err());
  }
}
