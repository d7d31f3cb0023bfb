use actix_web::{
  HttpResponse,
  error::ResponseError,
  http::{StatusCode, header::ContentType},
};
use std::fmt;

use crate::domain::auth::errors::{AuthError, RepositoryError};
use crate::domain::user::errors::UserError;

use super::dtos::{ErrorResponse, FieldError};

/// API error type that maps domain errors to HTTP responses
///
/// Every variant carries a stable machine-readable code so clients can
/// branch on `error` without parsing the message.
#[derive(Debug)]
pub enum ApiError {
  /// Request input failed validation (400)
  ///
  /// `message` and `field` describe the first violation; `details` carries
  /// every collected one.
  Validation {
    message: String,
    field: Option<String>,
    details: Vec<FieldError>,
  },

  /// Email/password pair did not match (401)
  InvalidCredentials,

  /// Session exists but its expiry has passed (401)
  SessionExpired,

  /// Session token is malformed or unknown (401)
  SessionInvalid,

  /// Account is not in the active status (403)
  AccountSuspended,

  /// Authenticated but not allowed to perform the operation (403)
  Forbidden,

  /// Unsafe request without a CSRF token (403)
  CsrfTokenMissing,

  /// CSRF token pair did not match (403)
  CsrfTokenInvalid,

  /// No user with the given identifier (404)
  UserNotFound,

  /// No session behind the given token (404)
  SessionNotFound,

  /// A user with this email already exists (409)
  UserAlreadyExists,

  /// The write lost an optimistic concurrency race (409)
  OptimisticLock,

  /// Too many requests (429)
  RateLimitExceeded,

  /// Anything the server cannot explain to the client (500)
  Internal(String),
}

impl ApiError {
  /// Stable machine-readable error code
  pub fn code(&self) -> &'static str {
    match self {
      ApiError::Validation { .. } => "VALIDATION_ERROR",
      ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
      ApiError::SessionExpired => "SESSION_EXPIRED",
      ApiError::SessionInvalid => "SESSION_INVALID",
      ApiError::AccountSuspended => "ACCOUNT_SUSPENDED",
      ApiError::Forbidden => "FORBIDDEN",
      ApiError::CsrfTokenMissing => "CSRF_TOKEN_MISSING",
      ApiError::CsrfTokenInvalid => "CSRF_TOKEN_INVALID",
      ApiError::UserNotFound => "USER_NOT_FOUND",
      ApiError::SessionNotFound => "SESSION_NOT_FOUND",
      ApiError::UserAlreadyExists => "USER_ALREADY_EXISTS",
      ApiError::OptimisticLock => "OPTIMISTIC_LOCK_ERROR",
      ApiError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
      ApiError::Internal(_) => "INTERNAL_ERROR",
    }
  }

  fn message(&self) -> String {
    match self {
      ApiError::Validation { message, .. } => message.clone(),
      ApiError::InvalidCredentials => "Invalid email or password".to_string(),
      ApiError::SessionExpired => "Session has expired".to_string(),
      ApiError::SessionInvalid => "Invalid or missing session token".to_string(),
      ApiError::AccountSuspended => "Account is not active".to_string(),
      ApiError::Forbidden => "You are not allowed to perform this operation".to_string(),
      ApiError::CsrfTokenMissing => "CSRF token is missing".to_string(),
      ApiError::CsrfTokenInvalid => "CSRF token is invalid".to_string(),
      ApiError::UserNotFound => "User not found".to_string(),
      ApiError::SessionNotFound => "Session not found".to_string(),
      ApiError::UserAlreadyExists => "A user with this email already exists".to_string(),
      ApiError::OptimisticLock => {
        "The resource was modified by another request; reload and retry".to_string()
      }
      ApiError::RateLimitExceeded => "Too many requests. Please try again later".to_string(),
      // Internal details never reach the client
      ApiError::Internal(_) => "An internal server error occurred".to_string(),
    }
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.code(), self.message())
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
      ApiError::InvalidCredentials | ApiError::SessionExpired | ApiError::SessionInvalid => {
        StatusCode::UNAUTHORIZED
      }
      ApiError::AccountSuspended
      | ApiError::Forbidden
      | ApiError::CsrfTokenMissing
      | ApiError::CsrfTokenInvalid => StatusCode::FORBIDDEN,
      ApiError::UserNotFound | ApiError::SessionNotFound => StatusCode::NOT_FOUND,
      ApiError::UserAlreadyExists | ApiError::OptimisticLock => StatusCode::CONFLICT,
      ApiError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    if let ApiError::Internal(details) = self {
      tracing::error!("Internal error: {}", details);
    }

    let (field, details) = match self {
      ApiError::Validation { field, details, .. } => {
        let details = if details.is_empty() {
          None
        } else {
          Some(details.clone())
        };
        (field.clone(), details)
      }
      _ => (None, None),
    };

    let body = ErrorResponse {
      error: self.code().to_string(),
      message: self.message(),
      field,
      details,
    };

    HttpResponse::build(self.status_code())
      .content_type(ContentType::json())
      .json(body)
  }
}

/// Convert AuthError to ApiError
impl From<AuthError> for ApiError {
  fn from(error: AuthError) -> Self {
    match error {
      AuthError::InvalidCredentials => ApiError::InvalidCredentials,
      AuthError::AccountSuspended => ApiError::AccountSuspended,
      AuthError::EmailAlreadyExists => ApiError::UserAlreadyExists,
      AuthError::UserNotFound => ApiError::UserNotFound,
      AuthError::SessionNotFound => ApiError::SessionNotFound,
      AuthError::SessionExpired => ApiError::SessionExpired,
      AuthError::InvalidSession => ApiError::SessionInvalid,
      AuthError::PasswordReused => ApiError::Validation {
        message: "New password must differ from the old password".to_string(),
        field: Some("new_password".to_string()),
        details: Vec::new(),
      },
      AuthError::ValueObject(err) => ApiError::Validation {
        message: err.to_string(),
        field: None,
        details: Vec::new(),
      },
      AuthError::Repository(err) => match err {
        RepositoryError::DuplicateKey(_) => ApiError::UserAlreadyExists,
        other => ApiError::Internal(other.to_string()),
      },
      AuthError::Hash(err) => ApiError::Internal(err.to_string()),
      AuthError::Event(err) => ApiError::Internal(err.to_string()),
    }
  }
}

/// Convert UserError to ApiError
impl From<UserError> for ApiError {
  fn from(error: UserError) -> Self {
    match error {
      UserError::NotFound => ApiError::UserNotFound,
      UserError::AlreadyExists => ApiError::UserAlreadyExists,
      UserError::OptimisticLock => ApiError::OptimisticLock,
      UserError::InvalidStatus(status) => ApiError::Validation {
        message: format!("Unknown user status: {}", status),
        field: Some("status".to_string()),
        details: Vec::new(),
      },
      UserError::StatusUnchanged(status) => ApiError::Validation {
        message: format!("User is already in status {}", status),
        field: Some("status".to_string()),
        details: Vec::new(),
      },
      UserError::AlreadyActive => ApiError::Validation {
        message: "User is already active".to_string(),
        field: None,
        details: Vec::new(),
      },
      UserError::ActivationTokenInvalid => ApiError::Validation {
        message: "Activation token not found".to_string(),
        field: Some("token".to_string()),
        details: Vec::new(),
      },
      UserError::ActivationTokenExpired => ApiError::Validation {
        message: "Activation token has expired".to_string(),
        field: Some("token".to_string()),
        details: Vec::new(),
      },
      UserError::ActivationTokenUsed => ApiError::Validation {
        message: "Activation token has already been used".to_string(),
        field: Some("token".to_string()),
        details: Vec::new(),
      },
      UserError::ValueObject(err) => ApiError::Validation {
        message: err.to_string(),
        field: None,
        details: Vec::new(),
      },
      UserError::Repository(err) => match err {
        RepositoryError::DuplicateKey(_) => ApiError::UserAlreadyExists,
        other => ApiError::Internal(other.to_string()),
      },
      UserError::Hash(err) => ApiError::Internal(err.to_string()),
      UserError::Event(err) => ApiError::Internal(err.to_string()),
    }
  }
}

/// Convert validation errors from the validator crate
impl From<validator::ValidationErrors> for ApiError {
  fn from(errors: validator::ValidationErrors) -> Self {
    // Collect every violation; sorted by field so the response is stable
    let mut details: Vec<FieldError> = errors
      .field_errors()
      .iter()
      .flat_map(|(field, errs)| {
        errs.iter().map(move |e| FieldError {
          field: field.to_string(),
          message: e
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("Invalid value for field: {}", field)),
        })
      })
      .collect();
    details.sort_by(|a, b| a.field.cmp(&b.field));

    match details.first() {
      Some(first) => ApiError::Validation {
        message: first.message.clone(),
        field: Some(first.field.clone()),
        details,
      },
      None => ApiError::Validation {
        message: "Invalid request".to_string(),
        field: None,
        details: Vec::new(),
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_codes_follow_the_taxonomy() {
    assert_eq!(
      ApiError::Validation {
        message: "bad".to_string(),
        field: None,
        details: Vec::new()
      }
      .status_code(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      ApiError::InvalidCredentials.status_code(),
      StatusCode::UNAUTHORIZED
    );
    assert_eq!(
      ApiError::AccountSuspended.status_code(),
      StatusCode::FORBIDDEN
    );
    assert_eq!(
      ApiError::CsrfTokenInvalid.status_code(),
      StatusCode::FORBIDDEN
    );
    assert_eq!(ApiError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
      ApiError::OptimisticLock.status_code(),
      StatusCode::CONFLICT
    );
    assert_eq!(
      ApiError::RateLimitExceeded.status_code(),
      StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
      ApiError::Internal("boom".to_string()).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn test_domain_error_conversion() {
    let api: ApiError = AuthError::InvalidCredentials.into();
    assert_eq!(api.code(), "INVALID_CREDENTIALS");

    let api: ApiError = AuthError::SessionExpired.into();
    assert_eq!(api.code(), "SESSION_EXPIRED");

    let api: ApiError = UserError::OptimisticLock.into();
    assert_eq!(api.code(), "OPTIMISTIC_LOCK_ERROR");

    let api: ApiError = UserError::AlreadyExists.into();
    assert_eq!(api.code(), "USER_ALREADY_EXISTS");
  }

  #[test]
  fn test_all_violations_are_collected() {
    let mut errors = validator::ValidationErrors::new();
    errors.add(
      "email".into(),
      validator::ValidationError::new("email").with_message("Invalid email format".into()),
    );
    errors.add(
      "password".into(),
      validator::ValidationError::new("length").with_message("Password too short".into()),
    );

    let api: ApiError = errors.into();
    match api {
      ApiError::Validation {
        field, details, ..
      } => {
        assert_eq!(field.as_deref(), Some("email"));
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].field, "email");
        assert_eq!(details[1].field, "password");
      }
      other => panic!("expected a validation error, got {}", other),
    }
  }

  #[test]
  fn test_internal_details_are_not_exposed() {
    let api = ApiError::Internal("connection refused at 10.0.0.3".to_string());
    assert_eq!(api.message(), "An internal server error occurred");
  }
}
