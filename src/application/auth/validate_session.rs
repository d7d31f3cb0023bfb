use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::SessionToken;
use crate::domain::user::entities::UserStatus;

/// Response describing a validated session
#[derive(Debug, Clone)]
pub struct ValidateSessionResponse {
  /// Unique identifier of the session owner
  pub user_id: Uuid,
  /// Owner's email address
  pub email: String,
  /// Owner's account status
  pub status: UserStatus,
  /// Session expiration timestamp
  pub expires_at: DateTime<Utc>,
}

/// Use case for validating a session token
pub struct ValidateSessionUseCase {
  auth_service: Arc<AuthService>,
}

impl ValidateSessionUseCase {
  /// Creates a new instance of ValidateSessionUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the session validation use case
  ///
  /// # Errors
  /// Returns `AuthError::InvalidSession` for malformed or unknown tokens,
  /// `AuthError::SessionExpired` for expired ones.
  pub async fn execute(&self, token: String) -> Result<ValidateSessionResponse, AuthError> {
    let token = SessionToken::from_string(token).map_err(|_| AuthError::InvalidSession)?;

    let (user, session) = self.auth_service.validate_session(token).await?;

    Ok(ValidateSessionResponse {
      user_id: user.id,
      email: user.email,
      status: user.status,
      expires_at: session.expires_at,
    })
  }
}
