use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::SessionToken;

/// Response after a session refresh
#[derive(Debug, Clone)]
pub struct RefreshSessionResponse {
  /// New session expiration timestamp
  pub expires_at: DateTime<Utc>,
}

/// Use case for extending a session's lifetime
pub struct RefreshSessionUseCase {
  auth_service: Arc<AuthService>,
}

impl RefreshSessionUseCase {
  /// Creates a new instance of RefreshSessionUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the session refresh use case; the session keeps its id and
  /// token, only the expiry moves forward
  pub async fn execute(&self, token: String) -> Result<RefreshSessionResponse, AuthError> {
    let token = SessionToken::from_string(token).map_err(|_| AuthError::InvalidSession)?;

    let session = self.auth_service.refresh_session(token).await?;

    Ok(RefreshSessionResponse {
      expires_at: session.expires_at,
    })
  }
}
