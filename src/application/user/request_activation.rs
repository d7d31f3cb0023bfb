use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::user::errors::UserError;
use crate::domain::user::services::UserService;

/// Response carrying a freshly issued activation token
///
/// The raw token is returned to the caller for delivery; it is never
/// retrievable again.
#[derive(Debug, Clone)]
pub struct RequestActivationResponse {
  /// The raw activation token
  pub token: String,
  /// When the token stops being redeemable
  pub expires_at: DateTime<Utc>,
}

/// Use case for issuing an activation token
pub struct RequestActivationUseCase {
  user_service: Arc<UserService>,
}

impl RequestActivationUseCase {
  /// Creates a new instance of RequestActivationUseCase
  pub fn new(user_service: Arc<UserService>) -> Self {
    Self { user_service }
  }

  /// Executes the activation request; any prior token for the user stops
  /// working
  ///
  /// # Errors
  /// Returns `UserError::AlreadyActive` if the account needs no activation.
  pub async fn execute(&self, user_id: Uuid) -> Result<RequestActivationResponse, UserError> {
    let token = self.user_service.request_activation(user_id).await?;

    Ok(RequestActivationResponse {
      token: token.token,
      expires_at: token.expires_at,
    })
  }
}
