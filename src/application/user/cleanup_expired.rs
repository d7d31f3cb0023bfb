use std::sync::Arc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::ports::SessionRepository;
use crate::domain::user::errors::UserError;
use crate::domain::user::services::UserService;

/// Response summarizing a cleanup sweep
#[derive(Debug, Clone, Copy)]
pub struct CleanupExpiredResponse {
  /// Number of expired sessions removed
  pub sessions_removed: u64,
  /// Number of expired activation tokens removed
  pub tokens_removed: u64,
}

/// Use case for sweeping expired sessions and activation tokens
///
/// Runs on demand via the maintenance endpoint and periodically from the
/// background task in `main`.
pub struct CleanupExpiredUseCase {
  session_repo: Arc<dyn SessionRepository>,
  user_service: Arc<UserService>,
}

impl CleanupExpiredUseCase {
  /// Creates a new instance of CleanupExpiredUseCase
  pub fn new(session_repo: Arc<dyn SessionRepository>, user_service: Arc<UserService>) -> Self {
    Self {
      session_repo,
      user_service,
    }
  }

  /// Executes the sweep; each store reports how many rows it dropped
  pub async fn execute(&self) -> Result<CleanupExpiredResponse, UserError> {
    let sessions_removed = self
      .session_repo
      .delete_expired()
      .await
      .map_err(|e| match e {
        AuthError::Repository(repo) => UserError::Repository(repo),
        other => UserError::Repository(
          crate::domain::auth::errors::RepositoryError::QueryFailed(other.to_string()),
        ),
      })?;

    let tokens_removed = self.user_service.cleanup_expired_tokens().await?;

    Ok(CleanupExpiredResponse {
      sessions_removed,
      tokens_removed,
    })
  }
}
