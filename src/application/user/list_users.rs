use std::sync::Arc;

use super::UserDetails;
use crate::domain::user::errors::UserError;
use crate::domain::user::services::UserService;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Command for listing users with pagination
#[derive(Debug, Clone, Default)]
pub struct ListUsersCommand {
  /// Maximum number of users to return (clamped to 1..=100)
  pub limit: Option<i64>,
  /// Number of users to skip
  pub offset: Option<i64>,
}

/// Response containing a page of users
#[derive(Debug, Clone)]
pub struct ListUsersResponse {
  /// The users on this page, ordered by creation time
  pub users: Vec<UserDetails>,
  /// The effective limit after clamping
  pub limit: i64,
  /// The effective offset
  pub offset: i64,
}

/// Use case for listing users
pub struct ListUsersUseCase {
  user_service: Arc<UserService>,
}

impl ListUsersUseCase {
  /// Creates a new instance of ListUsersUseCase
  pub fn new(user_service: Arc<UserService>) -> Self {
    Self { user_service }
  }

  /// Executes the listing; out-of-range paging values are clamped rather
  /// than rejected
  pub async fn execute(&self, command: ListUsersCommand) -> Result<ListUsersResponse, UserError> {
    let limit = command
      .limit
      .unwrap_or(DEFAULT_PAGE_SIZE)
      .clamp(1, MAX_PAGE_SIZE);
    let offset = command.offset.unwrap_or(0).max(0);

    let users = self.user_service.list_users(limit, offset).await?;

    Ok(ListUsersResponse {
      users: users.into_iter().map(UserDetails::from).collect(),
      limit,
      offset,
    })
  }
}
