use actix_web::{HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::adapters::http::{
  dtos::{
    ActivateRequest, ActivationTokenResponse, ChangeStatusRequest, CreateUserRequest,
    ListUsersQuery, UpdateUserRequest, UserListResponse, UserResponse,
  },
  errors::ApiError,
};
use crate::application::user::{
  ActivateUserCommand, ActivateUserUseCase, ChangeUserStatusCommand, ChangeUserStatusUseCase,
  CreateUserCommand, CreateUserUseCase, DeleteUserUseCase, GetUserUseCase, ListUsersCommand,
  ListUsersUseCase, RequestActivationUseCase, UpdateUserCommand, UpdateUserUseCase,
};

/// Handler for creating a user
///
/// POST /api/users
/// Body: CreateUserRequest (JSON)
/// Response: UserResponse (JSON) with status 201; the account starts
/// inactive unless the request says otherwise
pub async fn create_user_handler(
  request: web::Json<CreateUserRequest>,
  use_case: web::Data<Arc<CreateUserUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let command = CreateUserCommand {
    email: request.email.clone(),
    password: request.password.clone(),
    first_name: request.first_name.clone(),
    last_name: request.last_name.clone(),
    status: request.status.clone(),
  };

  let response = use_case.execute(command).await?;

  Ok(HttpResponse::Created().json(UserResponse::from(response)))
}

/// Handler for fetching a single user
///
/// GET /api/users/{id}
pub async fn get_user_handler(
  path: web::Path<Uuid>,
  use_case: web::Data<Arc<GetUserUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let details = use_case.execute(path.into_inner()).await?;

  Ok(HttpResponse::Ok().json(UserResponse::from(details)))
}

/// Handler for listing users
///
/// GET /api/users?limit=&offset=
/// Out-of-range paging values are clamped, not rejected
pub async fn list_users_handler(
  query: web::Query<ListUsersQuery>,
  use_case: web::Data<Arc<ListUsersUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let command = ListUsersCommand {
    limit: query.limit,
    offset: query.offset,
  };

  let response = use_case.execute(command).await?;

  Ok(HttpResponse::Ok().json(UserListResponse {
    users: response.users.into_iter().map(UserResponse::from).collect(),
    limit: response.limit,
    offset: response.offset,
  }))
}

/// Handler for updating a user's profile
///
/// PUT /api/users/{id}
/// Body: UpdateUserRequest (JSON); `version` must match the version the
/// client last read, otherwise the update is answered with 409
pub async fn update_user_handler(
  path: web::Path<Uuid>,
  request: web::Json<UpdateUserRequest>,
  use_case: web::Data<Arc<UpdateUserUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let command = UpdateUserCommand {
    email: request.email.clone(),
    first_name: request.first_name.clone(),
    last_name: request.last_name.clone(),
    expected_version: request.version,
  };

  let details = use_case.execute(path.into_inner(), command).await?;

  Ok(HttpResponse::Ok().json(UserResponse::from(details)))
}

/// Handler for deleting a user
///
/// DELETE /api/users/{id}
/// Response: 204 with no body; sessions and activation tokens cascade
pub async fn delete_user_handler(
  path: web::Path<Uuid>,
  use_case: web::Data<Arc<DeleteUserUseCase>>,
) -> Result<HttpResponse, ApiError> {
  use_case.execute(path.into_inner()).await?;

  Ok(HttpResponse::NoContent().finish())
}

/// Handler for changing a user's account status
///
/// PUT /api/users/{id}/status
/// Body: ChangeStatusRequest (JSON)
pub async fn change_status_handler(
  path: web::Path<Uuid>,
  request: web::Json<ChangeStatusRequest>,
  use_case: web::Data<Arc<ChangeUserStatusUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let command = ChangeUserStatusCommand {
    status: request.status.clone(),
    expected_version: request.version,
  };

  let details = use_case.execute(path.into_inner(), command).await?;

  Ok(HttpResponse::Ok().json(UserResponse::from(details)))
}

/// Handler for issuing an activation token
///
/// POST /api/users/{id}/activation
/// Issuing a new token replaces any earlier one for the user, so this
/// response always carries the only redeemable token
pub async fn request_activation_handler(
  path: web::Path<Uuid>,
  use_case: web::Data<Arc<RequestActivationUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = use_case.execute(path.into_inner()).await?;

  Ok(HttpResponse::Created().json(ActivationTokenResponse {
    token: response.token,
    expires_at: response.expires_at,
  }))
}

/// Handler for redeeming an activation token
///
/// POST /api/users/activate (public)
/// Body: ActivateRequest (JSON)
/// Marks the token used and activates the account in one transaction
pub async fn activate_handler(
  request: web::Json<ActivateRequest>,
  use_case: web::Data<Arc<ActivateUserUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let command = ActivateUserCommand {
    token: request.token.clone(),
  };

  let details = use_case.execute(command).await?;

  Ok(HttpResponse::Ok().json(UserResponse::from(details)))
}
