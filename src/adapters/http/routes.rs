use actix_web::web;
use std::sync::Arc;

use crate::application::auth::{
  ChangePasswordUseCase, LoginUserUseCase, LogoutUserUseCase, RefreshSessionUseCase,
  RegisterUserUseCase, ValidateSessionUseCase,
};
use crate::application::user::{
  ActivateUserUseCase, ChangeUserStatusUseCase, CleanupExpiredUseCase, CreateUserUseCase,
  DeleteUserUseCase, GetUserUseCase, ListUsersUseCase, RequestActivationUseCase,
  UpdateUserUseCase,
};
use crate::domain::auth::services::AuthService;

use super::handlers::auth::{
  change_password_handler, csrf_token_handler, login_handler, logout_handler, me_handler,
  refresh_handler, register_handler, validate_handler,
};
use super::handlers::maintenance::cleanup_handler;
use super::handlers::users::{
  activate_handler, change_status_handler, create_user_handler, delete_user_handler,
  get_user_handler, list_users_handler, request_activation_handler, update_user_handler,
};
use super::middleware::SessionMiddleware;

/// Configure authentication routes
///
/// Mounts all authentication-related endpoints under the provided scope
/// (e.g., /api/auth).
///
/// # Routes
///
/// - POST /register - Register a new user account and start a session
/// - POST /login - Authenticate and create a session
/// - POST /logout - Invalidate the presented session
/// - GET /validate - Describe the session behind the presented token
/// - POST /refresh - Extend the presented session's lifetime
/// - GET /csrf-token - Fetch the CSRF token for unsafe requests
/// - GET /me - Get the authenticated user's profile (guarded)
/// - PUT /password - Change the authenticated user's password (guarded)
pub fn configure_auth_routes(
  cfg: &mut web::ServiceConfig,
  register_use_case: Arc<RegisterUserUseCase>,
  login_use_case: Arc<LoginUserUseCase>,
  logout_use_case: Arc<LogoutUserUseCase>,
  validate_use_case: Arc<ValidateSessionUseCase>,
  refresh_use_case: Arc<RefreshSessionUseCase>,
  change_password_use_case: Arc<ChangePasswordUseCase>,
  auth_service: Arc<AuthService>,
) {
  cfg
    .app_data(web::Data::new(register_use_case))
    .app_data(web::Data::new(login_use_case))
    .app_data(web::Data::new(logout_use_case))
    .app_data(web::Data::new(validate_use_case))
    .app_data(web::Data::new(refresh_use_case))
    .app_data(web::Data::new(change_password_use_case))
    // Public routes; logout, validate and refresh carry their own token
    // and report token problems through the error taxonomy themselves
    .route("/register", web::post().to(register_handler))
    .route("/login", web::post().to(login_handler))
    .route("/logout", web::post().to(logout_handler))
    .route("/validate", web::get().to(validate_handler))
    .route("/refresh", web::post().to(refresh_handler))
    .route("/csrf-token", web::get().to(csrf_token_handler))
    // Guarded routes get the AuthContext attached by the middleware
    .service(
      web::scope("")
        .wrap(SessionMiddleware::new(auth_service))
        .route("/me", web::get().to(me_handler))
        .route("/password", web::put().to(change_password_handler)),
    );
}

/// Configure user-management routes
///
/// Mounts all user CRUD and activation endpoints under the provided scope
/// (e.g., /api/users).
///
/// # Routes
///
/// - POST /activate - Redeem an activation token (public)
/// - POST / - Create a user (guarded)
/// - GET / - List users with pagination (guarded)
/// - GET /{id} - Fetch a single user (guarded)
/// - PUT /{id} - Update a user's profile (guarded)
/// - DELETE /{id} - Delete a user (guarded)
/// - PUT /{id}/status - Change a user's account status (guarded)
/// - POST /{id}/activation - Issue an activation token (guarded)
pub fn configure_user_routes(
  cfg: &mut web::ServiceConfig,
  create_use_case: Arc<CreateUserUseCase>,
  get_use_case: Arc<GetUserUseCase>,
  list_use_case: Arc<ListUsersUseCase>,
  update_use_case: Arc<UpdateUserUseCase>,
  delete_use_case: Arc<DeleteUserUseCase>,
  change_status_use_case: Arc<ChangeUserStatusUseCase>,
  request_activation_use_case: Arc<RequestActivationUseCase>,
  activate_use_case: Arc<ActivateUserUseCase>,
  auth_service: Arc<AuthService>,
) {
  cfg
    .app_data(web::Data::new(create_use_case))
    .app_data(web::Data::new(get_use_case))
    .app_data(web::Data::new(list_use_case))
    .app_data(web::Data::new(update_use_case))
    .app_data(web::Data::new(delete_use_case))
    .app_data(web::Data::new(change_status_use_case))
    .app_data(web::Data::new(request_activation_use_case))
    .app_data(web::Data::new(activate_use_case))
    // Registered before the guarded scope so "activate" is not captured
    // by the {id} pattern
    .route("/activate", web::post().to(activate_handler))
    .service(
      web::scope("")
        .wrap(SessionMiddleware::new(auth_service))
        .route("", web::post().to(create_user_handler))
        .route("", web::get().to(list_users_handler))
        .route("/{id}", web::get().to(get_user_handler))
        .route("/{id}", web::put().to(update_user_handler))
        .route("/{id}", web::delete().to(delete_user_handler))
        .route("/{id}/status", web::put().to(change_status_handler))
        .route(
          "/{id}/activation",
          web::post().to(request_activation_handler),
        ),
    );
}

/// Configure maintenance routes
///
/// # Routes
///
/// - POST /cleanup - Remove expired sessions and activation tokens
///   (guarded)
pub fn configure_maintenance_routes(
  cfg: &mut web::ServiceConfig,
  cleanup_use_case: Arc<CleanupExpiredUseCase>,
  auth_service: Arc<AuthService>,
) {
  cfg.app_data(web::Data::new(cleanup_use_case)).service(
    web::scope("")
      .wrap(SessionMiddleware::new(auth_service))
      .route("/cleanup", web::post().to(cleanup_handler)),
  );
}
