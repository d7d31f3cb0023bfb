//! Authentication use cases
//!
//! Thin orchestration around the auth domain service: parse raw input
//! into value objects, call the service, project the result.

mod change_password;
mod get_current_user;
mod login_user;
mod logout_user;
mod refresh_session;
mod register_user;
mod validate_session;

pub use change_password::{ChangePasswordCommand, ChangePasswordResponse, ChangePasswordUseCase};
pub use get_current_user::{GetCurrentUserResponse, GetCurrentUserUseCase};
pub use login_user::{LoginUserCommand, LoginUserResponse, LoginUserUseCase};
pub use logout_user::LogoutUserUseCase;
pub use refresh_session::{RefreshSessionResponse, RefreshSessionUseCase};
pub use register_user::{RegisterUserCommand, RegisterUserResponse, RegisterUserUseCase};
pub use validate_session::{ValidateSessionResponse, ValidateSessionUseCase};
