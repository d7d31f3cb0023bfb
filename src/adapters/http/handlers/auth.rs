use actix_web::{
  HttpMessage, HttpRequest, HttpResponse,
  cookie::{Cookie, SameSite, time::Duration as CookieDuration},
  web,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use validator::Validate;

use crate::adapters::http::{
  dtos::{
    AuthResponse, ChangePasswordRequest, CsrfTokenResponse, LoginRequest, RefreshResponse,
    RegisterRequest, SessionResponse, SuccessResponse, UserResponse,
  },
  errors::ApiError,
  middleware::{Authenticated, CsrfToken, SESSION_COOKIE},
};
use crate::application::auth::{
  ChangePasswordCommand, ChangePasswordUseCase, GetCurrentUserUseCase, LoginUserCommand,
  LoginUserUseCase, LogoutUserUseCase, RefreshSessionUseCase, RegisterUserCommand,
  RegisterUserUseCase, ValidateSessionUseCase,
};

/// Cookie policy shared by the handlers that set the session cookie
#[derive(Debug, Clone)]
pub struct CookieSettings {
  /// Whether cookies are marked Secure (true behind TLS)
  pub secure: bool,
}

/// Builds the session cookie set on register, login and refresh
fn session_cookie(token: String, expires_at: DateTime<Utc>, settings: &CookieSettings) -> Cookie<'static> {
  let max_age = (expires_at - Utc::now()).num_seconds().max(0);

  Cookie::build(SESSION_COOKIE, token)
    .path("/")
    .http_only(true)
    .same_site(SameSite::Strict)
    .secure(settings.secure)
    .max_age(CookieDuration::seconds(max_age))
    .finish()
}

/// Builds the removal cookie that clears the session cookie
fn session_removal_cookie() -> Cookie<'static> {
  let mut cookie = Cookie::new(SESSION_COOKIE, "");
  cookie.set_path("/");
  cookie.make_removal();
  cookie
}

/// Extract session token from cookie, bearer header or query string
fn extract_session_token(req: &HttpRequest) -> Result<String, ApiError> {
  if let Some(cookie) = req.cookie(SESSION_COOKIE) {
    return Ok(cookie.value().to_string());
  }

  if let Some(token) = req
    .headers()
    .get("Authorization")
    .and_then(|h| h.to_str().ok())
    .and_then(|s| s.strip_prefix("Bearer "))
  {
    return Ok(token.to_string());
  }

  serde_urlencoded::from_str::<Vec<(String, String)>>(req.query_string())
    .ok()
    .and_then(|pairs| {
      pairs
        .into_iter()
        .find(|(key, _)| key == SESSION_COOKIE)
        .map(|(_, value)| value)
    })
    .ok_or(ApiError::SessionInvalid)
}

/// Extract IP address from the request
fn extract_ip_address(req: &HttpRequest) -> Option<std::net::IpAddr> {
  req.peer_addr().map(|addr| addr.ip())
}

/// Extract user agent from the request
fn extract_user_agent(req: &HttpRequest) -> Option<String> {
  req
    .headers()
    .get("User-Agent")
    .and_then(|h| h.to_str().ok())
    .map(|s| s.to_string())
}

/// Handler for user registration
///
/// POST /api/auth/register
/// Body: RegisterRequest (JSON)
/// Response: AuthResponse (JSON) with status 201; the session cookie is
/// set alongside the token in the body
pub async fn register_handler(
  req: HttpRequest,
  request: web::Json<RegisterRequest>,
  use_case: web::Data<Arc<RegisterUserUseCase>>,
  cookies: web::Data<CookieSettings>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let command = RegisterUserCommand {
    email: request.email.clone(),
    password: request.password.clone(),
    first_name: request.first_name.clone(),
    last_name: request.last_name.clone(),
  };

  let response = use_case
    .execute(command, extract_ip_address(&req), extract_user_agent(&req))
    .await?;

  let cookie = session_cookie(response.session_token.clone(), response.expires_at, &cookies);
  let api_response = AuthResponse::from(response);

  Ok(HttpResponse::Created().cookie(cookie).json(api_response))
}

/// Handler for user login
///
/// POST /api/auth/login
/// Body: LoginRequest (JSON)
/// Response: AuthResponse (JSON) with status 200
pub async fn login_handler(
  req: HttpRequest,
  request: web::Json<LoginRequest>,
  use_case: web::Data<Arc<LoginUserUseCase>>,
  cookies: web::Data<CookieSettings>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let command = LoginUserCommand {
    email: request.email.clone(),
    password: request.password.clone(),
  };

  let response = use_case
    .execute(command, extract_ip_address(&req), extract_user_agent(&req))
    .await?;

  let cookie = session_cookie(response.session_token.clone(), response.expires_at, &cookies);
  let api_response = AuthResponse::from(response);

  Ok(HttpResponse::Ok().cookie(cookie).json(api_response))
}

/// Handler for user logout
///
/// POST /api/auth/logout
/// Deletes the session behind the presented token and clears the cookie
pub async fn logout_handler(
  req: HttpRequest,
  use_case: web::Data<Arc<LogoutUserUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let token = extract_session_token(&req)?;

  use_case.execute(token).await?;

  Ok(
    HttpResponse::Ok()
      .cookie(session_removal_cookie())
      .json(SuccessResponse {
        message: "Logged out successfully".to_string(),
      }),
  )
}

/// Handler for session validation
///
/// GET /api/auth/validate
/// Response: SessionResponse (JSON) describing the session owner
pub async fn validate_handler(
  req: HttpRequest,
  use_case: web::Data<Arc<ValidateSessionUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let token = extract_session_token(&req)?;

  let response = use_case.execute(token).await?;

  Ok(HttpResponse::Ok().json(SessionResponse::from(response)))
}

/// Handler for session refresh
///
/// POST /api/auth/refresh
/// Extends the session's expiry; the token itself does not change, so the
/// cookie is re-set with the new lifetime
pub async fn refresh_handler(
  req: HttpRequest,
  use_case: web::Data<Arc<RefreshSessionUseCase>>,
  cookies: web::Data<CookieSettings>,
) -> Result<HttpResponse, ApiError> {
  let token = extract_session_token(&req)?;

  let response = use_case.execute(token.clone()).await?;

  let cookie = session_cookie(token, response.expires_at, &cookies);

  Ok(HttpResponse::Ok().cookie(cookie).json(RefreshResponse {
    expires_at: response.expires_at,
  }))
}

/// Handler for fetching the authenticated user's profile
///
/// GET /api/auth/me (guarded by the session middleware)
pub async fn me_handler(req: HttpRequest) -> Result<HttpResponse, ApiError> {
  let context = req.auth_context();

  let response = GetCurrentUserUseCase.execute(&context.user);

  Ok(HttpResponse::Ok().json(UserResponse::from(response)))
}

/// Handler for changing the authenticated user's password
///
/// PUT /api/auth/password (guarded by the session middleware)
/// All sessions are invalidated on success, so the cookie is cleared and
/// the client must log in again
pub async fn change_password_handler(
  req: HttpRequest,
  request: web::Json<ChangePasswordRequest>,
  use_case: web::Data<Arc<ChangePasswordUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let context = req.auth_context();

  let command = ChangePasswordCommand {
    current_password: request.current_password.clone(),
    new_password: request.new_password.clone(),
  };

  let response = use_case.execute(context.user.id, command).await?;

  Ok(
    HttpResponse::Ok()
      .cookie(session_removal_cookie())
      .json(SuccessResponse {
        message: format!(
          "Password changed; {} session(s) invalidated, please log in again",
          response.sessions_invalidated
        ),
      }),
  )
}

/// Handler for fetching a CSRF token
///
/// GET /api/auth/csrf-token
/// Returns the token the CSRF middleware attached to this request; the
/// matching cookie rides along on the response
pub async fn csrf_token_handler(req: HttpRequest) -> Result<HttpResponse, ApiError> {
  let token = req
    .extensions()
    .get::<CsrfToken>()
    .map(|t| t.0.clone())
    .ok_or_else(|| ApiError::Internal("CSRF middleware is not mounted".to_string()))?;

  Ok(HttpResponse::Ok().json(CsrfTokenResponse { csrf_token: token }))
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  #[test]
  fn test_extract_token_prefers_cookie() {
    let req = TestRequest::default()
      .cookie(Cookie::new(SESSION_COOKIE, "from-cookie"))
      .insert_header(("Authorization", "Bearer from-header"))
      .to_http_request();

    assert_eq!(extract_session_token(&req).unwrap(), "from-cookie");
  }

  #[test]
  fn test_extract_token_falls_back_to_query() {
    let req = TestRequest::with_uri("/api/auth/validate?session_id=qtok").to_http_request();

    assert_eq!(extract_session_token(&req).unwrap(), "qtok");
  }

  #[test]
  fn test_missing_token_is_an_error() {
    let req = TestRequest::default().to_http_request();

    assert!(extract_session_token(&req).is_err());
  }

  #[test]
  fn test_session_cookie_attributes() {
    let settings = CookieSettings { secure: true };
    let cookie = session_cookie(
      "tok".to_string(),
      Utc::now() + chrono::Duration::hours(1),
      &settings,
    );

    assert_eq!(cookie.name(), SESSION_COOKIE);
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    assert_eq!(cookie.path(), Some("/"));
  }
}
