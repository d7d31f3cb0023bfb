use actix_web::{
  Error, HttpMessage,
  body::EitherBody,
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
  error::ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::{
  future::{Ready, ready},
  rc::Rc,
  sync::Arc,
};

use crate::{
  adapters::http::errors::ApiError,
  domain::auth::entities::Session,
  domain::auth::services::AuthService,
  domain::auth::value_objects::SessionToken,
  domain::user::entities::User,
};

/// Name of the session cookie set on login and cleared on logout
pub const SESSION_COOKIE: &str = "session_id";

/// The authenticated caller, attached to request extensions by
/// [`SessionMiddleware`]
#[derive(Debug, Clone)]
pub struct AuthContext {
  pub user: User,
  pub session: Session,
}

/// Session middleware guarding authenticated routes
///
/// Resolves the session token (cookie first, then bearer header, then the
/// `session_id` query parameter), validates it against the store and
/// attaches an [`AuthContext`] for downstream handlers. Requests without a
/// valid session are answered with the error taxonomy's 401/403 responses.
pub struct SessionMiddleware {
  auth_service: Arc<AuthService>,
}

impl SessionMiddleware {
  /// Creates a new session middleware
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Transform = SessionMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(SessionMiddlewareService {
      service: Rc::new(service),
      auth_service: self.auth_service.clone(),
    }))
  }
}

pub struct SessionMiddlewareService<S> {
  service: Rc<S>,
  auth_service: Arc<AuthService>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let service = Rc::clone(&self.service);
    let auth_service = self.auth_service.clone();

    Box::pin(async move {
      let token = match extract_session_token(&req) {
        Some(token) => token,
        None => {
          let (request, _) = req.into_parts();
          let response = ApiError::SessionInvalid.error_response().map_into_right_body();
          return Ok(ServiceResponse::new(request, response));
        }
      };

      let parsed = match SessionToken::from_string(token) {
        Ok(parsed) => parsed,
        Err(_) => {
          let (request, _) = req.into_parts();
          let response = ApiError::SessionInvalid.error_response().map_into_right_body();
          return Ok(ServiceResponse::new(request, response));
        }
      };

      match auth_service.validate_session(parsed).await {
        Ok((user, session)) => {
          req.extensions_mut().insert(AuthContext { user, session });
          let res = service.call(req).await?;
          Ok(res.map_into_left_body())
        }
        Err(e) => {
          let (request, _) = req.into_parts();
          let api_error: ApiError = e.into();
          let response = api_error.error_response().map_into_right_body();
          Ok(ServiceResponse::new(request, response))
        }
      }
    })
  }
}

/// Resolves the session token from cookie, bearer header or query string
pub fn extract_session_token(req: &ServiceRequest) -> Option<String> {
  if let Some(cookie) = req.cookie(SESSION_COOKIE) {
    return Some(cookie.value().to_string());
  }

  if let Some(token) = req
    .headers()
    .get("Authorization")
    .and_then(|h| h.to_str().ok())
    .and_then(|s| s.strip_prefix("Bearer "))
  {
    return Some(token.to_string());
  }

  serde_urlencoded::from_str::<Vec<(String, String)>>(req.query_string())
    .ok()?
    .into_iter()
    .find(|(key, _)| key == SESSION_COOKIE)
    .map(|(_, value)| value)
}

/// Extension trait to extract the authenticated caller from a request
pub trait Authenticated {
  /// Returns the auth context attached by [`SessionMiddleware`]
  ///
  /// # Panics
  /// Panics when called outside a route guarded by the middleware.
  fn auth_context(&self) -> AuthContext;
}

impl Authenticated for actix_web::HttpRequest {
  fn auth_context(&self) -> AuthContext {
    self
      .extensions()
      .get::<AuthContext>()
      .cloned()
      .expect("AuthContext missing. Is the route guarded by SessionMiddleware?")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  #[test]
  fn test_extract_token_from_cookie() {
    let req = TestRequest::default()
      .cookie(actix_web::cookie::Cookie::new(SESSION_COOKIE, "abc123"))
      .to_srv_request();

    assert_eq!(extract_session_token(&req), Some("abc123".to_string()));
  }

  #[test]
  fn test_extract_token_from_bearer_header() {
    let req = TestRequest::default()
      .insert_header(("Authorization", "Bearer tok"))
      .to_srv_request();

    assert_eq!(extract_session_token(&req), Some("tok".to_string()));
  }

  #[test]
  fn test_cookie_wins_over_header() {
    let req = TestRequest::default()
      .cookie(actix_web::cookie::Cookie::new(SESSION_COOKIE, "from-cookie"))
      .insert_header(("Authorization", "Bearer from-header"))
      .to_srv_request();

    assert_eq!(extract_session_token(&req), Some("from-cookie".to_string()));
  }

  #[test]
  fn test_extract_token_from_query() {
    let req = TestRequest::with_uri("/auth/validate?session_id=qtok").to_srv_request();

    assert_eq!(extract_session_token(&req), Some("qtok".to_string()));
  }

  #[test]
  fn test_no_token_anywhere() {
    let req = TestRequest::default().to_srv_request();

    assert_eq!(extract_session_token(&req), None);
  }

  // ==========================================================================
  // Full middleware round trips over an in-memory AuthService
  // ==========================================================================

  use crate::domain::auth::errors::HashError;
  use crate::domain::auth::ports::{PasswordHasher, SessionRepository};
  use crate::domain::auth::services::AuthServiceConfig;
  use crate::domain::auth::value_objects::Password;
  use crate::domain::user::entities::UserStatus;
  use crate::domain::user::errors::UserError;
  use crate::domain::user::events::{DomainEvent, EventError};
  use crate::domain::user::ports::{EventPublisher, UserRepository};
  use actix_web::{
    App, HttpRequest, HttpResponse,
    cookie::Cookie,
    http::StatusCode,
    test::{self},
    web,
  };
  use async_trait::async_trait;
  use chrono::{DateTime, Duration, Utc};
  use std::collections::HashMap;
  use std::sync::Mutex;
  use uuid::Uuid;

  struct SingleUserRepo {
    user: User,
  }

  #[async_trait]
  impl UserRepository for SingleUserRepo {
    async fn create(&self, user: User) -> Result<User, UserError> {
      Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
      Ok((self.user.id == id).then(|| self.user.clone()))
    }

    async fn find_by_email(
      &self,
      email: &crate::domain::auth::value_objects::Email,
    ) -> Result<Option<User>, UserError> {
      Ok((self.user.email == email.as_str()).then(|| self.user.clone()))
    }

    async fn list(&self, _limit: i64, _offset: i64) -> Result<Vec<User>, UserError> {
      Ok(vec![self.user.clone()])
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
      Ok(user)
    }

    async fn delete(&self, _id: Uuid) -> Result<(), UserError> {
      Ok(())
    }
  }

  #[derive(Default)]
  struct SharedSessionRepo {
    sessions: Mutex<HashMap<Uuid, Session>>,
  }

  #[async_trait]
  impl SessionRepository for SharedSessionRepo {
    async fn create(
      &self,
      session: Session,
    ) -> Result<Session, crate::domain::auth::errors::AuthError> {
      self
        .sessions
        .lock()
        .unwrap()
        .insert(session.id, session.clone());
      Ok(session)
    }

    async fn find_by_token_hash(
      &self,
      token_hash: &str,
    ) -> Result<Option<Session>, crate::domain::auth::errors::AuthError> {
      Ok(
        self
          .sessions
          .lock()
          .unwrap()
          .values()
          .find(|s| s.token_hash == token_hash)
          .cloned(),
      )
    }

    async fn find_by_user_id(
      &self,
      user_id: Uuid,
    ) -> Result<Vec<Session>, crate::domain::auth::errors::AuthError> {
      Ok(
        self
          .sessions
          .lock()
          .unwrap()
          .values()
          .filter(|s| s.user_id == user_id)
          .cloned()
          .collect(),
      )
    }

    async fn refresh(
      &self,
      session_id: Uuid,
      expires_at: DateTime<Utc>,
    ) -> Result<(), crate::domain::auth::errors::AuthError> {
      let mut sessions = self.sessions.lock().unwrap();
      let session = sessions
        .get_mut(&session_id)
        .ok_or(crate::domain::auth::errors::AuthError::SessionNotFound)?;
      session.expires_at = expires_at;
      Ok(())
    }

    async fn delete(
      &self,
      session_id: Uuid,
    ) -> Result<(), crate::domain::auth::errors::AuthError> {
      self.sessions.lock().unwrap().remove(&session_id);
      Ok(())
    }

    async fn delete_all_for_user(
      &self,
      user_id: Uuid,
    ) -> Result<(), crate::domain::auth::errors::AuthError> {
      self
        .sessions
        .lock()
        .unwrap()
        .retain(|_, s| s.user_id != user_id);
      Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, crate::domain::auth::errors::AuthError> {
      let mut sessions = self.sessions.lock().unwrap();
      let before = sessions.len();
      sessions.retain(|_, s| s.is_valid());
      Ok((before - sessions.len()) as u64)
    }
  }

  struct NoopHasher;

  #[async_trait]
  impl PasswordHasher for NoopHasher {
    async fn hash(&self, _password: &Password) -> Result<String, HashError> {
      Ok("hash".to_string())
    }

    async fn verify(&self, _password: &Password, _hash: &str) -> Result<bool, HashError> {
      Ok(true)
    }
  }

  struct NullPublisher;

  impl EventPublisher for NullPublisher {
    fn publish(&self, _event: DomainEvent) -> Result<(), EventError> {
      Ok(())
    }
  }

  async fn whoami(req: HttpRequest) -> HttpResponse {
    let context = req.auth_context();
    HttpResponse::Ok().json(serde_json::json!({ "user_id": context.user.id }))
  }

  struct Harness {
    auth_service: Arc<AuthService>,
    session_repo: Arc<SharedSessionRepo>,
    user: User,
    raw_token: String,
  }

  fn guarded_harness() -> Harness {
    let user = User::new(
      "test@example.com".to_string(),
      "hash".to_string(),
      "John".to_string(),
      "Doe".to_string(),
      UserStatus::Active,
    );
    let token = SessionToken::generate();
    let session = Session::with_duration(
      user.id,
      token.hash().as_str().to_string(),
      Duration::hours(1),
      None,
      None,
    );

    let session_repo = Arc::new(SharedSessionRepo::default());
    session_repo
      .sessions
      .lock()
      .unwrap()
      .insert(session.id, session);

    let auth_service = Arc::new(AuthService::new(
      Arc::new(SingleUserRepo { user: user.clone() }),
      session_repo.clone(),
      Arc::new(NoopHasher),
      Arc::new(NullPublisher),
      AuthServiceConfig::default(),
    ));

    Harness {
      auth_service,
      session_repo,
      user,
      raw_token: token.into_inner(),
    }
  }

  #[actix_web::test]
  async fn test_valid_cookie_reaches_the_guarded_handler() {
    let h = guarded_harness();
    let app = test::init_service(
      App::new()
        .wrap(SessionMiddleware::new(h.auth_service.clone()))
        .route("/me", web::get().to(whoami)),
    )
    .await;

    let req = TestRequest::get()
      .uri("/me")
      .cookie(Cookie::new(SESSION_COOKIE, h.raw_token.clone()))
      .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], h.user.id.to_string());
  }

  #[actix_web::test]
  async fn test_missing_token_gets_the_401_taxonomy_body() {
    let h = guarded_harness();
    let app = test::init_service(
      App::new()
        .wrap(SessionMiddleware::new(h.auth_service.clone()))
        .route("/me", web::get().to(whoami)),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/me").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "SESSION_INVALID");
  }

  #[actix_web::test]
  async fn test_token_is_rejected_after_its_session_is_gone() {
    let h = guarded_harness();
    let app = test::init_service(
      App::new()
        .wrap(SessionMiddleware::new(h.auth_service.clone()))
        .route("/me", web::get().to(whoami)),
    )
    .await;

    // First round trip succeeds
    let req = TestRequest::get()
      .uri("/me")
      .cookie(Cookie::new(SESSION_COOKIE, h.raw_token.clone()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Session deleted out from under the cookie (logout)
    h.session_repo.sessions.lock().unwrap().clear();

    let req = TestRequest::get()
      .uri("/me")
      .cookie(Cookie::new(SESSION_COOKIE, h.raw_token.clone()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "SESSION_INVALID");
  }

  #[actix_web::test]
  async fn test_expired_session_is_401_and_removed() {
    let h = guarded_harness();
    let app = test::init_service(
      App::new()
        .wrap(SessionMiddleware::new(h.auth_service.clone()))
        .route("/me", web::get().to(whoami)),
    )
    .await;

    {
      let mut sessions = h.session_repo.sessions.lock().unwrap();
      for session in sessions.values_mut() {
        session.expires_at = Utc::now() - Duration::seconds(1);
      }
    }

    let req = TestRequest::get()
      .uri("/me")
      .cookie(Cookie::new(SESSION_COOKIE, h.raw_token.clone()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "SESSION_EXPIRED");

    // The expired row was deleted on sight
    assert!(h.session_repo.sessions.lock().unwrap().is_empty());
  }
}
