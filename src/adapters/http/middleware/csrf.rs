use actix_http::h1;
use actix_web::{
  Error, HttpMessage,
  body::EitherBody,
  cookie::{Cookie, SameSite},
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
  error::ResponseError,
  http::Method,
  web::BytesMut,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use futures_util::StreamExt as _;
use futures_util::future::LocalBoxFuture;
use rand::RngCore;
use std::{
  future::{Ready, ready},
  rc::Rc,
};
use subtle::ConstantTimeEq;

use crate::adapters::http::errors::ApiError;

/// Name of the cookie carrying the CSRF token (readable by scripts so
/// clients can echo it back)
pub const CSRF_COOKIE: &str = "csrf_token";

/// Header clients echo the cookie value into on unsafe requests
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Form field accepted as an alternative to the header
pub const CSRF_FORM_FIELD: &str = "_csrf_token";

const TOKEN_BYTES: usize = 32;

/// The CSRF token for the current request, attached to extensions on safe
/// requests so the token endpoint can return it
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

fn generate_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  rand::rngs::OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

fn decode_token(value: &str) -> Option<[u8; TOKEN_BYTES]> {
  let decoded = URL_SAFE_NO_PAD.decode(value).ok()?;
  decoded.try_into().ok()
}

fn is_safe_method(method: &Method) -> bool {
  matches!(
    *method,
    Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
  )
}

/// Double-submit CSRF middleware
///
/// Safe requests are issued a random token in the `csrf_token` cookie.
/// Unsafe requests must echo that value back in the `X-CSRF-Token` header
/// or the `_csrf_token` form field; the pair is compared in constant time.
/// The protection is stateless: nothing is stored server-side.
pub struct CsrfMiddleware {
  cookie_secure: bool,
}

impl CsrfMiddleware {
  /// Creates a new CSRF middleware; `cookie_secure` should be true behind
  /// TLS
  pub fn new(cookie_secure: bool) -> Self {
    Self { cookie_secure }
  }
}

impl<S, B> Transform<S, ServiceRequest> for CsrfMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Transform = CsrfMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(CsrfMiddlewareService {
      service: Rc::new(service),
      cookie_secure: self.cookie_secure,
    }))
  }
}

pub struct CsrfMiddlewareService<S> {
  service: Rc<S>,
  cookie_secure: bool,
}

impl<S, B> Service<ServiceRequest> for CsrfMiddlewareService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, mut req: ServiceRequest) -> Self::Future {
    let service = Rc::clone(&self.service);
    let cookie_secure = self.cookie_secure;

    Box::pin(async move {
      if is_safe_method(req.method()) {
        // Every safe request rotates the token; the new cookie replaces
        // any previous one on the response.
        let token = generate_token();

        req.extensions_mut().insert(CsrfToken(token.clone()));

        let mut res = service.call(req).await?;

        let cookie = Cookie::build(CSRF_COOKIE, token)
          .path("/")
          .same_site(SameSite::Strict)
          .http_only(false)
          .secure(cookie_secure)
          .finish();
        res.response_mut().add_cookie(&cookie)?;

        return Ok(res.map_into_left_body());
      }

      // Unsafe method: both halves of the pair must be present and equal
      let cookie_value = match req.cookie(CSRF_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => return Ok(reject(req, ApiError::CsrfTokenMissing)),
      };

      let submitted = match submitted_token(&mut req).await? {
        Some(value) => value,
        None => return Ok(reject(req, ApiError::CsrfTokenMissing)),
      };

      let (expected, provided) = match (decode_token(&cookie_value), decode_token(&submitted)) {
        (Some(expected), Some(provided)) => (expected, provided),
        _ => return Ok(reject(req, ApiError::CsrfTokenInvalid)),
      };

      if !bool::from(expected.ct_eq(&provided)) {
        return Ok(reject(req, ApiError::CsrfTokenInvalid));
      }

      let res = service.call(req).await?;
      Ok(res.map_into_left_body())
    })
  }
}

fn reject<B>(req: ServiceRequest, error: ApiError) -> ServiceResponse<EitherBody<B>> {
  let (request, _) = req.into_parts();
  ServiceResponse::new(request, error.error_response().map_into_right_body())
}

/// Pulls the submitted token from the header or, for form posts, from the
/// `_csrf_token` field. The body is buffered and handed back to the
/// request untouched so extractors downstream still see it.
async fn submitted_token(req: &mut ServiceRequest) -> Result<Option<String>, Error> {
  if let Some(value) = req
    .headers()
    .get(CSRF_HEADER)
    .and_then(|h| h.to_str().ok())
  {
    return Ok(Some(value.to_string()));
  }

  let is_form = req
    .headers()
    .get(actix_web::http::header::CONTENT_TYPE)
    .and_then(|h| h.to_str().ok())
    .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
    .unwrap_or(false);

  if !is_form {
    return Ok(None);
  }

  let mut body = BytesMut::new();
  let mut stream = req.take_payload();
  while let Some(chunk) = stream.next().await {
    body.extend_from_slice(&chunk?);
  }
  let bytes = body.freeze();

  let token = serde_urlencoded::from_bytes::<Vec<(String, String)>>(&bytes)
    .ok()
    .and_then(|pairs| {
      pairs
        .into_iter()
        .find(|(key, _)| key == CSRF_FORM_FIELD)
        .map(|(_, value)| value)
    });

  // Re-inject the buffered body for downstream extractors
  let (_, mut payload) = h1::Payload::create(true);
  payload.unread_data(bytes);
  req.set_payload(actix_web::dev::Payload::from(payload));

  Ok(token)
}
