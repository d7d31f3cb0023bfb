use actix_web::{
  Error,
  body::EitherBody,
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
  error::ResponseError,
};
use futures_util::FutureExt as _;
use futures_util::future::LocalBoxFuture;
use std::{
  future::{Ready, ready},
  panic::AssertUnwindSafe,
  rc::Rc,
};

use crate::adapters::http::errors::ApiError;

/// Panic recovery middleware
///
/// A panicking handler (or inner middleware) must not tear down the
/// connection without a response. This catches the unwind at the
/// outermost boundary and answers with the taxonomy's INTERNAL_ERROR
/// body; the panic message goes to tracing only.
#[derive(Debug, Clone, Default)]
pub struct RecoveryMiddleware;

impl RecoveryMiddleware {
  pub fn new() -> Self {
    Self
  }
}

impl<S, B> Transform<S, ServiceRequest> for RecoveryMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Transform = RecoveryMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(RecoveryMiddlewareService {
      service: Rc::new(service),
    }))
  }
}

pub struct RecoveryMiddlewareService<S> {
  service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RecoveryMiddlewareService<S>
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

    Box::pin(async move {
      // The HttpRequest half survives the panic so a response can still
      // be built against it
      let request = req.request().clone();

      match AssertUnwindSafe(service.call(req)).catch_unwind().await {
        Ok(Ok(res)) => Ok(res.map_into_left_body()),
        Ok(Err(e)) => Err(e),
        Err(panic) => {
          let message = panic_message(panic.as_ref());
          tracing::error!("Handler panicked: {}", message);

          let response = ApiError::Internal(format!("panic: {}", message))
            .error_response()
            .map_into_right_body();
          Ok(ServiceResponse::new(request, response))
        }
      }
    })
  }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
  if let Some(s) = panic.downcast_ref::<&str>() {
    s
  } else if let Some(s) = panic.downcast_ref::<String>() {
    s.as_str()
  } else {
    "unknown panic payload"
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::{
    App, HttpResponse,
    http::StatusCode,
    test::{self, TestRequest},
    web,
  };

  async fn healthy_handler() -> HttpResponse {
    HttpResponse::Ok().finish()
  }

  async fn panicking_handler() -> HttpResponse {
    panic!("boom");
  }

  #[actix_web::test]
  async fn test_panic_becomes_internal_error_response() {
    let app = test::init_service(
      App::new()
        .wrap(RecoveryMiddleware::new())
        .route("/panic", web::get().to(panicking_handler)),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/panic").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INTERNAL_ERROR");
    // The panic message stays out of the response
    assert_eq!(body["message"], "An internal server error occurred");
  }

  #[actix_web::test]
  async fn test_healthy_responses_pass_through() {
    let app = test::init_service(
      App::new()
        .wrap(RecoveryMiddleware::new())
        .route("/ok", web::get().to(healthy_handler)),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/ok").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[actix_web::test]
  async fn test_requests_after_a_panic_still_succeed() {
    let app = test::init_service(
      App::new()
        .wrap(RecoveryMiddleware::new())
        .route("/panic", web::get().to(panicking_handler))
        .route("/ok", web::get().to(healthy_handler)),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/panic").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = test::call_service(&app, TestRequest::get().uri("/ok").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
