use actix_web::{HttpResponse, web};
use serde_json::json;
use std::sync::Arc;

use crate::adapters::http::{dtos::CleanupResponse, errors::ApiError};
use crate::application::user::CleanupExpiredUseCase;

/// Handler for the health check
///
/// GET /health
pub async fn health_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Handler for the expiry sweep
///
/// POST /api/maintenance/cleanup (guarded by the session middleware)
/// Removes expired sessions and activation tokens; the same sweep also
/// runs periodically in the background
pub async fn cleanup_handler(
  use_case: web::Data<Arc<CleanupExpiredUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = use_case.execute().await?;

  tracing::info!(
    sessions_removed = response.sessions_removed,
    tokens_removed = response.tokens_removed,
    "Expiry sweep finished"
  );

  Ok(HttpResponse::Ok().json(CleanupResponse {
    sessions_removed: response.sessions_removed,
    tokens_removed: response.tokens_removed,
  }))
}
