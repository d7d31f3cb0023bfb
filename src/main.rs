use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Duration as ChronoDuration;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod application;
mod domain;
mod infrastructure;

use adapters::http::{
  handlers::auth::CookieSettings,
  handlers::maintenance::health_handler,
  middleware::{CsrfMiddleware, RecoveryMiddleware, RequestIdMiddleware},
  routes::{configure_auth_routes, configure_maintenance_routes, configure_user_routes},
};
use application::auth::{
  ChangePasswordUseCase, LoginUserUseCase, LogoutUserUseCase, RefreshSessionUseCase,
  RegisterUserUseCase, ValidateSessionUseCase,
};
use application::user::{
  ActivateUserUseCase, ChangeUserStatusUseCase, CleanupExpiredUseCase, CreateUserUseCase,
  DeleteUserUseCase, GetUserUseCase, ListUsersUseCase, RequestActivationUseCase,
  UpdateUserUseCase,
};
use domain::auth::services::{AuthService, AuthServiceConfig};
use domain::user::services::{UserService, UserServiceConfig};
use infrastructure::{
  config::Config,
  events::BroadcastEventBus,
  persistence::postgres::{
    PostgresActivationTokenRepository, PostgresSessionRepository, PostgresUserRepository,
  },
  security::{Argon2PasswordHasher, SecureTokenGenerator},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Initialize tracing subscriber for logging
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "userbase=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting userbase");

  let config = Config::load().map_err(|e| {
    tracing::error!("Failed to load configuration: {}", e);
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
  })?;
  tracing::info!("Configuration loaded");

  // Set up database connection pool with timeout
  tracing::info!("Connecting to database");

  let db_pool = tokio::time::timeout(
    Duration::from_secs(config.database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(config.database.max_connections)
      .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
      .connect(&config.database.url),
  )
  .await
  .map_err(|_| {
    tracing::error!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      config.database.connect_timeout_seconds
    );
    std::io::Error::new(
      std::io::ErrorKind::TimedOut,
      format!(
        "Database connection timed out after {} seconds",
        config.database.connect_timeout_seconds
      ),
    )
  })?
  .map_err(|e| {
    tracing::error!("Failed to connect to database: {}", e);
    std::io::Error::other(format!("Database error: {}", e))
  })?;

  tracing::info!("Database connection pool created");

  tracing::info!("Running database migrations");
  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .map_err(|e| {
      tracing::error!("Failed to run database migrations: {}", e);
      std::io::Error::other(format!("Migration error: {}", e))
    })?;
  tracing::info!("Database migrations completed");

  // Repositories and infrastructure services
  let user_repo = Arc::new(PostgresUserRepository::new(db_pool.clone()));
  let session_repo = Arc::new(PostgresSessionRepository::new(db_pool.clone()));
  let activation_repo = Arc::new(PostgresActivationTokenRepository::new(db_pool.clone()));

  let password_hasher = Arc::new(Argon2PasswordHasher::new().map_err(|e| {
    tracing::error!("Failed to set up password hasher: {}", e);
    std::io::Error::other(e.to_string())
  })?);
  let token_generator = Arc::new(SecureTokenGenerator::new());

  let event_bus = Arc::new(BroadcastEventBus::default());

  // Log every domain event; subscribers come and go, the bus does not care
  let mut event_rx = event_bus.subscribe();
  tokio::spawn(async move {
    loop {
      match event_rx.recv().await {
        Ok(event) => {
          tracing::info!(
            event_type = event.event_type(),
            aggregate_id = %event.aggregate_id,
            "Domain event"
          );
        }
        Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
          tracing::warn!(missed, "Event log subscriber lagged behind");
        }
        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
      }
    }
  });

  // Domain services
  let auth_service = Arc::new(AuthService::new(
    user_repo.clone(),
    session_repo.clone(),
    password_hasher.clone(),
    event_bus.clone(),
    AuthServiceConfig {
      session_ttl: ChronoDuration::seconds(config.security.session_ttl_seconds as i64),
    },
  ));
  let user_service = Arc::new(UserService::new(
    user_repo.clone(),
    activation_repo.clone(),
    password_hasher.clone(),
    token_generator.clone(),
    event_bus.clone(),
    UserServiceConfig {
      activation_token_ttl: ChronoDuration::seconds(
        config.security.activation_token_ttl_seconds as i64,
      ),
    },
  ));

  // Use cases
  let register_use_case = Arc::new(RegisterUserUseCase::new(auth_service.clone()));
  let login_use_case = Arc::new(LoginUserUseCase::new(auth_service.clone()));
  let logout_use_case = Arc::new(LogoutUserUseCase::new(auth_service.clone()));
  let validate_use_case = Arc::new(ValidateSessionUseCase::new(auth_service.clone()));
  let refresh_use_case = Arc::new(RefreshSessionUseCase::new(auth_service.clone()));
  let change_password_use_case = Arc::new(ChangePasswordUseCase::new(auth_service.clone()));

  let create_user_use_case = Arc::new(CreateUserUseCase::new(user_service.clone()));
  let get_user_use_case = Arc::new(GetUserUseCase::new(user_service.clone()));
  let list_users_use_case = Arc::new(ListUsersUseCase::new(user_service.clone()));
  let update_user_use_case = Arc::new(UpdateUserUseCase::new(user_service.clone()));
  let delete_user_use_case = Arc::new(DeleteUserUseCase::new(user_service.clone()));
  let change_status_use_case = Arc::new(ChangeUserStatusUseCase::new(user_service.clone()));
  let request_activation_use_case = Arc::new(RequestActivationUseCase::new(user_service.clone()));
  let activate_use_case = Arc::new(ActivateUserUseCase::new(user_service.clone()));
  let cleanup_use_case = Arc::new(CleanupExpiredUseCase::new(
    session_repo.clone(),
    user_service.clone(),
  ));

  // Periodic expiry sweep for sessions and activation tokens
  let sweep_use_case = cleanup_use_case.clone();
  let sweep_interval = Duration::from_secs(config.security.cleanup_interval_seconds);
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(sweep_interval);
    // The first tick fires immediately; skip it so startup stays quiet
    ticker.tick().await;
    loop {
      ticker.tick().await;
      match sweep_use_case.execute().await {
        Ok(report) => {
          tracing::info!(
            sessions_removed = report.sessions_removed,
            tokens_removed = report.tokens_removed,
            "Periodic expiry sweep finished"
          );
        }
        Err(e) => {
          tracing::error!("Periodic expiry sweep failed: {}", e);
        }
      }
    }
  });

  let cookie_settings = CookieSettings {
    secure: config.security.cookie_secure,
  };
  let cookie_secure = config.security.cookie_secure;

  let server_host = config.server.host.clone();
  let server_port = config.server.port;

  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  HttpServer::new(move || {
    App::new()
      .wrap(RequestIdMiddleware::new())
      .wrap(Logger::default())
      .wrap(CsrfMiddleware::new(cookie_secure))
      // Registered last so it is the outermost layer and catches panics
      // from every inner middleware and handler
      .wrap(RecoveryMiddleware::new())
      .app_data(web::Data::new(cookie_settings.clone()))
      .route("/health", web::get().to(health_handler))
      .service(web::scope("/api/auth").configure(|cfg| {
        configure_auth_routes(
          cfg,
          register_use_case.clone(),
          login_use_case.clone(),
          logout_use_case.clone(),
          validate_use_case.clone(),
          refresh_use_case.clone(),
          change_password_use_case.clone(),
          auth_service.clone(),
        )
      }))
      .service(web::scope("/api/users").configure(|cfg| {
        configure_user_routes(
          cfg,
          create_user_use_case.clone(),
          get_user_use_case.clone(),
          list_users_use_case.clone(),
          update_user_use_case.clone(),
          delete_user_use_case.clone(),
          change_status_use_case.clone(),
          request_activation_use_case.clone(),
          activate_use_case.clone(),
          auth_service.clone(),
        )
      }))
      .service(web::scope("/api/maintenance").configure(|cfg| {
        configure_maintenance_routes(cfg, cleanup_use_case.clone(), auth_service.clone())
      }))
  })
  .bind((server_host.as_str(), server_port))?
  .run()
  .await
}
