use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::auth::{
  entities::Session,
  errors::{AuthError, RepositoryError},
  ports::SessionRepository,
};

/// PostgreSQL implementation of the SessionRepository trait
pub struct PostgresSessionRepository {
  pool: PgPool,
}

impl PostgresSessionRepository {
  /// Creates a new instance of PostgresSessionRepository
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

/// Database row structure for the sessions table
///
/// The INET column travels as text; `HOST(ip_address)` strips the netmask
/// on the way out.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
  id: Uuid,
  user_id: Uuid,
  token_hash: String,
  ip_address: Option<String>,
  user_agent: Option<String>,
  expires_at: DateTime<Utc>,
  created_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
  type Error = AuthError;

  fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
    let ip_address = row
      .ip_address
      .map(|ip| ip.parse())
      .transpose()
      .map_err(RepositoryError::InvalidIpAddress)?;

    Ok(Session::from_db(
      row.id,
      row.user_id,
      row.token_hash,
      ip_address,
      row.user_agent,
      row.expires_at,
      row.created_at,
    ))
  }
}

const SESSION_COLUMNS: &str =
  "id, user_id, token_hash, HOST(ip_address) as ip_address, user_agent, expires_at, created_at";

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
  async fn create(&self, session: Session) -> Result<Session, AuthError> {
    let ip_address = session.ip_address.map(|ip| ip.to_string());

    let row = sqlx::query_as::<_, SessionRow>(&format!(
      r#"
            INSERT INTO sessions (
                id, user_id, token_hash, ip_address, user_agent, expires_at, created_at
            )
            VALUES ($1, $2, $3, $4::inet, $5, $6, $7)
            RETURNING {SESSION_COLUMNS}
            "#,
    ))
    .bind(session.id)
    .bind(session.user_id)
    .bind(&session.token_hash)
    .bind(ip_address.as_deref())
    .bind(&session.user_agent)
    .bind(session.expires_at)
    .bind(session.created_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AuthError> {
    let result = sqlx::query_as::<_, SessionRow>(&format!(
      "SELECT {SESSION_COLUMNS} FROM sessions WHERE token_hash = $1"
    ))
    .bind(token_hash)
    .fetch_optional(&self.pool)
    .await?;

    result.map(Session::try_from).transpose()
  }

  async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Session>, AuthError> {
    let rows = sqlx::query_as::<_, SessionRow>(&format!(
      "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = $1 ORDER BY created_at"
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(Session::try_from).collect()
  }

  async fn refresh(&self, session_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), AuthError> {
    let result = sqlx::query("UPDATE sessions SET expires_at = $2 WHERE id = $1")
      .bind(session_id)
      .bind(expires_at)
      .execute(&self.pool)
      .await?;

    if result.rows_affected() == 0 {
      Err(AuthError::Repository(RepositoryError::NotFound))
    } else {
      Ok(())
    }
  }

  async fn delete(&self, session_id: Uuid) -> Result<(), AuthError> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
      .bind(session_id)
      .execute(&self.pool)
      .await?;

    Ok(())
  }

  async fn delete_all_for_user(&self, user_id: Uuid) -> Result<(), AuthError> {
    sqlx::query("DELETE FROM sessions WHERE user_id = $1")
      .bind(user_id)
      .execute(&self.pool)
      .await?;

    Ok(())
  }

  async fn delete_expired(&self) -> Result<u64, AuthError> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
      .execute(&self.pool)
      .await?;

    Ok(result.rows_affected())
  }
}
