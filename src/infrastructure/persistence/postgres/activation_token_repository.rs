use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::{
  entities::{ActivationToken, User, UserStatus},
  errors::UserError,
  ports::ActivationTokenRepository,
};

/// PostgreSQL implementation of the ActivationTokenRepository trait
pub struct PostgresActivationTokenRepository {
  pool: PgPool,
}

impl PostgresActivationTokenRepository {
  /// Creates a new instance of PostgresActivationTokenRepository
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

/// Database row structure for the activation_tokens table
#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
  id: Uuid,
  user_id: Uuid,
  token: String,
  expires_at: DateTime<Utc>,
  used_at: Option<DateTime<Utc>>,
  created_at: DateTime<Utc>,
}

impl From<TokenRow> for ActivationToken {
  fn from(row: TokenRow) -> Self {
    ActivationToken::from_db(
      row.id,
      row.user_id,
      row.token,
      row.expires_at,
      row.used_at,
      row.created_at,
    )
  }
}

/// Database row structure for the user joined during consumption
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
  id: Uuid,
  email: String,
  password_hash: String,
  first_name: String,
  last_name: String,
  status: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
  version: i64,
}

impl TryFrom<UserRow> for User {
  type Error = UserError;

  fn try_from(row: UserRow) -> Result<Self, Self::Error> {
    Ok(User::from_db(
      row.id,
      row.email,
      row.password_hash,
      row.first_name,
      row.last_name,
      UserStatus::parse(&row.status)?,
      row.created_at,
      row.updated_at,
      row.version,
    ))
  }
}

const TOKEN_COLUMNS: &str = "id, user_id, token, expires_at, used_at, created_at";

#[async_trait]
impl ActivationTokenRepository for PostgresActivationTokenRepository {
  async fn replace_for_user(&self, token: ActivationToken) -> Result<ActivationToken, UserError> {
    // Delete-then-insert in one transaction keeps the at-most-one-token
    // invariant under concurrent requests.
    let mut tx = self.pool.begin().await?;

    sqlx::query("DELETE FROM activation_tokens WHERE user_id = $1")
      .bind(token.user_id)
      .execute(&mut *tx)
      .await?;

    let row = sqlx::query_as::<_, TokenRow>(&format!(
      r#"
            INSERT INTO activation_tokens (id, user_id, token, expires_at, used_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TOKEN_COLUMNS}
            "#,
    ))
    .bind(token.id)
    .bind(token.user_id)
    .bind(&token.token)
    .bind(token.expires_at)
    .bind(token.used_at)
    .bind(token.created_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(row.into())
  }

  async fn find_by_token(&self, token: &str) -> Result<Option<ActivationToken>, UserError> {
    let result = sqlx::query_as::<_, TokenRow>(&format!(
      "SELECT {TOKEN_COLUMNS} FROM activation_tokens WHERE token = $1"
    ))
    .bind(token)
    .fetch_optional(&self.pool)
    .await?;

    Ok(result.map(ActivationToken::from))
  }

  async fn consume(&self, token: &str) -> Result<(ActivationToken, User), UserError> {
    let mut tx = self.pool.begin().await?;

    // FOR UPDATE serializes two racing redeemers on the same token
    let row = sqlx::query_as::<_, TokenRow>(&format!(
      "SELECT {TOKEN_COLUMNS} FROM activation_tokens WHERE token = $1 FOR UPDATE"
    ))
    .bind(token)
    .fetch_optional(&mut *tx)
    .await?;

    let stored: ActivationToken = row.ok_or(UserError::ActivationTokenInvalid)?.into();

    if stored.is_used() {
      return Err(UserError::ActivationTokenUsed);
    }

    if stored.is_expired() {
      return Err(UserError::ActivationTokenExpired);
    }

    let consumed = sqlx::query_as::<_, TokenRow>(&format!(
      r#"
            UPDATE activation_tokens
            SET used_at = NOW()
            WHERE id = $1
            RETURNING {TOKEN_COLUMNS}
            "#,
    ))
    .bind(stored.id)
    .fetch_one(&mut *tx)
    .await?;

    let user_row = sqlx::query_as::<_, UserRow>(
      r#"
            UPDATE users
            SET status = 'active', updated_at = NOW(), version = version + 1
            WHERE id = $1
            RETURNING
                id, email, password_hash, first_name, last_name,
                status, created_at, updated_at, version
            "#,
    )
    .bind(stored.user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(UserError::NotFound)?;

    let user = User::try_from(user_row)?;

    tx.commit().await?;

    Ok((consumed.into(), user))
  }

  async fn delete_expired(&self) -> Result<u64, UserError> {
    let result = sqlx::query("DELETE FROM activation_tokens WHERE expires_at <= NOW()")
      .execute(&self.pool)
      .await?;

    Ok(result.rows_affected())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  use crate::domain::user::ports::UserRepository;
  use crate::infrastructure::persistence::postgres::test_support::setup_test_db;
  use crate::infrastructure::persistence::postgres::user_repository::PostgresUserRepository;

  async fn seed_user(pool: &PgPool, email: &str) -> User {
    let repo = PostgresUserRepository::new(pool.clone());
    repo
      .create(User::new(
        email.to_string(),
        "$argon2id$fake".to_string(),
        "John".to_string(),
        "Doe".to_string(),
        UserStatus::Inactive,
      ))
      .await
      .unwrap()
  }

  fn test_token(user_id: Uuid, value: &str, ttl: Duration) -> ActivationToken {
    ActivationToken::new(user_id, value.to_string(), ttl)
  }

  #[tokio::test]
  async fn test_replace_keeps_one_token_per_user() {
    let (pool, _container) = setup_test_db().await;
    let user = seed_user(&pool, "t1@example.com").await;
    let repo = PostgresActivationTokenRepository::new(pool);

    let first = repo
      .replace_for_user(test_token(user.id, &"a".repeat(64), Duration::hours(24)))
      .await
      .unwrap();
    let second = repo
      .replace_for_user(test_token(user.id, &"b".repeat(64), Duration::hours(24)))
      .await
      .unwrap();

    assert!(repo.find_by_token(&first.token).await.unwrap().is_none());
    assert!(repo.find_by_token(&second.token).await.unwrap().is_some());
  }

  #[tokio::test]
  async fn test_consume_activates_user_and_marks_token() {
    let (pool, _container) = setup_test_db().await;
    let user = seed_user(&pool, "t2@example.com").await;
    let repo = PostgresActivationTokenRepository::new(pool.clone());

    let token = repo
      .replace_for_user(test_token(user.id, &"c".repeat(64), Duration::hours(24)))
      .await
      .unwrap();

    let (consumed, activated) = repo.consume(&token.token).await.unwrap();

    assert!(consumed.is_used());
    assert_eq!(activated.status, UserStatus::Active);
    assert_eq!(activated.version, user.version + 1);

    // The user row really changed
    let users = PostgresUserRepository::new(pool);
    let current = users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(current.status, UserStatus::Active);
  }

  #[tokio::test]
  async fn test_consume_is_one_shot() {
    let (pool, _container) = setup_test_db().await;
    let user = seed_user(&pool, "t3@example.com").await;
    let repo = PostgresActivationTokenRepository::new(pool);

    let token = repo
      .replace_for_user(test_token(user.id, &"d".repeat(64), Duration::hours(24)))
      .await
      .unwrap();

    repo.consume(&token.token).await.unwrap();
    let second = repo.consume(&token.token).await;

    assert!(matches!(second, Err(UserError::ActivationTokenUsed)));
  }

  #[tokio::test]
  async fn test_consume_unknown_token() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresActivationTokenRepository::new(pool);

    let result = repo.consume(&"f".repeat(64)).await;
    assert!(matches!(result, Err(UserError::ActivationTokenInvalid)));
  }

  #[tokio::test]
  async fn test_consume_expired_token() {
    let (pool, _container) = setup_test_db().await;
    let user = seed_user(&pool, "t4@example.com").await;
    let repo = PostgresActivationTokenRepository::new(pool.clone());

    let token = repo
      .replace_for_user(test_token(user.id, &"e".repeat(64), Duration::seconds(-10)))
      .await
      .unwrap();

    let result = repo.consume(&token.token).await;
    assert!(matches!(result, Err(UserError::ActivationTokenExpired)));

    // The user stayed inactive
    let users = PostgresUserRepository::new(pool);
    let current = users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(current.status, UserStatus::Inactive);
  }

  #[tokio::test]
  async fn test_delete_expired() {
    let (pool, _container) = setup_test_db().await;
    let user = seed_user(&pool, "t5@example.com").await;
    let other = seed_user(&pool, "t6@example.com").await;
    let repo = PostgresActivationTokenRepository::new(pool);

    repo
      .replace_for_user(test_token(user.id, &"1".repeat(64), Duration::seconds(-10)))
      .await
      .unwrap();
    let live = repo
      .replace_for_user(test_token(other.id, &"2".repeat(64), Duration::hours(24)))
      .await
      .unwrap();

    let removed = repo.delete_expired().await.unwrap();
    assert_eq!(removed, 1);
    assert!(repo.find_by_token(&live.token).await.unwrap().is_some());
  }
}
