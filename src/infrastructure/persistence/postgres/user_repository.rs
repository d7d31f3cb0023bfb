use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::auth::value_objects::Email;
use crate::domain::user::{
  entities::{User, UserStatus},
  errors::UserError,
  ports::UserRepository,
};

/// PostgreSQL implementation of the UserRepository trait
pub struct PostgresUserRepository {
  pool: PgPool,
}

impl PostgresUserRepository {
  /// Creates a new instance of PostgresUserRepository
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

/// Database row structure for the users table
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

const USER_COLUMNS: &str =
  "id, email, password_hash, first_name, last_name, status, created_at, updated_at, version";

#[async_trait]
impl UserRepository for PostgresUserRepository {
  async fn create(&self, user: User) -> Result<User, UserError> {
    let result = sqlx::query_as::<_, UserRow>(
      r#"
            INSERT INTO users (
                id, email, password_hash, first_name, last_name,
                status, created_at, updated_at, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING
                id, email, password_hash, first_name, last_name,
                status, created_at, updated_at, version
            "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.status.as_str())
    .bind(user.created_at)
    .bind(user.updated_at)
    .bind(user.version)
    .fetch_one(&self.pool)
    .await;

    match result {
      Ok(row) => row.try_into(),
      Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
        Err(UserError::AlreadyExists)
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
    let result = sqlx::query_as::<_, UserRow>(&format!(
      "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    result.map(User::try_from).transpose()
  }

  async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserError> {
    let result = sqlx::query_as::<_, UserRow>(&format!(
      "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email.as_str())
    .fetch_optional(&self.pool)
    .await?;

    result.map(User::try_from).transpose()
  }

  async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, UserError> {
    let rows = sqlx::query_as::<_, UserRow>(&format!(
      "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(User::try_from).collect()
  }

  async fn update(&self, user: User) -> Result<User, UserError> {
    // The version guard makes concurrent writers lose cleanly: the row is
    // only touched when it still carries the version the caller read.
    let result = sqlx::query_as::<_, UserRow>(
      r#"
            UPDATE users
            SET
                email = $3,
                password_hash = $4,
                first_name = $5,
                last_name = $6,
                status = $7,
                updated_at = $8,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING
                id, email, password_hash, first_name, last_name,
                status, created_at, updated_at, version
            "#,
    )
    .bind(user.id)
    .bind(user.version)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.status.as_str())
    .bind(user.updated_at)
    .fetch_optional(&self.pool)
    .await;

    match result {
      Ok(Some(row)) => row.try_into(),
      Ok(None) => {
        // Zero rows means either a stale version or a vanished user;
        // an existence probe tells them apart.
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
          .bind(user.id)
          .fetch_one(&self.pool)
          .await?;

        if exists {
          Err(UserError::OptimisticLock)
        } else {
          Err(UserError::NotFound)
        }
      }
      Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
        Err(UserError::AlreadyExists)
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn delete(&self, id: Uuid) -> Result<(), UserError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;

    if result.rows_affected() == 0 {
      Err(UserError::NotFound)
    } else {
      Ok(())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::infrastructure::persistence::postgres::test_support::setup_test_db;

  fn test_user(email: &str) -> User {
    User::new(
      email.to_string(),
      "$argon2id$fake".to_string(),
      "John".to_string(),
      "Doe".to_string(),
      UserStatus::Inactive,
    )
  }

  #[tokio::test]
  async fn test_create_and_find_user() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresUserRepository::new(pool);

    let created = repo.create(test_user("test@example.com")).await.unwrap();
    assert_eq!(created.version, 1);

    let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "test@example.com");
    assert_eq!(by_id.status, UserStatus::Inactive);

    let email = Email::new("test@example.com").unwrap();
    let by_email = repo.find_by_email(&email).await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);
  }

  #[tokio::test]
  async fn test_duplicate_email_is_rejected() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresUserRepository::new(pool);

    repo.create(test_user("dup@example.com")).await.unwrap();
    let result = repo.create(test_user("dup@example.com")).await;

    assert!(matches!(result, Err(UserError::AlreadyExists)));
  }

  #[tokio::test]
  async fn test_update_increments_version_by_one() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresUserRepository::new(pool);

    let created = repo.create(test_user("v@example.com")).await.unwrap();

    let mut user = created.clone();
    user.change_name("Johnny".to_string(), "Doe".to_string());
    let updated = repo.update(user).await.unwrap();

    assert_eq!(updated.version, created.version + 1);
    assert_eq!(updated.first_name, "Johnny");
  }

  #[tokio::test]
  async fn test_update_with_stale_version_loses() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresUserRepository::new(pool);

    let created = repo.create(test_user("stale@example.com")).await.unwrap();

    // Writer A wins
    let mut first = created.clone();
    first.change_name("Johnny".to_string(), "Doe".to_string());
    repo.update(first).await.unwrap();

    // Writer B read the same version and must lose
    let mut second = created.clone();
    second.change_name("Jon".to_string(), "Doe".to_string());
    let result = repo.update(second).await;

    assert!(matches!(result, Err(UserError::OptimisticLock)));

    // The losing write left no trace
    let current = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(current.first_name, "Johnny");
    assert_eq!(current.version, created.version + 1);
  }

  #[tokio::test]
  async fn test_update_missing_user_is_not_found() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresUserRepository::new(pool);

    let ghost = test_user("ghost@example.com");
    let result = repo.update(ghost).await;

    assert!(matches!(result, Err(UserError::NotFound)));
  }

  #[tokio::test]
  async fn test_list_is_ordered_and_paged() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresUserRepository::new(pool);

    for i in 0..3 {
      repo
        .create(test_user(&format!("user{}@example.com", i)))
        .await
        .unwrap();
    }

    let page = repo.list(2, 0).await.unwrap();
    assert_eq!(page.len(), 2);

    let rest = repo.list(2, 2).await.unwrap();
    assert_eq!(rest.len(), 1);
  }

  #[tokio::test]
  async fn test_delete_user() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresUserRepository::new(pool);

    let created = repo.create(test_user("del@example.com")).await.unwrap();
    repo.delete(created.id).await.unwrap();

    assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    assert!(matches!(
      repo.delete(created.id).await,
      Err(UserError::NotFound)
    ));
  }
}
