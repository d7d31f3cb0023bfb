use chrono::Duration;
use std::net::IpAddr;
use std::sync::Arc;
use uuid::Uuid;

use super::entities::Session;
use super::errors::AuthError;
use super::ports::{PasswordHasher, SessionRepository};
use super::value_objects::{Email, Password, PersonName, SessionToken};
use crate::domain::user::entities::{User, UserStatus};
use crate::domain::user::events::{DomainEvent, EventPayload, UserCreated, UserUpdated};
use crate::domain::user::ports::{EventPublisher, UserRepository};

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
  /// How long a newly created or refreshed session lives
  pub session_ttl: Duration,
}

impl Default for AuthServiceConfig {
  fn default() -> Self {
    Self {
      session_ttl: Duration::hours(24),
    }
  }
}

/// Authentication service implementing core business logic
pub struct AuthService {
  user_repo: Arc<dyn UserRepository>,
  session_repo: Arc<dyn SessionRepository>,
  password_hasher: Arc<dyn PasswordHasher>,
  events: Arc<dyn EventPublisher>,
  config: AuthServiceConfig,
}

impl AuthService {
  /// Creates a new instance of AuthService
  pub fn new(
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    events: Arc<dyn EventPublisher>,
    config: AuthServiceConfig,
  ) -> Self {
    Self {
      user_repo,
      session_repo,
      password_hasher,
      events,
      config,
    }
  }

  /// Registers a new user account and opens the first session
  ///
  /// Self-registered accounts start active. The raw session token is
  /// returned once and only its hash is persisted.
  ///
  /// # Errors
  /// Returns `AuthError::EmailAlreadyExists` if the email is taken.
  pub async fn register(
    &self,
    email: Email,
    password: Password,
    first_name: PersonName,
    last_name: PersonName,
    ip_address: Option<IpAddr>,
    user_agent: Option<String>,
  ) -> Result<(User, Session, SessionToken), AuthError> {
    if self.user_repo.find_by_email(&email).await?.is_some() {
      return Err(AuthError::EmailAlreadyExists);
    }

    let password_hash = self.password_hasher.hash(&password).await?;

    let user = User::new(
      email.into_inner(),
      password_hash,
      first_name.into_inner(),
      last_name.into_inner(),
      UserStatus::Active,
    );

    // The unique index is the authority under concurrent registration;
    // a duplicate insert maps to EmailAlreadyExists via UserError.
    let created_user = self.user_repo.create(user).await?;

    self.events.publish(DomainEvent::new(
      created_user.id,
      created_user.version,
      EventPayload::UserCreated(UserCreated {
        email: created_user.email.clone(),
        first_name: created_user.first_name.clone(),
        last_name: created_user.last_name.clone(),
        status: created_user.status,
      }),
    ))?;

    let session_token = SessionToken::generate();
    let session = Session::with_duration(
      created_user.id,
      session_token.hash().into_inner(),
      self.config.session_ttl,
      ip_address,
      user_agent,
    );
    let created_session = self.session_repo.create(session).await?;

    Ok((created_user, created_session, session_token))
  }

  /// Authenticates a user and creates a new session
  ///
  /// The password is verified before the status check so timing does not
  /// reveal whether an account exists in a non-active state.
  ///
  /// # Errors
  /// Returns `AuthError::InvalidCredentials` for unknown emails or wrong
  /// passwords, `AuthError::AccountSuspended` for non-active accounts.
  pub async fn login(
    &self,
    email: Email,
    password: Password,
    ip_address: Option<IpAddr>,
    user_agent: Option<String>,
  ) -> Result<(User, Session, SessionToken), AuthError> {
    let user = self
      .user_repo
      .find_by_email(&email)
      .await?
      .ok_or(AuthError::InvalidCredentials)?;

    let is_valid = self
      .password_hasher
      .verify(&password, &user.password_hash)
      .await?;

    if !is_valid {
      return Err(AuthError::InvalidCredentials);
    }

    if !user.is_active() {
      return Err(AuthError::AccountSuspended);
    }

    let session_token = SessionToken::generate();
    let session = Session::with_duration(
      user.id,
      session_token.hash().into_inner(),
      self.config.session_ttl,
      ip_address,
      user_agent,
    );
    let created_session = self.session_repo.create(session).await?;

    Ok((user, created_session, session_token))
  }

  /// Logs out a user by deleting the session behind the token
  ///
  /// # Errors
  /// Returns `AuthError::InvalidSession` if the session does not exist.
  pub async fn logout(&self, token: SessionToken) -> Result<(), AuthError> {
    let token_hash = token.hash();

    let session = self
      .session_repo
      .find_by_token_hash(token_hash.as_str())
      .await?
      .ok_or(AuthError::InvalidSession)?;

    self.session_repo.delete(session.id).await?;

    Ok(())
  }

  /// Validates a session token and returns the owning user and session
  ///
  /// Expired sessions are deleted on sight and reported as
  /// `AuthError::SessionExpired`; sessions of non-active users fail with
  /// `AuthError::AccountSuspended` so a suspension takes effect immediately.
  pub async fn validate_session(&self, token: SessionToken) -> Result<(User, Session), AuthError> {
    let token_hash = token.hash();

    let session = self
      .session_repo
      .find_by_token_hash(token_hash.as_str())
      .await?
      .ok_or(AuthError::InvalidSession)?;

    if session.is_expired() {
      self.session_repo.delete(session.id).await?;
      return Err(AuthError::SessionExpired);
    }

    let user = self
      .user_repo
      .find_by_id(session.user_id)
      .await?
      .ok_or(AuthError::InvalidSession)?;

    if !user.is_active() {
      return Err(AuthError::AccountSuspended);
    }

    Ok((user, session))
  }

  /// Extends a valid session by the configured TTL (same id, new expiry)
  pub async fn refresh_session(&self, token: SessionToken) -> Result<Session, AuthError> {
    let (_, mut session) = self.validate_session(token).await?;

    session.refresh_with_duration(self.config.session_ttl);
    self
      .session_repo
      .refresh(session.id, session.expires_at)
      .await?;

    Ok(session)
  }

  /// Changes a user's password and invalidates all of their sessions,
  /// returning how many were invalidated
  ///
  /// # Errors
  /// Returns `AuthError::InvalidCredentials` if the current password does
  /// not verify, `AuthError::PasswordReused` if the new password equals the
  /// current one.
  pub async fn change_password(
    &self,
    user_id: Uuid,
    current_password: Password,
    new_password: Password,
  ) -> Result<usize, AuthError> {
    // Equality is checked before any storage access
    if current_password.as_str() == new_password.as_str() {
      return Err(AuthError::PasswordReused);
    }

    let mut user = self
      .user_repo
      .find_by_id(user_id)
      .await?
      .ok_or(AuthError::UserNotFound)?;

    let is_valid = self
      .password_hasher
      .verify(&current_password, &user.password_hash)
      .await?;

    if !is_valid {
      return Err(AuthError::InvalidCredentials);
    }

    let new_hash = self.password_hasher.hash(&new_password).await?;
    user.change_password_hash(new_hash);

    let updated = self.user_repo.update(user).await?;

    // Every existing session dies with the old password; the count is
    // reported back to the caller
    let invalidated = self.session_repo.find_by_user_id(user_id).await?.len();
    self.session_repo.delete_all_for_user(user_id).await?;

    self.events.publish(DomainEvent::new(
      updated.id,
      updated.version,
      EventPayload::UserUpdated(UserUpdated {
        email: updated.email.clone(),
        first_name: updated.first_name.clone(),
        last_name: updated.last_name.clone(),
      }),
    ))?;

    Ok(invalidated)
  }
}
