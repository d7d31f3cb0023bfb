use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use super::entities::{ActivationToken, User, UserStatus};
use super::errors::UserError;
use super::events::{
  ActivationExpired, ActivationRequested, DomainEvent, EventPayload, UserActivated, UserCreated,
  UserDeactivated, UserDeleted, UserEmailChanged, UserStatusChanged, UserUpdated,
};
use super::ports::{ActivationTokenRepository, EventPublisher, UserRepository};
use crate::domain::auth::ports::{PasswordHasher, TokenGenerator};
use crate::domain::auth::value_objects::{Email, Password, PersonName};

/// Configuration for the user-management service
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
  /// How long an activation token stays redeemable
  pub activation_token_ttl: Duration,
}

impl Default for UserServiceConfig {
  fn default() -> Self {
    Self {
      activation_token_ttl: Duration::hours(24),
    }
  }
}

/// Fields of a user that can be changed through an update
///
/// `None` leaves the current value untouched.
#[derive(Debug, Default)]
pub struct UserChanges {
  pub email: Option<Email>,
  pub first_name: Option<PersonName>,
  pub last_name: Option<PersonName>,
}

/// User-management service implementing account lifecycle logic
pub struct UserService {
  user_repo: Arc<dyn UserRepository>,
  activation_repo: Arc<dyn ActivationTokenRepository>,
  password_hasher: Arc<dyn PasswordHasher>,
  token_generator: Arc<dyn TokenGenerator>,
  events: Arc<dyn EventPublisher>,
  config: UserServiceConfig,
}

impl UserService {
  /// Creates a new instance of UserService
  pub fn new(
    user_repo: Arc<dyn UserRepository>,
    activation_repo: Arc<dyn ActivationTokenRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_generator: Arc<dyn TokenGenerator>,
    events: Arc<dyn EventPublisher>,
    config: UserServiceConfig,
  ) -> Self {
    Self {
      user_repo,
      activation_repo,
      password_hasher,
      token_generator,
      events,
      config,
    }
  }

  /// Creates a user through the management interface
  ///
  /// Accounts created this way start inactive and go through the
  /// activation flow, unlike self-registration.
  ///
  /// # Errors
  /// Returns `UserError::AlreadyExists` if the email is taken.
  pub async fn create_user(
    &self,
    email: Email,
    password: Password,
    first_name: PersonName,
    last_name: PersonName,
    status: Option<UserStatus>,
  ) -> Result<User, UserError> {
    if self.user_repo.find_by_email(&email).await?.is_some() {
      return Err(UserError::AlreadyExists);
    }

    let password_hash = self.password_hasher.hash(&password).await?;

    let user = User::new(
      email.into_inner(),
      password_hash,
      first_name.into_inner(),
      last_name.into_inner(),
      status.unwrap_or(UserStatus::Inactive),
    );

    let created = self.user_repo.create(user).await?;

    self.events.publish(DomainEvent::new(
      created.id,
      created.version,
      EventPayload::UserCreated(UserCreated {
        email: created.email.clone(),
        first_name: created.first_name.clone(),
        last_name: created.last_name.clone(),
        status: created.status,
      }),
    ))?;

    Ok(created)
  }

  /// Fetches a single user by id
  pub async fn get_user(&self, id: Uuid) -> Result<User, UserError> {
    self.user_repo.find_by_id(id).await?.ok_or(UserError::NotFound)
  }

  /// Lists users ordered by creation time
  pub async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>, UserError> {
    self.user_repo.list(limit, offset).await
  }

  /// Applies profile changes under an optimistic version check
  ///
  /// `expected_version` is the version the caller last read; a concurrent
  /// write in between surfaces as `UserError::OptimisticLock` and nothing
  /// is written.
  pub async fn update_user(
    &self,
    id: Uuid,
    expected_version: i64,
    changes: UserChanges,
  ) -> Result<User, UserError> {
    let mut user = self.user_repo.find_by_id(id).await?.ok_or(UserError::NotFound)?;

    let previous_email = user.email.clone();
    let mut email_changed = false;

    if let Some(email) = changes.email {
      if email.as_str() != user.email {
        if self.user_repo.find_by_email(&email).await?.is_some() {
          return Err(UserError::AlreadyExists);
        }
        user.change_email(email.into_inner());
        email_changed = true;
      }
    }

    if changes.first_name.is_some() || changes.last_name.is_some() {
      let first_name = changes
        .first_name
        .map(PersonName::into_inner)
        .unwrap_or_else(|| user.first_name.clone());
      let last_name = changes
        .last_name
        .map(PersonName::into_inner)
        .unwrap_or_else(|| user.last_name.clone());
      user.change_name(first_name, last_name);
    }

    // The repository guards on the version the caller read, not the
    // version currently in the row.
    user.version = expected_version;
    let updated = self.user_repo.update(user).await?;

    let payload = if email_changed {
      EventPayload::UserEmailChanged(UserEmailChanged {
        previous_email,
        new_email: updated.email.clone(),
      })
    } else {
      EventPayload::UserUpdated(UserUpdated {
        email: updated.email.clone(),
        first_name: updated.first_name.clone(),
        last_name: updated.last_name.clone(),
      })
    };
    self
      .events
      .publish(DomainEvent::new(updated.id, updated.version, payload))?;

    Ok(updated)
  }

  /// Transitions a user to a new account status
  ///
  /// # Errors
  /// Returns `UserError::StatusUnchanged` for a transition to the current
  /// status, so no spurious events are published.
  pub async fn change_status(
    &self,
    id: Uuid,
    new_status: UserStatus,
    expected_version: i64,
  ) -> Result<User, UserError> {
    let mut user = self.user_repo.find_by_id(id).await?.ok_or(UserError::NotFound)?;

    let previous = user.change_status(new_status)?;

    user.version = expected_version;
    let updated = self.user_repo.update(user).await?;

    self.events.publish(DomainEvent::new(
      updated.id,
      updated.version,
      EventPayload::UserStatusChanged(UserStatusChanged {
        previous,
        new: new_status,
      }),
    ))?;

    match new_status {
      UserStatus::Active => {
        self.events.publish(DomainEvent::new(
          updated.id,
          updated.version,
          EventPayload::UserActivated(UserActivated {
            email: updated.email.clone(),
          }),
        ))?;
      }
      UserStatus::Inactive => {
        self.events.publish(DomainEvent::new(
          updated.id,
          updated.version,
          EventPayload::UserDeactivated(UserDeactivated {
            email: updated.email.clone(),
          }),
        ))?;
      }
      UserStatus::Suspended => {}
    }

    Ok(updated)
  }

  /// Permanently deletes a user; sessions and tokens cascade
  pub async fn delete_user(&self, id: Uuid) -> Result<(), UserError> {
    let user = self.user_repo.find_by_id(id).await?.ok_or(UserError::NotFound)?;

    self.user_repo.delete(id).await?;

    self.events.publish(DomainEvent::new(
      user.id,
      user.version,
      EventPayload::UserDeleted(UserDeleted { email: user.email }),
    ))?;

    Ok(())
  }

  /// Issues a fresh activation token for an inactive user
  ///
  /// Any prior token for the user is replaced, so at most one token is
  /// redeemable at a time. The raw token is returned for delivery.
  ///
  /// # Errors
  /// Returns `UserError::AlreadyActive` if the account needs no activation.
  pub async fn request_activation(&self, user_id: Uuid) -> Result<ActivationToken, UserError> {
    let user = self
      .user_repo
      .find_by_id(user_id)
      .await?
      .ok_or(UserError::NotFound)?;

    if user.is_active() {
      return Err(UserError::AlreadyActive);
    }

    let token = ActivationToken::new(
      user.id,
      self.token_generator.generate(),
      self.config.activation_token_ttl,
    );
    let stored = self.activation_repo.replace_for_user(token).await?;

    self.events.publish(DomainEvent::new(
      user.id,
      user.version,
      EventPayload::ActivationRequested(ActivationRequested {
        token_id: stored.id,
        expires_at: stored.expires_at,
      }),
    ))?;

    Ok(stored)
  }

  /// Redeems an activation token, activating its user
  ///
  /// Consumption and activation happen in one transaction inside the
  /// repository, so a token can never be spent without the user flipping
  /// to active.
  ///
  /// # Errors
  /// Returns `ActivationTokenInvalid` for unknown tokens,
  /// `ActivationTokenUsed` / `ActivationTokenExpired` for spent or stale
  /// ones.
  pub async fn activate_user(&self, token: &str) -> Result<User, UserError> {
    let existing = self
      .activation_repo
      .find_by_token(token)
      .await?
      .ok_or(UserError::ActivationTokenInvalid)?;

    if existing.is_used() {
      return Err(UserError::ActivationTokenUsed);
    }

    if existing.is_expired() {
      self.events.publish(DomainEvent::new(
        existing.user_id,
        1,
        EventPayload::ActivationExpired(ActivationExpired {
          token_id: existing.id,
          expired_at: existing.expires_at,
        }),
      ))?;
      return Err(UserError::ActivationTokenExpired);
    }

    let (_, user) = self.activation_repo.consume(token).await?;

    self.events.publish(DomainEvent::new(
      user.id,
      user.version,
      EventPayload::UserActivated(UserActivated {
        email: user.email.clone(),
      }),
    ))?;

    Ok(user)
  }

  /// Removes expired activation tokens, returning the number removed
  pub async fn cleanup_expired_tokens(&self) -> Result<u64, UserError> {
    self.activation_repo.delete_expired().await
  }
}
