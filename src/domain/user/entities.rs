use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::UserError;

/// Account status of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
  Active,
  Inactive,
  Suspended,
}

impl UserStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      UserStatus::Active => "active",
      UserStatus::Inactive => "inactive",
      UserStatus::Suspended => "suspended",
    }
  }

  pub fn parse(value: &str) -> Result<Self, UserError> {
    match value {
      "active" => Ok(UserStatus::Active),
      "inactive" => Ok(UserStatus::Inactive),
      "suspended" => Ok(UserStatus::Suspended),
      other => Err(UserError::InvalidStatus(other.to_string())),
    }
  }
}

impl fmt::Display for UserStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// User entity representing an account in the system
///
/// The `version` field is the optimistic concurrency token: it starts at 1
/// and the repository increments it by exactly 1 on every successful update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  /// Unique identifier for the user
  pub id: Uuid,
  /// User's email address (lowercased, unique)
  pub email: String,
  /// Hashed password using Argon2id
  pub password_hash: String,
  /// User's first name
  pub first_name: String,
  /// User's last name
  pub last_name: String,
  /// Account status
  pub status: UserStatus,
  /// Timestamp when the user was created
  pub created_at: DateTime<Utc>,
  /// Timestamp when the user was last updated
  pub updated_at: DateTime<Utc>,
  /// Optimistic locking version
  pub version: i64,
}

impl User {
  /// Creates a new user with the given details
  pub fn new(
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    status: UserStatus,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      email,
      password_hash,
      first_name,
      last_name,
      status,
      created_at: now,
      updated_at: now,
      version: 1,
    }
  }

  /// Creates a user from database fields (for reconstruction)
  #[allow(clippy::too_many_arguments)]
  pub fn from_db(
    id: Uuid,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    status: UserStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
  ) -> Self {
    Self {
      id,
      email,
      password_hash,
      first_name,
      last_name,
      status,
      created_at,
      updated_at,
      version,
    }
  }

  /// Updates the user's email
  pub fn change_email(&mut self, new_email: String) {
    self.email = new_email;
    self.updated_at = Utc::now();
  }

  /// Updates the user's first and last names
  pub fn change_name(&mut self, first_name: String, last_name: String) {
    self.first_name = first_name;
    self.last_name = last_name;
    self.updated_at = Utc::now();
  }

  /// Updates the user's password hash
  pub fn change_password_hash(&mut self, new_password_hash: String) {
    self.password_hash = new_password_hash;
    self.updated_at = Utc::now();
  }

  /// Transitions the account to a new status
  ///
  /// A transition to the current status is rejected so callers cannot
  /// publish spurious status-change events.
  pub fn change_status(&mut self, new_status: UserStatus) -> Result<UserStatus, UserError> {
    if self.status == new_status {
      return Err(UserError::StatusUnchanged(new_status));
    }

    let previous = self.status;
    self.status = new_status;
    self.updated_at = Utc::now();
    Ok(previous)
  }

  pub fn is_active(&self) -> bool {
    self.status == UserStatus::Active
  }
}

/// ActivationToken entity for one-shot account activation
///
/// Valid iff not expired and not used. Only one active token exists per
/// user; the repository deletes prior tokens when a new one is issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationToken {
  /// Unique identifier for the token record
  pub id: Uuid,
  /// Reference to the user this token activates
  pub user_id: Uuid,
  /// Random 256-bit token value (hex-encoded)
  pub token: String,
  /// Timestamp when the token expires
  pub expires_at: DateTime<Utc>,
  /// Timestamp when the token was consumed (None while unused)
  pub used_at: Option<DateTime<Utc>>,
  /// Timestamp when the token was issued
  pub created_at: DateTime<Utc>,
}

impl ActivationToken {
  /// Creates a new activation token valid for the given duration
  pub fn new(user_id: Uuid, token: String, ttl: Duration) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      user_id,
      token,
      expires_at: now + ttl,
      used_at: None,
      created_at: now,
    }
  }

  /// Creates an activation token from database fields (for reconstruction)
  pub fn from_db(
    id: Uuid,
    user_id: Uuid,
    token: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
  ) -> Self {
    Self {
      id,
      user_id,
      token,
      expires_at,
      used_at,
      created_at,
    }
  }

  pub fn is_expired(&self) -> bool {
    self.expires_at <= Utc::now()
  }

  pub fn is_used(&self) -> bool {
    self.used_at.is_some()
  }

  pub fn is_valid(&self) -> bool {
    !self.is_expired() && !self.is_used()
  }

  /// Marks the token as consumed
  pub fn mark_used(&mut self) {
    self.used_at = Some(Utc::now());
  }
}
