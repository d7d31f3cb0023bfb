use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;

/// Session entity representing an active user session
///
/// Only the SHA-256 hash of the session token is stored; the raw token is
/// handed to the client once and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  /// Unique identifier for the session
  pub id: Uuid,
  /// Reference to the user who owns this session
  pub user_id: Uuid,
  /// SHA-256 hash of the session token
  pub token_hash: String,
  /// IP address from which the session was created
  pub ip_address: Option<IpAddr>,
  /// User agent string from the client
  pub user_agent: Option<String>,
  /// Timestamp when the session expires
  pub expires_at: DateTime<Utc>,
  /// Timestamp when the session was created
  pub created_at: DateTime<Utc>,
}

impl Session {
  /// Creates a new session for a user
  pub fn new(
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    ip_address: Option<IpAddr>,
    user_agent: Option<String>,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      user_id,
      token_hash,
      ip_address,
      user_agent,
      expires_at,
      created_at: Utc::now(),
    }
  }

  /// Creates a session with a duration instead of absolute expiration time
  pub fn with_duration(
    user_id: Uuid,
    token_hash: String,
    duration: Duration,
    ip_address: Option<IpAddr>,
    user_agent: Option<String>,
  ) -> Self {
    let expires_at = Utc::now() + duration;
    Self::new(user_id, token_hash, expires_at, ip_address, user_agent)
  }

  /// Creates a session from database fields (for reconstruction)
  pub fn from_db(
    id: Uuid,
    user_id: Uuid,
    token_hash: String,
    ip_address: Option<IpAddr>,
    user_agent: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
  ) -> Self {
    Self {
      id,
      user_id,
      token_hash,
      ip_address,
      user_agent,
      expires_at,
      created_at,
    }
  }

  /// Checks if the session has expired
  pub fn is_expired(&self) -> bool {
    self.expires_at <= Utc::now()
  }

  /// Checks if the session is still valid (not expired)
  pub fn is_valid(&self) -> bool {
    !self.is_expired()
  }

  /// Refreshes the session with a duration from now (same id, new expiry)
  pub fn refresh_with_duration(&mut self, duration: Duration) {
    self.expires_at = Utc::now() + duration;
  }
}
