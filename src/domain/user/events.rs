use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::entities::UserStatus;

/// Error raised when an event cannot be handed to the bus
#[derive(Debug, Error)]
pub enum EventError {
  #[error("Event bus is closed: {0}")]
  Closed(String),
}

// ============================================================================
// Event payloads (one concrete struct per event type)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UserCreated {
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub status: UserStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserUpdated {
  pub email: String,
  pub first_name: String,
  pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDeleted {
  pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStatusChanged {
  pub previous: UserStatus,
  pub new: UserStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserEmailChanged {
  pub previous_email: String,
  pub new_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserActivated {
  pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDeactivated {
  pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivationRequested {
  pub token_id: Uuid,
  pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivationExpired {
  pub token_id: Uuid,
  pub expired_at: DateTime<Utc>,
}

/// The payload of a domain event, tagged by event type
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
  UserCreated(UserCreated),
  UserUpdated(UserUpdated),
  UserDeleted(UserDeleted),
  UserStatusChanged(UserStatusChanged),
  UserEmailChanged(UserEmailChanged),
  UserActivated(UserActivated),
  UserDeactivated(UserDeactivated),
  ActivationRequested(ActivationRequested),
  ActivationExpired(ActivationExpired),
}

impl EventPayload {
  /// Dot-separated event name, e.g. `"user.created"`
  pub fn event_type(&self) -> &'static str {
    match self {
      EventPayload::UserCreated(_) => "user.created",
      EventPayload::UserUpdated(_) => "user.updated",
      EventPayload::UserDeleted(_) => "user.deleted",
      EventPayload::UserStatusChanged(_) => "user.status_changed",
      EventPayload::UserEmailChanged(_) => "user.email_changed",
      EventPayload::UserActivated(_) => "user.activated",
      EventPayload::UserDeactivated(_) => "user.deactivated",
      EventPayload::ActivationRequested(_) => "user.activation_requested",
      EventPayload::ActivationExpired(_) => "user.activation_expired",
    }
  }
}

// ============================================================================
// DomainEvent envelope
// ============================================================================

/// An immutable record of a state change on the user aggregate.
///
/// Published after the repository operation that produced it succeeded;
/// consumed by subscribers on the in-process event bus.
#[derive(Debug, Clone, Serialize)]
pub struct DomainEvent {
  /// Unique identifier for this event occurrence
  pub id: Uuid,
  /// Identifier of the aggregate the event belongs to
  pub aggregate_id: Uuid,
  /// When the event occurred (UTC)
  pub occurred_at: DateTime<Utc>,
  /// Aggregate version after the change
  pub version: i64,
  /// Typed event payload
  pub payload: EventPayload,
}

impl DomainEvent {
  pub fn new(aggregate_id: Uuid, version: i64, payload: EventPayload) -> Self {
    Self {
      id: Uuid::new_v4(),
      aggregate_id,
      occurred_at: Utc::now(),
      version,
      payload,
    }
  }

  /// Dot-separated event name, e.g. `"user.created"`
  pub fn event_type(&self) -> &'static str {
    self.payload.event_type()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_event_type_names() {
    let payload = EventPayload::UserCreated(UserCreated {
      email: "a@b.com".to_string(),
      first_name: "John".to_string(),
      last_name: "Doe".to_string(),
      status: UserStatus::Active,
    });
    assert_eq!(payload.event_type(), "user.created");

    let payload = EventPayload::UserStatusChanged(UserStatusChanged {
      previous: UserStatus::Active,
      new: UserStatus::Suspended,
    });
    assert_eq!(payload.event_type(), "user.status_changed");
  }

  #[test]
  fn test_envelope_carries_aggregate_and_version() {
    let aggregate_id = Uuid::new_v4();
    let event = DomainEvent::new(
      aggregate_id,
      3,
      EventPayload::UserDeleted(UserDeleted {
        email: "a@b.com".to_string(),
      }),
    );

    assert_eq!(event.aggregate_id, aggregate_id);
    assert_eq!(event.version, 3);
    assert_eq!(event.event_type(), "user.deleted");
  }

  #[test]
  fn test_payload_serialization_is_tagged() {
    let event = DomainEvent::new(
      Uuid::new_v4(),
      1,
      EventPayload::UserEmailChanged(UserEmailChanged {
        previous_email: "old@b.com".to_string(),
        new_email: "new@b.com".to_string(),
      }),
    );

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["payload"]["type"], "user_email_changed");
    assert_eq!(json["payload"]["data"]["new_email"], "new@b.com");
  }
}
