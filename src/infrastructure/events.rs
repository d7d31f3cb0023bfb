//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! The bus is the only `EventPublisher` implementation; it fans every
//! published `DomainEvent` out to all current subscribers. Shared across
//! the application via `Arc<BroadcastEventBus>`.

use tokio::sync::broadcast;

use crate::domain::user::events::{DomainEvent, EventError};
use crate::domain::user::ports::EventPublisher;

/// Default buffer capacity for the broadcast channel
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus
pub struct BroadcastEventBus {
  sender: broadcast::Sender<DomainEvent>,
}

impl BroadcastEventBus {
  /// Creates a bus with a specific channel capacity.
  ///
  /// When the buffer is full the oldest un-consumed messages are dropped
  /// and slow receivers observe a `RecvError::Lagged`.
  pub fn new(capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity);
    Self { sender }
  }

  /// Subscribes to all events published on this bus
  pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
    self.sender.subscribe()
  }
}

impl Default for BroadcastEventBus {
  fn default() -> Self {
    Self::new(DEFAULT_CAPACITY)
  }
}

impl EventPublisher for BroadcastEventBus {
  /// Publishes an event to all current subscribers.
  ///
  /// Zero receivers is not an error: the event simply has no audience
  /// right now, and the operation that produced it must still succeed.
  fn publish(&self, event: DomainEvent) -> Result<(), EventError> {
    let _ = self.sender.send(event);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  use crate::domain::user::events::{EventPayload, UserDeleted};

  fn test_event() -> DomainEvent {
    DomainEvent::new(
      Uuid::new_v4(),
      1,
      EventPayload::UserDeleted(UserDeleted {
        email: "a@b.com".to_string(),
      }),
    )
  }

  #[tokio::test]
  async fn test_publish_and_receive() {
    let bus = BroadcastEventBus::default();
    let mut rx = bus.subscribe();

    bus.publish(test_event()).unwrap();

    let received = rx.recv().await.expect("should receive the event");
    assert_eq!(received.event_type(), "user.deleted");
  }

  #[tokio::test]
  async fn test_multiple_subscribers_receive_same_event() {
    let bus = BroadcastEventBus::default();
    let mut rx1 = bus.subscribe();
    let mut rx2 = bus.subscribe();

    let event = test_event();
    bus.publish(event.clone()).unwrap();

    assert_eq!(rx1.recv().await.unwrap().id, event.id);
    assert_eq!(rx2.recv().await.unwrap().id, event.id);
  }

  #[test]
  fn test_publish_with_no_subscribers_succeeds() {
    let bus = BroadcastEventBus::default();
    assert!(bus.publish(test_event()).is_ok());
  }
}
