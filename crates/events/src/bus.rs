//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Handlers publish a [`DomainEvent`] after a mutation commits. Subscribers
//! (the notification dispatcher, calendar sync) react asynchronously, so a
//! slow or failing collaborator never blocks or fails the request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tutorhub_core::types::DbId;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

pub const EVENT_CREATED: &str = "event.created";
pub const EVENT_RESCHEDULED: &str = "event.rescheduled";
pub const BOOKING_CREATED: &str = "booking.created";
pub const BOOKING_CANCELLED: &str = "booking.cancelled";
pub const ATTENDANCE_MARKED: &str = "attendance.marked";
pub const RESCHEDULE_HANDLED: &str = "reschedule.handled";
pub const WAITLIST_PLACED: &str = "waitlist.placed";
pub const PAYMENT_REMINDER: &str = "status.payment_reminder";

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// Something that happened on the platform.
///
/// Built with [`DomainEvent::new`] and the `with_*` methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name, e.g. `"booking.created"`.
    pub event_type: String,

    /// Kind of the entity the event concerns (`"event"`, `"cohort"`, ...).
    pub source_entity_type: Option<String>,

    pub source_entity_id: Option<DbId>,

    /// The principal whose request caused the event.
    pub actor_user_id: Option<DbId>,

    /// The user the event is about, when different from the actor
    /// (e.g. the student whose reschedule request was handled).
    pub subject_user_id: Option<DbId>,

    /// Event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            subject_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_subject(mut self, user_id: DbId) -> Self {
        self.subject_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// The user a notification should go to: the subject if set, else the actor.
    pub fn recipient(&self) -> Option<DbId> {
        self.subject_user_id.or(self.actor_user_id)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus, shared as `Arc<EventBus>`.
///
/// When the buffer is full the oldest unread events are dropped and slow
/// receivers observe `RecvError::Lagged`.
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: DomainEvent) {
        tracing::debug!(event_type = %event.event_type, "Publishing domain event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = DomainEvent::new(BOOKING_CREATED)
            .with_source("event", 42)
            .with_actor(7)
            .with_payload(serde_json::json!({"title": "Algebra"}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "booking.created");
        assert_eq!(received.source_entity_type.as_deref(), Some("event"));
        assert_eq!(received.source_entity_id, Some(42));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload["title"], "Algebra");
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DomainEvent::new(EVENT_RESCHEDULED));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.event_type, EVENT_RESCHEDULED);
        assert_eq!(e2.event_type, EVENT_RESCHEDULED);
    }

    #[test]
    fn test_publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(DomainEvent::new(WAITLIST_PLACED));
    }

    #[test]
    fn test_recipient_prefers_subject() {
        let event = DomainEvent::new(RESCHEDULE_HANDLED).with_actor(1).with_subject(9);
        assert_eq!(event.recipient(), Some(9));

        let self_service = DomainEvent::new(BOOKING_CREATED).with_actor(3);
        assert_eq!(self_service.recipient(), Some(3));

        assert_eq!(DomainEvent::new(EVENT_CREATED).recipient(), None);
    }
}
