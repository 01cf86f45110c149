use crate::models::appointment::AppointmentStatus;
use tokio::sync::broadcast;

/// Events emitted by the booking engine. Notification/email dispatch
/// subscribes here instead of being called from the engine directly.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    AppointmentBooked {
        appointment_id: String,
        user_id: String,
        start_datetime: String, // ISO 8601
        end_datetime: String,   // ISO 8601
        timestamp: String,      // ISO 8601
    },
    AppointmentRescheduled {
        appointment_id: String,
        user_id: String,
        old_start: String, // ISO 8601
        new_start: String, // ISO 8601
        timestamp: String, // ISO 8601
    },
    AppointmentStatusChanged {
        appointment_id: String,
        user_id: String,
        old_status: AppointmentStatus,
        new_status: AppointmentStatus,
        timestamp: String, // ISO 8601
    },
    RecurringSeriesBooked {
        user_id: String,
        instance_count: usize,
        first_start: String, // ISO 8601
        timestamp: String,   // ISO 8601
    },
}

/// Event bus for publishing and subscribing to system events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SystemEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all subscribers (non-blocking, fire-and-forget)
    pub fn publish(&self, event: SystemEvent) {
        // Fire-and-forget - if no subscribers or channel full, just log and continue
        if let Err(e) = self.tx.send(event) {
            tracing::warn!("Failed to publish event (no subscribers): {}", e);
        }
    }

    /// Subscribe to events (returns a receiver)
    pub fn subscribe(&self) -> broadcast::Receiver<SystemEvent> {
        self.tx.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_creation() {
        let bus = EventBus::new(100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_event_publish_subscribe() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        bus.publish(SystemEvent::AppointmentBooked {
            appointment_id: "appt-1".to_string(),
            user_id: "provider-1".to_string(),
            start_datetime: "2026-03-02T09:00:00Z".to_string(),
            end_datetime: "2026-03-02T10:00:00Z".to_string(),
            timestamp: "2026-03-01T12:00:00Z".to_string(),
        });

        let received = rx.recv().await.unwrap();
        match received {
            SystemEvent::AppointmentBooked { appointment_id, .. } => {
                assert_eq!(appointment_id, "appt-1");
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }
}
