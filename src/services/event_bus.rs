//! Engine event bus.
//!
//! Broadcast-based notification stream for UI/observability consumers.
//! Delivery is best effort: a slow or absent subscriber never blocks
//! the execution cycle, and lagging subscribers drop old events rather
//! than applying backpressure.

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::models::{Bot, Plan, RunLogEntry};

/// Events observable by external consumers.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A bot record mutation became visible (status, schedule, errors).
    StatusChanged(Bot),
    /// The transient plan of a running bot was created or updated.
    PlanChanged { bot_id: Uuid, plan: Plan },
    /// A run log entry was emitted.
    LogEntryAdded(RunLogEntry),
}

/// Configuration for the event bus.
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Broadcast channel capacity before lagging subscribers drop events.
    pub capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Fan-out channel for [`EngineEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(config: EventBusConfig) -> Self {
        let (tx, _) = broadcast::channel(config.capacity);
        Self { tx }
    }

    /// Publish an event. Never blocks; an empty subscriber set is fine.
    pub fn publish(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::LogLevel;

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_panic() {
        let bus = EventBus::default();
        let entry = RunLogEntry::new(Uuid::new_v4(), 1, LogLevel::Info, "hello");
        bus.publish(EngineEvent::LogEntryAdded(entry));
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let bot_id = Uuid::new_v4();
        for i in 0..3 {
            let entry = RunLogEntry::new(bot_id, i, LogLevel::Info, format!("msg {}", i));
            bus.publish(EngineEvent::LogEntryAdded(entry));
        }

        for i in 0..3 {
            match rx.recv().await.unwrap() {
                EngineEvent::LogEntryAdded(entry) => {
                    assert_eq!(entry.message, format!("msg {}", i));
                }
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }
}
