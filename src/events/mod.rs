//! Progress notifications fanned out to connected clients
//!
//! Publishing never blocks: each subscriber owns a bounded queue, a full
//! queue drops the event for that subscriber only, and a closed receiver
//! unregisters the subscriber on the next publish.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    UploadStarted,
    UploadComplete,
    AnalysisStarted,
    AnalysisProgress,
    AnalysisComplete,
    AnalysisFailed,
}

/// Wire shape: `{type, data?, message?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Event {
    pub fn new(kind: EventType) -> Self {
        Self {
            kind,
            data: None,
            message: None,
        }
    }

    pub fn with_data(kind: EventType, data: Value) -> Self {
        Self {
            kind,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(kind: EventType, message: impl Into<String>) -> Self {
        Self {
            kind,
            data: None,
            message: Some(message.into()),
        }
    }
}

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<Event>,
    missed: Arc<AtomicU64>,
}

/// Receiving side of a subscription
pub struct Subscription {
    pub id: u64,
    rx: mpsc::Receiver<Event>,
    missed: Arc<AtomicU64>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    /// Events dropped because this subscriber's queue was full
    pub fn missed(&self) -> u64 {
        self.missed.load(Ordering::Relaxed)
    }
}

/// Fan-out publisher with per-subscriber health tracking
pub struct EventBus {
    capacity: usize,
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let missed = Arc::new(AtomicU64::new(0));

        self.lock().push(Subscriber {
            id,
            tx,
            missed: missed.clone(),
        });
        debug!(subscriber = id, "Event subscriber registered");

        Subscription { id, rx, missed }
    }

    /// Deliver to every live subscriber; returns how many accepted the event
    pub fn publish(&self, event: Event) -> usize {
        let mut delivered = 0;
        let mut subscribers = self.lock();

        subscribers.retain(|sub| match sub.tx.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                sub.missed.fetch_add(1, Ordering::Relaxed);
                debug!(subscriber = sub.id, "Subscriber queue full; dropping event");
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!(subscriber = sub.id, "Subscriber disconnected");
                false
            }
        });

        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::config::default_event_queue_capacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_shape() {
        let event = Event::with_message(EventType::AnalysisProgress, "Topic clustering complete");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "analysis_progress", "message": "Topic clustering complete"})
        );

        let event = Event::with_data(EventType::AnalysisStarted, json!({"job_id": "j1"}));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "analysis_started", "data": {"job_id": "j1"}})
        );
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let bus = EventBus::new(4);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        assert_eq!(bus.publish(Event::new(EventType::UploadStarted)), 2);
        assert_eq!(a.recv().await.unwrap().kind, EventType::UploadStarted);
        assert_eq!(b.recv().await.unwrap().kind, EventType::UploadStarted);
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let bus = EventBus::new(1);
        let mut slow = bus.subscribe();

        assert_eq!(bus.publish(Event::new(EventType::UploadStarted)), 1);
        assert_eq!(bus.publish(Event::new(EventType::UploadComplete)), 0);
        assert_eq!(slow.missed(), 1);
        assert_eq!(bus.subscriber_count(), 1);

        assert_eq!(slow.try_recv().unwrap().kind, EventType::UploadStarted);
        assert!(slow.try_recv().is_none());
    }

    #[test]
    fn test_closed_subscriber_is_removed() {
        let bus = EventBus::new(2);
        let gone = bus.subscribe();
        let _kept = bus.subscribe();
        drop(gone);

        assert_eq!(bus.publish(Event::new(EventType::AnalysisComplete)), 1);
        assert_eq!(bus.subscriber_count(), 1);
    }
}
