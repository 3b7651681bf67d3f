//! Bus trait and the in-process loopback implementation.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use super::ClusterMessage;

/// Callback invoked when a message for a registered event arrives.
pub type ClusterHandler = Arc<dyn Fn(&ClusterMessage) + Send + Sync>;

/// Process-wide publish/subscribe for best-effort cluster messages.
///
/// Handler registration happens only while the cache layer is being
/// constructed. `publish` is fire-and-forget: implementations absorb
/// transport failures and log them; the publisher's local cache has
/// already been invalidated by the time a message is published.
pub trait ClusterBus: Send + Sync {
    /// Register a handler for one event name.
    fn register_handler(&self, event: &'static str, handler: ClusterHandler);

    /// Publish a message to the other replicas.
    fn publish(&self, message: ClusterMessage);
}

/// In-process bus: the single-node default, and the harness every
/// invalidation test runs against.
///
/// `publish` only records the outgoing message; [`LoopbackBus::deliver`]
/// plays a message into the registered handlers as though it arrived from
/// a peer replica.
#[derive(Default)]
pub struct LoopbackBus {
    handlers: DashMap<&'static str, Vec<ClusterHandler>>,
    published: Mutex<Vec<ClusterMessage>>,
}

impl LoopbackBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke the handlers registered for `message.event`.
    pub fn deliver(&self, message: &ClusterMessage) {
        if let Some(handlers) = self.handlers.get(message.event.as_str()) {
            for handler in handlers.iter() {
                handler(message);
            }
        }
    }

    /// Messages published so far.
    pub fn published(&self) -> Vec<ClusterMessage> {
        self.published.lock().clone()
    }

    /// Drain and return the published messages.
    pub fn take_published(&self) -> Vec<ClusterMessage> {
        std::mem::take(&mut self.published.lock())
    }
}

impl ClusterBus for LoopbackBus {
    fn register_handler(&self, event: &'static str, handler: ClusterHandler) {
        self.handlers.entry(event).or_default().push(handler);
    }

    fn publish(&self, message: ClusterMessage) {
        debug!(event = %message.event, clear = message.is_clear(), "publishing invalidation");
        self.published.lock().push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_deliver_routes_by_event() {
        let bus = LoopbackBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counted = Arc::clone(&hits);
        bus.register_handler(
            "inv_roles",
            Arc::new(move |_msg| {
                counted.fetch_add(1, Ordering::SeqCst);
            }),
        );

        bus.deliver(&ClusterMessage::clear("inv_roles"));
        bus.deliver(&ClusterMessage::clear("inv_schemes"));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_publish_records_messages() {
        let bus = LoopbackBus::new();
        bus.publish(ClusterMessage::invalidate("inv_users", "u1").unwrap());
        bus.publish(ClusterMessage::clear("inv_users"));

        let published = bus.take_published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].key(), Some("u1"));
        assert!(published[1].is_clear());
        assert!(bus.published().is_empty());
    }
}
