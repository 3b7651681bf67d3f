//! Cluster message shape.

use serde::{Deserialize, Serialize};

/// Delivery semantics requested for a message.
///
/// This layer only ever publishes [`SendType::BestEffort`]; loss is
/// absorbed by cache TTLs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendType {
    BestEffort,
    Reliable,
}

/// A message on the invalidation bus.
///
/// `data` is either empty (clear the associated cache) or the UTF-8 bytes
/// of a single cache key. An empty payload and an empty key would be
/// indistinguishable on the wire, so [`ClusterMessage::invalidate`] rejects
/// empty keys outright.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMessage {
    /// Event name, one per cache.
    pub event: String,
    /// Requested delivery semantics.
    pub send_type: SendType,
    /// Key bytes, or empty for clear-cache.
    pub data: Vec<u8>,
}

impl ClusterMessage {
    /// A single-key invalidation. Returns `None` for an empty key, which
    /// must never reach the wire.
    pub fn invalidate(event: &str, key: &str) -> Option<Self> {
        if key.is_empty() {
            return None;
        }
        Some(Self {
            event: event.to_string(),
            send_type: SendType::BestEffort,
            data: key.as_bytes().to_vec(),
        })
    }

    /// A clear-cache message (empty payload).
    pub fn clear(event: &str) -> Self {
        Self {
            event: event.to_string(),
            send_type: SendType::BestEffort,
            data: Vec::new(),
        }
    }

    /// Whether this message clears the whole cache.
    pub fn is_clear(&self) -> bool {
        self.data.is_empty()
    }

    /// The key carried by an invalidation message, `None` for clear-cache
    /// or non-UTF-8 payloads.
    pub fn key(&self) -> Option<&str> {
        if self.data.is_empty() {
            return None;
        }
        std::str::from_utf8(&self.data).ok()
    }

    /// Encode for an external transport.
    pub fn to_wire(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a message received from an external transport.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
