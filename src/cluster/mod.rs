//! Cluster invalidation bus.
//!
//! Caches stay coherent across replicas through best-effort messages: one
//! event name per cache, a payload that is either a single UTF-8 cache key
//! ("invalidate this key") or empty ("clear the whole cache"). Loss is
//! tolerated; entry TTLs bound the staleness window.
//!
//! The transport is an external collaborator behind [`ClusterBus`].
//! [`LoopbackBus`] is the in-process implementation used for single-node
//! deployments and tests.

mod bus;
mod message;

pub mod events;

pub use bus::{ClusterBus, ClusterHandler, LoopbackBus};
pub use message::{ClusterMessage, SendType};
