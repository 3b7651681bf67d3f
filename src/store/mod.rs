//! Base-store abstraction the cache layer decorates.
//!
//! The authoritative store (SQL-backed in production) lives behind these
//! traits, one sub-store per entity kind. The cache layer implements the
//! same traits, so callers cannot tell the decorated store from the base
//! store.
//!
//! `allow_from_cache` flags and the explicit `invalidate_*` operations are
//! part of the shared signatures: the base store ignores the flags and
//! treats the invalidations as no-ops, while the decorator gives them
//! meaning.

mod context;
mod error;
mod traits;

pub mod mock;

pub use context::RequestContext;
pub use error::{StoreError, StoreResult};
pub use traits::{
    AutoTranslationStore, ChannelStore, ContentFlaggingStore, EmojiStore, FileInfoStore,
    PostStore, ReactionStore, ReadReceiptStore, RoleStore, SchemeStore, Store, TeamStore,
    TemporaryPostStore, TermsOfServiceStore, UserStore, UserTermsOfServiceStore, WebhookStore,
};
