//! The decorating local-cache layer.
//!
//! [`LocalCacheLayer`] wraps a base [`Store`] and implements the same
//! trait, one decorated sub-store per entity kind. Reads go through a
//! per-entity cache; writes invalidate locally and publish a best-effort
//! cluster message so peer replicas converge.
//!
//! Every decorated operation is one of four shapes:
//!
//! - **R** read-through: cache hit, or base read then cache fill.
//! - **W** write + invalidate-key: base write, then invalidate the
//!   affected keys locally and on the bus.
//! - **P** write + purge: as W, but the affected key set is unknown, so
//!   the whole cache is cleared (empty bus payload).
//! - **S** scan-invalidate: scan the cache for keys matching a predicate,
//!   invalidate each; degrade to P if the scan fails.
//!
//! A write also marks the key in the decorator's [`InvalidationSet`]
//! where one exists: the next miss-read for that key on this node is
//! redirected to the master replica so a lagging read replica cannot be
//! re-cached.

mod auto_translation;
mod channel;
mod content_flagging;
mod emoji;
mod file_info;
mod post;
mod reaction;
mod read_receipt;
mod role;
mod scheme;
mod team;
mod temporary_post;
mod terms_of_service;
mod user;
mod webhook;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{CacheError, CacheOptions, CacheProvider, TypedCache};
use crate::cluster::{ClusterBus, ClusterMessage, events};
use crate::metrics::MetricsSink;
use crate::model::{
    Channel, ContentFlag, Emoji, FileInfo, IncomingWebhook, PostList, ReadReceipt, Reaction,
    Role, RolePermissions, Scheme, TemporaryPost, TermsOfService, User, UserTermsOfService,
};
use crate::store::{
    AutoTranslationStore, ChannelStore, ContentFlaggingStore, EmojiStore, FileInfoStore,
    PostStore, ReactionStore, ReadReceiptStore, RoleStore, SchemeStore, Store, TeamStore,
    TemporaryPostStore, TermsOfServiceStore, UserStore, UserTermsOfServiceStore, WebhookStore,
};

// Cache sizes and TTLs, tuned for a multi-thousand-user workload.
const CHANNEL_CACHE_SIZE: u64 = 50_000;
const CHANNEL_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const CHANNEL_COUNTS_CACHE_SIZE: u64 = 50_000;
const CHANNEL_COUNTS_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const USER_PROFILE_CACHE_SIZE: u64 = 20_000;
const USER_PROFILE_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const PROFILES_IN_CHANNEL_CACHE_SIZE: u64 = 50_000;
const PROFILES_IN_CHANNEL_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const ALL_PROFILES_CACHE_SIZE: u64 = 1;
const ALL_PROFILES_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const ROLE_CACHE_SIZE: u64 = 20_000;
const ROLE_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const SCHEME_CACHE_SIZE: u64 = 20_000;
const SCHEME_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const EMOJI_CACHE_SIZE: u64 = 5_000;
const EMOJI_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const LAST_POST_TIME_CACHE_SIZE: u64 = 25_000;
const LAST_POST_TIME_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const LAST_POSTS_CACHE_SIZE: u64 = 20_000;
const LAST_POSTS_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const POSTS_USAGE_CACHE_SIZE: u64 = 1;
const POSTS_USAGE_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const FILE_INFO_CACHE_SIZE: u64 = 25_000;
const FILE_INFO_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const FILE_STORAGE_USAGE_CACHE_SIZE: u64 = 1;
const FILE_STORAGE_USAGE_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const REACTION_CACHE_SIZE: u64 = 20_000;
const REACTION_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const TEAM_CACHE_SIZE: u64 = 20_000;
const TEAM_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const TERMS_OF_SERVICE_CACHE_SIZE: u64 = 20_000;
const TERMS_OF_SERVICE_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const WEBHOOK_CACHE_SIZE: u64 = 25_000;
const WEBHOOK_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const TEMPORARY_POST_CACHE_SIZE: u64 = 25_000;
const TEMPORARY_POST_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const READ_RECEIPT_CACHE_SIZE: u64 = 25_000;
const READ_RECEIPT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const CONTENT_FLAG_CACHE_SIZE: u64 = 25_000;
const CONTENT_FLAG_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const USER_LOCALE_CACHE_SIZE: u64 = 20_000;
const USER_LOCALE_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Lock shards for the hot caches (roles, user profiles).
const STRIPED_BUCKETS: usize = 16;

/// Keys whose next miss-read must consult the master replica.
///
/// Marked on local writes (and received invalidations), drained by the
/// next read for the key. The mutex is never held across base-store I/O.
#[derive(Clone, Default)]
pub(crate) struct InvalidationSet {
    keys: Arc<Mutex<HashSet<String>>>,
}

impl InvalidationSet {
    /// Mark `key` for master redirect.
    pub(crate) fn mark(&self, key: &str) {
        self.keys.lock().insert(key.to_string());
    }

    /// Remove `key`, reporting whether it was marked.
    pub(crate) fn drain(&self, key: &str) -> bool {
        self.keys.lock().remove(key)
    }
}

/// Shared state for every decorated sub-store: the base store, the bus,
/// the metrics sink, and all caches.
pub(crate) struct LayerCore {
    pub(crate) base: Arc<dyn Store>,
    pub(crate) bus: Arc<dyn ClusterBus>,
    pub(crate) metrics: Arc<dyn MetricsSink>,
    provider: CacheProvider,

    pub(crate) channel_by_id: TypedCache<Channel>,
    pub(crate) member_counts: TypedCache<i64>,
    pub(crate) guest_counts: TypedCache<i64>,
    pub(crate) pinned_post_counts: TypedCache<i64>,
    pub(crate) user_by_id: TypedCache<User>,
    pub(crate) profiles_in_channel: TypedCache<HashMap<String, User>>,
    pub(crate) all_profiles: TypedCache<Vec<User>>,
    pub(crate) role_by_name: TypedCache<Role>,
    pub(crate) role_permissions: TypedCache<HashMap<String, RolePermissions>>,
    pub(crate) schemes: TypedCache<Scheme>,
    pub(crate) emoji_by_id: TypedCache<Emoji>,
    pub(crate) emoji_id_by_name: TypedCache<String>,
    pub(crate) last_post_times: TypedCache<i64>,
    pub(crate) last_posts: TypedCache<PostList>,
    pub(crate) posts_usage: TypedCache<i64>,
    pub(crate) file_infos: TypedCache<Vec<FileInfo>>,
    pub(crate) file_storage_usage: TypedCache<i64>,
    pub(crate) reactions: TypedCache<Vec<Reaction>>,
    pub(crate) team_ids_for_user: TypedCache<Vec<String>>,
    pub(crate) terms_of_service: TypedCache<TermsOfService>,
    pub(crate) user_terms_of_service: TypedCache<UserTermsOfService>,
    pub(crate) webhooks: TypedCache<IncomingWebhook>,
    pub(crate) temporary_posts: TypedCache<TemporaryPost>,
    pub(crate) read_receipts: TypedCache<ReadReceipt>,
    pub(crate) content_flags: TypedCache<ContentFlag>,
    pub(crate) user_locales: TypedCache<String>,

    pub(crate) channel_invalidations: InvalidationSet,
    pub(crate) user_invalidations: InvalidationSet,
    pub(crate) emoji_id_invalidations: InvalidationSet,
    pub(crate) emoji_name_invalidations: InvalidationSet,
}

impl LayerCore {
    /// Read `key`, counting a hit or a miss. Backend failures are logged
    /// and treated as a miss; a user operation never fails because of the
    /// cache.
    pub(crate) fn cache_get<T>(&self, cache: &TypedCache<T>, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        match cache.get(key) {
            Ok(value) => {
                self.metrics.cache_hit(cache.name());
                Some(value)
            }
            Err(CacheError::KeyNotFound) => {
                self.metrics.cache_miss(cache.name());
                None
            }
            Err(err) => {
                warn!(cache = cache.name(), %err, "cache read failed, treating as miss");
                self.metrics.cache_miss(cache.name());
                None
            }
        }
    }

    /// Store `value` under `key`, logging instead of propagating failures.
    pub(crate) fn cache_set<T>(&self, cache: &TypedCache<T>, key: &str, value: T)
    where
        T: Clone + Send + Sync + 'static,
    {
        if let Err(err) = cache.set(key, value) {
            warn!(cache = cache.name(), %err, "cache write failed, skipping");
        }
    }

    /// Shape W: remove `key` locally, then publish a best-effort
    /// invalidation for it.
    pub(crate) fn invalidate_key<T>(&self, cache: &TypedCache<T>, key: &str)
    where
        T: Clone + Send + Sync + 'static,
    {
        cache.remove(key);
        if let Some(event) = cache.cluster_event() {
            match ClusterMessage::invalidate(event, key) {
                Some(message) => self.bus.publish(message),
                // An empty key would read as clear-cache on the wire.
                None => warn!(cache = cache.name(), "refusing to publish empty cache key"),
            }
        }
        self.metrics.cache_invalidation(cache.name());
    }

    /// Shape P: purge the cache locally, then publish a clear-cache
    /// message.
    pub(crate) fn clear_cache<T>(&self, cache: &TypedCache<T>)
    where
        T: Clone + Send + Sync + 'static,
    {
        cache.purge();
        self.publish_clear(cache);
    }

    /// Publish a clear-cache message without touching local entries.
    /// Used when the local side was already trimmed more precisely than
    /// the wire protocol can express.
    pub(crate) fn publish_clear<T>(&self, cache: &TypedCache<T>)
    where
        T: Clone + Send + Sync + 'static,
    {
        if let Some(event) = cache.cluster_event() {
            self.bus.publish(ClusterMessage::clear(event));
        }
        self.metrics.cache_invalidation(cache.name());
    }
}

/// Subscribe `cache` to its cluster event: an empty payload purges, a
/// key payload removes that entry. Where the decorator keeps an
/// [`InvalidationSet`], received keys are marked so follow-up reads on
/// this node also prefer the master replica.
fn register_invalidation_handler<T>(
    bus: &dyn ClusterBus,
    cache: &TypedCache<T>,
    invalidations: Option<&InvalidationSet>,
) where
    T: Clone + Send + Sync + 'static,
{
    let Some(event) = cache.cluster_event() else {
        return;
    };
    let cache = cache.clone();
    let invalidations = invalidations.cloned();
    bus.register_handler(
        event,
        Arc::new(move |message| {
            if message.is_clear() {
                cache.purge();
                return;
            }
            if let Some(key) = message.key() {
                if let Some(set) = &invalidations {
                    set.mark(key);
                }
                cache.remove(key);
            }
        }),
    );
}

/// The decorating cache layer. Presents the base store's own [`Store`]
/// interface; callers cannot tell the difference.
pub struct LocalCacheLayer {
    core: Arc<LayerCore>,
    channel: channel::CachedChannelStore,
    user: user::CachedUserStore,
    role: role::CachedRoleStore,
    scheme: scheme::CachedSchemeStore,
    emoji: emoji::CachedEmojiStore,
    post: post::CachedPostStore,
    file_info: file_info::CachedFileInfoStore,
    reaction: reaction::CachedReactionStore,
    team: team::CachedTeamStore,
    terms_of_service: terms_of_service::CachedTermsOfServiceStore,
    user_terms_of_service: terms_of_service::CachedUserTermsOfServiceStore,
    webhook: webhook::CachedWebhookStore,
    temporary_post: temporary_post::CachedTemporaryPostStore,
    read_receipt: read_receipt::CachedReadReceiptStore,
    content_flagging: content_flagging::CachedContentFlaggingStore,
    auto_translation: auto_translation::CachedAutoTranslationStore,
}

impl LocalCacheLayer {
    /// Build the layer: create every cache and register its bus handler.
    pub fn new(
        base: Arc<dyn Store>,
        bus: Arc<dyn ClusterBus>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Result<Self, CacheError> {
        let provider = CacheProvider::new();

        let channel_by_id = provider.new_cache(
            &CacheOptions::new("channels", CHANNEL_CACHE_SIZE, CHANNEL_CACHE_TTL)
                .cluster_event(events::INVALIDATE_CHANNELS),
        )?;
        let member_counts = provider.new_cache(
            &CacheOptions::new(
                "channel_member_counts",
                CHANNEL_COUNTS_CACHE_SIZE,
                CHANNEL_COUNTS_CACHE_TTL,
            )
            .cluster_event(events::INVALIDATE_CHANNEL_MEMBER_COUNTS),
        )?;
        let guest_counts = provider.new_cache(
            &CacheOptions::new(
                "channel_guest_counts",
                CHANNEL_COUNTS_CACHE_SIZE,
                CHANNEL_COUNTS_CACHE_TTL,
            )
            .cluster_event(events::INVALIDATE_CHANNEL_GUEST_COUNTS),
        )?;
        let pinned_post_counts = provider.new_cache(
            &CacheOptions::new(
                "channel_pinned_post_counts",
                CHANNEL_COUNTS_CACHE_SIZE,
                CHANNEL_COUNTS_CACHE_TTL,
            )
            .cluster_event(events::INVALIDATE_CHANNEL_PINNED_POST_COUNTS),
        )?;
        let user_by_id = provider.new_cache(
            &CacheOptions::new(
                "user_profiles",
                USER_PROFILE_CACHE_SIZE,
                USER_PROFILE_CACHE_TTL,
            )
            .striped(STRIPED_BUCKETS)
            .cluster_event(events::INVALIDATE_USERS),
        )?;
        let profiles_in_channel = provider.new_cache(
            &CacheOptions::new(
                "profiles_in_channel",
                PROFILES_IN_CHANNEL_CACHE_SIZE,
                PROFILES_IN_CHANNEL_CACHE_TTL,
            )
            .cluster_event(events::INVALIDATE_PROFILES_IN_CHANNEL),
        )?;
        let all_profiles = provider.new_cache(
            &CacheOptions::new(
                "all_profiles",
                ALL_PROFILES_CACHE_SIZE,
                ALL_PROFILES_CACHE_TTL,
            )
            .cluster_event(events::INVALIDATE_ALL_PROFILES),
        )?;
        let role_by_name = provider.new_cache(
            &CacheOptions::new("roles", ROLE_CACHE_SIZE, ROLE_CACHE_TTL)
                .striped(STRIPED_BUCKETS)
                .cluster_event(events::INVALIDATE_ROLES),
        )?;
        let role_permissions = provider.new_cache(
            &CacheOptions::new("role_permissions", ROLE_CACHE_SIZE, ROLE_CACHE_TTL)
                .cluster_event(events::INVALIDATE_ROLE_PERMISSIONS),
        )?;
        let schemes = provider.new_cache(
            &CacheOptions::new("schemes", SCHEME_CACHE_SIZE, SCHEME_CACHE_TTL)
                .cluster_event(events::INVALIDATE_SCHEMES),
        )?;
        let emoji_by_id = provider.new_cache(
            &CacheOptions::new("emojis_by_id", EMOJI_CACHE_SIZE, EMOJI_CACHE_TTL)
                .cluster_event(events::INVALIDATE_EMOJIS_BY_ID),
        )?;
        let emoji_id_by_name = provider.new_cache(
            &CacheOptions::new("emojis_id_by_name", EMOJI_CACHE_SIZE, EMOJI_CACHE_TTL)
                .cluster_event(events::INVALIDATE_EMOJIS_ID_BY_NAME),
        )?;
        let last_post_times = provider.new_cache(
            &CacheOptions::new(
                "last_post_times",
                LAST_POST_TIME_CACHE_SIZE,
                LAST_POST_TIME_CACHE_TTL,
            )
            .cluster_event(events::INVALIDATE_LAST_POST_TIMES),
        )?;
        let last_posts = provider.new_cache(
            &CacheOptions::new("last_posts", LAST_POSTS_CACHE_SIZE, LAST_POSTS_CACHE_TTL)
                .cluster_event(events::INVALIDATE_LAST_POSTS),
        )?;
        let posts_usage = provider.new_cache(
            &CacheOptions::new("posts_usage", POSTS_USAGE_CACHE_SIZE, POSTS_USAGE_CACHE_TTL)
                .cluster_event(events::INVALIDATE_POSTS_USAGE),
        )?;
        let file_infos = provider.new_cache(
            &CacheOptions::new("file_infos", FILE_INFO_CACHE_SIZE, FILE_INFO_CACHE_TTL)
                .cluster_event(events::INVALIDATE_FILE_INFOS),
        )?;
        let file_storage_usage = provider.new_cache(
            &CacheOptions::new(
                "file_storage_usage",
                FILE_STORAGE_USAGE_CACHE_SIZE,
                FILE_STORAGE_USAGE_CACHE_TTL,
            )
            .cluster_event(events::INVALIDATE_FILE_STORAGE_USAGE),
        )?;
        let reactions = provider.new_cache(
            &CacheOptions::new("reactions", REACTION_CACHE_SIZE, REACTION_CACHE_TTL)
                .cluster_event(events::INVALIDATE_REACTIONS),
        )?;
        let team_ids_for_user = provider.new_cache(
            &CacheOptions::new("team_ids_for_user", TEAM_CACHE_SIZE, TEAM_CACHE_TTL)
                .cluster_event(events::INVALIDATE_TEAM_IDS_FOR_USER),
        )?;
        let terms_of_service = provider.new_cache(
            &CacheOptions::new(
                "terms_of_service",
                TERMS_OF_SERVICE_CACHE_SIZE,
                TERMS_OF_SERVICE_CACHE_TTL,
            )
            .cluster_event(events::INVALIDATE_TERMS_OF_SERVICE),
        )?;
        let user_terms_of_service = provider.new_cache(
            &CacheOptions::new(
                "user_terms_of_service",
                TERMS_OF_SERVICE_CACHE_SIZE,
                TERMS_OF_SERVICE_CACHE_TTL,
            )
            .cluster_event(events::INVALIDATE_USER_TERMS_OF_SERVICE),
        )?;
        let webhooks = provider.new_cache(
            &CacheOptions::new("webhooks", WEBHOOK_CACHE_SIZE, WEBHOOK_CACHE_TTL)
                .cluster_event(events::INVALIDATE_WEBHOOKS),
        )?;
        let temporary_posts = provider.new_cache(
            &CacheOptions::new(
                "temporary_posts",
                TEMPORARY_POST_CACHE_SIZE,
                TEMPORARY_POST_CACHE_TTL,
            )
            .cluster_event(events::INVALIDATE_TEMPORARY_POSTS),
        )?;
        let read_receipts = provider.new_cache(
            &CacheOptions::new(
                "read_receipts",
                READ_RECEIPT_CACHE_SIZE,
                READ_RECEIPT_CACHE_TTL,
            )
            .cluster_event(events::INVALIDATE_READ_RECEIPTS)
            .invalidation_closures(),
        )?;
        let content_flags = provider.new_cache(
            &CacheOptions::new(
                "content_flags",
                CONTENT_FLAG_CACHE_SIZE,
                CONTENT_FLAG_CACHE_TTL,
            )
            .cluster_event(events::INVALIDATE_CONTENT_FLAGS),
        )?;
        let user_locales = provider.new_cache(
            &CacheOptions::new("user_locales", USER_LOCALE_CACHE_SIZE, USER_LOCALE_CACHE_TTL)
                .cluster_event(events::INVALIDATE_USER_LOCALES),
        )?;

        let channel_invalidations = InvalidationSet::default();
        let user_invalidations = InvalidationSet::default();
        let emoji_id_invalidations = InvalidationSet::default();
        let emoji_name_invalidations = InvalidationSet::default();

        register_invalidation_handler(bus.as_ref(), &channel_by_id, Some(&channel_invalidations));
        register_invalidation_handler(bus.as_ref(), &member_counts, None);
        register_invalidation_handler(bus.as_ref(), &guest_counts, None);
        register_invalidation_handler(bus.as_ref(), &pinned_post_counts, None);
        register_invalidation_handler(bus.as_ref(), &user_by_id, Some(&user_invalidations));
        register_invalidation_handler(bus.as_ref(), &profiles_in_channel, None);
        register_invalidation_handler(bus.as_ref(), &all_profiles, None);
        register_invalidation_handler(bus.as_ref(), &role_by_name, None);
        register_invalidation_handler(bus.as_ref(), &role_permissions, None);
        register_invalidation_handler(bus.as_ref(), &schemes, None);
        register_invalidation_handler(bus.as_ref(), &emoji_by_id, Some(&emoji_id_invalidations));
        register_invalidation_handler(
            bus.as_ref(),
            &emoji_id_by_name,
            Some(&emoji_name_invalidations),
        );
        register_invalidation_handler(bus.as_ref(), &last_post_times, None);
        register_invalidation_handler(bus.as_ref(), &last_posts, None);
        register_invalidation_handler(bus.as_ref(), &posts_usage, None);
        register_invalidation_handler(bus.as_ref(), &file_infos, None);
        register_invalidation_handler(bus.as_ref(), &file_storage_usage, None);
        register_invalidation_handler(bus.as_ref(), &reactions, None);
        register_invalidation_handler(bus.as_ref(), &team_ids_for_user, None);
        register_invalidation_handler(bus.as_ref(), &terms_of_service, None);
        register_invalidation_handler(bus.as_ref(), &user_terms_of_service, None);
        register_invalidation_handler(bus.as_ref(), &webhooks, None);
        register_invalidation_handler(bus.as_ref(), &temporary_posts, None);
        register_invalidation_handler(bus.as_ref(), &read_receipts, None);
        register_invalidation_handler(bus.as_ref(), &content_flags, None);
        register_invalidation_handler(bus.as_ref(), &user_locales, None);

        let core = Arc::new(LayerCore {
            base,
            bus,
            metrics,
            provider,
            channel_by_id,
            member_counts,
            guest_counts,
            pinned_post_counts,
            user_by_id,
            profiles_in_channel,
            all_profiles,
            role_by_name,
            role_permissions,
            schemes,
            emoji_by_id,
            emoji_id_by_name,
            last_post_times,
            last_posts,
            posts_usage,
            file_infos,
            file_storage_usage,
            reactions,
            team_ids_for_user,
            terms_of_service,
            user_terms_of_service,
            webhooks,
            temporary_posts,
            read_receipts,
            content_flags,
            user_locales,
            channel_invalidations,
            user_invalidations,
            emoji_id_invalidations,
            emoji_name_invalidations,
        });

        debug!(caches = core.provider.cache_names().len(), "local cache layer ready");

        Ok(Self {
            channel: channel::CachedChannelStore::new(Arc::clone(&core)),
            user: user::CachedUserStore::new(Arc::clone(&core)),
            role: role::CachedRoleStore::new(Arc::clone(&core)),
            scheme: scheme::CachedSchemeStore::new(Arc::clone(&core)),
            emoji: emoji::CachedEmojiStore::new(Arc::clone(&core)),
            post: post::CachedPostStore::new(Arc::clone(&core)),
            file_info: file_info::CachedFileInfoStore::new(Arc::clone(&core)),
            reaction: reaction::CachedReactionStore::new(Arc::clone(&core)),
            team: team::CachedTeamStore::new(Arc::clone(&core)),
            terms_of_service: terms_of_service::CachedTermsOfServiceStore::new(Arc::clone(&core)),
            user_terms_of_service: terms_of_service::CachedUserTermsOfServiceStore::new(
                Arc::clone(&core),
            ),
            webhook: webhook::CachedWebhookStore::new(Arc::clone(&core)),
            temporary_post: temporary_post::CachedTemporaryPostStore::new(Arc::clone(&core)),
            read_receipt: read_receipt::CachedReadReceiptStore::new(Arc::clone(&core)),
            content_flagging: content_flagging::CachedContentFlaggingStore::new(Arc::clone(&core)),
            auto_translation: auto_translation::CachedAutoTranslationStore::new(Arc::clone(&core)),
            core,
        })
    }

    /// Build the layer for a single-node deployment: invalidations stay
    /// local (loopback bus) and counters are dropped.
    pub fn single_node(base: Arc<dyn Store>) -> Result<Self, CacheError> {
        Self::new(
            base,
            Arc::new(crate::cluster::LoopbackBus::new()),
            Arc::new(crate::metrics::NoopMetrics),
        )
    }

    /// Names of every cache owned by the layer.
    pub fn cache_names(&self) -> Vec<&'static str> {
        self.core.provider.cache_names()
    }

    /// Purge every cache. Used on teardown and when the backing tables
    /// are dropped wholesale.
    pub fn invalidate_all_caches(&self) {
        let core = &self.core;
        core.channel_by_id.purge();
        core.member_counts.purge();
        core.guest_counts.purge();
        core.pinned_post_counts.purge();
        core.user_by_id.purge();
        core.profiles_in_channel.purge();
        core.all_profiles.purge();
        core.role_by_name.purge();
        core.role_permissions.purge();
        core.schemes.purge();
        core.emoji_by_id.purge();
        core.emoji_id_by_name.purge();
        core.last_post_times.purge();
        core.last_posts.purge();
        core.posts_usage.purge();
        core.file_infos.purge();
        core.file_storage_usage.purge();
        core.reactions.purge();
        core.team_ids_for_user.purge();
        core.terms_of_service.purge();
        core.user_terms_of_service.purge();
        core.webhooks.purge();
        core.temporary_posts.purge();
        core.read_receipts.purge();
        core.content_flags.purge();
        core.user_locales.purge();
    }
}

impl Store for LocalCacheLayer {
    fn channel(&self) -> &dyn ChannelStore {
        &self.channel
    }
    fn user(&self) -> &dyn UserStore {
        &self.user
    }
    fn role(&self) -> &dyn RoleStore {
        &self.role
    }
    fn scheme(&self) -> &dyn SchemeStore {
        &self.scheme
    }
    fn emoji(&self) -> &dyn EmojiStore {
        &self.emoji
    }
    fn post(&self) -> &dyn PostStore {
        &self.post
    }
    fn file_info(&self) -> &dyn FileInfoStore {
        &self.file_info
    }
    fn reaction(&self) -> &dyn ReactionStore {
        &self.reaction
    }
    fn team(&self) -> &dyn TeamStore {
        &self.team
    }
    fn terms_of_service(&self) -> &dyn TermsOfServiceStore {
        &self.terms_of_service
    }
    fn user_terms_of_service(&self) -> &dyn UserTermsOfServiceStore {
        &self.user_terms_of_service
    }
    fn webhook(&self) -> &dyn WebhookStore {
        &self.webhook
    }
    fn temporary_post(&self) -> &dyn TemporaryPostStore {
        &self.temporary_post
    }
    fn read_receipt(&self) -> &dyn ReadReceiptStore {
        &self.read_receipt
    }
    fn content_flagging(&self) -> &dyn ContentFlaggingStore {
        &self.content_flagging
    }
    fn auto_translation(&self) -> &dyn AutoTranslationStore {
        &self.auto_translation
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::Arc;

    use crate::cluster::LoopbackBus;
    use crate::metrics::CounterMetrics;
    use crate::store::mock::MockStore;

    use super::LocalCacheLayer;

    /// Everything a decorator test needs: the layer plus handles to the
    /// mock base store, the loopback bus and the counter metrics behind
    /// it.
    pub(crate) struct Harness {
        pub(crate) base: Arc<MockStore>,
        pub(crate) bus: Arc<LoopbackBus>,
        pub(crate) metrics: Arc<CounterMetrics>,
        pub(crate) layer: LocalCacheLayer,
    }

    pub(crate) fn harness() -> Harness {
        let base = Arc::new(MockStore::new());
        let bus = Arc::new(LoopbackBus::new());
        let metrics = Arc::new(CounterMetrics::new());
        let layer = LocalCacheLayer::new(
            Arc::clone(&base) as Arc<dyn crate::store::Store>,
            Arc::clone(&bus) as Arc<dyn crate::cluster::ClusterBus>,
            Arc::clone(&metrics) as Arc<dyn crate::metrics::MetricsSink>,
        )
        .expect("layer construction");
        Harness {
            base,
            bus,
            metrics,
            layer,
        }
    }
}
