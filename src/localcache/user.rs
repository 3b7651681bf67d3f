//! Cached user store: profiles by id (striped), profiles per channel,
//! and the all-profiles page used by admin listings.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::CacheError;
use crate::model::{User, UserGetOptions};
use crate::store::{RequestContext, StoreResult, UserStore};

use super::LayerCore;

/// Single entry key for the all-profiles cache.
const ALL_PROFILES_KEY: &str = "ALL";

/// The one listing shape worth a cache slot: unfiltered, first page at
/// the standard admin page size.
fn is_cacheable_listing(options: &UserGetOptions) -> bool {
    options.is_unfiltered() && options.page == 0 && options.per_page == 100
}

pub(super) struct CachedUserStore {
    core: Arc<LayerCore>,
}

impl CachedUserStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }

    fn read_context(&self, ctx: RequestContext, id: &str) -> RequestContext {
        if self.core.user_invalidations.drain(id) {
            ctx.with_master()
        } else {
            ctx
        }
    }

    fn invalidate_profile(&self, user_id: &str) {
        self.core.user_invalidations.mark(user_id);
        self.core.invalidate_key(&self.core.user_by_id, user_id);
        // Any cached all-profiles page may contain the stale profile.
        self.core.clear_cache(&self.core.all_profiles);
    }
}

#[async_trait]
impl UserStore for CachedUserStore {
    async fn get(&self, ctx: RequestContext, id: &str) -> StoreResult<User> {
        if let Some(user) = self.core.cache_get(&self.core.user_by_id, id) {
            return Ok(user);
        }
        let ctx = self.read_context(ctx, id);
        let user = self.core.base.user().get(ctx, id).await?;
        self.core.cache_set(&self.core.user_by_id, id, user.clone());
        Ok(user)
    }

    async fn get_many(&self, ctx: RequestContext, ids: &[String]) -> StoreResult<Vec<User>> {
        // Duplicate ids collapse to one cache lookup and one base row.
        let mut unique = ids.to_vec();
        unique.sort();
        unique.dedup();

        let mut found = Vec::with_capacity(unique.len());
        let mut remaining = Vec::new();
        for (id, cached) in unique.iter().zip(self.core.user_by_id.multi_get(&unique)) {
            match cached {
                Ok(user) => {
                    self.core.metrics.cache_hit(self.core.user_by_id.name());
                    found.push(user);
                }
                Err(_) => {
                    self.core.metrics.cache_miss(self.core.user_by_id.name());
                    remaining.push(id.clone());
                }
            }
        }
        if !remaining.is_empty() {
            let fetched = self.core.base.user().get_many(ctx, &remaining).await?;
            for user in fetched {
                self.core.cache_set(&self.core.user_by_id, &user.id, user.clone());
                found.push(user);
            }
        }
        Ok(found)
    }

    async fn get_profile_by_ids(
        &self,
        ctx: RequestContext,
        ids: &[String],
        options: &UserGetOptions,
        allow_from_cache: bool,
    ) -> StoreResult<Vec<User>> {
        if !allow_from_cache {
            return self
                .core
                .base
                .user()
                .get_profile_by_ids(ctx, ids, options, false)
                .await;
        }

        let mut found = Vec::with_capacity(ids.len());
        let mut remaining = Vec::new();
        for (id, cached) in ids.iter().zip(self.core.user_by_id.multi_get(ids)) {
            match cached {
                Ok(user) => {
                    self.core.metrics.cache_hit(self.core.user_by_id.name());
                    // The since filter applies to hits without refetching.
                    if options.since == 0 || user.update_at > options.since {
                        found.push(user);
                    }
                }
                Err(_) => {
                    self.core.metrics.cache_miss(self.core.user_by_id.name());
                    remaining.push(id.clone());
                }
            }
        }
        if !remaining.is_empty() {
            let fetched = self
                .core
                .base
                .user()
                .get_profile_by_ids(ctx, &remaining, options, true)
                .await?;
            for user in fetched {
                self.core.cache_set(&self.core.user_by_id, &user.id, user.clone());
                found.push(user);
            }
        }
        Ok(found)
    }

    async fn get_all_profiles_in_channel(
        &self,
        ctx: RequestContext,
        channel_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<HashMap<String, User>> {
        if allow_from_cache {
            if let Some(profiles) =
                self.core.cache_get(&self.core.profiles_in_channel, channel_id)
            {
                return Ok(profiles);
            }
        }
        let profiles = self
            .core
            .base
            .user()
            .get_all_profiles_in_channel(ctx, channel_id, allow_from_cache)
            .await?;
        self.core
            .cache_set(&self.core.profiles_in_channel, channel_id, profiles.clone());
        Ok(profiles)
    }

    async fn get_all_profiles(&self, options: &UserGetOptions) -> StoreResult<Vec<User>> {
        if !is_cacheable_listing(options) {
            return self.core.base.user().get_all_profiles(options).await;
        }
        if let Some(users) = self.core.cache_get(&self.core.all_profiles, ALL_PROFILES_KEY) {
            return Ok(users);
        }
        let users = self.core.base.user().get_all_profiles(options).await?;
        self.core
            .cache_set(&self.core.all_profiles, ALL_PROFILES_KEY, users.clone());
        Ok(users)
    }

    async fn update_failed_password_attempts(
        &self,
        user_id: &str,
        attempts: i32,
    ) -> StoreResult<()> {
        // Invalidate first so a concurrent read cannot re-cache the old
        // attempt count between the base write and the invalidation.
        self.invalidate_profile(user_id);
        self.core
            .base
            .user()
            .update_failed_password_attempts(user_id, attempts)
            .await
    }

    fn invalidate_profile_cache_for_user(&self, user_id: &str) {
        self.invalidate_profile(user_id);
    }

    fn invalidate_profiles_in_channel_cache(&self, channel_id: &str) {
        self.core.invalidate_key(&self.core.profiles_in_channel, channel_id);
    }

    fn invalidate_profiles_in_channel_cache_by_user(&self, user_id: &str) {
        // The member channel set is unknown; scan cached channel maps for
        // the user and drop those entries. A failed scan degrades to a
        // full purge rather than leaving stale profiles behind.
        let mut affected = Vec::new();
        let scanned = self.core.profiles_in_channel.scan(|keys| {
            for (key, cached) in keys
                .iter()
                .zip(self.core.profiles_in_channel.multi_get(keys))
            {
                if let Ok(profiles) = cached {
                    if profiles.contains_key(user_id) {
                        affected.push(key.clone());
                    }
                }
            }
            Ok::<(), CacheError>(())
        });
        match scanned {
            Ok(()) => {
                for channel_id in &affected {
                    self.core.invalidate_key(&self.core.profiles_in_channel, channel_id);
                }
            }
            Err(_) => self.core.clear_cache(&self.core.profiles_in_channel),
        }
    }
}
