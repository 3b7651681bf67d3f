//! Cached post store: per-channel last-post times (backing etags and
//! posts-since short-circuits), first-page post lists, and the
//! platform-wide usage count.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{
    CURRENT_VERSION, GetPostsOptions, Post, PostCountOptions, PostList, PostsSinceOptions,
};
use crate::store::{PostStore, StoreResult};

use super::LayerCore;

/// Single entry key for the usage-count cache.
const POSTS_USAGE_KEY: &str = "posts_usage";

/// First-page sizes clients actually request; other shapes bypass the
/// last-posts cache.
const CACHEABLE_PER_PAGE: [usize; 2] = [30, 60];

pub(super) struct CachedPostStore {
    core: Arc<LayerCore>,
}

impl CachedPostStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }

    fn is_cacheable_page(options: &GetPostsOptions) -> bool {
        options.page == 0 && CACHEABLE_PER_PAGE.contains(&options.per_page)
    }

    fn last_posts_key(options: &GetPostsOptions) -> String {
        format!("{}|{}", options.channel_id, options.per_page)
    }
}

#[async_trait]
impl PostStore for CachedPostStore {
    async fn get_etag(
        &self,
        channel_id: &str,
        allow_from_cache: bool,
        collapsed_threads: bool,
    ) -> StoreResult<String> {
        if allow_from_cache {
            if let Some(last) = self.core.cache_get(&self.core.last_post_times, channel_id) {
                return Ok(format!("{CURRENT_VERSION}.{last}"));
            }
        }
        let etag = self
            .core
            .base
            .post()
            .get_etag(channel_id, allow_from_cache, collapsed_threads)
            .await?;
        // Etags are "<version>.<last_post_time>"; cache the time part so
        // posts-since can reuse it.
        if let Some(last) = etag.rsplit('.').next().and_then(|t| t.parse::<i64>().ok()) {
            self.core.cache_set(&self.core.last_post_times, channel_id, last);
        }
        Ok(etag)
    }

    async fn get_posts_since(
        &self,
        options: &PostsSinceOptions,
        allow_from_cache: bool,
        sanitize: bool,
    ) -> StoreResult<PostList> {
        if allow_from_cache {
            // Nothing has landed since the caller's watermark; skip the
            // base query entirely.
            if let Some(last) =
                self.core.cache_get(&self.core.last_post_times, &options.channel_id)
            {
                if last <= options.time {
                    return Ok(PostList::new());
                }
            }
        }
        let list = self
            .core
            .base
            .post()
            .get_posts_since(options, allow_from_cache, sanitize)
            .await?;
        let latest = list.latest_update_at();
        if latest != 0 {
            self.core
                .cache_set(&self.core.last_post_times, &options.channel_id, latest);
        }
        Ok(list)
    }

    async fn get_posts(
        &self,
        options: &GetPostsOptions,
        allow_from_cache: bool,
        sanitize: bool,
    ) -> StoreResult<PostList> {
        if !Self::is_cacheable_page(options) {
            return self
                .core
                .base
                .post()
                .get_posts(options, allow_from_cache, sanitize)
                .await;
        }
        let key = Self::last_posts_key(options);
        if allow_from_cache {
            if let Some(list) = self.core.cache_get(&self.core.last_posts, &key) {
                return Ok(list);
            }
        }
        let list = self
            .core
            .base
            .post()
            .get_posts(options, allow_from_cache, sanitize)
            .await?;
        self.core.cache_set(&self.core.last_posts, &key, list.clone());
        Ok(list)
    }

    async fn analytics_post_count(&self, options: &PostCountOptions) -> StoreResult<i64> {
        if !options.is_cacheable_usage_count() {
            return self.core.base.post().analytics_post_count(options).await;
        }
        if let Some(count) = self.core.cache_get(&self.core.posts_usage, POSTS_USAGE_KEY) {
            return Ok(count);
        }
        let count = self.core.base.post().analytics_post_count(options).await?;
        self.core.cache_set(&self.core.posts_usage, POSTS_USAGE_KEY, count);
        Ok(count)
    }

    async fn save(&self, post: &Post) -> StoreResult<Post> {
        let saved = self.core.base.post().save(post).await?;
        self.invalidate_last_post_time_cache(&saved.channel_id);
        Ok(saved)
    }

    fn invalidate_last_post_time_cache(&self, channel_id: &str) {
        self.core.invalidate_key(&self.core.last_post_times, channel_id);
        // Both cacheable first pages contain the changed tail.
        for per_page in CACHEABLE_PER_PAGE {
            self.core
                .invalidate_key(&self.core.last_posts, &format!("{channel_id}|{per_page}"));
        }
    }

    fn clear_caches(&self) {
        self.core.clear_cache(&self.core.last_post_times);
        self.core.clear_cache(&self.core.last_posts);
        self.core.clear_cache(&self.core.posts_usage);
    }
}
