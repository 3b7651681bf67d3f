//! Cached emoji store: two coordinated caches, emoji by id and
//! name-to-id, each filled by whichever lookup ran first. System emoji
//! resolve from the built-in table without touching either cache.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{Emoji, system_emoji_id};
use crate::store::{EmojiStore, RequestContext, StoreResult};

use super::LayerCore;

pub(super) struct CachedEmojiStore {
    core: Arc<LayerCore>,
}

impl CachedEmojiStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }

    fn id_context(&self, ctx: RequestContext, id: &str) -> RequestContext {
        if self.core.emoji_id_invalidations.drain(id) {
            ctx.with_master()
        } else {
            ctx
        }
    }

    fn fill_both(&self, emoji: &Emoji) {
        self.core.cache_set(&self.core.emoji_by_id, &emoji.id, emoji.clone());
        self.core
            .cache_set(&self.core.emoji_id_by_name, &emoji.name, emoji.id.clone());
    }

    async fn get_by_id(&self, ctx: RequestContext, id: &str) -> StoreResult<Emoji> {
        if let Some(emoji) = self.core.cache_get(&self.core.emoji_by_id, id) {
            return Ok(emoji);
        }
        let ctx = self.id_context(ctx, id);
        let emoji = self.core.base.emoji().get(ctx, id).await?;
        self.fill_both(&emoji);
        Ok(emoji)
    }
}

#[async_trait]
impl EmojiStore for CachedEmojiStore {
    async fn get(&self, ctx: RequestContext, id: &str) -> StoreResult<Emoji> {
        self.get_by_id(ctx, id).await
    }

    async fn get_by_name(&self, ctx: RequestContext, name: &str) -> StoreResult<Emoji> {
        if let Some(id) = system_emoji_id(name) {
            return self.get_by_id(ctx, id).await;
        }
        if let Some(id) = self.core.cache_get(&self.core.emoji_id_by_name, name) {
            return self.get_by_id(ctx, &id).await;
        }
        let ctx = if self.core.emoji_name_invalidations.drain(name) {
            ctx.with_master()
        } else {
            ctx
        };
        let emoji = self.core.base.emoji().get_by_name(ctx, name).await?;
        self.fill_both(&emoji);
        Ok(emoji)
    }

    async fn get_multiple_by_name(
        &self,
        ctx: RequestContext,
        names: &[String],
    ) -> StoreResult<Vec<Emoji>> {
        let mut found = Vec::with_capacity(names.len());
        let mut remaining = Vec::new();
        for name in names {
            let cached_id = system_emoji_id(name)
                .map(str::to_string)
                .or_else(|| self.core.cache_get(&self.core.emoji_id_by_name, name));
            let cached = cached_id
                .and_then(|id| self.core.cache_get(&self.core.emoji_by_id, &id));
            match cached {
                Some(emoji) => found.push(emoji),
                None => remaining.push(name.clone()),
            }
        }
        if !remaining.is_empty() {
            let fetched = self
                .core
                .base
                .emoji()
                .get_multiple_by_name(ctx, &remaining)
                .await?;
            for emoji in fetched {
                self.fill_both(&emoji);
                found.push(emoji);
            }
        }
        Ok(found)
    }

    async fn delete(&self, emoji: &Emoji, delete_at: i64) -> StoreResult<()> {
        self.core.base.emoji().delete(emoji, delete_at).await?;
        self.core.emoji_id_invalidations.mark(&emoji.id);
        self.core.emoji_name_invalidations.mark(&emoji.name);
        self.core.invalidate_key(&self.core.emoji_by_id, &emoji.id);
        self.core.invalidate_key(&self.core.emoji_id_by_name, &emoji.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cluster::events;
    use crate::localcache::testutil::harness;
    use crate::model::{Emoji, system_emoji_id};
    use crate::store::{RequestContext, Store};

    #[tokio::test]
    async fn test_get_fills_name_cache_too() {
        let h = harness();
        h.base.put_emoji(Emoji::new("e1", "partyparrot"));

        h.layer.emoji().get(RequestContext::new(), "e1").await.unwrap();

        // The by-name lookup is served from cache without a base call.
        let emoji = h
            .layer
            .emoji()
            .get_by_name(RequestContext::new(), "partyparrot")
            .await
            .unwrap();
        assert_eq!(emoji.id, "e1");
        assert_eq!(h.base.calls("emoji.get"), 1);
        assert_eq!(h.base.calls("emoji.get_by_name"), 0);
    }

    #[tokio::test]
    async fn test_get_by_name_fills_id_cache_too() {
        let h = harness();
        h.base.put_emoji(Emoji::new("e1", "partyparrot"));

        h.layer
            .emoji()
            .get_by_name(RequestContext::new(), "partyparrot")
            .await
            .unwrap();
        h.layer.emoji().get(RequestContext::new(), "e1").await.unwrap();

        assert_eq!(h.base.calls("emoji.get_by_name"), 1);
        assert_eq!(h.base.calls("emoji.get"), 0);
    }

    #[tokio::test]
    async fn test_system_emoji_resolves_without_name_cache() {
        let h = harness();
        let id = system_emoji_id("smile").unwrap();
        h.base.put_emoji(Emoji::new(id, "smile"));

        h.layer
            .emoji()
            .get_by_name(RequestContext::new(), "smile")
            .await
            .unwrap();
        // Resolution goes straight to the id cache path.
        assert_eq!(h.base.calls("emoji.get_by_name"), 0);
        assert_eq!(h.base.calls("emoji.get"), 1);
    }

    #[tokio::test]
    async fn test_get_multiple_by_name_fetches_only_misses() {
        let h = harness();
        h.base.put_emoji(Emoji::new("e1", "alpha"));
        h.base.put_emoji(Emoji::new("e2", "beta"));

        h.layer
            .emoji()
            .get_by_name(RequestContext::new(), "alpha")
            .await
            .unwrap();

        let names = vec!["alpha".to_string(), "beta".to_string()];
        let emojis = h
            .layer
            .emoji()
            .get_multiple_by_name(RequestContext::new(), &names)
            .await
            .unwrap();
        assert_eq!(emojis.len(), 2);
        assert_eq!(
            h.base.last_ids("emoji.get_multiple_by_name"),
            vec!["beta".to_string()]
        );
    }

    #[tokio::test]
    async fn test_name_hit_with_evicted_id_refetches_by_id() {
        use crate::cluster::ClusterMessage;

        let h = harness();
        h.base.put_emoji(Emoji::new("e1", "partyparrot"));
        h.layer
            .emoji()
            .get_by_name(RequestContext::new(), "partyparrot")
            .await
            .unwrap();

        // Drop only the id-side entry; the name mapping survives.
        h.bus.deliver(
            &ClusterMessage::invalidate(events::INVALIDATE_EMOJIS_BY_ID, "e1").unwrap(),
        );

        let emoji = h
            .layer
            .emoji()
            .get_by_name(RequestContext::new(), "partyparrot")
            .await
            .unwrap();
        assert_eq!(emoji.id, "e1");
        assert_eq!(h.base.calls("emoji.get_by_name"), 1);
        assert_eq!(h.base.calls("emoji.get"), 1);
    }

    #[tokio::test]
    async fn test_delete_invalidates_both_caches_and_redirects() {
        let h = harness();
        let emoji = Emoji::new("e1", "partyparrot");
        h.base.put_emoji(emoji.clone());
        h.layer.emoji().get(RequestContext::new(), "e1").await.unwrap();

        h.layer.emoji().delete(&emoji, 123).await.unwrap();
        h.base.put_emoji(emoji.clone());

        h.layer.emoji().get(RequestContext::new(), "e1").await.unwrap();
        assert_eq!(h.base.master_reads(), 1);

        let published = h.bus.take_published();
        assert!(published
            .iter()
            .any(|m| m.event == events::INVALIDATE_EMOJIS_BY_ID && m.key() == Some("e1")));
        assert!(published.iter().any(|m| {
            m.event == events::INVALIDATE_EMOJIS_ID_BY_NAME && m.key() == Some("partyparrot")
        }));
    }
}
