//! Cached channel store: channels by id plus three per-channel counts
//! (members, guests, pinned posts).

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{Channel, ChannelMember};
use crate::store::{ChannelStore, RequestContext, StoreResult};

use super::LayerCore;

/// Channels touched by a batch of member writes, each exactly once.
fn distinct_channels(members: &[ChannelMember]) -> impl Iterator<Item = &str> {
    let mut seen = std::collections::HashSet::new();
    members
        .iter()
        .map(|member| member.channel_id.as_str())
        .filter(move |id| seen.insert(*id))
}

pub(super) struct CachedChannelStore {
    core: Arc<LayerCore>,
}

impl CachedChannelStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }

    /// A miss-read after a local write goes to the master replica, so a
    /// lagging read replica cannot repopulate the cache with stale data.
    fn read_context(&self, ctx: RequestContext, id: &str) -> RequestContext {
        if self.core.channel_invalidations.drain(id) {
            ctx.with_master()
        } else {
            ctx
        }
    }
}

#[async_trait]
impl ChannelStore for CachedChannelStore {
    async fn get(&self, ctx: RequestContext, id: &str) -> StoreResult<Channel> {
        if let Some(channel) = self.core.cache_get(&self.core.channel_by_id, id) {
            return Ok(channel);
        }
        let ctx = self.read_context(ctx, id);
        let channel = self.core.base.channel().get(ctx, id).await?;
        self.core.cache_set(&self.core.channel_by_id, id, channel.clone());
        Ok(channel)
    }

    async fn get_many(&self, ctx: RequestContext, ids: &[String]) -> StoreResult<Vec<Channel>> {
        let mut found = Vec::with_capacity(ids.len());
        let mut remaining = Vec::new();
        for (id, cached) in ids.iter().zip(self.core.channel_by_id.multi_get(ids)) {
            match cached {
                Ok(channel) => {
                    self.core.metrics.cache_hit(self.core.channel_by_id.name());
                    found.push(channel);
                }
                Err(_) => {
                    self.core.metrics.cache_miss(self.core.channel_by_id.name());
                    remaining.push(id.clone());
                }
            }
        }
        if !remaining.is_empty() {
            let fetched = self.core.base.channel().get_many(ctx, &remaining).await?;
            for channel in fetched {
                self.core
                    .cache_set(&self.core.channel_by_id, &channel.id, channel.clone());
                found.push(channel);
            }
        }
        Ok(found)
    }

    async fn save_member(&self, member: &ChannelMember) -> StoreResult<ChannelMember> {
        let saved = self.core.base.channel().save_member(member).await?;
        self.invalidate_member_count(&member.channel_id);
        Ok(saved)
    }

    async fn save_multiple_members(
        &self,
        members: &[ChannelMember],
    ) -> StoreResult<Vec<ChannelMember>> {
        let saved = self.core.base.channel().save_multiple_members(members).await?;
        for channel_id in distinct_channels(members) {
            self.invalidate_member_count(channel_id);
        }
        Ok(saved)
    }

    async fn update_member(&self, member: &ChannelMember) -> StoreResult<ChannelMember> {
        let updated = self.core.base.channel().update_member(member).await?;
        // Role or guest transitions move members between counts.
        self.invalidate_member_count(&member.channel_id);
        self.invalidate_guest_count(&member.channel_id);
        Ok(updated)
    }

    async fn update_multiple_members(
        &self,
        members: &[ChannelMember],
    ) -> StoreResult<Vec<ChannelMember>> {
        let updated = self.core.base.channel().update_multiple_members(members).await?;
        for channel_id in distinct_channels(members) {
            self.invalidate_member_count(channel_id);
            self.invalidate_guest_count(channel_id);
        }
        Ok(updated)
    }

    async fn remove_member(&self, channel_id: &str, user_id: &str) -> StoreResult<()> {
        self.core.base.channel().remove_member(channel_id, user_id).await?;
        self.invalidate_member_count(channel_id);
        self.invalidate_guest_count(channel_id);
        Ok(())
    }

    async fn remove_members(&self, channel_id: &str, user_ids: &[String]) -> StoreResult<()> {
        self.core.base.channel().remove_members(channel_id, user_ids).await?;
        self.invalidate_member_count(channel_id);
        self.invalidate_guest_count(channel_id);
        Ok(())
    }

    async fn get_member_count(
        &self,
        channel_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<i64> {
        if allow_from_cache {
            if let Some(count) = self.core.cache_get(&self.core.member_counts, channel_id) {
                return Ok(count);
            }
        }
        let count = self
            .core
            .base
            .channel()
            .get_member_count(channel_id, allow_from_cache)
            .await?;
        // A forced base read still refreshes the cache for later callers.
        self.core.cache_set(&self.core.member_counts, channel_id, count);
        Ok(count)
    }

    async fn get_guest_count(&self, channel_id: &str, allow_from_cache: bool) -> StoreResult<i64> {
        if allow_from_cache {
            if let Some(count) = self.core.cache_get(&self.core.guest_counts, channel_id) {
                return Ok(count);
            }
        }
        let count = self
            .core
            .base
            .channel()
            .get_guest_count(channel_id, allow_from_cache)
            .await?;
        self.core.cache_set(&self.core.guest_counts, channel_id, count);
        Ok(count)
    }

    async fn get_pinned_post_count(
        &self,
        channel_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<i64> {
        if allow_from_cache {
            if let Some(count) = self.core.cache_get(&self.core.pinned_post_counts, channel_id) {
                return Ok(count);
            }
        }
        let count = self
            .core
            .base
            .channel()
            .get_pinned_post_count(channel_id, allow_from_cache)
            .await?;
        self.core.cache_set(&self.core.pinned_post_counts, channel_id, count);
        Ok(count)
    }

    fn invalidate_channel(&self, id: &str) {
        self.core.channel_invalidations.mark(id);
        self.core.invalidate_key(&self.core.channel_by_id, id);
    }

    fn invalidate_member_count(&self, channel_id: &str) {
        self.core.invalidate_key(&self.core.member_counts, channel_id);
    }

    fn invalidate_guest_count(&self, channel_id: &str) {
        self.core.invalidate_key(&self.core.guest_counts, channel_id);
    }

    fn invalidate_pinned_post_count(&self, channel_id: &str) {
        self.core.invalidate_key(&self.core.pinned_post_counts, channel_id);
    }
}

#[cfg(test)]
mod tests {
    use crate::cluster::{ClusterMessage, events};
    use crate::localcache::testutil::harness;
    use crate::model::{Channel, ChannelMember};
    use crate::store::{RequestContext, Store, StoreError};

    #[tokio::test]
    async fn test_get_reads_through_and_caches() {
        let h = harness();
        h.base.put_channel(Channel::new("c1", "t1", "town-square"));

        let first = h
            .layer
            .channel()
            .get(RequestContext::new(), "c1")
            .await
            .unwrap();
        let second = h
            .layer
            .channel()
            .get(RequestContext::new(), "c1")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(h.base.calls("channel.get"), 1);
    }

    #[tokio::test]
    async fn test_get_miss_propagates_not_found() {
        let h = harness();
        let err = h
            .layer
            .channel()
            .get(RequestContext::new(), "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_invalidate_channel_redirects_next_read_to_master() {
        let h = harness();
        h.base.put_channel(Channel::new("c1", "t1", "town-square"));

        h.layer.channel().get(RequestContext::new(), "c1").await.unwrap();
        h.layer.channel().invalidate_channel("c1");
        h.layer.channel().get(RequestContext::new(), "c1").await.unwrap();

        assert_eq!(h.base.calls("channel.get"), 2);
        assert_eq!(h.base.master_reads(), 1);

        // The redirect is one-shot: a later miss goes back to replicas.
        h.bus.deliver(&ClusterMessage::clear(events::INVALIDATE_CHANNELS));
        h.layer.channel().get(RequestContext::new(), "c1").await.unwrap();
        assert_eq!(h.base.master_reads(), 1);
    }

    #[tokio::test]
    async fn test_get_many_fetches_only_uncached_ids() {
        let h = harness();
        h.base.put_channel(Channel::new("c1", "t1", "one"));
        h.base.put_channel(Channel::new("c2", "t1", "two"));

        h.layer.channel().get(RequestContext::new(), "c1").await.unwrap();

        let ids = vec!["c1".to_string(), "c2".to_string()];
        let channels = h
            .layer
            .channel()
            .get_many(RequestContext::new(), &ids)
            .await
            .unwrap();

        assert_eq!(channels.len(), 2);
        assert_eq!(h.base.last_ids("channel.get_many"), vec!["c2".to_string()]);

        // Everything cached now; the base is not consulted again.
        h.layer
            .channel()
            .get_many(RequestContext::new(), &ids)
            .await
            .unwrap();
        assert_eq!(h.base.calls("channel.get_many"), 1);
    }

    #[tokio::test]
    async fn test_member_count_skips_cache_when_not_allowed() {
        let h = harness();
        h.base.set_member_count("c1", 7);

        assert_eq!(
            h.layer.channel().get_member_count("c1", true).await.unwrap(),
            7
        );
        h.base.set_member_count("c1", 8);

        // allow_from_cache=false bypasses the cached 7 and refreshes it.
        assert_eq!(
            h.layer.channel().get_member_count("c1", false).await.unwrap(),
            8
        );
        assert_eq!(
            h.layer.channel().get_member_count("c1", true).await.unwrap(),
            8
        );
        assert_eq!(h.base.calls("channel.get_member_count"), 2);
    }

    #[tokio::test]
    async fn test_save_member_invalidates_member_count_and_publishes() {
        let h = harness();
        h.base.set_member_count("c1", 1);
        h.layer.channel().get_member_count("c1", true).await.unwrap();

        h.layer
            .channel()
            .save_member(&ChannelMember::new("c1", "u1"))
            .await
            .unwrap();

        let published = h.bus.take_published();
        assert!(published.iter().any(|m| {
            m.event == events::INVALIDATE_CHANNEL_MEMBER_COUNTS && m.key() == Some("c1")
        }));

        h.base.set_member_count("c1", 2);
        assert_eq!(
            h.layer.channel().get_member_count("c1", true).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_save_multiple_members_invalidates_each_channel_once() {
        let h = harness();
        let members = vec![
            ChannelMember::new("c1", "u1"),
            ChannelMember::new("c1", "u2"),
            ChannelMember::new("c2", "u1"),
        ];

        h.layer.channel().save_multiple_members(&members).await.unwrap();

        let keys: Vec<_> = h
            .bus
            .take_published()
            .into_iter()
            .filter(|m| m.event == events::INVALIDATE_CHANNEL_MEMBER_COUNTS)
            .filter_map(|m| m.key().map(str::to_string))
            .collect();
        assert_eq!(keys, vec!["c1".to_string(), "c2".to_string()]);
    }

    #[tokio::test]
    async fn test_update_multiple_members_invalidates_both_counts() {
        let h = harness();
        h.base.set_member_count("c1", 2);
        h.base.set_guest_count("c1", 1);
        h.layer.channel().get_member_count("c1", true).await.unwrap();
        h.layer.channel().get_guest_count("c1", true).await.unwrap();

        h.layer
            .channel()
            .update_multiple_members(&[ChannelMember::new("c1", "u1")])
            .await
            .unwrap();

        h.layer.channel().get_member_count("c1", true).await.unwrap();
        h.layer.channel().get_guest_count("c1", true).await.unwrap();
        assert_eq!(h.base.calls("channel.get_member_count"), 2);
        assert_eq!(h.base.calls("channel.get_guest_count"), 2);
    }

    #[tokio::test]
    async fn test_remove_member_invalidates_guest_count_too() {
        let h = harness();
        h.base.set_guest_count("c1", 3);
        h.layer.channel().get_guest_count("c1", true).await.unwrap();

        h.layer.channel().remove_member("c1", "u1").await.unwrap();

        h.base.set_guest_count("c1", 2);
        assert_eq!(
            h.layer.channel().get_guest_count("c1", true).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_cluster_message_removes_cached_channel() {
        let h = harness();
        h.base.put_channel(Channel::new("c1", "t1", "town-square"));
        h.layer.channel().get(RequestContext::new(), "c1").await.unwrap();

        let message =
            ClusterMessage::invalidate(events::INVALIDATE_CHANNELS, "c1").unwrap();
        h.bus.deliver(&message);

        h.layer.channel().get(RequestContext::new(), "c1").await.unwrap();
        assert_eq!(h.base.calls("channel.get"), 2);
        // Received invalidations also redirect the refill to the master.
        assert_eq!(h.base.master_reads(), 1);
    }

    #[tokio::test]
    async fn test_pinned_post_count_reads_through() {
        let h = harness();
        h.base.set_pinned_post_count("c1", 4);

        h.layer.channel().get_pinned_post_count("c1", true).await.unwrap();
        h.layer.channel().get_pinned_post_count("c1", true).await.unwrap();
        assert_eq!(h.base.calls("channel.get_pinned_post_count"), 1);

        h.layer.channel().invalidate_pinned_post_count("c1");
        h.layer.channel().get_pinned_post_count("c1", true).await.unwrap();
        assert_eq!(h.base.calls("channel.get_pinned_post_count"), 2);
    }
}
