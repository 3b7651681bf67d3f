//! Cached temporary-post store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::TemporaryPost;
use crate::store::{StoreResult, TemporaryPostStore};

use super::LayerCore;

pub(super) struct CachedTemporaryPostStore {
    core: Arc<LayerCore>,
}

impl CachedTemporaryPostStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl TemporaryPostStore for CachedTemporaryPostStore {
    async fn get(&self, post_id: &str, allow_from_cache: bool) -> StoreResult<TemporaryPost> {
        if allow_from_cache {
            if let Some(post) = self.core.cache_get(&self.core.temporary_posts, post_id) {
                return Ok(post);
            }
        }
        let post = self
            .core
            .base
            .temporary_post()
            .get(post_id, allow_from_cache)
            .await?;
        self.core.cache_set(&self.core.temporary_posts, post_id, post.clone());
        Ok(post)
    }

    async fn save(&self, post: &TemporaryPost) -> StoreResult<TemporaryPost> {
        let saved = self.core.base.temporary_post().save(post).await?;
        self.core.invalidate_key(&self.core.temporary_posts, &saved.post_id);
        Ok(saved)
    }

    async fn delete(&self, post_id: &str) -> StoreResult<()> {
        self.core.base.temporary_post().delete(post_id).await?;
        self.core.invalidate_key(&self.core.temporary_posts, post_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cluster::events;
    use crate::localcache::testutil::harness;
    use crate::model::TemporaryPost;
    use crate::store::Store;

    fn temp_post(post_id: &str) -> TemporaryPost {
        TemporaryPost {
            post_id: post_id.to_string(),
            channel_id: "c1".to_string(),
            expire_at: 10_000,
        }
    }

    #[tokio::test]
    async fn test_get_reads_through() {
        let h = harness();
        h.base.put_temporary_post(temp_post("p1"));

        h.layer.temporary_post().get("p1", true).await.unwrap();
        h.layer.temporary_post().get("p1", true).await.unwrap();
        assert_eq!(h.base.calls("temporary_post.get"), 1);
    }

    #[tokio::test]
    async fn test_forced_read_bypasses_cache() {
        let h = harness();
        h.base.put_temporary_post(temp_post("p1"));

        h.layer.temporary_post().get("p1", true).await.unwrap();
        h.layer.temporary_post().get("p1", false).await.unwrap();
        assert_eq!(h.base.calls("temporary_post.get"), 2);
    }

    #[tokio::test]
    async fn test_cluster_key_message_removes_entry() {
        use crate::cluster::ClusterMessage;

        let h = harness();
        h.base.put_temporary_post(temp_post("p1"));
        h.layer.temporary_post().get("p1", true).await.unwrap();

        h.bus.deliver(
            &ClusterMessage::invalidate(events::INVALIDATE_TEMPORARY_POSTS, "p1").unwrap(),
        );

        h.layer.temporary_post().get("p1", true).await.unwrap();
        assert_eq!(h.base.calls("temporary_post.get"), 2);
    }

    #[tokio::test]
    async fn test_save_and_delete_invalidate() {
        let h = harness();
        h.base.put_temporary_post(temp_post("p1"));
        h.layer.temporary_post().get("p1", true).await.unwrap();

        let mut updated = temp_post("p1");
        updated.expire_at = 20_000;
        h.layer.temporary_post().save(&updated).await.unwrap();

        let post = h.layer.temporary_post().get("p1", true).await.unwrap();
        assert_eq!(post.expire_at, 20_000);

        h.layer.temporary_post().delete("p1").await.unwrap();
        assert!(h.layer.temporary_post().get("p1", true).await.is_err());

        let published = h.bus.take_published();
        let keyed = published
            .iter()
            .filter(|m| m.event == events::INVALIDATE_TEMPORARY_POSTS && m.key() == Some("p1"))
            .count();
        assert_eq!(keyed, 2);
    }
}
