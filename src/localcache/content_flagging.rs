//! Cached content-flagging store: moderation flags per post.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::ContentFlag;
use crate::store::{ContentFlaggingStore, StoreResult};

use super::LayerCore;

pub(super) struct CachedContentFlaggingStore {
    core: Arc<LayerCore>,
}

impl CachedContentFlaggingStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl ContentFlaggingStore for CachedContentFlaggingStore {
    async fn get_flag(&self, post_id: &str, allow_from_cache: bool) -> StoreResult<ContentFlag> {
        if allow_from_cache {
            if let Some(flag) = self.core.cache_get(&self.core.content_flags, post_id) {
                return Ok(flag);
            }
        }
        let flag = self
            .core
            .base
            .content_flagging()
            .get_flag(post_id, allow_from_cache)
            .await?;
        self.core.cache_set(&self.core.content_flags, post_id, flag.clone());
        Ok(flag)
    }

    async fn save_flag(&self, flag: &ContentFlag) -> StoreResult<ContentFlag> {
        let saved = self.core.base.content_flagging().save_flag(flag).await?;
        self.core.invalidate_key(&self.core.content_flags, &saved.post_id);
        Ok(saved)
    }

    async fn delete_flag(&self, post_id: &str) -> StoreResult<()> {
        self.core.base.content_flagging().delete_flag(post_id).await?;
        self.core.invalidate_key(&self.core.content_flags, post_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cluster::events;
    use crate::localcache::testutil::harness;
    use crate::model::ContentFlag;
    use crate::store::Store;

    #[tokio::test]
    async fn test_get_flag_reads_through() {
        let h = harness();
        h.base.put_flag(ContentFlag::new("p1", "u1"));

        h.layer.content_flagging().get_flag("p1", true).await.unwrap();
        h.layer.content_flagging().get_flag("p1", true).await.unwrap();
        assert_eq!(h.base.calls("content_flagging.get_flag"), 1);
    }

    #[tokio::test]
    async fn test_save_flag_invalidates_status() {
        let h = harness();
        h.base.put_flag(ContentFlag::new("p1", "u1"));
        h.layer.content_flagging().get_flag("p1", true).await.unwrap();

        let mut reviewed = ContentFlag::new("p1", "u1");
        reviewed.status = "reviewed".to_string();
        h.layer.content_flagging().save_flag(&reviewed).await.unwrap();

        let flag = h.layer.content_flagging().get_flag("p1", true).await.unwrap();
        assert_eq!(flag.status, "reviewed");
        assert!(h.bus.take_published().iter().any(|m| {
            m.event == events::INVALIDATE_CONTENT_FLAGS && m.key() == Some("p1")
        }));
    }

    #[tokio::test]
    async fn test_forced_read_bypasses_but_refreshes() {
        let h = harness();
        h.base.put_flag(ContentFlag::new("p1", "u1"));
        h.layer.content_flagging().get_flag("p1", true).await.unwrap();

        let mut reviewed = ContentFlag::new("p1", "u1");
        reviewed.status = "reviewed".to_string();
        h.base.put_flag(reviewed);

        let fresh = h.layer.content_flagging().get_flag("p1", false).await.unwrap();
        assert_eq!(fresh.status, "reviewed");
        let cached = h.layer.content_flagging().get_flag("p1", true).await.unwrap();
        assert_eq!(cached.status, "reviewed");
        assert_eq!(h.base.calls("content_flagging.get_flag"), 2);
    }

    #[tokio::test]
    async fn test_cluster_clear_purges_flags() {
        use crate::cluster::ClusterMessage;

        let h = harness();
        h.base.put_flag(ContentFlag::new("p1", "u1"));
        h.layer.content_flagging().get_flag("p1", true).await.unwrap();

        h.bus
            .deliver(&ClusterMessage::clear(events::INVALIDATE_CONTENT_FLAGS));

        h.layer.content_flagging().get_flag("p1", true).await.unwrap();
        assert_eq!(h.base.calls("content_flagging.get_flag"), 2);
    }

    #[tokio::test]
    async fn test_delete_flag_invalidates() {
        let h = harness();
        h.base.put_flag(ContentFlag::new("p1", "u1"));
        h.layer.content_flagging().get_flag("p1", true).await.unwrap();

        h.layer.content_flagging().delete_flag("p1").await.unwrap();
        assert!(h.layer.content_flagging().get_flag("p1", true).await.is_err());
    }
}
