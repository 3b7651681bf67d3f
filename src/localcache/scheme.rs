//! Cached scheme store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::Scheme;
use crate::store::{SchemeStore, StoreResult};

use super::LayerCore;

pub(super) struct CachedSchemeStore {
    core: Arc<LayerCore>,
}

impl CachedSchemeStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl SchemeStore for CachedSchemeStore {
    async fn get(&self, scheme_id: &str) -> StoreResult<Scheme> {
        if let Some(scheme) = self.core.cache_get(&self.core.schemes, scheme_id) {
            return Ok(scheme);
        }
        let scheme = self.core.base.scheme().get(scheme_id).await?;
        self.core.cache_set(&self.core.schemes, scheme_id, scheme.clone());
        Ok(scheme)
    }

    async fn save(&self, scheme: &Scheme) -> StoreResult<Scheme> {
        let saved = self.core.base.scheme().save(scheme).await?;
        self.core.invalidate_key(&self.core.schemes, &saved.id);
        Ok(saved)
    }

    async fn delete(&self, scheme_id: &str) -> StoreResult<Scheme> {
        let deleted = self.core.base.scheme().delete(scheme_id).await?;
        self.core.invalidate_key(&self.core.schemes, scheme_id);
        Ok(deleted)
    }

    async fn permanent_delete_all(&self) -> StoreResult<()> {
        self.core.base.scheme().permanent_delete_all().await?;
        self.core.clear_cache(&self.core.schemes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cluster::events;
    use crate::localcache::testutil::harness;
    use crate::model::Scheme;
    use crate::store::Store;

    #[tokio::test]
    async fn test_get_reads_through() {
        let h = harness();
        h.base.put_scheme(Scheme::new("s1", "team-scheme", "team"));

        h.layer.scheme().get("s1").await.unwrap();
        h.layer.scheme().get("s1").await.unwrap();
        assert_eq!(h.base.calls("scheme.get"), 1);
    }

    #[tokio::test]
    async fn test_save_invalidates_by_id() {
        let h = harness();
        let scheme = Scheme::new("s1", "team-scheme", "team");
        h.base.put_scheme(scheme.clone());
        h.layer.scheme().get("s1").await.unwrap();

        h.layer.scheme().save(&scheme).await.unwrap();

        h.layer.scheme().get("s1").await.unwrap();
        assert_eq!(h.base.calls("scheme.get"), 2);
        let published = h.bus.take_published();
        assert!(published
            .iter()
            .any(|m| m.event == events::INVALIDATE_SCHEMES && m.key() == Some("s1")));
    }

    #[tokio::test]
    async fn test_cluster_key_message_removes_entry() {
        use crate::cluster::ClusterMessage;

        let h = harness();
        h.base.put_scheme(Scheme::new("s1", "team-scheme", "team"));
        h.layer.scheme().get("s1").await.unwrap();

        h.bus.deliver(
            &ClusterMessage::invalidate(events::INVALIDATE_SCHEMES, "s1").unwrap(),
        );

        h.layer.scheme().get("s1").await.unwrap();
        assert_eq!(h.base.calls("scheme.get"), 2);
    }

    #[tokio::test]
    async fn test_delete_all_purges() {
        let h = harness();
        h.base.put_scheme(Scheme::new("s1", "team-scheme", "team"));
        h.layer.scheme().get("s1").await.unwrap();

        h.layer.scheme().permanent_delete_all().await.unwrap();

        assert!(h.layer.scheme().get("s1").await.is_err());
    }
}
