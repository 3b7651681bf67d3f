//! Cached incoming-webhook store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::IncomingWebhook;
use crate::store::{StoreResult, WebhookStore};

use super::LayerCore;

pub(super) struct CachedWebhookStore {
    core: Arc<LayerCore>,
}

impl CachedWebhookStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl WebhookStore for CachedWebhookStore {
    async fn get_incoming(&self, id: &str, allow_from_cache: bool) -> StoreResult<IncomingWebhook> {
        if allow_from_cache {
            if let Some(webhook) = self.core.cache_get(&self.core.webhooks, id) {
                return Ok(webhook);
            }
        }
        let webhook = self
            .core
            .base
            .webhook()
            .get_incoming(id, allow_from_cache)
            .await?;
        self.core.cache_set(&self.core.webhooks, id, webhook.clone());
        Ok(webhook)
    }

    async fn save_incoming(&self, webhook: &IncomingWebhook) -> StoreResult<IncomingWebhook> {
        let saved = self.core.base.webhook().save_incoming(webhook).await?;
        self.invalidate_webhook_cache(&saved.id);
        Ok(saved)
    }

    async fn delete_incoming(&self, webhook_id: &str, delete_at: i64) -> StoreResult<()> {
        self.core
            .base
            .webhook()
            .delete_incoming(webhook_id, delete_at)
            .await?;
        self.invalidate_webhook_cache(webhook_id);
        Ok(())
    }

    fn invalidate_webhook_cache(&self, webhook_id: &str) {
        self.core.invalidate_key(&self.core.webhooks, webhook_id);
    }
}

#[cfg(test)]
mod tests {
    use crate::cluster::{events, ClusterMessage};
    use crate::localcache::testutil::harness;
    use crate::model::IncomingWebhook;
    use crate::store::Store;

    #[tokio::test]
    async fn test_get_incoming_reads_through() {
        let h = harness();
        h.base.put_webhook(IncomingWebhook::new("w1", "c1"));

        h.layer.webhook().get_incoming("w1", true).await.unwrap();
        h.layer.webhook().get_incoming("w1", true).await.unwrap();
        assert_eq!(h.base.calls("webhook.get_incoming"), 1);
    }

    #[tokio::test]
    async fn test_delete_incoming_invalidates() {
        let h = harness();
        h.base.put_webhook(IncomingWebhook::new("w1", "c1"));
        h.layer.webhook().get_incoming("w1", true).await.unwrap();

        h.layer.webhook().delete_incoming("w1", 123).await.unwrap();

        assert!(h.layer.webhook().get_incoming("w1", true).await.is_err());
        assert!(h.bus.take_published().iter().any(|m| {
            m.event == events::INVALIDATE_WEBHOOKS && m.key() == Some("w1")
        }));
    }

    #[tokio::test]
    async fn test_delivered_key_message_evicts_the_webhook() {
        let h = harness();
        h.base.put_webhook(IncomingWebhook::new("w1", "c1"));
        h.layer.webhook().get_incoming("w1", true).await.unwrap();

        h.bus.deliver(
            &ClusterMessage::invalidate(events::INVALIDATE_WEBHOOKS, "w1").unwrap(),
        );

        h.layer.webhook().get_incoming("w1", true).await.unwrap();
        assert_eq!(h.base.calls("webhook.get_incoming"), 2);
    }

    #[tokio::test]
    async fn test_forced_read_still_refreshes() {
        let h = harness();
        let mut webhook = IncomingWebhook::new("w1", "c1");
        h.base.put_webhook(webhook.clone());
        h.layer.webhook().get_incoming("w1", true).await.unwrap();

        webhook.display_name = "renamed".to_string();
        h.base.put_webhook(webhook);

        let fresh = h.layer.webhook().get_incoming("w1", false).await.unwrap();
        assert_eq!(fresh.display_name, "renamed");
        let cached = h.layer.webhook().get_incoming("w1", true).await.unwrap();
        assert_eq!(cached.display_name, "renamed");
        assert_eq!(h.base.calls("webhook.get_incoming"), 2);
    }
}
