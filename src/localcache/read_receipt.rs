//! Cached read-receipt store. Receipts are keyed `"<post_id>:<user_id>"`;
//! deleting a post's receipts trims the local cache by key prefix and
//! tells peers to clear theirs, since the member set cannot be encoded in
//! a single invalidation key.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::model::ReadReceipt;
use crate::store::{ReadReceiptStore, StoreResult};

use super::LayerCore;

pub(super) struct CachedReadReceiptStore {
    core: Arc<LayerCore>,
}

impl CachedReadReceiptStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl ReadReceiptStore for CachedReadReceiptStore {
    async fn get(
        &self,
        post_id: &str,
        user_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<ReadReceipt> {
        let key = ReadReceipt::key_for(post_id, user_id);
        if allow_from_cache {
            if let Some(receipt) = self.core.cache_get(&self.core.read_receipts, &key) {
                return Ok(receipt);
            }
        }
        let receipt = self
            .core
            .base
            .read_receipt()
            .get(post_id, user_id, allow_from_cache)
            .await?;
        self.core.cache_set(&self.core.read_receipts, &key, receipt.clone());
        Ok(receipt)
    }

    async fn save(&self, receipt: &ReadReceipt) -> StoreResult<ReadReceipt> {
        let saved = self.core.base.read_receipt().save(receipt).await?;
        self.core
            .invalidate_key(&self.core.read_receipts, &receipt.cache_key());
        Ok(saved)
    }

    async fn delete_by_post(&self, post_id: &str) -> StoreResult<()> {
        self.core.base.read_receipt().delete_by_post(post_id).await?;
        let prefix = format!("{post_id}:");
        if let Err(err) = self
            .core
            .read_receipts
            .remove_by_predicate(move |key| key.starts_with(&prefix))
        {
            warn!(%err, "prefix invalidation failed, purging read receipts");
            self.core.read_receipts.purge();
        }
        self.core.publish_clear(&self.core.read_receipts);
        Ok(())
    }
}
