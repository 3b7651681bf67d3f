//! Cached file-info store: attachments per post (live and
//! include-deleted variants under distinct keys) plus the platform-wide
//! storage-usage total.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::FileInfo;
use crate::store::{FileInfoStore, StoreResult};

use super::LayerCore;

/// Single entry key for the storage-usage cache.
const STORAGE_USAGE_KEY: &str = "storage_usage";

pub(super) struct CachedFileInfoStore {
    core: Arc<LayerCore>,
}

impl CachedFileInfoStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }

    fn post_key(post_id: &str, include_deleted: bool) -> String {
        if include_deleted {
            format!("{post_id}_deleted")
        } else {
            post_id.to_string()
        }
    }
}

#[async_trait]
impl FileInfoStore for CachedFileInfoStore {
    async fn get_for_post(
        &self,
        post_id: &str,
        read_from_master: bool,
        include_deleted: bool,
        allow_from_cache: bool,
    ) -> StoreResult<Vec<FileInfo>> {
        let key = Self::post_key(post_id, include_deleted);
        if allow_from_cache {
            if let Some(infos) = self.core.cache_get(&self.core.file_infos, &key) {
                return Ok(infos);
            }
        }
        let infos = self
            .core
            .base
            .file_info()
            .get_for_post(post_id, read_from_master, include_deleted, allow_from_cache)
            .await?;
        // Most posts have no attachments; caching the empty result would
        // evict entries that earn their slot.
        if !infos.is_empty() {
            self.core.cache_set(&self.core.file_infos, &key, infos.clone());
        }
        Ok(infos)
    }

    async fn get_storage_usage(
        &self,
        allow_from_cache: bool,
        include_deleted: bool,
    ) -> StoreResult<i64> {
        if allow_from_cache {
            if let Some(usage) =
                self.core.cache_get(&self.core.file_storage_usage, STORAGE_USAGE_KEY)
            {
                return Ok(usage);
            }
        }
        let usage = self
            .core
            .base
            .file_info()
            .get_storage_usage(allow_from_cache, include_deleted)
            .await?;
        self.core
            .cache_set(&self.core.file_storage_usage, STORAGE_USAGE_KEY, usage);
        Ok(usage)
    }

    async fn attach_to_post(&self, file_id: &str, post_id: &str) -> StoreResult<()> {
        self.core.base.file_info().attach_to_post(file_id, post_id).await?;
        self.invalidate_file_infos_for_post_cache(post_id, false);
        self.core.invalidate_key(&self.core.file_storage_usage, STORAGE_USAGE_KEY);
        Ok(())
    }

    fn invalidate_file_infos_for_post_cache(&self, post_id: &str, deleted: bool) {
        self.core.invalidate_key(&self.core.file_infos, post_id);
        if deleted {
            self.core
                .invalidate_key(&self.core.file_infos, &Self::post_key(post_id, true));
        }
    }
}
