//! Cached terms-of-service stores: the documents themselves (with a
//! dedicated latest slot) and per-user acceptance records.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{TermsOfService, UserTermsOfService};
use crate::store::{StoreResult, TermsOfServiceStore, UserTermsOfServiceStore};

use super::LayerCore;

/// Cache key for the most recently published document.
const LATEST_KEY: &str = "latest";

pub(super) struct CachedTermsOfServiceStore {
    core: Arc<LayerCore>,
}

impl CachedTermsOfServiceStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl TermsOfServiceStore for CachedTermsOfServiceStore {
    async fn save(&self, terms: &TermsOfService) -> StoreResult<TermsOfService> {
        let saved = self.core.base.terms_of_service().save(terms).await?;
        // A new document becomes the latest one.
        self.core.invalidate_key(&self.core.terms_of_service, LATEST_KEY);
        self.core.invalidate_key(&self.core.terms_of_service, &saved.id);
        Ok(saved)
    }

    async fn get(&self, id: &str, allow_from_cache: bool) -> StoreResult<TermsOfService> {
        if allow_from_cache {
            if let Some(terms) = self.core.cache_get(&self.core.terms_of_service, id) {
                return Ok(terms);
            }
        }
        let terms = self
            .core
            .base
            .terms_of_service()
            .get(id, allow_from_cache)
            .await?;
        self.core.cache_set(&self.core.terms_of_service, id, terms.clone());
        Ok(terms)
    }

    async fn get_latest(&self, allow_from_cache: bool) -> StoreResult<TermsOfService> {
        if allow_from_cache {
            if let Some(terms) = self.core.cache_get(&self.core.terms_of_service, LATEST_KEY) {
                return Ok(terms);
            }
        }
        let terms = self
            .core
            .base
            .terms_of_service()
            .get_latest(allow_from_cache)
            .await?;
        self.core
            .cache_set(&self.core.terms_of_service, LATEST_KEY, terms.clone());
        // The latest document is also addressable by id.
        self.core
            .cache_set(&self.core.terms_of_service, &terms.id, terms.clone());
        Ok(terms)
    }
}

pub(super) struct CachedUserTermsOfServiceStore {
    core: Arc<LayerCore>,
}

impl CachedUserTermsOfServiceStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl UserTermsOfServiceStore for CachedUserTermsOfServiceStore {
    async fn get_by_user(
        &self,
        user_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<UserTermsOfService> {
        if allow_from_cache {
            if let Some(record) = self.core.cache_get(&self.core.user_terms_of_service, user_id)
            {
                return Ok(record);
            }
        }
        let record = self
            .core
            .base
            .user_terms_of_service()
            .get_by_user(user_id, allow_from_cache)
            .await?;
        self.core
            .cache_set(&self.core.user_terms_of_service, user_id, record.clone());
        Ok(record)
    }

    async fn save(&self, user_terms: &UserTermsOfService) -> StoreResult<UserTermsOfService> {
        let saved = self.core.base.user_terms_of_service().save(user_terms).await?;
        self.core
            .invalidate_key(&self.core.user_terms_of_service, &saved.user_id);
        Ok(saved)
    }

    async fn delete(&self, user_id: &str, terms_of_service_id: &str) -> StoreResult<()> {
        self.core
            .base
            .user_terms_of_service()
            .delete(user_id, terms_of_service_id)
            .await?;
        self.core.invalidate_key(&self.core.user_terms_of_service, user_id);
        Ok(())
    }
}
