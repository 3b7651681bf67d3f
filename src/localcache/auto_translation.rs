//! Cached auto-translation store: the target locale per user/channel
//! pair. Keys are `"lang:<user_id>:<channel_id>"` so a user's entries
//! can be found by prefix scan when their language settings change.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::CacheError;
use crate::store::{AutoTranslationStore, StoreResult};

use super::LayerCore;

pub(super) struct CachedAutoTranslationStore {
    core: Arc<LayerCore>,
}

impl CachedAutoTranslationStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }

    fn locale_key(user_id: &str, channel_id: &str) -> String {
        format!("lang:{user_id}:{channel_id}")
    }
}

#[async_trait]
impl AutoTranslationStore for CachedAutoTranslationStore {
    async fn get_channel_locale(
        &self,
        user_id: &str,
        channel_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<String> {
        let key = Self::locale_key(user_id, channel_id);
        if allow_from_cache {
            if let Some(locale) = self.core.cache_get(&self.core.user_locales, &key) {
                return Ok(locale);
            }
        }
        let locale = self
            .core
            .base
            .auto_translation()
            .get_channel_locale(user_id, channel_id, allow_from_cache)
            .await?;
        // Empty means translation is off for the pair; not worth a slot.
        if !locale.is_empty() {
            self.core.cache_set(&self.core.user_locales, &key, locale.clone());
        }
        Ok(locale)
    }

    async fn set_channel_locale(
        &self,
        user_id: &str,
        channel_id: &str,
        locale: &str,
    ) -> StoreResult<()> {
        self.core
            .base
            .auto_translation()
            .set_channel_locale(user_id, channel_id, locale)
            .await?;
        self.core
            .invalidate_key(&self.core.user_locales, &Self::locale_key(user_id, channel_id));
        Ok(())
    }

    fn invalidate_user_locale_cache(&self, user_id: &str) {
        // One entry per channel the user configured; find them by prefix.
        let prefix = format!("lang:{user_id}:");
        let mut affected = Vec::new();
        let scanned = self.core.user_locales.scan(|keys| {
            affected.extend(keys.iter().filter(|key| key.starts_with(&prefix)).cloned());
            Ok::<(), CacheError>(())
        });
        match scanned {
            Ok(()) => {
                for key in &affected {
                    self.core.invalidate_key(&self.core.user_locales, key);
                }
            }
            Err(_) => self.core.clear_cache(&self.core.user_locales),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cluster::events;
    use crate::localcache::testutil::harness;
    use crate::store::Store;

    #[tokio::test]
    async fn test_locale_reads_through() {
        let h = harness();
        h.base.set_locale("u1", "c1", "de");

        let locale = h
            .layer
            .auto_translation()
            .get_channel_locale("u1", "c1", true)
            .await
            .unwrap();
        assert_eq!(locale, "de");
        h.layer
            .auto_translation()
            .get_channel_locale("u1", "c1", true)
            .await
            .unwrap();
        assert_eq!(h.base.calls("auto_translation.get_channel_locale"), 1);
    }

    #[tokio::test]
    async fn test_empty_locale_is_not_cached() {
        let h = harness();

        let locale = h
            .layer
            .auto_translation()
            .get_channel_locale("u1", "c1", true)
            .await
            .unwrap();
        assert_eq!(locale, "");
        h.layer
            .auto_translation()
            .get_channel_locale("u1", "c1", true)
            .await
            .unwrap();
        assert_eq!(h.base.calls("auto_translation.get_channel_locale"), 2);
    }

    #[tokio::test]
    async fn test_set_locale_invalidates_the_pair() {
        let h = harness();
        h.base.set_locale("u1", "c1", "de");
        h.layer
            .auto_translation()
            .get_channel_locale("u1", "c1", true)
            .await
            .unwrap();

        h.layer
            .auto_translation()
            .set_channel_locale("u1", "c1", "fr")
            .await
            .unwrap();

        let locale = h
            .layer
            .auto_translation()
            .get_channel_locale("u1", "c1", true)
            .await
            .unwrap();
        assert_eq!(locale, "fr");
        assert!(h.bus.take_published().iter().any(|m| {
            m.event == events::INVALIDATE_USER_LOCALES && m.key() == Some("lang:u1:c1")
        }));
    }

    #[tokio::test]
    async fn test_invalidate_user_locale_cache_targets_one_user() {
        let h = harness();
        h.base.set_locale("u1", "c1", "de");
        h.base.set_locale("u1", "c2", "de");
        h.base.set_locale("u2", "c1", "fr");
        h.layer
            .auto_translation()
            .get_channel_locale("u1", "c1", true)
            .await
            .unwrap();
        h.layer
            .auto_translation()
            .get_channel_locale("u1", "c2", true)
            .await
            .unwrap();
        h.layer
            .auto_translation()
            .get_channel_locale("u2", "c1", true)
            .await
            .unwrap();

        h.layer.auto_translation().invalidate_user_locale_cache("u1");

        // u1 entries refetch, u2 still cached.
        h.layer
            .auto_translation()
            .get_channel_locale("u1", "c1", true)
            .await
            .unwrap();
        h.layer
            .auto_translation()
            .get_channel_locale("u1", "c2", true)
            .await
            .unwrap();
        h.layer
            .auto_translation()
            .get_channel_locale("u2", "c1", true)
            .await
            .unwrap();
        assert_eq!(h.base.calls("auto_translation.get_channel_locale"), 5);
    }
}
