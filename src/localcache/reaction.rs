//! Cached reaction store: reaction lists per post.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::Reaction;
use crate::store::{ReactionStore, StoreResult};

use super::LayerCore;

pub(super) struct CachedReactionStore {
    core: Arc<LayerCore>,
}

impl CachedReactionStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl ReactionStore for CachedReactionStore {
    async fn get_for_post(
        &self,
        post_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<Vec<Reaction>> {
        if allow_from_cache {
            if let Some(reactions) = self.core.cache_get(&self.core.reactions, post_id) {
                return Ok(reactions);
            }
        }
        let reactions = self
            .core
            .base
            .reaction()
            .get_for_post(post_id, allow_from_cache)
            .await?;
        self.core.cache_set(&self.core.reactions, post_id, reactions.clone());
        Ok(reactions)
    }

    async fn save(&self, reaction: &Reaction) -> StoreResult<Reaction> {
        let saved = self.core.base.reaction().save(reaction).await?;
        self.core.invalidate_key(&self.core.reactions, &reaction.post_id);
        Ok(saved)
    }

    async fn delete(&self, reaction: &Reaction) -> StoreResult<Reaction> {
        let deleted = self.core.base.reaction().delete(reaction).await?;
        self.core.invalidate_key(&self.core.reactions, &reaction.post_id);
        Ok(deleted)
    }

    async fn delete_all_with_emoji_name(&self, emoji_name: &str) -> StoreResult<()> {
        self.core
            .base
            .reaction()
            .delete_all_with_emoji_name(emoji_name)
            .await?;
        // The set of posts that used the emoji is unknown here.
        self.core.clear_cache(&self.core.reactions);
        Ok(())
    }
}
