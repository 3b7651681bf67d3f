//! Cached team store: team-id lists per user.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::TeamMember;
use crate::store::{StoreResult, TeamStore};

use super::LayerCore;

pub(super) struct CachedTeamStore {
    core: Arc<LayerCore>,
}

impl CachedTeamStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl TeamStore for CachedTeamStore {
    async fn get_user_team_ids(
        &self,
        user_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<Vec<String>> {
        if allow_from_cache {
            if let Some(ids) = self.core.cache_get(&self.core.team_ids_for_user, user_id) {
                return Ok(ids);
            }
        }
        let ids = self
            .core
            .base
            .team()
            .get_user_team_ids(user_id, allow_from_cache)
            .await?;
        self.core.cache_set(&self.core.team_ids_for_user, user_id, ids.clone());
        Ok(ids)
    }

    async fn save_member(&self, member: &TeamMember) -> StoreResult<TeamMember> {
        let saved = self.core.base.team().save_member(member).await?;
        self.invalidate_all_team_ids_for_user(&member.user_id);
        Ok(saved)
    }

    async fn remove_member(&self, team_id: &str, user_id: &str) -> StoreResult<()> {
        self.core.base.team().remove_member(team_id, user_id).await?;
        self.invalidate_all_team_ids_for_user(user_id);
        Ok(())
    }

    fn invalidate_all_team_ids_for_user(&self, user_id: &str) {
        self.core.invalidate_key(&self.core.team_ids_for_user, user_id);
    }
}

#[cfg(test)]
mod tests {
    use crate::cluster::events;
    use crate::localcache::testutil::harness;
    use crate::model::TeamMember;
    use crate::store::Store;

    #[tokio::test]
    async fn test_team_ids_read_through() {
        let h = harness();
        h.base.set_team_ids("u1", vec!["t1".to_string(), "t2".to_string()]);

        let ids = h.layer.team().get_user_team_ids("u1", true).await.unwrap();
        assert_eq!(ids.len(), 2);
        h.layer.team().get_user_team_ids("u1", true).await.unwrap();
        assert_eq!(h.base.calls("team.get_user_team_ids"), 1);
    }

    #[tokio::test]
    async fn test_save_member_invalidates_the_users_list() {
        let h = harness();
        h.base.set_team_ids("u1", vec!["t1".to_string()]);
        h.layer.team().get_user_team_ids("u1", true).await.unwrap();

        h.layer
            .team()
            .save_member(&TeamMember::new("t2", "u1"))
            .await
            .unwrap();

        h.base.set_team_ids("u1", vec!["t1".to_string(), "t2".to_string()]);
        let ids = h.layer.team().get_user_team_ids("u1", true).await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(h.bus.take_published().iter().any(|m| {
            m.event == events::INVALIDATE_TEAM_IDS_FOR_USER && m.key() == Some("u1")
        }));
    }

    #[tokio::test]
    async fn test_remove_member_invalidates_and_publishes() {
        let h = harness();
        h.base.set_team_ids("u1", vec!["t1".to_string(), "t2".to_string()]);
        h.layer.team().get_user_team_ids("u1", true).await.unwrap();

        h.layer.team().remove_member("t2", "u1").await.unwrap();

        h.base.set_team_ids("u1", vec!["t1".to_string()]);
        let ids = h.layer.team().get_user_team_ids("u1", true).await.unwrap();
        assert_eq!(ids, vec!["t1".to_string()]);
        assert!(h.bus.take_published().iter().any(|m| {
            m.event == events::INVALIDATE_TEAM_IDS_FOR_USER && m.key() == Some("u1")
        }));
    }

    #[tokio::test]
    async fn test_cluster_key_message_removes_entry() {
        use crate::cluster::ClusterMessage;

        let h = harness();
        h.base.set_team_ids("u1", vec!["t1".to_string()]);
        h.layer.team().get_user_team_ids("u1", true).await.unwrap();

        h.bus.deliver(
            &ClusterMessage::invalidate(events::INVALIDATE_TEAM_IDS_FOR_USER, "u1").unwrap(),
        );

        h.layer.team().get_user_team_ids("u1", true).await.unwrap();
        assert_eq!(h.base.calls("team.get_user_team_ids"), 2);
    }

    #[tokio::test]
    async fn test_forced_read_refreshes_the_cache() {
        let h = harness();
        h.base.set_team_ids("u1", vec!["t1".to_string()]);
        h.layer.team().get_user_team_ids("u1", true).await.unwrap();

        h.base.set_team_ids("u1", vec!["t1".to_string(), "t2".to_string()]);
        let forced = h.layer.team().get_user_team_ids("u1", false).await.unwrap();
        assert_eq!(forced.len(), 2);

        let cached = h.layer.team().get_user_team_ids("u1", true).await.unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(h.base.calls("team.get_user_team_ids"), 2);
    }
}
