//! Cached role store: roles by name plus the higher-scoped channel
//! permission sets derived from them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{Role, RolePermissions};
use crate::store::{RoleStore, StoreResult};

use super::LayerCore;

pub(super) struct CachedRoleStore {
    core: Arc<LayerCore>,
}

impl CachedRoleStore {
    pub(super) fn new(core: Arc<LayerCore>) -> Self {
        Self { core }
    }

    /// A role write changes what any permission set derived from it
    /// grants, and the derivation key is not recoverable from the role.
    fn invalidate_role(&self, name: &str) {
        self.core.invalidate_key(&self.core.role_by_name, name);
        self.core.clear_cache(&self.core.role_permissions);
    }
}

#[async_trait]
impl RoleStore for CachedRoleStore {
    async fn get_by_name(&self, name: &str) -> StoreResult<Role> {
        if let Some(role) = self.core.cache_get(&self.core.role_by_name, name) {
            return Ok(role);
        }
        let role = self.core.base.role().get_by_name(name).await?;
        self.core.cache_set(&self.core.role_by_name, name, role.clone());
        Ok(role)
    }

    async fn get_by_names(&self, names: &[String]) -> StoreResult<Vec<Role>> {
        let mut found = Vec::with_capacity(names.len());
        let mut remaining = Vec::new();
        for (name, cached) in names.iter().zip(self.core.role_by_name.multi_get(names)) {
            match cached {
                Ok(role) => {
                    self.core.metrics.cache_hit(self.core.role_by_name.name());
                    found.push(role);
                }
                Err(_) => {
                    self.core.metrics.cache_miss(self.core.role_by_name.name());
                    remaining.push(name.clone());
                }
            }
        }
        if !remaining.is_empty() {
            let fetched = self.core.base.role().get_by_names(&remaining).await?;
            for role in fetched {
                self.core.cache_set(&self.core.role_by_name, &role.name, role.clone());
                found.push(role);
            }
        }
        Ok(found)
    }

    async fn save(&self, role: &Role) -> StoreResult<Role> {
        let saved = self.core.base.role().save(role).await?;
        self.invalidate_role(&saved.name);
        Ok(saved)
    }

    async fn delete(&self, role_id: &str) -> StoreResult<Role> {
        let deleted = self.core.base.role().delete(role_id).await?;
        self.invalidate_role(&deleted.name);
        Ok(deleted)
    }

    async fn permanent_delete_all(&self) -> StoreResult<()> {
        self.core.base.role().permanent_delete_all().await?;
        self.core.clear_cache(&self.core.role_by_name);
        self.core.clear_cache(&self.core.role_permissions);
        Ok(())
    }

    async fn channel_higher_scoped_permissions(
        &self,
        role_names: &[String],
    ) -> StoreResult<HashMap<String, RolePermissions>> {
        let mut sorted = role_names.to_vec();
        sorted.sort();
        let key = sorted.join("/");

        if let Some(permissions) = self.core.cache_get(&self.core.role_permissions, &key) {
            return Ok(permissions);
        }
        let permissions = self
            .core
            .base
            .role()
            .channel_higher_scoped_permissions(role_names)
            .await?;
        self.core
            .cache_set(&self.core.role_permissions, &key, permissions.clone());
        Ok(permissions)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::cluster::events;
    use crate::localcache::testutil::harness;
    use crate::model::{Role, RolePermissions};
    use crate::store::Store;

    #[tokio::test]
    async fn test_get_by_name_reads_through() {
        let h = harness();
        h.base.put_role(Role::new("r1", "channel_user"));

        h.layer.role().get_by_name("channel_user").await.unwrap();
        h.layer.role().get_by_name("channel_user").await.unwrap();
        assert_eq!(h.base.calls("role.get_by_name"), 1);
    }

    #[tokio::test]
    async fn test_get_by_names_fetches_only_misses() {
        let h = harness();
        h.base.put_role(Role::new("r1", "channel_user"));
        h.base.put_role(Role::new("r2", "channel_admin"));

        h.layer.role().get_by_name("channel_user").await.unwrap();

        let names = vec!["channel_user".to_string(), "channel_admin".to_string()];
        let roles = h.layer.role().get_by_names(&names).await.unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(
            h.base.last_ids("role.get_by_names"),
            vec!["channel_admin".to_string()]
        );
    }

    #[tokio::test]
    async fn test_save_invalidates_role_and_derived_permissions() {
        let h = harness();
        let role = Role::new("r1", "channel_user");
        h.base.put_role(role.clone());
        h.base.put_higher_scoped_permissions(
            &["channel_user".to_string()],
            HashMap::from([("channel_user".to_string(), RolePermissions::default())]),
        );

        h.layer.role().get_by_name("channel_user").await.unwrap();
        h.layer
            .role()
            .channel_higher_scoped_permissions(&["channel_user".to_string()])
            .await
            .unwrap();

        h.layer.role().save(&role).await.unwrap();

        h.layer.role().get_by_name("channel_user").await.unwrap();
        h.layer
            .role()
            .channel_higher_scoped_permissions(&["channel_user".to_string()])
            .await
            .unwrap();
        assert_eq!(h.base.calls("role.get_by_name"), 2);
        assert_eq!(h.base.calls("role.channel_higher_scoped_permissions"), 2);

        let published = h.bus.take_published();
        assert!(published
            .iter()
            .any(|m| m.event == events::INVALIDATE_ROLES && m.key() == Some("channel_user")));
        assert!(published
            .iter()
            .any(|m| m.event == events::INVALIDATE_ROLE_PERMISSIONS && m.is_clear()));
    }

    #[tokio::test]
    async fn test_higher_scoped_permissions_key_is_order_insensitive() {
        let h = harness();
        let names = vec!["a".to_string(), "b".to_string()];
        h.base
            .put_higher_scoped_permissions(&names, HashMap::new());

        h.layer
            .role()
            .channel_higher_scoped_permissions(&names)
            .await
            .unwrap();
        let reversed = vec!["b".to_string(), "a".to_string()];
        h.layer
            .role()
            .channel_higher_scoped_permissions(&reversed)
            .await
            .unwrap();
        assert_eq!(h.base.calls("role.channel_higher_scoped_permissions"), 1);
    }

    #[tokio::test]
    async fn test_permanent_delete_all_purges_both_caches() {
        let h = harness();
        h.base.put_role(Role::new("r1", "channel_user"));
        h.layer.role().get_by_name("channel_user").await.unwrap();

        h.layer.role().permanent_delete_all().await.unwrap();

        assert!(h.layer.role().get_by_name("channel_user").await.is_err());
        let published = h.bus.take_published();
        assert!(published
            .iter()
            .any(|m| m.event == events::INVALIDATE_ROLES && m.is_clear()));
    }
}
