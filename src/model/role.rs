//! Role data model.

use serde::{Deserialize, Serialize};

/// A named role granting a set of permissions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Role ID.
    pub id: String,
    /// Unique role name, e.g. "channel_admin".
    pub name: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Permission IDs granted by this role.
    pub permissions: Vec<String>,
    /// Whether the role belongs to a scheme.
    pub scheme_managed: bool,
    /// Whether the role is built in and cannot be deleted.
    pub built_in: bool,
    /// Deletion time, 0 if live.
    pub delete_at: i64,
}

impl Role {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: String::new(),
            permissions: Vec::new(),
            scheme_managed: false,
            built_in: false,
            delete_at: 0,
        }
    }
}

/// Permissions granted by a higher-scoped (team/system) role set to a
/// channel, keyed during lookup by the sorted role-name list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RolePermissions {
    /// ID of the guest role inside the set, if any.
    pub guest_role_id: String,
    /// ID of the member role inside the set, if any.
    pub user_role_id: String,
    /// ID of the admin role inside the set, if any.
    pub admin_role_id: String,
    /// Union of permission IDs.
    pub permissions: Vec<String>,
}
