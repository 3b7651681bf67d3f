//! Permission scheme data model.

use serde::{Deserialize, Serialize};

/// A scheme bundling the default roles for a team or channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    /// Scheme ID.
    pub id: String,
    /// Unique scheme name.
    pub name: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Scope, "team" or "channel".
    pub scope: String,
    /// Default admin role name inside this scheme.
    pub default_admin_role: String,
    /// Default member role name inside this scheme.
    pub default_user_role: String,
    /// Deletion time, 0 if live.
    pub delete_at: i64,
}

impl Scheme {
    pub fn new(id: impl Into<String>, name: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: String::new(),
            scope: scope.into(),
            default_admin_role: String::new(),
            default_user_role: String::new(),
            delete_at: 0,
        }
    }
}
