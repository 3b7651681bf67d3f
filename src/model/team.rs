//! Team membership data model.
//!
//! Teams themselves never pass through the cache layer; only the
//! membership writes that invalidate per-user team-id lists do.

use serde::{Deserialize, Serialize};

/// Membership of one user in one team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Team ID.
    pub team_id: String,
    /// User ID.
    pub user_id: String,
    /// Comma-separated role names inside the team.
    pub roles: String,
    /// Deletion time, 0 if live.
    pub delete_at: i64,
}

impl TeamMember {
    pub fn new(team_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            user_id: user_id.into(),
            roles: String::new(),
            delete_at: 0,
        }
    }
}
