//! Channel data model.

use serde::{Deserialize, Serialize};

/// A message channel inside a team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel ID.
    pub id: String,
    /// Owning team ID.
    pub team_id: String,
    /// URL-safe channel name.
    pub name: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Channel type ("O" open, "P" private, "D" direct, "G" group).
    pub channel_type: String,
    /// Creation time (epoch millis).
    pub create_at: i64,
    /// Last update time (epoch millis).
    pub update_at: i64,
    /// Deletion time, 0 if live.
    pub delete_at: i64,
}

impl Channel {
    pub fn new(id: impl Into<String>, team_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = super::now_millis();
        Self {
            id: id.into(),
            team_id: team_id.into(),
            name: name.into(),
            display_name: String::new(),
            channel_type: "O".to_string(),
            create_at: now,
            update_at: now,
            delete_at: 0,
        }
    }
}

/// Membership of one user in one channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelMember {
    /// Channel ID.
    pub channel_id: String,
    /// User ID.
    pub user_id: String,
    /// Comma-separated role names inside the channel.
    pub roles: String,
    /// Last time the member viewed the channel (epoch millis).
    pub last_viewed_at: i64,
    /// Whether the member is a guest account.
    pub is_guest: bool,
}

impl ChannelMember {
    pub fn new(channel_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            roles: String::new(),
            last_viewed_at: 0,
            is_guest: false,
        }
    }
}
