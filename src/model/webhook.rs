//! Incoming webhook data model.

use serde::{Deserialize, Serialize};

/// An incoming webhook that lets external services post into a channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncomingWebhook {
    /// Webhook ID (also the URL token).
    pub id: String,
    /// Target channel ID.
    pub channel_id: String,
    /// Owning team ID.
    pub team_id: String,
    /// Creating user ID.
    pub user_id: String,
    /// Display name shown on posted messages.
    pub display_name: String,
    /// Creation time (epoch millis).
    pub create_at: i64,
    /// Deletion time, 0 if live.
    pub delete_at: i64,
}

impl IncomingWebhook {
    pub fn new(id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            team_id: String::new(),
            user_id: String::new(),
            display_name: String::new(),
            create_at: super::now_millis(),
            delete_at: 0,
        }
    }
}
