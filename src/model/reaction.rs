//! Post reaction data model.

use serde::{Deserialize, Serialize};

/// One user's emoji reaction to one post.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Reacting user ID.
    pub user_id: String,
    /// Post being reacted to.
    pub post_id: String,
    /// Emoji name (system or custom).
    pub emoji_name: String,
    /// Creation time (epoch millis).
    pub create_at: i64,
}

impl Reaction {
    pub fn new(
        user_id: impl Into<String>,
        post_id: impl Into<String>,
        emoji_name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            post_id: post_id.into(),
            emoji_name: emoji_name.into(),
            create_at: super::now_millis(),
        }
    }
}
