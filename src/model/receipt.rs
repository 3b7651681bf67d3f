//! Read receipt data model.

use serde::{Deserialize, Serialize};

/// A record that one user has read one post.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadReceipt {
    /// Post that was read.
    pub post_id: String,
    /// Reading user ID.
    pub user_id: String,
    /// Read time (epoch millis).
    pub read_at: i64,
}

impl ReadReceipt {
    pub fn new(post_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            user_id: user_id.into(),
            read_at: super::now_millis(),
        }
    }

    /// Cache key for this receipt, `"<post_id>:<user_id>"`.
    pub fn cache_key(&self) -> String {
        Self::key_for(&self.post_id, &self.user_id)
    }

    /// Cache key for a (post, user) pair.
    pub fn key_for(post_id: &str, user_id: &str) -> String {
        format!("{post_id}:{user_id}")
    }
}
