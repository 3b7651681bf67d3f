//! Content moderation data model.

use serde::{Deserialize, Serialize};

/// Moderation state attached to a flagged post.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentFlag {
    /// Flagged post ID.
    pub post_id: String,
    /// Reporting user ID.
    pub reporter_id: String,
    /// Moderation status ("pending", "retained", "removed").
    pub status: String,
    /// Free-form reason supplied by the reporter.
    pub reason: String,
    /// Flagging time (epoch millis).
    pub create_at: i64,
}

impl ContentFlag {
    pub fn new(post_id: impl Into<String>, reporter_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            reporter_id: reporter_id.into(),
            status: "pending".to_string(),
            reason: String::new(),
            create_at: super::now_millis(),
        }
    }
}
