//! Custom emoji data model and the builtin system-emoji table.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A custom emoji uploaded by a user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Emoji {
    /// Emoji ID.
    pub id: String,
    /// Unique emoji name (what users type between colons).
    pub name: String,
    /// Uploading user ID.
    pub creator_id: String,
    /// Creation time (epoch millis).
    pub create_at: i64,
    /// Deletion time, 0 if live.
    pub delete_at: i64,
}

impl Emoji {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            creator_id: String::new(),
            create_at: super::now_millis(),
            delete_at: 0,
        }
    }
}

/// Builtin emoji shipped with the platform. These are never stored and
/// their ID equals their name.
static SYSTEM_EMOJIS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        "smile",
        "wave",
        "+1",
        "-1",
        "heart",
        "fire",
        "tada",
        "joy",
        "thinking_face",
        "eyes",
        "rocket",
        "white_check_mark",
        "x",
        "100",
    ]
    .into_iter()
    .map(|name| (name, name))
    .collect()
});

/// Resolve a system emoji name to its ID, or `None` for custom emoji.
pub fn system_emoji_id(name: &str) -> Option<&'static str> {
    SYSTEM_EMOJIS.get(name).copied()
}
