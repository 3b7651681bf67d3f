//! File attachment metadata.

use serde::{Deserialize, Serialize};

/// Metadata for one uploaded file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// File ID.
    pub id: String,
    /// Post the file is attached to ("" while pending).
    pub post_id: String,
    /// Uploading user ID.
    pub creator_id: String,
    /// Original file name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Creation time (epoch millis).
    pub create_at: i64,
    /// Deletion time, 0 if live.
    pub delete_at: i64,
}

impl FileInfo {
    pub fn new(id: impl Into<String>, post_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            post_id: post_id.into(),
            creator_id: String::new(),
            name: String::new(),
            mime_type: String::new(),
            size: 0,
            create_at: super::now_millis(),
            delete_at: 0,
        }
    }
}
