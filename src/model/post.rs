//! Post data model and post query options.

use serde::{Deserialize, Serialize};

/// A message posted to a channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Post ID.
    pub id: String,
    /// Channel the post belongs to.
    pub channel_id: String,
    /// Authoring user ID.
    pub user_id: String,
    /// Message body.
    pub message: String,
    /// Root post ID when this is a thread reply ("" for roots).
    pub root_id: String,
    /// Creation time (epoch millis).
    pub create_at: i64,
    /// Last edit time (epoch millis).
    pub update_at: i64,
    /// Deletion time, 0 if live.
    pub delete_at: i64,
}

impl Post {
    pub fn new(id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        let now = super::now_millis();
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            user_id: String::new(),
            message: String::new(),
            root_id: String::new(),
            create_at: now,
            update_at: now,
            delete_at: 0,
        }
    }
}

/// An ordered list of posts as returned by post queries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PostList {
    /// Post IDs in display order (newest first).
    pub order: Vec<String>,
    /// Posts keyed by ID.
    pub posts: std::collections::HashMap<String, Post>,
}

impl PostList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty() && self.posts.is_empty()
    }

    /// Add a post, appending its ID to the order.
    pub fn add(&mut self, post: Post) {
        self.order.push(post.id.clone());
        self.posts.insert(post.id.clone(), post);
    }

    /// The largest `update_at` across contained posts, 0 when empty.
    pub fn latest_update_at(&self) -> i64 {
        self.posts.values().map(|p| p.update_at).max().unwrap_or(0)
    }
}

/// Options for [`PostStore::get_posts_since`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PostsSinceOptions {
    /// Channel to read from.
    pub channel_id: String,
    /// Only posts updated strictly after this time (epoch millis).
    pub time: i64,
    /// Whether thread following data should be skipped.
    pub skip_fetch_threads: bool,
}

/// Options for [`PostStore::get_posts`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GetPostsOptions {
    /// Channel to read from.
    pub channel_id: String,
    /// Page index.
    pub page: usize,
    /// Page size.
    pub per_page: usize,
    /// Collapse thread replies out of the main timeline.
    pub collapsed_threads: bool,
}

/// Filters for [`PostStore::analytics_post_count`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PostCountOptions {
    /// Restrict to one team ("" = all).
    pub team_id: String,
    /// Only posts with file attachments.
    pub must_have_file: bool,
    /// Only posts with hashtags.
    pub must_have_hashtag: bool,
    /// Exclude deleted posts.
    pub exclude_deleted: bool,
    /// Only user-authored posts (no system messages).
    pub users_posts_only: bool,
    /// Whether a cached total may be served.
    pub allow_from_cache: bool,
}

impl PostCountOptions {
    /// The one filter combination the usage cache stores: the platform-wide
    /// user-post total that the admin console polls.
    pub fn is_cacheable_usage_count(&self) -> bool {
        self.allow_from_cache
            && self.exclude_deleted
            && self.users_posts_only
            && self.team_id.is_empty()
            && !self.must_have_file
            && !self.must_have_hashtag
    }
}

/// A short-lived post that expires without moderation action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemporaryPost {
    /// ID of the backing post.
    pub post_id: String,
    /// Channel the post belongs to.
    pub channel_id: String,
    /// Time at which the post expires (epoch millis).
    pub expire_at: i64,
}
