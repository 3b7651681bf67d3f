//! User data model and profile query options.

use serde::{Deserialize, Serialize};

/// A platform user profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: String,
    /// Login name (lowercase).
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display nickname.
    pub nickname: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Comma-separated system role names.
    pub roles: String,
    /// Preferred locale, e.g. "en".
    pub locale: String,
    /// Creation time (epoch millis).
    pub create_at: i64,
    /// Last profile update time (epoch millis).
    pub update_at: i64,
    /// Deactivation time, 0 if active.
    pub delete_at: i64,
    /// Consecutive failed login attempts.
    pub failed_attempts: i32,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        let now = super::now_millis();
        Self {
            id: id.into(),
            username: username.into(),
            email: String::new(),
            nickname: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            roles: "system_user".to_string(),
            locale: "en".to_string(),
            create_at: now,
            update_at: now,
            delete_at: 0,
            failed_attempts: 0,
        }
    }
}

/// Options for profile list queries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserGetOptions {
    /// Restrict to profiles inside this team ("" = all).
    pub in_team_id: String,
    /// Restrict to profiles inside this channel ("" = all).
    pub in_channel_id: String,
    /// Restrict to profiles with this role ("" = all).
    pub role: String,
    /// Only profiles updated after this time (epoch millis, 0 = all).
    pub since: i64,
    /// Include deactivated profiles.
    pub inactive: bool,
    /// Page index.
    pub page: usize,
    /// Page size.
    pub per_page: usize,
}

impl UserGetOptions {
    /// True when no filter narrows the result set.
    ///
    /// The all-profiles cache is only valid for unfiltered page-0 queries;
    /// keep the condition here so there is exactly one definition of it.
    pub fn is_unfiltered(&self) -> bool {
        self.in_team_id.is_empty()
            && self.in_channel_id.is_empty()
            && self.role.is_empty()
            && self.since == 0
            && !self.inactive
    }
}
