//! Cluster event names, one per cache.
//!
//! The layer owns this namespace; the bus treats event names as opaque
//! strings.

pub const INVALIDATE_CHANNELS: &str = "inv_channels";
pub const INVALIDATE_CHANNEL_MEMBER_COUNTS: &str = "inv_channel_member_counts";
pub const INVALIDATE_CHANNEL_GUEST_COUNTS: &str = "inv_channel_guest_counts";
pub const INVALIDATE_CHANNEL_PINNED_POST_COUNTS: &str = "inv_channel_pinned_post_counts";
pub const INVALIDATE_USERS: &str = "inv_users";
pub const INVALIDATE_PROFILES_IN_CHANNEL: &str = "inv_profiles_in_channel";
pub const INVALIDATE_ALL_PROFILES: &str = "inv_all_profiles";
pub const INVALIDATE_ROLES: &str = "inv_roles";
pub const INVALIDATE_ROLE_PERMISSIONS: &str = "inv_role_permissions";
pub const INVALIDATE_SCHEMES: &str = "inv_schemes";
pub const INVALIDATE_EMOJIS_BY_ID: &str = "inv_emojis_by_id";
pub const INVALIDATE_EMOJIS_ID_BY_NAME: &str = "inv_emojis_id_by_name";
pub const INVALIDATE_LAST_POST_TIMES: &str = "inv_last_post_times";
pub const INVALIDATE_LAST_POSTS: &str = "inv_last_posts";
pub const INVALIDATE_POSTS_USAGE: &str = "inv_posts_usage";
pub const INVALIDATE_FILE_INFOS: &str = "inv_file_infos";
pub const INVALIDATE_FILE_STORAGE_USAGE: &str = "inv_file_storage_usage";
pub const INVALIDATE_REACTIONS: &str = "inv_reactions";
pub const INVALIDATE_TEAM_IDS_FOR_USER: &str = "inv_team_ids_for_user";
pub const INVALIDATE_TERMS_OF_SERVICE: &str = "inv_terms_of_service";
pub const INVALIDATE_USER_TERMS_OF_SERVICE: &str = "inv_user_terms_of_service";
pub const INVALIDATE_WEBHOOKS: &str = "inv_webhooks";
pub const INVALIDATE_TEMPORARY_POSTS: &str = "inv_temporary_posts";
pub const INVALIDATE_READ_RECEIPTS: &str = "inv_read_receipts";
pub const INVALIDATE_CONTENT_FLAGS: &str = "inv_content_flags";
pub const INVALIDATE_USER_LOCALES: &str = "inv_user_locales";
