//! Entity types shared by the base store and the cache layer.
//!
//! Everything here is owned data with `Clone + Serialize + Deserialize`,
//! so a clone is a deep copy and cached values can never alias caller
//! state. Timestamps are epoch milliseconds (`i64`).

mod channel;
mod emoji;
mod file_info;
mod moderation;
mod post;
mod reaction;
mod receipt;
mod role;
mod scheme;
mod team;
mod terms;
mod user;
mod webhook;

pub use channel::{Channel, ChannelMember};
pub use emoji::{Emoji, system_emoji_id};
pub use file_info::FileInfo;
pub use moderation::ContentFlag;
pub use post::{GetPostsOptions, Post, PostCountOptions, PostList, PostsSinceOptions, TemporaryPost};
pub use reaction::Reaction;
pub use receipt::ReadReceipt;
pub use role::{Role, RolePermissions};
pub use scheme::Scheme;
pub use team::TeamMember;
pub use terms::{TermsOfService, UserTermsOfService};
pub use user::{User, UserGetOptions};
pub use webhook::IncomingWebhook;

/// Platform schema version, used as the prefix of synthesized etags.
pub const CURRENT_VERSION: &str = "7.0.0";

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
