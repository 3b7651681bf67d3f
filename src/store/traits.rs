//! Sub-store traits, one per entity kind.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::model::{
    Channel, ChannelMember, ContentFlag, Emoji, FileInfo, GetPostsOptions, IncomingWebhook,
    Post, PostCountOptions, PostList, PostsSinceOptions, ReadReceipt, Reaction, Role,
    RolePermissions, Scheme, TeamMember, TemporaryPost, TermsOfService, User, UserGetOptions,
    UserTermsOfService,
};

use super::{RequestContext, StoreResult};

/// The authoritative store, one accessor per sub-store.
///
/// Implementations must be thread-safe; every operation is callable from
/// any task.
pub trait Store: Send + Sync {
    fn channel(&self) -> &dyn ChannelStore;
    fn user(&self) -> &dyn UserStore;
    fn role(&self) -> &dyn RoleStore;
    fn scheme(&self) -> &dyn SchemeStore;
    fn emoji(&self) -> &dyn EmojiStore;
    fn post(&self) -> &dyn PostStore;
    fn file_info(&self) -> &dyn FileInfoStore;
    fn reaction(&self) -> &dyn ReactionStore;
    fn team(&self) -> &dyn TeamStore;
    fn terms_of_service(&self) -> &dyn TermsOfServiceStore;
    fn user_terms_of_service(&self) -> &dyn UserTermsOfServiceStore;
    fn webhook(&self) -> &dyn WebhookStore;
    fn temporary_post(&self) -> &dyn TemporaryPostStore;
    fn read_receipt(&self) -> &dyn ReadReceiptStore;
    fn content_flagging(&self) -> &dyn ContentFlaggingStore;
    fn auto_translation(&self) -> &dyn AutoTranslationStore;
}

#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn get(&self, ctx: RequestContext, id: &str) -> StoreResult<Channel>;

    /// Fetch several channels at once. Order of the result is unspecified.
    async fn get_many(&self, ctx: RequestContext, ids: &[String]) -> StoreResult<Vec<Channel>>;

    async fn save_member(&self, member: &ChannelMember) -> StoreResult<ChannelMember>;
    async fn save_multiple_members(
        &self,
        members: &[ChannelMember],
    ) -> StoreResult<Vec<ChannelMember>>;
    async fn update_member(&self, member: &ChannelMember) -> StoreResult<ChannelMember>;
    async fn update_multiple_members(
        &self,
        members: &[ChannelMember],
    ) -> StoreResult<Vec<ChannelMember>>;
    async fn remove_member(&self, channel_id: &str, user_id: &str) -> StoreResult<()>;
    async fn remove_members(&self, channel_id: &str, user_ids: &[String]) -> StoreResult<()>;

    async fn get_member_count(&self, channel_id: &str, allow_from_cache: bool)
        -> StoreResult<i64>;
    async fn get_guest_count(&self, channel_id: &str, allow_from_cache: bool) -> StoreResult<i64>;
    async fn get_pinned_post_count(
        &self,
        channel_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<i64>;

    fn invalidate_channel(&self, id: &str);
    fn invalidate_member_count(&self, channel_id: &str);
    fn invalidate_guest_count(&self, channel_id: &str);
    fn invalidate_pinned_post_count(&self, channel_id: &str);
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, ctx: RequestContext, id: &str) -> StoreResult<User>;

    /// Fetch several profiles at once. Callers may pass duplicates; the
    /// decorated implementation deduplicates before touching cache or base.
    async fn get_many(&self, ctx: RequestContext, ids: &[String]) -> StoreResult<Vec<User>>;

    /// Fetch the profiles in `ids` that pass `options` (notably
    /// `options.since`: only profiles updated after that time).
    async fn get_profile_by_ids(
        &self,
        ctx: RequestContext,
        ids: &[String],
        options: &UserGetOptions,
        allow_from_cache: bool,
    ) -> StoreResult<Vec<User>>;

    async fn get_all_profiles_in_channel(
        &self,
        ctx: RequestContext,
        channel_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<HashMap<String, User>>;

    async fn get_all_profiles(&self, options: &UserGetOptions) -> StoreResult<Vec<User>>;

    async fn update_failed_password_attempts(
        &self,
        user_id: &str,
        attempts: i32,
    ) -> StoreResult<()>;

    fn invalidate_profile_cache_for_user(&self, user_id: &str);
    fn invalidate_profiles_in_channel_cache(&self, channel_id: &str);
    fn invalidate_profiles_in_channel_cache_by_user(&self, user_id: &str);
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn get_by_name(&self, name: &str) -> StoreResult<Role>;
    async fn get_by_names(&self, names: &[String]) -> StoreResult<Vec<Role>>;
    async fn save(&self, role: &Role) -> StoreResult<Role>;
    async fn delete(&self, role_id: &str) -> StoreResult<Role>;
    async fn permanent_delete_all(&self) -> StoreResult<()>;

    /// Permissions a higher-scoped role set grants to channels, keyed by
    /// role name.
    async fn channel_higher_scoped_permissions(
        &self,
        role_names: &[String],
    ) -> StoreResult<HashMap<String, RolePermissions>>;
}

#[async_trait]
pub trait SchemeStore: Send + Sync {
    async fn get(&self, scheme_id: &str) -> StoreResult<Scheme>;
    async fn save(&self, scheme: &Scheme) -> StoreResult<Scheme>;
    async fn delete(&self, scheme_id: &str) -> StoreResult<Scheme>;
    async fn permanent_delete_all(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait EmojiStore: Send + Sync {
    async fn get(&self, ctx: RequestContext, id: &str) -> StoreResult<Emoji>;
    async fn get_by_name(&self, ctx: RequestContext, name: &str) -> StoreResult<Emoji>;
    async fn get_multiple_by_name(
        &self,
        ctx: RequestContext,
        names: &[String],
    ) -> StoreResult<Vec<Emoji>>;
    async fn delete(&self, emoji: &Emoji, delete_at: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Channel etag, `"<version>.<last_post_time>"`.
    async fn get_etag(
        &self,
        channel_id: &str,
        allow_from_cache: bool,
        collapsed_threads: bool,
    ) -> StoreResult<String>;

    async fn get_posts_since(
        &self,
        options: &PostsSinceOptions,
        allow_from_cache: bool,
        sanitize: bool,
    ) -> StoreResult<PostList>;

    async fn get_posts(
        &self,
        options: &GetPostsOptions,
        allow_from_cache: bool,
        sanitize: bool,
    ) -> StoreResult<PostList>;

    async fn analytics_post_count(&self, options: &PostCountOptions) -> StoreResult<i64>;

    async fn save(&self, post: &Post) -> StoreResult<Post>;

    fn invalidate_last_post_time_cache(&self, channel_id: &str);
    fn clear_caches(&self);
}

#[async_trait]
pub trait FileInfoStore: Send + Sync {
    async fn get_for_post(
        &self,
        post_id: &str,
        read_from_master: bool,
        include_deleted: bool,
        allow_from_cache: bool,
    ) -> StoreResult<Vec<FileInfo>>;

    /// Total bytes stored across all files.
    async fn get_storage_usage(
        &self,
        allow_from_cache: bool,
        include_deleted: bool,
    ) -> StoreResult<i64>;

    async fn attach_to_post(&self, file_id: &str, post_id: &str) -> StoreResult<()>;

    fn invalidate_file_infos_for_post_cache(&self, post_id: &str, deleted: bool);
}

#[async_trait]
pub trait ReactionStore: Send + Sync {
    async fn get_for_post(&self, post_id: &str, allow_from_cache: bool)
        -> StoreResult<Vec<Reaction>>;
    async fn save(&self, reaction: &Reaction) -> StoreResult<Reaction>;
    async fn delete(&self, reaction: &Reaction) -> StoreResult<Reaction>;

    /// Remove the emoji from every post it was used on. The affected post
    /// set is unknown to the caller.
    async fn delete_all_with_emoji_name(&self, emoji_name: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn get_user_team_ids(
        &self,
        user_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<Vec<String>>;
    async fn save_member(&self, member: &TeamMember) -> StoreResult<TeamMember>;
    async fn remove_member(&self, team_id: &str, user_id: &str) -> StoreResult<()>;

    fn invalidate_all_team_ids_for_user(&self, user_id: &str);
}

#[async_trait]
pub trait TermsOfServiceStore: Send + Sync {
    async fn save(&self, terms: &TermsOfService) -> StoreResult<TermsOfService>;
    async fn get(&self, id: &str, allow_from_cache: bool) -> StoreResult<TermsOfService>;
    async fn get_latest(&self, allow_from_cache: bool) -> StoreResult<TermsOfService>;
}

#[async_trait]
pub trait UserTermsOfServiceStore: Send + Sync {
    async fn get_by_user(
        &self,
        user_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<UserTermsOfService>;
    async fn save(&self, user_terms: &UserTermsOfService) -> StoreResult<UserTermsOfService>;
    async fn delete(&self, user_id: &str, terms_of_service_id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait WebhookStore: Send + Sync {
    async fn get_incoming(&self, id: &str, allow_from_cache: bool) -> StoreResult<IncomingWebhook>;
    async fn save_incoming(&self, webhook: &IncomingWebhook) -> StoreResult<IncomingWebhook>;
    async fn delete_incoming(&self, webhook_id: &str, delete_at: i64) -> StoreResult<()>;

    fn invalidate_webhook_cache(&self, webhook_id: &str);
}

#[async_trait]
pub trait TemporaryPostStore: Send + Sync {
    async fn get(&self, post_id: &str, allow_from_cache: bool) -> StoreResult<TemporaryPost>;
    async fn save(&self, post: &TemporaryPost) -> StoreResult<TemporaryPost>;
    async fn delete(&self, post_id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait ReadReceiptStore: Send + Sync {
    async fn get(
        &self,
        post_id: &str,
        user_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<ReadReceipt>;
    async fn save(&self, receipt: &ReadReceipt) -> StoreResult<ReadReceipt>;

    /// Remove every receipt for one post.
    async fn delete_by_post(&self, post_id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait ContentFlaggingStore: Send + Sync {
    async fn get_flag(&self, post_id: &str, allow_from_cache: bool) -> StoreResult<ContentFlag>;
    async fn save_flag(&self, flag: &ContentFlag) -> StoreResult<ContentFlag>;
    async fn delete_flag(&self, post_id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait AutoTranslationStore: Send + Sync {
    /// The locale translations should target for one user in one channel.
    /// An empty string means translation is off for the pair.
    async fn get_channel_locale(
        &self,
        user_id: &str,
        channel_id: &str,
        allow_from_cache: bool,
    ) -> StoreResult<String>;

    async fn set_channel_locale(
        &self,
        user_id: &str,
        channel_id: &str,
        locale: &str,
    ) -> StoreResult<()>;

    fn invalidate_user_locale_cache(&self, user_id: &str);
}
