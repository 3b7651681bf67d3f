//! In-memory base store with call counting.
//!
//! The cache layer's tests need to know exactly how often each base
//! operation ran and whether a read was redirected to the master replica.
//! `MockStore` keeps everything in maps, bumps a per-operation counter on
//! every call, and can be told to fail an operation once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::model::{
    CURRENT_VERSION, Channel, ChannelMember, ContentFlag, Emoji, FileInfo, GetPostsOptions,
    IncomingWebhook, Post, PostCountOptions, PostList, PostsSinceOptions, ReadReceipt, Reaction,
    Role, RolePermissions, Scheme, TeamMember, TemporaryPost, TermsOfService, User,
    UserGetOptions, UserTermsOfService,
};

use super::{
    AutoTranslationStore, ChannelStore, ContentFlaggingStore, EmojiStore, FileInfoStore,
    PostStore, ReactionStore, ReadReceiptStore, RequestContext, RoleStore, SchemeStore, Store,
    StoreError, StoreResult, TeamStore, TemporaryPostStore, TermsOfServiceStore, UserStore,
    UserTermsOfServiceStore, WebhookStore,
};

#[derive(Default)]
struct MockData {
    channels: HashMap<String, Channel>,
    member_counts: HashMap<String, i64>,
    guest_counts: HashMap<String, i64>,
    pinned_post_counts: HashMap<String, i64>,
    users: HashMap<String, User>,
    profiles_in_channel: HashMap<String, HashMap<String, User>>,
    roles: HashMap<String, Role>,
    higher_scoped: HashMap<String, HashMap<String, RolePermissions>>,
    schemes: HashMap<String, Scheme>,
    emojis: HashMap<String, Emoji>,
    posts: HashMap<String, Post>,
    post_count: i64,
    file_infos: HashMap<String, Vec<FileInfo>>,
    storage_usage: i64,
    reactions: HashMap<String, Vec<Reaction>>,
    team_ids: HashMap<String, Vec<String>>,
    terms: HashMap<String, TermsOfService>,
    latest_terms: Option<String>,
    user_terms: HashMap<String, UserTermsOfService>,
    webhooks: HashMap<String, IncomingWebhook>,
    temporary_posts: HashMap<String, TemporaryPost>,
    receipts: HashMap<String, ReadReceipt>,
    flags: HashMap<String, ContentFlag>,
    locales: HashMap<String, String>,
}

/// Counting in-memory base store.
#[derive(Default)]
pub struct MockStore {
    data: Mutex<MockData>,
    calls: DashMap<&'static str, usize>,
    last_ids: DashMap<&'static str, Vec<String>>,
    master_reads: AtomicUsize,
    fail_once: DashMap<&'static str, StoreError>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How often `op` (e.g. `"channel.get_member_count"`) has run.
    pub fn calls(&self, op: &str) -> usize {
        self.calls.get(op).map(|c| *c).unwrap_or(0)
    }

    /// The id list passed to the most recent invocation of a multi-get
    /// style `op`.
    pub fn last_ids(&self, op: &str) -> Vec<String> {
        self.last_ids.get(op).map(|ids| ids.clone()).unwrap_or_default()
    }

    fn record_ids(&self, op: &'static str, ids: &[String]) {
        self.last_ids.insert(op, ids.to_vec());
    }

    /// How many reads carried the master-replica flag.
    pub fn master_reads(&self) -> usize {
        self.master_reads.load(Ordering::SeqCst)
    }

    /// Fail the next invocation of `op` with `err`.
    pub fn fail_once(&self, op: &'static str, err: StoreError) {
        self.fail_once.insert(op, err);
    }

    fn record(&self, op: &'static str) -> StoreResult<()> {
        *self.calls.entry(op).or_insert(0) += 1;
        if let Some((_, err)) = self.fail_once.remove(op) {
            return Err(err);
        }
        Ok(())
    }

    fn record_read(&self, op: &'static str, ctx: RequestContext) -> StoreResult<()> {
        if ctx.use_master {
            self.master_reads.fetch_add(1, Ordering::SeqCst);
        }
        self.record(op)
    }

    // ---- seeding -------------------------------------------------------

    pub fn put_channel(&self, channel: Channel) {
        self.data.lock().channels.insert(channel.id.clone(), channel);
    }

    pub fn set_member_count(&self, channel_id: &str, count: i64) {
        self.data.lock().member_counts.insert(channel_id.to_string(), count);
    }

    pub fn set_guest_count(&self, channel_id: &str, count: i64) {
        self.data.lock().guest_counts.insert(channel_id.to_string(), count);
    }

    pub fn set_pinned_post_count(&self, channel_id: &str, count: i64) {
        self.data
            .lock()
            .pinned_post_counts
            .insert(channel_id.to_string(), count);
    }

    pub fn put_user(&self, user: User) {
        self.data.lock().users.insert(user.id.clone(), user);
    }

    pub fn put_profiles_in_channel(&self, channel_id: &str, profiles: HashMap<String, User>) {
        self.data
            .lock()
            .profiles_in_channel
            .insert(channel_id.to_string(), profiles);
    }

    pub fn put_role(&self, role: Role) {
        self.data.lock().roles.insert(role.name.clone(), role);
    }

    pub fn put_higher_scoped_permissions(
        &self,
        role_names: &[String],
        permissions: HashMap<String, RolePermissions>,
    ) {
        let mut sorted: Vec<_> = role_names.to_vec();
        sorted.sort();
        self.data
            .lock()
            .higher_scoped
            .insert(sorted.join("/"), permissions);
    }

    pub fn put_scheme(&self, scheme: Scheme) {
        self.data.lock().schemes.insert(scheme.id.clone(), scheme);
    }

    pub fn put_emoji(&self, emoji: Emoji) {
        self.data.lock().emojis.insert(emoji.id.clone(), emoji);
    }

    pub fn put_post(&self, post: Post) {
        self.data.lock().posts.insert(post.id.clone(), post);
    }

    pub fn set_post_count(&self, count: i64) {
        self.data.lock().post_count = count;
    }

    pub fn put_file_infos(&self, post_id: &str, infos: Vec<FileInfo>) {
        self.data.lock().file_infos.insert(post_id.to_string(), infos);
    }

    pub fn set_storage_usage(&self, bytes: i64) {
        self.data.lock().storage_usage = bytes;
    }

    pub fn put_reaction(&self, reaction: Reaction) {
        self.data
            .lock()
            .reactions
            .entry(reaction.post_id.clone())
            .or_default()
            .push(reaction);
    }

    pub fn set_team_ids(&self, user_id: &str, team_ids: Vec<String>) {
        self.data.lock().team_ids.insert(user_id.to_string(), team_ids);
    }

    pub fn put_terms(&self, terms: TermsOfService, latest: bool) {
        let mut data = self.data.lock();
        if latest {
            data.latest_terms = Some(terms.id.clone());
        }
        data.terms.insert(terms.id.clone(), terms);
    }

    pub fn put_user_terms(&self, user_terms: UserTermsOfService) {
        self.data
            .lock()
            .user_terms
            .insert(user_terms.user_id.clone(), user_terms);
    }

    pub fn put_webhook(&self, webhook: IncomingWebhook) {
        self.data.lock().webhooks.insert(webhook.id.clone(), webhook);
    }

    pub fn put_temporary_post(&self, post: TemporaryPost) {
        self.data
            .lock()
            .temporary_posts
            .insert(post.post_id.clone(), post);
    }

    pub fn put_receipt(&self, receipt: ReadReceipt) {
        self.data
            .lock()
            .receipts
            .insert(receipt.cache_key(), receipt);
    }

    pub fn put_flag(&self, flag: ContentFlag) {
        self.data.lock().flags.insert(flag.post_id.clone(), flag);
    }

    pub fn set_locale(&self, user_id: &str, channel_id: &str, locale: &str) {
        self.data
            .lock()
            .locales
            .insert(format!("{user_id}:{channel_id}"), locale.to_string());
    }
}

impl Store for MockStore {
    fn channel(&self) -> &dyn ChannelStore {
        self
    }
    fn user(&self) -> &dyn UserStore {
        self
    }
    fn role(&self) -> &dyn RoleStore {
        self
    }
    fn scheme(&self) -> &dyn SchemeStore {
        self
    }
    fn emoji(&self) -> &dyn EmojiStore {
        self
    }
    fn post(&self) -> &dyn PostStore {
        self
    }
    fn file_info(&self) -> &dyn FileInfoStore {
        self
    }
    fn reaction(&self) -> &dyn ReactionStore {
        self
    }
    fn team(&self) -> &dyn TeamStore {
        self
    }
    fn terms_of_service(&self) -> &dyn TermsOfServiceStore {
        self
    }
    fn user_terms_of_service(&self) -> &dyn UserTermsOfServiceStore {
        self
    }
    fn webhook(&self) -> &dyn WebhookStore {
        self
    }
    fn temporary_post(&self) -> &dyn TemporaryPostStore {
        self
    }
    fn read_receipt(&self) -> &dyn ReadReceiptStore {
        self
    }
    fn content_flagging(&self) -> &dyn ContentFlaggingStore {
        self
    }
    fn auto_translation(&self) -> &dyn AutoTranslationStore {
        self
    }
}

#[async_trait]
impl ChannelStore for MockStore {
    async fn get(&self, ctx: RequestContext, id: &str) -> StoreResult<Channel> {
        self.record_read("channel.get", ctx)?;
        self.data
            .lock()
            .channels
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("channel", id))
    }

    async fn get_many(&self, ctx: RequestContext, ids: &[String]) -> StoreResult<Vec<Channel>> {
        self.record_read("channel.get_many", ctx)?;
        self.record_ids("channel.get_many", ids);
        let data = self.data.lock();
        Ok(ids
            .iter()
            .filter_map(|id| data.channels.get(id).cloned())
            .collect())
    }

    async fn save_member(&self, member: &ChannelMember) -> StoreResult<ChannelMember> {
        self.record("channel.save_member")?;
        let mut data = self.data.lock();
        *data
            .member_counts
            .entry(member.channel_id.clone())
            .or_insert(0) += 1;
        Ok(member.clone())
    }

    async fn save_multiple_members(
        &self,
        members: &[ChannelMember],
    ) -> StoreResult<Vec<ChannelMember>> {
        self.record("channel.save_multiple_members")?;
        let mut data = self.data.lock();
        for member in members {
            *data
                .member_counts
                .entry(member.channel_id.clone())
                .or_insert(0) += 1;
        }
        Ok(members.to_vec())
    }

    async fn update_member(&self, member: &ChannelMember) -> StoreResult<ChannelMember> {
        self.record("channel.update_member")?;
        Ok(member.clone())
    }

    async fn update_multiple_members(
        &self,
        members: &[ChannelMember],
    ) -> StoreResult<Vec<ChannelMember>> {
        self.record("channel.update_multiple_members")?;
        Ok(members.to_vec())
    }

    async fn remove_member(&self, channel_id: &str, _user_id: &str) -> StoreResult<()> {
        self.record("channel.remove_member")?;
        let mut data = self.data.lock();
        if let Some(count) = data.member_counts.get_mut(channel_id) {
            *count -= 1;
        }
        Ok(())
    }

    async fn remove_members(&self, channel_id: &str, user_ids: &[String]) -> StoreResult<()> {
        self.record("channel.remove_members")?;
        let mut data = self.data.lock();
        if let Some(count) = data.member_counts.get_mut(channel_id) {
            *count -= user_ids.len() as i64;
        }
        Ok(())
    }

    async fn get_member_count(
        &self,
        channel_id: &str,
        _allow_from_cache: bool,
    ) -> StoreResult<i64> {
        self.record("channel.get_member_count")?;
        Ok(*self.data.lock().member_counts.get(channel_id).unwrap_or(&0))
    }

    async fn get_guest_count(&self, channel_id: &str, _allow_from_cache: bool) -> StoreResult<i64> {
        self.record("channel.get_guest_count")?;
        Ok(*self.data.lock().guest_counts.get(channel_id).unwrap_or(&0))
    }

    async fn get_pinned_post_count(
        &self,
        channel_id: &str,
        _allow_from_cache: bool,
    ) -> StoreResult<i64> {
        self.record("channel.get_pinned_post_count")?;
        Ok(*self
            .data
            .lock()
            .pinned_post_counts
            .get(channel_id)
            .unwrap_or(&0))
    }

    fn invalidate_channel(&self, _id: &str) {}
    fn invalidate_member_count(&self, _channel_id: &str) {}
    fn invalidate_guest_count(&self, _channel_id: &str) {}
    fn invalidate_pinned_post_count(&self, _channel_id: &str) {}
}

#[async_trait]
impl UserStore for MockStore {
    async fn get(&self, ctx: RequestContext, id: &str) -> StoreResult<User> {
        self.record_read("user.get", ctx)?;
        self.data
            .lock()
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn get_many(&self, ctx: RequestContext, ids: &[String]) -> StoreResult<Vec<User>> {
        self.record_read("user.get_many", ctx)?;
        self.record_ids("user.get_many", ids);
        let data = self.data.lock();
        Ok(ids
            .iter()
            .filter_map(|id| data.users.get(id).cloned())
            .collect())
    }

    async fn get_profile_by_ids(
        &self,
        ctx: RequestContext,
        ids: &[String],
        options: &UserGetOptions,
        _allow_from_cache: bool,
    ) -> StoreResult<Vec<User>> {
        self.record_read("user.get_profile_by_ids", ctx)?;
        self.record_ids("user.get_profile_by_ids", ids);
        let data = self.data.lock();
        Ok(ids
            .iter()
            .filter_map(|id| data.users.get(id))
            .filter(|user| options.since == 0 || user.update_at > options.since)
            .cloned()
            .collect())
    }

    async fn get_all_profiles_in_channel(
        &self,
        ctx: RequestContext,
        channel_id: &str,
        _allow_from_cache: bool,
    ) -> StoreResult<HashMap<String, User>> {
        self.record_read("user.get_all_profiles_in_channel", ctx)?;
        Ok(self
            .data
            .lock()
            .profiles_in_channel
            .get(channel_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_all_profiles(&self, options: &UserGetOptions) -> StoreResult<Vec<User>> {
        self.record("user.get_all_profiles")?;
        let data = self.data.lock();
        let mut users: Vec<_> = data.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        if options.per_page == 0 {
            return Ok(users);
        }
        Ok(users
            .into_iter()
            .skip(options.page * options.per_page)
            .take(options.per_page)
            .collect())
    }

    async fn update_failed_password_attempts(
        &self,
        user_id: &str,
        attempts: i32,
    ) -> StoreResult<()> {
        self.record("user.update_failed_password_attempts")?;
        if let Some(user) = self.data.lock().users.get_mut(user_id) {
            user.failed_attempts = attempts;
        }
        Ok(())
    }

    fn invalidate_profile_cache_for_user(&self, _user_id: &str) {}
    fn invalidate_profiles_in_channel_cache(&self, _channel_id: &str) {}
    fn invalidate_profiles_in_channel_cache_by_user(&self, _user_id: &str) {}
}

#[async_trait]
impl RoleStore for MockStore {
    async fn get_by_name(&self, name: &str) -> StoreResult<Role> {
        self.record("role.get_by_name")?;
        self.data
            .lock()
            .roles
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found("role", name))
    }

    async fn get_by_names(&self, names: &[String]) -> StoreResult<Vec<Role>> {
        self.record("role.get_by_names")?;
        self.record_ids("role.get_by_names", names);
        let data = self.data.lock();
        Ok(names
            .iter()
            .filter_map(|name| data.roles.get(name).cloned())
            .collect())
    }

    async fn save(&self, role: &Role) -> StoreResult<Role> {
        self.record("role.save")?;
        self.data
            .lock()
            .roles
            .insert(role.name.clone(), role.clone());
        Ok(role.clone())
    }

    async fn delete(&self, role_id: &str) -> StoreResult<Role> {
        self.record("role.delete")?;
        let mut data = self.data.lock();
        let name = data
            .roles
            .values()
            .find(|role| role.id == role_id)
            .map(|role| role.name.clone())
            .ok_or_else(|| StoreError::not_found("role", role_id))?;
        data.roles
            .remove(&name)
            .ok_or_else(|| StoreError::not_found("role", role_id))
    }

    async fn permanent_delete_all(&self) -> StoreResult<()> {
        self.record("role.permanent_delete_all")?;
        let mut data = self.data.lock();
        data.roles.clear();
        data.higher_scoped.clear();
        Ok(())
    }

    async fn channel_higher_scoped_permissions(
        &self,
        role_names: &[String],
    ) -> StoreResult<HashMap<String, RolePermissions>> {
        self.record("role.channel_higher_scoped_permissions")?;
        let mut sorted: Vec<_> = role_names.to_vec();
        sorted.sort();
        Ok(self
            .data
            .lock()
            .higher_scoped
            .get(&sorted.join("/"))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl SchemeStore for MockStore {
    async fn get(&self, scheme_id: &str) -> StoreResult<Scheme> {
        self.record("scheme.get")?;
        self.data
            .lock()
            .schemes
            .get(scheme_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("scheme", scheme_id))
    }

    async fn save(&self, scheme: &Scheme) -> StoreResult<Scheme> {
        self.record("scheme.save")?;
        self.data
            .lock()
            .schemes
            .insert(scheme.id.clone(), scheme.clone());
        Ok(scheme.clone())
    }

    async fn delete(&self, scheme_id: &str) -> StoreResult<Scheme> {
        self.record("scheme.delete")?;
        self.data
            .lock()
            .schemes
            .remove(scheme_id)
            .ok_or_else(|| StoreError::not_found("scheme", scheme_id))
    }

    async fn permanent_delete_all(&self) -> StoreResult<()> {
        self.record("scheme.permanent_delete_all")?;
        self.data.lock().schemes.clear();
        Ok(())
    }
}

#[async_trait]
impl EmojiStore for MockStore {
    async fn get(&self, ctx: RequestContext, id: &str) -> StoreResult<Emoji> {
        self.record_read("emoji.get", ctx)?;
        self.data
            .lock()
            .emojis
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("emoji", id))
    }

    async fn get_by_name(&self, ctx: RequestContext, name: &str) -> StoreResult<Emoji> {
        self.record_read("emoji.get_by_name", ctx)?;
        self.data
            .lock()
            .emojis
            .values()
            .find(|emoji| emoji.name == name)
            .cloned()
            .ok_or_else(|| StoreError::not_found("emoji", name))
    }

    async fn get_multiple_by_name(
        &self,
        ctx: RequestContext,
        names: &[String],
    ) -> StoreResult<Vec<Emoji>> {
        self.record_read("emoji.get_multiple_by_name", ctx)?;
        self.record_ids("emoji.get_multiple_by_name", names);
        let data = self.data.lock();
        Ok(data
            .emojis
            .values()
            .filter(|emoji| names.contains(&emoji.name))
            .cloned()
            .collect())
    }

    async fn delete(&self, emoji: &Emoji, _delete_at: i64) -> StoreResult<()> {
        self.record("emoji.delete")?;
        self.data.lock().emojis.remove(&emoji.id);
        Ok(())
    }
}

#[async_trait]
impl PostStore for MockStore {
    async fn get_etag(
        &self,
        channel_id: &str,
        _allow_from_cache: bool,
        _collapsed_threads: bool,
    ) -> StoreResult<String> {
        self.record("post.get_etag")?;
        let data = self.data.lock();
        let last = data
            .posts
            .values()
            .filter(|post| post.channel_id == channel_id)
            .map(|post| post.update_at)
            .max()
            .unwrap_or(0);
        Ok(format!("{CURRENT_VERSION}.{last}"))
    }

    async fn get_posts_since(
        &self,
        options: &PostsSinceOptions,
        _allow_from_cache: bool,
        _sanitize: bool,
    ) -> StoreResult<PostList> {
        self.record("post.get_posts_since")?;
        let data = self.data.lock();
        let mut list = PostList::new();
        for post in data.posts.values() {
            if post.channel_id == options.channel_id && post.update_at > options.time {
                list.add(post.clone());
            }
        }
        Ok(list)
    }

    async fn get_posts(
        &self,
        options: &GetPostsOptions,
        _allow_from_cache: bool,
        _sanitize: bool,
    ) -> StoreResult<PostList> {
        self.record("post.get_posts")?;
        let data = self.data.lock();
        let mut list = PostList::new();
        for post in data.posts.values() {
            if post.channel_id == options.channel_id {
                list.add(post.clone());
            }
        }
        Ok(list)
    }

    async fn analytics_post_count(&self, _options: &PostCountOptions) -> StoreResult<i64> {
        self.record("post.analytics_post_count")?;
        Ok(self.data.lock().post_count)
    }

    async fn save(&self, post: &Post) -> StoreResult<Post> {
        self.record("post.save")?;
        self.data.lock().posts.insert(post.id.clone(), post.clone());
        Ok(post.clone())
    }

    fn invalidate_last_post_time_cache(&self, _channel_id: &str) {}
    fn clear_caches(&self) {}
}

#[async_trait]
impl FileInfoStore for MockStore {
    async fn get_for_post(
        &self,
        post_id: &str,
        read_from_master: bool,
        include_deleted: bool,
        _allow_from_cache: bool,
    ) -> StoreResult<Vec<FileInfo>> {
        if read_from_master {
            self.master_reads.fetch_add(1, Ordering::SeqCst);
        }
        self.record("file_info.get_for_post")?;
        let data = self.data.lock();
        Ok(data
            .file_infos
            .get(post_id)
            .map(|infos| {
                infos
                    .iter()
                    .filter(|info| include_deleted || info.delete_at == 0)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_storage_usage(
        &self,
        _allow_from_cache: bool,
        _include_deleted: bool,
    ) -> StoreResult<i64> {
        self.record("file_info.get_storage_usage")?;
        Ok(self.data.lock().storage_usage)
    }

    async fn attach_to_post(&self, file_id: &str, post_id: &str) -> StoreResult<()> {
        self.record("file_info.attach_to_post")?;
        let mut data = self.data.lock();
        data.file_infos
            .entry(post_id.to_string())
            .or_default()
            .push(FileInfo::new(file_id, post_id));
        Ok(())
    }

    fn invalidate_file_infos_for_post_cache(&self, _post_id: &str, _deleted: bool) {}
}

#[async_trait]
impl ReactionStore for MockStore {
    async fn get_for_post(
        &self,
        post_id: &str,
        _allow_from_cache: bool,
    ) -> StoreResult<Vec<Reaction>> {
        self.record("reaction.get_for_post")?;
        Ok(self
            .data
            .lock()
            .reactions
            .get(post_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, reaction: &Reaction) -> StoreResult<Reaction> {
        self.record("reaction.save")?;
        self.data
            .lock()
            .reactions
            .entry(reaction.post_id.clone())
            .or_default()
            .push(reaction.clone());
        Ok(reaction.clone())
    }

    async fn delete(&self, reaction: &Reaction) -> StoreResult<Reaction> {
        self.record("reaction.delete")?;
        if let Some(list) = self.data.lock().reactions.get_mut(&reaction.post_id) {
            list.retain(|r| {
                !(r.user_id == reaction.user_id && r.emoji_name == reaction.emoji_name)
            });
        }
        Ok(reaction.clone())
    }

    async fn delete_all_with_emoji_name(&self, emoji_name: &str) -> StoreResult<()> {
        self.record("reaction.delete_all_with_emoji_name")?;
        for list in self.data.lock().reactions.values_mut() {
            list.retain(|r| r.emoji_name != emoji_name);
        }
        Ok(())
    }
}

#[async_trait]
impl TeamStore for MockStore {
    async fn get_user_team_ids(
        &self,
        user_id: &str,
        _allow_from_cache: bool,
    ) -> StoreResult<Vec<String>> {
        self.record("team.get_user_team_ids")?;
        Ok(self
            .data
            .lock()
            .team_ids
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_member(&self, member: &TeamMember) -> StoreResult<TeamMember> {
        self.record("team.save_member")?;
        self.data
            .lock()
            .team_ids
            .entry(member.user_id.clone())
            .or_default()
            .push(member.team_id.clone());
        Ok(member.clone())
    }

    async fn remove_member(&self, team_id: &str, user_id: &str) -> StoreResult<()> {
        self.record("team.remove_member")?;
        if let Some(ids) = self.data.lock().team_ids.get_mut(user_id) {
            ids.retain(|id| id != team_id);
        }
        Ok(())
    }

    fn invalidate_all_team_ids_for_user(&self, _user_id: &str) {}
}

#[async_trait]
impl TermsOfServiceStore for MockStore {
    async fn save(&self, terms: &TermsOfService) -> StoreResult<TermsOfService> {
        self.record("terms_of_service.save")?;
        let mut data = self.data.lock();
        data.latest_terms = Some(terms.id.clone());
        data.terms.insert(terms.id.clone(), terms.clone());
        Ok(terms.clone())
    }

    async fn get(&self, id: &str, _allow_from_cache: bool) -> StoreResult<TermsOfService> {
        self.record("terms_of_service.get")?;
        self.data
            .lock()
            .terms
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("terms_of_service", id))
    }

    async fn get_latest(&self, _allow_from_cache: bool) -> StoreResult<TermsOfService> {
        self.record("terms_of_service.get_latest")?;
        let data = self.data.lock();
        data.latest_terms
            .as_ref()
            .and_then(|id| data.terms.get(id))
            .cloned()
            .ok_or_else(|| StoreError::not_found("terms_of_service", "latest"))
    }
}

#[async_trait]
impl UserTermsOfServiceStore for MockStore {
    async fn get_by_user(
        &self,
        user_id: &str,
        _allow_from_cache: bool,
    ) -> StoreResult<UserTermsOfService> {
        self.record("user_terms_of_service.get_by_user")?;
        self.data
            .lock()
            .user_terms
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user_terms_of_service", user_id))
    }

    async fn save(&self, user_terms: &UserTermsOfService) -> StoreResult<UserTermsOfService> {
        self.record("user_terms_of_service.save")?;
        self.data
            .lock()
            .user_terms
            .insert(user_terms.user_id.clone(), user_terms.clone());
        Ok(user_terms.clone())
    }

    async fn delete(&self, user_id: &str, _terms_of_service_id: &str) -> StoreResult<()> {
        self.record("user_terms_of_service.delete")?;
        self.data.lock().user_terms.remove(user_id);
        Ok(())
    }
}

#[async_trait]
impl WebhookStore for MockStore {
    async fn get_incoming(&self, id: &str, _allow_from_cache: bool) -> StoreResult<IncomingWebhook> {
        self.record("webhook.get_incoming")?;
        self.data
            .lock()
            .webhooks
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("webhook", id))
    }

    async fn save_incoming(&self, webhook: &IncomingWebhook) -> StoreResult<IncomingWebhook> {
        self.record("webhook.save_incoming")?;
        self.data
            .lock()
            .webhooks
            .insert(webhook.id.clone(), webhook.clone());
        Ok(webhook.clone())
    }

    async fn delete_incoming(&self, webhook_id: &str, _delete_at: i64) -> StoreResult<()> {
        self.record("webhook.delete_incoming")?;
        self.data.lock().webhooks.remove(webhook_id);
        Ok(())
    }

    fn invalidate_webhook_cache(&self, _webhook_id: &str) {}
}

#[async_trait]
impl TemporaryPostStore for MockStore {
    async fn get(&self, post_id: &str, _allow_from_cache: bool) -> StoreResult<TemporaryPost> {
        self.record("temporary_post.get")?;
        self.data
            .lock()
            .temporary_posts
            .get(post_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("temporary_post", post_id))
    }

    async fn save(&self, post: &TemporaryPost) -> StoreResult<TemporaryPost> {
        self.record("temporary_post.save")?;
        self.data
            .lock()
            .temporary_posts
            .insert(post.post_id.clone(), post.clone());
        Ok(post.clone())
    }

    async fn delete(&self, post_id: &str) -> StoreResult<()> {
        self.record("temporary_post.delete")?;
        self.data.lock().temporary_posts.remove(post_id);
        Ok(())
    }
}

#[async_trait]
impl ReadReceiptStore for MockStore {
    async fn get(
        &self,
        post_id: &str,
        user_id: &str,
        _allow_from_cache: bool,
    ) -> StoreResult<ReadReceipt> {
        self.record("read_receipt.get")?;
        self.data
            .lock()
            .receipts
            .get(&ReadReceipt::key_for(post_id, user_id))
            .cloned()
            .ok_or_else(|| StoreError::not_found("read_receipt", post_id))
    }

    async fn save(&self, receipt: &ReadReceipt) -> StoreResult<ReadReceipt> {
        self.record("read_receipt.save")?;
        self.data
            .lock()
            .receipts
            .insert(receipt.cache_key(), receipt.clone());
        Ok(receipt.clone())
    }

    async fn delete_by_post(&self, post_id: &str) -> StoreResult<()> {
        self.record("read_receipt.delete_by_post")?;
        let prefix = format!("{post_id}:");
        self.data
            .lock()
            .receipts
            .retain(|key, _| !key.starts_with(&prefix));
        Ok(())
    }
}

#[async_trait]
impl ContentFlaggingStore for MockStore {
    async fn get_flag(&self, post_id: &str, _allow_from_cache: bool) -> StoreResult<ContentFlag> {
        self.record("content_flagging.get_flag")?;
        self.data
            .lock()
            .flags
            .get(post_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("content_flag", post_id))
    }

    async fn save_flag(&self, flag: &ContentFlag) -> StoreResult<ContentFlag> {
        self.record("content_flagging.save_flag")?;
        self.data
            .lock()
            .flags
            .insert(flag.post_id.clone(), flag.clone());
        Ok(flag.clone())
    }

    async fn delete_flag(&self, post_id: &str) -> StoreResult<()> {
        self.record("content_flagging.delete_flag")?;
        self.data.lock().flags.remove(post_id);
        Ok(())
    }
}

#[async_trait]
impl AutoTranslationStore for MockStore {
    async fn get_channel_locale(
        &self,
        user_id: &str,
        channel_id: &str,
        _allow_from_cache: bool,
    ) -> StoreResult<String> {
        self.record("auto_translation.get_channel_locale")?;
        Ok(self
            .data
            .lock()
            .locales
            .get(&format!("{user_id}:{channel_id}"))
            .cloned()
            .unwrap_or_default())
    }

    async fn set_channel_locale(
        &self,
        user_id: &str,
        channel_id: &str,
        locale: &str,
    ) -> StoreResult<()> {
        self.record("auto_translation.set_channel_locale")?;
        self.data
            .lock()
            .locales
            .insert(format!("{user_id}:{channel_id}"), locale.to_string());
        Ok(())
    }

    fn invalidate_user_locale_cache(&self, _user_id: &str) {}
}
