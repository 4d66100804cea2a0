//! In-memory `SpaceHost` for tests and local experimentation.
//!
//! `MemorySpace` keeps a full object graph per space behind a mutex and
//! implements every capability the engine consumes. Host-assigned ids are
//! sequential (`s-1`, `r-2`, `c-3`, ...), positions follow creation order
//! within a parent scope, and bitrate/user-limit validation mirrors the
//! limits a real host enforces.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;
use snafu::prelude::*;
use tracing::debug;

use crate::{
    Result,
    error::{CapabilityDeniedSnafu, HostError, ValidationSnafu},
    host::SpaceHost,
    types::{
        ChannelKind, CreateChannel, DefaultRolePatch, ImagePayload, LiveAttachment, LiveBan,
        LiveChannel, LiveEmoji, LiveIntegration, LiveMessage, LiveOverwrite, LiveRole, LiveThread,
        LiveWebhook, MessageAuthor, NewRole, NewThread, OutboundMessage, PremiumTier,
        ResolvedOverwrite, OverwriteTarget, SpaceProfile, SpaceSetting,
    },
};

/// Maximum voice user limit a host accepts.
const MAX_USER_LIMIT: u32 = 99;

/// Voice bitrate ceiling per boost tier.
fn max_bitrate(tier: PremiumTier) -> u32 {
    match tier {
        PremiumTier::None => 64_000,
        PremiumTier::Tier1 => 128_000,
        PremiumTier::Tier2 => 256_000,
        PremiumTier::Tier3 => 384_000,
    }
}

/// Seed input for [`MemorySpace::push_message`].
#[derive(Debug, Clone, Default)]
pub struct SeedMessage {
    pub author: Option<MessageAuthor>,
    pub content: String,
    pub embeds: Vec<serde_json::Value>,
    pub attachments: Vec<LiveAttachment>,
    pub pinned: bool,
}

impl SeedMessage {
    /// A plain text message from a named author.
    pub fn text(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: Some(MessageAuthor {
                name: author.into(),
                avatar_url: None,
            }),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// A message whose author account no longer resolves.
    pub fn orphaned(content: impl Into<String>) -> Self {
        Self {
            author: None,
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Seed input for [`MemorySpace::push_thread`].
#[derive(Debug, Clone)]
pub struct SeedThread {
    pub name: String,
    pub archived: bool,
    pub locked: bool,
    pub auto_archive_minutes: u32,
    pub slowmode_secs: u32,
}

impl SeedThread {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            archived: false,
            locked: false,
            auto_archive_minutes: 1440,
            slowmode_secs: 0,
        }
    }
}

#[derive(Debug, Default)]
struct SpaceState {
    profile: SpaceProfile,
    roles: Vec<LiveRole>,
    channels: Vec<LiveChannel>,
    // channel id -> active threads
    threads: HashMap<String, Vec<LiveThread>>,
    // channel or thread id -> messages, oldest first
    messages: HashMap<String, Vec<LiveMessage>>,
    emojis: Vec<LiveEmoji>,
    bans: Vec<LiveBan>,
    webhooks: Vec<LiveWebhook>,
    integrations: Vec<LiveIntegration>,
}

#[derive(Default)]
struct State {
    spaces: HashMap<String, SpaceState>,
    next_id: u64,
}

impl State {
    fn gen_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn space(&self, space_id: &str) -> Result<&SpaceState> {
        self.spaces
            .get(space_id)
            .ok_or_else(|| HostError::not_found("Space", space_id))
    }

    fn space_mut(&mut self, space_id: &str) -> Result<&mut SpaceState> {
        self.spaces
            .get_mut(space_id)
            .ok_or_else(|| HostError::not_found("Space", space_id))
    }
}

/// In-memory implementation of [`SpaceHost`].
#[derive(Default)]
pub struct MemorySpace {
    state: Mutex<State>,
}

impl MemorySpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a space with default settings and a default role whose id
    /// equals the space id, and returns the space id.
    pub fn create_space(&self, name: impl Into<String>) -> String {
        let mut state = self.state.lock();
        let space_id = state.gen_id("s");
        let mut space = SpaceState {
            profile: SpaceProfile {
                id: space_id.clone(),
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        };
        space.roles.push(LiveRole {
            id: space_id.clone(),
            name: "everyone".to_string(),
            color: "#000000".to_string(),
            hoist: false,
            permissions: 104_324_673,
            mentionable: false,
            position: 0,
            managed: false,
            editable: true,
        });
        state.spaces.insert(space_id.clone(), space);
        debug!(space_id = %space_id, "mock space created");
        space_id
    }

    /// Mutates the space profile directly, for seeding fields the trait
    /// has no write for (tier, features, image URLs, ...).
    pub fn update_profile(&self, space_id: &str, mutate: impl FnOnce(&mut SpaceProfile)) {
        let mut state = self.state.lock();
        if let Ok(space) = state.space_mut(space_id) {
            mutate(&mut space.profile);
        }
    }

    /// Appends a message (oldest first) to a channel or thread and returns
    /// its id.
    pub fn push_message(&self, space_id: &str, channel_id: &str, seed: SeedMessage) -> String {
        let mut state = self.state.lock();
        let id = state.gen_id("m");
        if let Ok(space) = state.space_mut(space_id) {
            space
                .messages
                .entry(channel_id.to_string())
                .or_default()
                .push(LiveMessage {
                    id: id.clone(),
                    author: seed.author,
                    content: seed.content,
                    embeds: seed.embeds,
                    attachments: seed.attachments,
                    pinned: seed.pinned,
                });
        }
        id
    }

    /// Attaches a thread to a text channel and returns its id. Unlike
    /// [`SpaceHost::create_thread`] this can seed archived/locked state.
    pub fn push_thread(&self, space_id: &str, channel_id: &str, seed: SeedThread) -> String {
        let mut state = self.state.lock();
        let id = state.gen_id("t");
        if let Ok(space) = state.space_mut(space_id) {
            space
                .threads
                .entry(channel_id.to_string())
                .or_default()
                .push(LiveThread {
                    id: id.clone(),
                    name: seed.name,
                    archived: seed.archived,
                    locked: seed.locked,
                    auto_archive_minutes: seed.auto_archive_minutes,
                    slowmode_secs: seed.slowmode_secs,
                });
            space.messages.entry(id.clone()).or_default();
        }
        id
    }

    /// Seeds a role-scoped or member-scoped overwrite on a channel.
    pub fn push_overwrite(&self, space_id: &str, channel_id: &str, overwrite: LiveOverwrite) {
        let mut state = self.state.lock();
        if let Ok(space) = state.space_mut(space_id)
            && let Some(channel) = space.channels.iter_mut().find(|ch| ch.id == channel_id)
        {
            channel.overwrites.push(overwrite);
        }
    }

    pub fn push_integration(&self, space_id: &str, name: impl Into<String>) -> String {
        let mut state = self.state.lock();
        let id = state.gen_id("i");
        if let Ok(space) = state.space_mut(space_id) {
            space.integrations.push(LiveIntegration {
                id: id.clone(),
                name: name.into(),
            });
        }
        id
    }

    // ------------------------------------------------------------------
    // inspection helpers for tests
    // ------------------------------------------------------------------

    pub fn profile_of(&self, space_id: &str) -> Option<SpaceProfile> {
        self.state
            .lock()
            .spaces
            .get(space_id)
            .map(|space| space.profile.clone())
    }

    pub fn roles_of(&self, space_id: &str) -> Vec<LiveRole> {
        self.collect(space_id, |space| space.roles.clone())
    }

    pub fn channels_of(&self, space_id: &str) -> Vec<LiveChannel> {
        self.collect(space_id, |space| space.channels.clone())
    }

    pub fn threads_of(&self, space_id: &str, channel_id: &str) -> Vec<LiveThread> {
        self.collect(space_id, |space| {
            space.threads.get(channel_id).cloned().unwrap_or_default()
        })
    }

    /// Messages of a channel or thread, oldest first.
    pub fn messages_of(&self, space_id: &str, channel_id: &str) -> Vec<LiveMessage> {
        self.collect(space_id, |space| {
            space.messages.get(channel_id).cloned().unwrap_or_default()
        })
    }

    pub fn emojis_of(&self, space_id: &str) -> Vec<LiveEmoji> {
        self.collect(space_id, |space| space.emojis.clone())
    }

    pub fn bans_of(&self, space_id: &str) -> Vec<LiveBan> {
        self.collect(space_id, |space| space.bans.clone())
    }

    pub fn webhooks_of(&self, space_id: &str) -> Vec<LiveWebhook> {
        self.collect(space_id, |space| space.webhooks.clone())
    }

    pub fn integrations_of(&self, space_id: &str) -> Vec<LiveIntegration> {
        self.collect(space_id, |space| space.integrations.clone())
    }

    fn collect<T>(&self, space_id: &str, read: impl FnOnce(&SpaceState) -> Vec<T>) -> Vec<T> {
        self.state
            .lock()
            .spaces
            .get(space_id)
            .map(read)
            .unwrap_or_default()
    }

    fn next_position(channels: &[LiveChannel], parent_id: Option<&str>, kind: ChannelKind) -> i64 {
        channels
            .iter()
            .filter(|ch| {
                if kind == ChannelKind::Category {
                    ch.kind == ChannelKind::Category
                } else {
                    ch.kind != ChannelKind::Category && ch.parent_id.as_deref() == parent_id
                }
            })
            .map(|ch| ch.position + 1)
            .max()
            .unwrap_or(0)
    }
}

impl SpaceHost for MemorySpace {
    async fn space_profile(&self, space_id: &str) -> Result<SpaceProfile> {
        Ok(self.state.lock().space(space_id)?.profile.clone())
    }

    async fn list_roles(&self, space_id: &str) -> Result<Vec<LiveRole>> {
        Ok(self.state.lock().space(space_id)?.roles.clone())
    }

    async fn list_channels(&self, space_id: &str) -> Result<Vec<LiveChannel>> {
        Ok(self.state.lock().space(space_id)?.channels.clone())
    }

    async fn list_threads(&self, space_id: &str, channel_id: &str) -> Result<Vec<LiveThread>> {
        let state = self.state.lock();
        let space = state.space(space_id)?;
        Ok(space.threads.get(channel_id).cloned().unwrap_or_default())
    }

    async fn list_emojis(&self, space_id: &str) -> Result<Vec<LiveEmoji>> {
        Ok(self.state.lock().space(space_id)?.emojis.clone())
    }

    async fn list_bans(&self, space_id: &str) -> Result<Vec<LiveBan>> {
        Ok(self.state.lock().space(space_id)?.bans.clone())
    }

    async fn list_webhooks(&self, space_id: &str) -> Result<Vec<LiveWebhook>> {
        Ok(self.state.lock().space(space_id)?.webhooks.clone())
    }

    async fn list_integrations(&self, space_id: &str) -> Result<Vec<LiveIntegration>> {
        Ok(self.state.lock().space(space_id)?.integrations.clone())
    }

    async fn message_page(
        &self,
        space_id: &str,
        channel_id: &str,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<LiveMessage>> {
        let state = self.state.lock();
        let space = state.space(space_id)?;
        let messages = space
            .messages
            .get(channel_id)
            .ok_or_else(|| HostError::not_found("Channel", channel_id))?;
        let end = match before {
            Some(before_id) => messages
                .iter()
                .position(|msg| msg.id == before_id)
                .unwrap_or(0),
            None => messages.len(),
        };
        Ok(messages[..end].iter().rev().take(limit).cloned().collect())
    }

    async fn fetch_image(&self, url: &str) -> Result<Bytes> {
        if url.starts_with("mock://missing") {
            return Err(HostError::not_found("Image", url));
        }
        // deterministic payload derived from the url
        Ok(Bytes::copy_from_slice(url.as_bytes()))
    }

    async fn create_role(&self, space_id: &str, role: NewRole) -> Result<LiveRole> {
        let mut state = self.state.lock();
        let id = state.gen_id("r");
        let space = state.space_mut(space_id)?;
        let position = space
            .roles
            .iter()
            .map(|existing| existing.position + 1)
            .max()
            .unwrap_or(0);
        let live = LiveRole {
            id,
            name: role.name,
            color: role.color,
            hoist: role.hoist,
            permissions: role.permissions,
            mentionable: role.mentionable,
            position,
            managed: false,
            editable: true,
        };
        space.roles.push(live.clone());
        Ok(live)
    }

    async fn edit_default_role(&self, space_id: &str, patch: DefaultRolePatch) -> Result<LiveRole> {
        let mut state = self.state.lock();
        let space = state.space_mut(space_id)?;
        let role = space
            .roles
            .iter_mut()
            .find(|role| role.id == space_id)
            .ok_or_else(|| HostError::not_found("Role", space_id))?;
        role.name = patch.name;
        role.color = patch.color;
        role.permissions = patch.permissions;
        role.mentionable = patch.mentionable;
        Ok(role.clone())
    }

    async fn delete_role(&self, space_id: &str, role_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        let space = state.space_mut(space_id)?;
        let role = space
            .roles
            .iter()
            .find(|role| role.id == role_id)
            .ok_or_else(|| HostError::not_found("Role", role_id))?;
        if role.managed || role.id == space_id {
            return CapabilityDeniedSnafu {
                operation: "delete_role".to_string(),
            }
            .fail();
        }
        space.roles.retain(|role| role.id != role_id);
        Ok(())
    }

    async fn create_channel(&self, space_id: &str, request: CreateChannel) -> Result<LiveChannel> {
        let mut state = self.state.lock();
        let id = state.gen_id("c");
        let space = state.space_mut(space_id)?;
        if request.kind == ChannelKind::Voice {
            let ceiling = max_bitrate(space.profile.premium_tier);
            if let Some(bitrate) = request.bitrate
                && bitrate > ceiling
            {
                return ValidationSnafu {
                    field: "bitrate".to_string(),
                    message: format!("{bitrate} exceeds tier ceiling {ceiling}"),
                }
                .fail();
            }
            if let Some(user_limit) = request.user_limit
                && user_limit > MAX_USER_LIMIT
            {
                return ValidationSnafu {
                    field: "user_limit".to_string(),
                    message: format!("{user_limit} exceeds maximum {MAX_USER_LIMIT}"),
                }
                .fail();
            }
        }
        if let Some(parent_id) = request.parent_id.as_deref()
            && !space
                .channels
                .iter()
                .any(|ch| ch.id == parent_id && ch.kind == ChannelKind::Category)
        {
            return Err(HostError::not_found("Category", parent_id));
        }
        let position =
            Self::next_position(&space.channels, request.parent_id.as_deref(), request.kind);
        debug!(space_id, channel = %request.name, kind = %request.kind, "mock channel created");
        let live = LiveChannel {
            id: id.clone(),
            name: request.name,
            kind: request.kind,
            parent_id: request.parent_id,
            position,
            topic: request.topic,
            nsfw: request.nsfw,
            slowmode_secs: request.slowmode_secs,
            bitrate: request.bitrate.unwrap_or(64_000),
            user_limit: request.user_limit.unwrap_or(0),
            overwrites: Vec::new(),
        };
        space.channels.push(live.clone());
        space.messages.entry(id).or_default();
        Ok(live)
    }

    async fn delete_channel(&self, space_id: &str, channel_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        let space = state.space_mut(space_id)?;
        if !space.channels.iter().any(|ch| ch.id == channel_id) {
            return Err(HostError::not_found("Channel", channel_id));
        }
        space.channels.retain(|ch| ch.id != channel_id);
        for thread in space.threads.remove(channel_id).unwrap_or_default() {
            space.messages.remove(&thread.id);
        }
        space.messages.remove(channel_id);
        space.webhooks.retain(|hook| hook.channel_id != channel_id);
        Ok(())
    }

    async fn set_overwrites(
        &self,
        space_id: &str,
        channel_id: &str,
        overwrites: Vec<ResolvedOverwrite>,
    ) -> Result<()> {
        let mut state = self.state.lock();
        let space = state.space_mut(space_id)?;
        let channel = space
            .channels
            .iter_mut()
            .find(|ch| ch.id == channel_id)
            .ok_or_else(|| HostError::not_found("Channel", channel_id))?;
        channel.overwrites = overwrites
            .into_iter()
            .map(|overwrite| LiveOverwrite {
                target: OverwriteTarget::Role(overwrite.role_id),
                allow: overwrite.allow,
                deny: overwrite.deny,
            })
            .collect();
        Ok(())
    }

    async fn create_thread(
        &self,
        space_id: &str,
        channel_id: &str,
        thread: NewThread,
    ) -> Result<LiveThread> {
        let mut state = self.state.lock();
        let id = state.gen_id("t");
        let space = state.space_mut(space_id)?;
        let parent_ok = space.channels.iter().any(|ch| {
            ch.id == channel_id
                && matches!(ch.kind, ChannelKind::Text | ChannelKind::Announcement)
        });
        if !parent_ok {
            return Err(HostError::not_found("Channel", channel_id));
        }
        let live = LiveThread {
            id: id.clone(),
            name: thread.name,
            archived: false,
            locked: false,
            auto_archive_minutes: thread.auto_archive_minutes,
            slowmode_secs: 0,
        };
        space
            .threads
            .entry(channel_id.to_string())
            .or_default()
            .push(live.clone());
        space.messages.entry(id).or_default();
        Ok(live)
    }

    async fn create_emoji(
        &self,
        space_id: &str,
        name: &str,
        image: ImagePayload,
    ) -> Result<LiveEmoji> {
        let mut state = self.state.lock();
        let id = state.gen_id("e");
        let space = state.space_mut(space_id)?;
        let url = match image {
            ImagePayload::Url(url) => url,
            ImagePayload::Bytes(_) => format!("mock://emoji/{id}"),
        };
        let live = LiveEmoji {
            id,
            name: name.to_string(),
            url,
        };
        space.emojis.push(live.clone());
        Ok(live)
    }

    async fn delete_emoji(&self, space_id: &str, emoji_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        let space = state.space_mut(space_id)?;
        if !space.emojis.iter().any(|emoji| emoji.id == emoji_id) {
            return Err(HostError::not_found("Emoji", emoji_id));
        }
        space.emojis.retain(|emoji| emoji.id != emoji_id);
        Ok(())
    }

    async fn ban(&self, space_id: &str, user_id: &str, reason: Option<&str>) -> Result<()> {
        let mut state = self.state.lock();
        let space = state.space_mut(space_id)?;
        if !space.bans.iter().any(|ban| ban.user_id == user_id) {
            space.bans.push(LiveBan {
                user_id: user_id.to_string(),
                reason: reason.map(ToString::to_string),
            });
        }
        Ok(())
    }

    async fn unban(&self, space_id: &str, user_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        let space = state.space_mut(space_id)?;
        if !space.bans.iter().any(|ban| ban.user_id == user_id) {
            return Err(HostError::not_found("Ban", user_id));
        }
        space.bans.retain(|ban| ban.user_id != user_id);
        Ok(())
    }

    async fn delete_integration(&self, space_id: &str, integration_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        let space = state.space_mut(space_id)?;
        if !space
            .integrations
            .iter()
            .any(|integration| integration.id == integration_id)
        {
            return Err(HostError::not_found("Integration", integration_id));
        }
        space
            .integrations
            .retain(|integration| integration.id != integration_id);
        Ok(())
    }

    async fn create_webhook(
        &self,
        space_id: &str,
        channel_id: &str,
        name: &str,
    ) -> Result<LiveWebhook> {
        let mut state = self.state.lock();
        let id = state.gen_id("w");
        let space = state.space_mut(space_id)?;
        // webhooks may target a channel or a thread
        let target_exists = space.channels.iter().any(|ch| ch.id == channel_id)
            || space
                .threads
                .values()
                .flatten()
                .any(|thread| thread.id == channel_id);
        if !target_exists {
            return Err(HostError::not_found("Channel", channel_id));
        }
        let live = LiveWebhook {
            id,
            name: name.to_string(),
            channel_id: channel_id.to_string(),
        };
        space.webhooks.push(live.clone());
        Ok(live)
    }

    async fn delete_webhook(&self, space_id: &str, webhook_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        let space = state.space_mut(space_id)?;
        if !space.webhooks.iter().any(|hook| hook.id == webhook_id) {
            return Err(HostError::not_found("Webhook", webhook_id));
        }
        space.webhooks.retain(|hook| hook.id != webhook_id);
        Ok(())
    }

    async fn send_webhook_message(
        &self,
        space_id: &str,
        webhook_id: &str,
        message: OutboundMessage,
    ) -> Result<LiveMessage> {
        let mut state = self.state.lock();
        let id = state.gen_id("m");
        let space = state.space_mut(space_id)?;
        let channel_id = space
            .webhooks
            .iter()
            .find(|hook| hook.id == webhook_id)
            .map(|hook| hook.channel_id.clone())
            .ok_or_else(|| HostError::not_found("Webhook", webhook_id))?;
        let live = LiveMessage {
            id,
            author: Some(MessageAuthor {
                name: message.author_name,
                avatar_url: message.author_avatar_url,
            }),
            content: message.content,
            embeds: message.embeds,
            attachments: message
                .attachments
                .into_iter()
                .map(|attachment| LiveAttachment {
                    name: attachment.name,
                    url: attachment.content,
                })
                .collect(),
            pinned: false,
        };
        space
            .messages
            .entry(channel_id)
            .or_default()
            .push(live.clone());
        Ok(live)
    }

    async fn pin_message(&self, space_id: &str, channel_id: &str, message_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        let space = state.space_mut(space_id)?;
        let message = space
            .messages
            .get_mut(channel_id)
            .and_then(|messages| messages.iter_mut().find(|msg| msg.id == message_id))
            .ok_or_else(|| HostError::not_found("Message", message_id))?;
        message.pinned = true;
        Ok(())
    }

    async fn apply_setting(&self, space_id: &str, setting: SpaceSetting) -> Result<()> {
        let mut state = self.state.lock();
        let space = state.space_mut(space_id)?;
        let profile = &mut space.profile;
        match setting {
            SpaceSetting::Name(name) => profile.name = name,
            SpaceSetting::Icon(image) => profile.icon_url = image_url(image),
            SpaceSetting::Splash(image) => profile.splash_url = image_url(image),
            SpaceSetting::Banner(image) => profile.banner_url = image_url(image),
            SpaceSetting::VerificationLevel(level) => profile.verification_level = level,
            SpaceSetting::ExplicitContentFilter(filter) => {
                profile.explicit_content_filter = filter;
            }
            SpaceSetting::DefaultNotifications(level) => profile.default_notifications = level,
            SpaceSetting::AfkChannel(channel_id) => profile.afk_channel_id = channel_id,
            SpaceSetting::AfkTimeoutSecs(secs) => profile.afk_timeout_secs = secs,
            SpaceSetting::Widget {
                enabled,
                channel_id,
            } => {
                profile.widget_enabled = enabled;
                profile.widget_channel_id = channel_id;
            }
            SpaceSetting::SystemChannel(channel_id) => profile.system_channel_id = channel_id,
        }
        Ok(())
    }
}

fn image_url(image: Option<ImagePayload>) -> Option<String> {
    image.map(|payload| match payload {
        ImagePayload::Url(url) => url,
        ImagePayload::Bytes(bytes) => format!("mock://upload/{}", bytes.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_create_space_seeds_default_role() {
        let host = MemorySpace::new();
        let space_id = host.create_space("Test");
        let roles = host.list_roles(&space_id).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].id, space_id);
    }

    #[test_log::test(tokio::test)]
    async fn test_message_paging_newest_first() {
        let host = MemorySpace::new();
        let space_id = host.create_space("Test");
        let channel = host
            .create_channel(&space_id, CreateChannel::new("general", ChannelKind::Text))
            .await
            .unwrap();
        for n in 1..=5 {
            host.push_message(
                &space_id,
                &channel.id,
                SeedMessage::text("ann", format!("msg {n}")),
            );
        }
        let page = host
            .message_page(&space_id, &channel.id, None, 2)
            .await
            .unwrap();
        assert_eq!(page[0].content, "msg 5");
        assert_eq!(page[1].content, "msg 4");
        let next = host
            .message_page(&space_id, &channel.id, Some(&page[1].id), 10)
            .await
            .unwrap();
        assert_eq!(next.len(), 3);
        assert_eq!(next[0].content, "msg 3");
    }

    #[test_log::test(tokio::test)]
    async fn test_voice_bitrate_validation() {
        let host = MemorySpace::new();
        let space_id = host.create_space("Test");
        let mut request = CreateChannel::new("radio", ChannelKind::Voice);
        request.bitrate = Some(96_000);
        let err = host.create_channel(&space_id, request).await.unwrap_err();
        assert!(matches!(err, HostError::Validation { .. }));
    }

    #[test_log::test(tokio::test)]
    async fn test_default_role_cannot_be_deleted() {
        let host = MemorySpace::new();
        let space_id = host.create_space("Test");
        let err = host.delete_role(&space_id, &space_id).await.unwrap_err();
        assert!(matches!(err, HostError::CapabilityDenied { .. }));
    }

    #[test_log::test(tokio::test)]
    async fn test_webhook_send_targets_thread() {
        let host = MemorySpace::new();
        let space_id = host.create_space("Test");
        let channel = host
            .create_channel(&space_id, CreateChannel::new("general", ChannelKind::Text))
            .await
            .unwrap();
        let thread_id = host.push_thread(&space_id, &channel.id, SeedThread::new("help"));
        let hook = host
            .create_webhook(&space_id, &thread_id, "replay")
            .await
            .unwrap();
        host.send_webhook_message(
            &space_id,
            &hook.id,
            OutboundMessage {
                author_name: "ann".to_string(),
                content: "hi".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(host.messages_of(&space_id, &thread_id).len(), 1);
    }
}
