//! # Live entity views and write requests
//!
//! These are the types the [`SpaceHost`](crate::host::SpaceHost) capability
//! speaks in. "Live" types describe entities as they exist on the remote
//! space right now; request types carry the attributes for create/edit
//! calls. Identifiers are host-assigned strings and are never portable
//! across spaces.

use serde::{Deserialize, Serialize};

// ============================================================================
// SPACE METADATA
// ============================================================================

/// Moderation level required before members can participate.
#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VerificationLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Scope of the explicit-media content scan.
#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExplicitContentFilter {
    #[default]
    Disabled,
    MembersWithoutRoles,
    AllMembers,
}

/// Default notification behavior for new members.
#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationLevel {
    AllMessages,
    #[default]
    OnlyMentions,
}

/// Boost level of a space. Determines the voice bitrate ceiling.
#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PremiumTier {
    #[default]
    None,
    Tier1,
    Tier2,
    Tier3,
}

/// Optional capabilities a space may have enabled.
#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpaceFeature {
    /// Elevated community features; gates verification and content-filter
    /// edits on restore.
    Community,
    /// Announcement (broadcast) channels.
    Announcements,
}

/// Current metadata of a space, as reported by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceProfile {
    /// Host-assigned space identifier
    pub id: String,

    /// Display name of the space
    pub name: String,

    /// Icon image URL, if an icon is set
    pub icon_url: Option<String>,

    /// Invite splash image URL
    pub splash_url: Option<String>,

    /// Banner image URL
    pub banner_url: Option<String>,

    pub verification_level: VerificationLevel,
    pub explicit_content_filter: ExplicitContentFilter,
    pub default_notifications: NotificationLevel,

    /// Channel id members are moved to when idle
    pub afk_channel_id: Option<String>,

    /// Idle timeout in seconds before the AFK move
    pub afk_timeout_secs: u32,

    pub widget_enabled: bool,
    pub widget_channel_id: Option<String>,

    /// Channel that receives host-generated notices
    pub system_channel_id: Option<String>,

    pub premium_tier: PremiumTier,
    pub features: Vec<SpaceFeature>,
}

impl SpaceProfile {
    /// Returns true if the space has the given feature enabled.
    pub fn has_feature(&self, feature: SpaceFeature) -> bool {
        self.features.contains(&feature)
    }
}

impl Default for SpaceProfile {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            icon_url: None,
            splash_url: None,
            banner_url: None,
            verification_level: Default::default(),
            explicit_content_filter: Default::default(),
            default_notifications: Default::default(),
            afk_channel_id: None,
            afk_timeout_secs: 300,
            widget_enabled: false,
            widget_channel_id: None,
            system_channel_id: None,
            premium_tier: Default::default(),
            features: Vec::new(),
        }
    }
}

// ============================================================================
// ROLES AND PERMISSIONS
// ============================================================================

/// A role as it exists on the remote space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveRole {
    pub id: String,
    pub name: String,
    /// Display color as a `#rrggbb` hex string
    pub color: String,
    /// Whether members holding the role are listed separately
    pub hoist: bool,
    pub permissions: u64,
    pub mentionable: bool,
    /// Position in the role ladder; higher is more senior
    pub position: i64,
    /// Managed roles belong to integrations and can't be recreated
    pub managed: bool,
    /// Whether the current credential is allowed to edit or delete the role
    pub editable: bool,
}

/// Target of an access-control overwrite on a channel or category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteTarget {
    /// Overwrite scoped to a role id
    Role(String),
    /// Overwrite scoped to an individual member id. Not portable across
    /// spaces, so snapshot capture drops these.
    Member(String),
}

/// One access-control overwrite as stored on the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveOverwrite {
    pub target: OverwriteTarget,
    pub allow: u64,
    pub deny: u64,
}

/// Attributes for creating a new role.
#[derive(Debug, Clone, Default)]
pub struct NewRole {
    pub name: String,
    pub color: String,
    pub hoist: bool,
    pub permissions: u64,
    pub mentionable: bool,
}

/// Attributes that may be edited on the default (everyone) role.
///
/// Hoist and position are not valid for the default role, so they are
/// deliberately absent here.
#[derive(Debug, Clone, Default)]
pub struct DefaultRolePatch {
    pub name: String,
    pub color: String,
    pub permissions: u64,
    pub mentionable: bool,
}

/// An overwrite whose role reference has been resolved to a live role id
/// on the target space.
#[derive(Debug, Clone)]
pub struct ResolvedOverwrite {
    pub role_id: String,
    pub allow: u64,
    pub deny: u64,
}

// ============================================================================
// CHANNELS AND THREADS
// ============================================================================

/// Discriminator for channel shapes on the host.
#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChannelKind {
    Category,
    Text,
    /// Broadcast channel; downgraded to `Text` on restore when the target
    /// space lacks [`SpaceFeature::Announcements`].
    Announcement,
    Voice,
    /// Storefront channels cannot be recreated and are never captured.
    Store,
}

/// A channel (of any kind, including categories) as it exists on the host.
///
/// The host reports all channels through one flat shape; fields that don't
/// apply to a kind are zero or `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveChannel {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
    /// Id of the owning category, if any
    pub parent_id: Option<String>,
    /// Display position among siblings, ascending
    pub position: i64,
    pub topic: Option<String>,
    pub nsfw: bool,
    /// Per-user message rate limit (seconds)
    pub slowmode_secs: u32,
    /// Voice only
    pub bitrate: u32,
    /// Voice only; 0 means unlimited
    pub user_limit: u32,
    pub overwrites: Vec<LiveOverwrite>,
}

/// An active thread under a text channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveThread {
    pub id: String,
    pub name: String,
    pub archived: bool,
    pub locked: bool,
    pub auto_archive_minutes: u32,
    pub slowmode_secs: u32,
}

/// Attributes for creating a channel or category.
#[derive(Debug, Clone)]
pub struct CreateChannel {
    pub name: String,
    pub kind: ChannelKind,
    pub parent_id: Option<String>,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub slowmode_secs: u32,
    /// Voice only; the caller is expected to have clamped this to the
    /// space's tier ceiling
    pub bitrate: Option<u32>,
    /// Voice only; omit to leave the channel unlimited
    pub user_limit: Option<u32>,
}

impl CreateChannel {
    /// Starts a request for a channel of the given kind with all optional
    /// attributes unset.
    pub fn new(name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent_id: None,
            topic: None,
            nsfw: false,
            slowmode_secs: 0,
            bitrate: None,
            user_limit: None,
        }
    }
}

/// Attributes for creating a thread under a text channel.
#[derive(Debug, Clone)]
pub struct NewThread {
    pub name: String,
    pub auto_archive_minutes: u32,
}

// ============================================================================
// MESSAGES
// ============================================================================

/// Author identity attached to a live message. Absent when the account has
/// since been deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub name: String,
    pub avatar_url: Option<String>,
}

/// An uploaded file attached to a live message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveAttachment {
    pub name: String,
    pub url: String,
}

/// A message as stored on the host. Embeds are carried as opaque JSON so
/// the engine can round-trip them without modeling every embed field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveMessage {
    pub id: String,
    pub author: Option<MessageAuthor>,
    pub content: String,
    pub embeds: Vec<serde_json::Value>,
    pub attachments: Vec<LiveAttachment>,
    pub pinned: bool,
}

/// An attachment on an outbound (replayed) message. `content` is either a
/// URL or a base64 payload; the host accepts both.
#[derive(Debug, Clone)]
pub struct OutboundAttachment {
    pub name: String,
    pub content: String,
}

/// A message sent through an impersonation proxy (webhook) with a display
/// identity of the proxy's choosing.
#[derive(Debug, Clone, Default)]
pub struct OutboundMessage {
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub embeds: Vec<serde_json::Value>,
    pub attachments: Vec<OutboundAttachment>,
}

// ============================================================================
// EMOJIS, BANS, WEBHOOKS, INTEGRATIONS
// ============================================================================

/// A custom emoji as it exists on the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveEmoji {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// A ban entry on the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveBan {
    pub user_id: String,
    pub reason: Option<String>,
}

/// An outbound-message proxy attached to a channel or thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveWebhook {
    pub id: String,
    pub name: String,
    pub channel_id: String,
}

/// A third-party integration attached to the space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveIntegration {
    pub id: String,
    pub name: String,
}

// ============================================================================
// SPACE EDITS
// ============================================================================

/// Image payload for icon/splash/banner/emoji writes: either a reference
/// the host fetches itself, or raw bytes uploaded directly.
#[derive(Debug, Clone)]
pub enum ImagePayload {
    Url(String),
    Bytes(bytes::Bytes),
}

/// One space-metadata edit. Each variant is an independent write; the
/// engine applies several of them concurrently during restore.
#[derive(Debug, Clone)]
pub enum SpaceSetting {
    Name(String),
    Icon(Option<ImagePayload>),
    Splash(Option<ImagePayload>),
    Banner(Option<ImagePayload>),
    VerificationLevel(VerificationLevel),
    ExplicitContentFilter(ExplicitContentFilter),
    DefaultNotifications(NotificationLevel),
    AfkChannel(Option<String>),
    AfkTimeoutSecs(u32),
    Widget {
        enabled: bool,
        channel_id: Option<String>,
    },
    SystemChannel(Option<String>),
}

impl SpaceSetting {
    /// Short operation name used in logs and error contexts.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::Name(_) => "set_name",
            Self::Icon(_) => "set_icon",
            Self::Splash(_) => "set_splash",
            Self::Banner(_) => "set_banner",
            Self::VerificationLevel(_) => "set_verification_level",
            Self::ExplicitContentFilter(_) => "set_explicit_content_filter",
            Self::DefaultNotifications(_) => "set_default_notifications",
            Self::AfkChannel(_) => "set_afk_channel",
            Self::AfkTimeoutSecs(_) => "set_afk_timeout",
            Self::Widget { .. } => "set_widget",
            Self::SystemChannel(_) => "set_system_channel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_channel_kind_tokens() {
        assert_eq!(ChannelKind::Announcement.to_string(), "announcement");
        assert_eq!(ChannelKind::from_str("voice").unwrap(), ChannelKind::Voice);
    }

    #[test]
    fn test_premium_tier_ordering() {
        assert!(PremiumTier::None < PremiumTier::Tier3);
        assert_eq!(PremiumTier::default(), PremiumTier::None);
    }

    #[test]
    fn test_profile_features() {
        let profile = SpaceProfile {
            id: "s-1".to_string(),
            name: "Test".to_string(),
            icon_url: None,
            splash_url: None,
            banner_url: None,
            verification_level: VerificationLevel::default(),
            explicit_content_filter: ExplicitContentFilter::default(),
            default_notifications: NotificationLevel::default(),
            afk_channel_id: None,
            afk_timeout_secs: 300,
            widget_enabled: false,
            widget_channel_id: None,
            system_channel_id: None,
            premium_tier: PremiumTier::None,
            features: vec![SpaceFeature::Community],
        };
        assert!(profile.has_feature(SpaceFeature::Community));
        assert!(!profile.has_feature(SpaceFeature::Announcements));
    }

    #[test]
    fn test_setting_op_name() {
        assert_eq!(SpaceSetting::Name("x".to_string()).op_name(), "set_name");
        assert_eq!(
            SpaceSetting::Widget {
                enabled: true,
                channel_id: None
            }
            .op_name(),
            "set_widget"
        );
    }
}
