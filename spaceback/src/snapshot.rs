//! # Snapshot data model
//!
//! The portable representation of a space's structure. A snapshot is
//! built once during capture, is immutable from then on, and is only read
//! during restore. Its identity is decoupled from both the source and any
//! target space: all cross-references inside the document are by *name*,
//! because host-assigned identifiers are regenerated on every restore.
//!
//! The JSON layout of these types is the persisted document format; field
//! names are part of the forward-compatibility contract.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use data_encoding::BASE64;
use serde::{Deserialize, Serialize};

// ============================================================================
// IMAGES
// ============================================================================

/// An image carried in a snapshot: either a URL the target host fetches
/// itself, or a base64 payload embedded in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRef {
    Url(String),
    Embedded(String),
}

impl ImageRef {
    /// Embeds raw bytes as a base64 payload.
    pub fn from_bytes(bytes: &Bytes) -> Self {
        Self::Embedded(BASE64.encode(bytes))
    }

    /// Decodes an embedded payload back to bytes. Returns `None` for URL
    /// references and for payloads that are not valid base64.
    pub fn decode(&self) -> Option<Bytes> {
        match self {
            Self::Url(_) => None,
            Self::Embedded(payload) => BASE64
                .decode(payload.as_bytes())
                .ok()
                .map(Bytes::from),
        }
    }
}

// ============================================================================
// ROOT DOCUMENT
// ============================================================================

/// Root snapshot document for one captured space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot identifier; the storage key
    pub id: String,

    /// Identifier of the space the snapshot was captured from
    pub source_space_id: String,

    /// Capture time
    pub created_at: DateTime<Utc>,

    /// Space display name
    pub name: String,

    pub verification_level: space_host::VerificationLevel,
    pub explicit_content_filter: space_host::ExplicitContentFilter,
    pub default_notifications: space_host::NotificationLevel,

    /// AFK configuration, when the source space had an AFK channel
    pub afk: Option<AfkConfig>,

    pub widget: WidgetConfig,

    pub icon: Option<ImageRef>,
    pub splash: Option<ImageRef>,
    pub banner: Option<ImageRef>,

    pub roles: Vec<RoleRecord>,
    pub channels: ChannelTree,
    pub emojis: Vec<EmojiRecord>,
    pub bans: Vec<BanRecord>,
}

/// AFK channel configuration, keyed by channel name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfkConfig {
    pub channel_name: String,
    pub timeout_secs: u32,
}

/// Widget configuration, keyed by channel name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub enabled: bool,
    pub channel_name: Option<String>,
}

// ============================================================================
// ROLES
// ============================================================================

/// A captured role. Permissions travel as a decimal string so the
/// document survives JSON parsers that truncate 64-bit integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub name: String,
    pub color: String,
    pub hoist: bool,
    pub permissions: String,
    pub mentionable: bool,
    pub position: i64,
    /// Exactly one record per snapshot carries this flag; restoring it
    /// edits the target's existing default role instead of creating one.
    pub is_default: bool,
}

impl RoleRecord {
    /// Parses the permission bitmask. Malformed values read as zero.
    pub fn permission_bits(&self) -> u64 {
        self.permissions.parse().unwrap_or(0)
    }
}

/// A role-scoped access-control overwrite, keyed by role name. Member
/// overwrites are not portable and are never captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwriteRecord {
    pub role_name: String,
    pub allow: String,
    pub deny: String,
}

impl PermissionOverwriteRecord {
    pub fn allow_bits(&self) -> u64 {
        self.allow.parse().unwrap_or(0)
    }

    pub fn deny_bits(&self) -> u64 {
        self.deny.parse().unwrap_or(0)
    }
}

// ============================================================================
// CHANNEL TREE
// ============================================================================

/// The channel hierarchy: categories with ordered children, plus an
/// ordered list of channels outside any category. Order within each list
/// is the display order and is preserved on restore.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelTree {
    pub categories: Vec<CategoryNode>,
    pub uncategorized: Vec<ChannelNode>,
}

impl ChannelTree {
    /// Total number of channels in the tree, categories excluded.
    pub fn channel_count(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.children.len())
            .sum::<usize>()
            + self.uncategorized.len()
    }
}

/// A category and its ordered children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryNode {
    pub name: String,
    pub overwrites: Vec<PermissionOverwriteRecord>,
    pub children: Vec<ChannelNode>,
}

/// A non-category channel, discriminated by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelNode {
    Text(TextChannelNode),
    Voice(VoiceChannelNode),
}

impl ChannelNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Text(node) => &node.name,
            Self::Voice(node) => &node.name,
        }
    }

    pub fn overwrites(&self) -> &[PermissionOverwriteRecord] {
        match self {
            Self::Text(node) => &node.overwrites,
            Self::Voice(node) => &node.overwrites,
        }
    }
}

/// A text or announcement channel with its captured message tail and
/// active threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChannelNode {
    pub name: String,
    pub nsfw: bool,
    pub topic: Option<String>,
    /// Per-user message rate limit in seconds
    pub slowmode_secs: u32,
    /// True for announcement (broadcast) channels; downgraded to plain
    /// text on restore when the target lacks the capability
    pub announcement: bool,
    pub overwrites: Vec<PermissionOverwriteRecord>,
    /// Chronological, oldest first
    pub messages: Vec<MessageRecord>,
    pub threads: Vec<ThreadNode>,
}

/// A voice channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceChannelNode {
    pub name: String,
    pub bitrate: u32,
    /// 0 means unlimited
    pub user_limit: u32,
    pub overwrites: Vec<PermissionOverwriteRecord>,
}

/// A thread under a text channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadNode {
    pub name: String,
    pub archived: bool,
    pub locked: bool,
    pub auto_archive_minutes: u32,
    pub slowmode_secs: u32,
    /// Chronological, oldest first
    pub messages: Vec<MessageRecord>,
}

// ============================================================================
// MESSAGES
// ============================================================================

/// One captured message. Embeds are opaque JSON, passed through to the
/// replay proxy verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageRecord {
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub embeds: Vec<serde_json::Value>,
    pub attachments: Vec<AttachmentRecord>,
    pub pinned: bool,
}

impl MessageRecord {
    /// True when the message carries nothing a replay could send.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.embeds.is_empty() && self.attachments.is_empty()
    }
}

/// A captured attachment: name plus content or reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    pub name: String,
    pub content: ImageRef,
}

// ============================================================================
// EMOJIS AND BANS
// ============================================================================

/// A captured custom emoji: name plus exactly one of URL reference or
/// embedded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiRecord {
    pub name: String,
    pub image: ImageRef,
}

/// A captured ban entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanRecord {
    pub user_id: String,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_ref_roundtrip() {
        let bytes = Bytes::from_static(b"pixels");
        let image = ImageRef::from_bytes(&bytes);
        assert_eq!(image.decode().unwrap(), bytes);
        assert_eq!(ImageRef::Url("https://x/y.png".to_string()).decode(), None);
    }

    #[test]
    fn test_channel_node_kind_tag() {
        let node = ChannelNode::Voice(VoiceChannelNode {
            name: "radio".to_string(),
            bitrate: 64_000,
            user_limit: 0,
            overwrites: Vec::new(),
        });
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "voice");
        assert_eq!(json["name"], "radio");
    }

    #[test]
    fn test_permission_bits_survive_strings() {
        let record = RoleRecord {
            name: "admin".to_string(),
            color: "#ff0000".to_string(),
            hoist: true,
            // larger than 2^53, the double-precision integer limit
            permissions: "9007199254740993".to_string(),
            mentionable: false,
            position: 3,
            is_default: false,
        };
        assert_eq!(record.permission_bits(), 9_007_199_254_740_993);
    }

    #[test]
    fn test_malformed_bitmask_reads_zero() {
        let overwrite = PermissionOverwriteRecord {
            role_name: "mods".to_string(),
            allow: "not a number".to_string(),
            deny: "16".to_string(),
        };
        assert_eq!(overwrite.allow_bits(), 0);
        assert_eq!(overwrite.deny_bits(), 16);
    }

    #[test]
    fn test_message_is_empty() {
        let mut message = MessageRecord::default();
        assert!(message.is_empty());
        message.content = "hello".to_string();
        assert!(!message.is_empty());
    }

    #[test]
    fn test_channel_count() {
        let tree = ChannelTree {
            categories: vec![CategoryNode {
                name: "cat".to_string(),
                overwrites: Vec::new(),
                children: vec![ChannelNode::Voice(VoiceChannelNode {
                    name: "radio".to_string(),
                    bitrate: 64_000,
                    user_limit: 0,
                    overwrites: Vec::new(),
                })],
            }],
            uncategorized: Vec::new(),
        };
        assert_eq!(tree.channel_count(), 1);
    }
}
