//! Capture and restore options.
//!
//! Options are plain values threaded through every call; the engine keeps
//! no process-wide configuration state.

use std::collections::HashSet;

/// Default bounded message tail per channel.
pub const DEFAULT_MESSAGE_CAP: usize = 10;

/// Reserved name prefix for support-ticket channels, used by
/// [`RestoreOptions::suppress_ticket_channels`].
pub const TICKET_PREFIX: &str = "ticket-";

/// How images (icon, splash, banner, emojis, image attachments) are
/// carried in a snapshot.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImageMode {
    /// Store the source URL; the target host fetches it on restore.
    #[default]
    Reference,
    /// Download and embed the bytes as base64 in the document.
    Embedded,
}

/// Entity classes that can be excluded from a capture.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Roles,
    Emojis,
    Channels,
    Bans,
}

/// Options for [`BackupEngine::capture`](crate::engine::BackupEngine::capture).
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// How image content is carried in the snapshot.
    pub image_mode: ImageMode,

    /// Upper bound on captured messages per channel or thread.
    pub message_cap: usize,

    /// Entity classes to leave out of the snapshot entirely.
    pub exclude: HashSet<EntityKind>,

    /// Persist the snapshot document to the store after capture. The
    /// in-memory snapshot is returned either way.
    pub json_save: bool,

    /// Pretty-print the persisted document.
    pub pretty_json: bool,

    /// Snapshot identifier to use; generated when absent.
    pub snapshot_id: Option<String>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            image_mode: ImageMode::default(),
            message_cap: DEFAULT_MESSAGE_CAP,
            exclude: HashSet::new(),
            json_save: true,
            pretty_json: true,
            snapshot_id: None,
        }
    }
}

impl CaptureOptions {
    pub fn image_mode(mut self, image_mode: ImageMode) -> Self {
        self.image_mode = image_mode;
        self
    }

    pub fn message_cap(mut self, message_cap: usize) -> Self {
        self.message_cap = message_cap;
        self
    }

    pub fn exclude(mut self, kind: EntityKind) -> Self {
        self.exclude.insert(kind);
        self
    }

    pub fn json_save(mut self, json_save: bool) -> Self {
        self.json_save = json_save;
        self
    }

    pub fn pretty_json(mut self, pretty_json: bool) -> Self {
        self.pretty_json = pretty_json;
        self
    }

    pub fn snapshot_id(mut self, snapshot_id: impl Into<String>) -> Self {
        self.snapshot_id = Some(snapshot_id.into());
        self
    }

    pub fn excludes(&self, kind: EntityKind) -> bool {
        self.exclude.contains(&kind)
    }
}

/// Options for [`BackupEngine::restore`](crate::engine::BackupEngine::restore).
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    /// Wipe the target space before restoring. Destructive.
    pub pre_clear: bool,

    /// Upper bound on replayed messages per channel or thread.
    pub message_cap: usize,

    /// Skip channels whose name starts with [`TICKET_PREFIX`].
    pub suppress_ticket_channels: bool,

    /// Re-apply captured bans to the target.
    pub restore_bans: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            pre_clear: false,
            message_cap: DEFAULT_MESSAGE_CAP,
            suppress_ticket_channels: false,
            restore_bans: false,
        }
    }
}

impl RestoreOptions {
    pub fn pre_clear(mut self, pre_clear: bool) -> Self {
        self.pre_clear = pre_clear;
        self
    }

    pub fn message_cap(mut self, message_cap: usize) -> Self {
        self.message_cap = message_cap;
        self
    }

    pub fn suppress_ticket_channels(mut self, suppress: bool) -> Self {
        self.suppress_ticket_channels = suppress;
        self
    }

    pub fn restore_bans(mut self, restore_bans: bool) -> Self {
        self.restore_bans = restore_bans;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_capture_defaults() {
        let options = CaptureOptions::default();
        assert_eq!(options.message_cap, DEFAULT_MESSAGE_CAP);
        assert!(options.json_save);
        assert!(options.pretty_json);
        assert!(options.exclude.is_empty());
        assert_eq!(options.image_mode, ImageMode::Reference);
    }

    #[test]
    fn test_restore_defaults() {
        let options = RestoreOptions::default();
        assert!(!options.pre_clear);
        assert!(!options.suppress_ticket_channels);
        assert!(!options.restore_bans);
    }

    #[test]
    fn test_exclude_builder() {
        let options = CaptureOptions::default()
            .exclude(EntityKind::Bans)
            .exclude(EntityKind::Emojis);
        assert!(options.excludes(EntityKind::Bans));
        assert!(!options.excludes(EntityKind::Roles));
    }

    #[test]
    fn test_entity_kind_tokens() {
        assert_eq!(EntityKind::Emojis.to_string(), "emojis");
        assert_eq!(EntityKind::from_str("bans").unwrap(), EntityKind::Bans);
    }
}
