//! # Capture
//!
//! Entity readers that turn a live space into its snapshot representation,
//! and the assembler that orchestrates them.
//!
//! Readers are best-effort by contract: a failure on an individual
//! sub-entity (or a whole listing call) produces a diagnostic and an
//! omission, never an error. The only hard failure in a capture is a
//! source space that cannot be resolved at all.

use chrono::Utc;
use space_host::{ChannelKind, LiveChannel, LiveRole, SpaceHost, SpaceProfile};
use tracing::{debug, info, warn};

use crate::{
    Result,
    error::SpaceNotFoundSnafu,
    options::{CaptureOptions, EntityKind, ImageMode},
    permissions::extract_overwrites,
    snapshot::{
        AfkConfig, AttachmentRecord, BanRecord, CategoryNode, ChannelNode, ChannelTree,
        EmojiRecord, ImageRef, MessageRecord, RoleRecord, Snapshot, TextChannelNode, ThreadNode,
        VoiceChannelNode, WidgetConfig,
    },
};
use snafu::prelude::*;

/// Fixed page size for backward message paging.
const MESSAGE_PAGE_SIZE: usize = 100;

/// File suffixes treated as inlineable images.
const IMAGE_SUFFIXES: &[&str] = &["png", "jpg", "jpeg", "jpe", "jif", "jfif", "jfi"];

fn is_image_name(name: &str) -> bool {
    name.rsplit('.')
        .next()
        .is_some_and(|suffix| IMAGE_SUFFIXES.contains(&suffix.to_ascii_lowercase().as_str()))
}

/// Captures an image by reference or as an embedded payload per the image
/// mode. A failed download falls back to the URL reference.
async fn capture_image<H: SpaceHost>(host: &H, url: &str, mode: ImageMode) -> ImageRef {
    match mode {
        ImageMode::Reference => ImageRef::Url(url.to_string()),
        ImageMode::Embedded => match host.fetch_image(url).await {
            Ok(bytes) => ImageRef::from_bytes(&bytes),
            Err(err) => {
                warn!(url, error = %err, "image download failed, keeping reference");
                ImageRef::Url(url.to_string())
            }
        },
    }
}

// ============================================================================
// ENTITY READERS
// ============================================================================

/// Converts the live role list into snapshot records: managed roles are
/// dropped, the rest are ordered most-senior first, and the role whose id
/// equals the space id becomes the single default-role record.
fn read_roles(space_id: &str, live_roles: &[LiveRole]) -> Vec<RoleRecord> {
    let mut roles: Vec<&LiveRole> = live_roles.iter().filter(|role| !role.managed).collect();
    roles.sort_by_key(|role| std::cmp::Reverse(role.position));
    roles
        .into_iter()
        .map(|role| RoleRecord {
            name: role.name.clone(),
            color: role.color.clone(),
            hoist: role.hoist,
            permissions: role.permissions.to_string(),
            mentionable: role.mentionable,
            position: role.position,
            is_default: role.id == space_id,
        })
        .collect()
}

async fn read_emojis<H: SpaceHost>(
    host: &H,
    space_id: &str,
    options: &CaptureOptions,
) -> Vec<EmojiRecord> {
    let live = match host.list_emojis(space_id).await {
        Ok(live) => live,
        Err(err) => {
            warn!(error = %err, "emoji listing failed, capturing none");
            return Vec::new();
        }
    };
    let mut emojis = Vec::with_capacity(live.len());
    for emoji in live {
        emojis.push(EmojiRecord {
            image: capture_image(host, &emoji.url, options.image_mode).await,
            name: emoji.name,
        });
    }
    emojis
}

async fn read_bans<H: SpaceHost>(host: &H, space_id: &str) -> Vec<BanRecord> {
    match host.list_bans(space_id).await {
        Ok(bans) => bans
            .into_iter()
            .map(|ban| BanRecord {
                user_id: ban.user_id,
                reason: ban.reason,
            })
            .collect(),
        Err(err) => {
            warn!(error = %err, "ban listing failed, capturing none");
            Vec::new()
        }
    }
}

/// Pages backward from the most recent message and keeps up to
/// `message_cap` records. An unresolvable author (deleted account) ends
/// the capture for this channel immediately, even mid-page. The collected
/// newest-first window is reversed so the stored list is chronological.
async fn read_messages<H: SpaceHost>(
    host: &H,
    space_id: &str,
    channel_id: &str,
    channel_name: &str,
    options: &CaptureOptions,
) -> Vec<MessageRecord> {
    let mut collected: Vec<MessageRecord> = Vec::new();
    let mut before: Option<String> = None;
    'paging: loop {
        let page = match host
            .message_page(space_id, channel_id, before.as_deref(), MESSAGE_PAGE_SIZE)
            .await
        {
            Ok(page) => page,
            Err(err) => {
                warn!(channel = channel_name, error = %err, "message page fetch failed");
                break;
            }
        };
        let Some(last) = page.last() else {
            break;
        };
        before = Some(last.id.clone());
        for message in page {
            if collected.len() >= options.message_cap {
                break 'paging;
            }
            let Some(author) = message.author else {
                debug!(
                    channel = channel_name,
                    "unresolvable author, ending message capture"
                );
                break 'paging;
            };
            let mut attachments = Vec::with_capacity(message.attachments.len());
            for attachment in message.attachments {
                let content = if options.image_mode == ImageMode::Embedded
                    && is_image_name(&attachment.name)
                {
                    capture_image(host, &attachment.url, ImageMode::Embedded).await
                } else {
                    ImageRef::Url(attachment.url)
                };
                attachments.push(AttachmentRecord {
                    name: attachment.name,
                    content,
                });
            }
            collected.push(MessageRecord {
                author_name: author.name,
                author_avatar_url: author.avatar_url,
                content: message.content,
                embeds: message.embeds,
                attachments,
                pinned: message.pinned,
            });
        }
    }
    collected.reverse();
    collected
}

async fn read_text_channel<H: SpaceHost>(
    host: &H,
    space_id: &str,
    roles: &[LiveRole],
    channel: &LiveChannel,
    options: &CaptureOptions,
) -> TextChannelNode {
    let mut threads = Vec::new();
    match host.list_threads(space_id, &channel.id).await {
        Ok(live_threads) => {
            for thread in live_threads {
                let messages =
                    read_messages(host, space_id, &thread.id, &thread.name, options).await;
                threads.push(ThreadNode {
                    name: thread.name,
                    archived: thread.archived,
                    locked: thread.locked,
                    auto_archive_minutes: thread.auto_archive_minutes,
                    slowmode_secs: thread.slowmode_secs,
                    messages,
                });
            }
        }
        Err(err) => {
            warn!(channel = %channel.name, error = %err, "thread listing failed");
        }
    }
    TextChannelNode {
        name: channel.name.clone(),
        nsfw: channel.nsfw,
        topic: channel.topic.clone(),
        slowmode_secs: channel.slowmode_secs,
        announcement: channel.kind == ChannelKind::Announcement,
        overwrites: extract_overwrites(&channel.name, &channel.overwrites, roles),
        messages: read_messages(host, space_id, &channel.id, &channel.name, options).await,
        threads,
    }
}

fn read_voice_channel(roles: &[LiveRole], channel: &LiveChannel) -> VoiceChannelNode {
    VoiceChannelNode {
        name: channel.name.clone(),
        bitrate: channel.bitrate,
        user_limit: channel.user_limit,
        overwrites: extract_overwrites(&channel.name, &channel.overwrites, roles),
    }
}

async fn read_channel_node<H: SpaceHost>(
    host: &H,
    space_id: &str,
    roles: &[LiveRole],
    channel: &LiveChannel,
    options: &CaptureOptions,
) -> ChannelNode {
    match channel.kind {
        ChannelKind::Voice => ChannelNode::Voice(read_voice_channel(roles, channel)),
        _ => ChannelNode::Text(read_text_channel(host, space_id, roles, channel, options).await),
    }
}

/// Builds the channel tree: categories by ascending position, each with
/// its children by ascending position, then the remaining parentless
/// channels. Store channels cannot be restored and are skipped.
async fn read_channels<H: SpaceHost>(
    host: &H,
    space_id: &str,
    live_channels: &[LiveChannel],
    roles: &[LiveRole],
    options: &CaptureOptions,
) -> ChannelTree {
    let mut tree = ChannelTree::default();

    let mut categories: Vec<&LiveChannel> = live_channels
        .iter()
        .filter(|ch| ch.kind == ChannelKind::Category)
        .collect();
    categories.sort_by_key(|ch| ch.position);

    for category in categories {
        let mut children: Vec<&LiveChannel> = live_channels
            .iter()
            .filter(|ch| {
                ch.parent_id.as_deref() == Some(category.id.as_str())
                    && ch.kind != ChannelKind::Store
            })
            .collect();
        children.sort_by_key(|ch| ch.position);

        let mut nodes = Vec::with_capacity(children.len());
        for child in children {
            nodes.push(read_channel_node(host, space_id, roles, child, options).await);
        }
        tree.categories.push(CategoryNode {
            name: category.name.clone(),
            overwrites: extract_overwrites(&category.name, &category.overwrites, roles),
            children: nodes,
        });
    }

    let mut others: Vec<&LiveChannel> = live_channels
        .iter()
        .filter(|ch| {
            ch.parent_id.is_none()
                && ch.kind != ChannelKind::Category
                && ch.kind != ChannelKind::Store
        })
        .collect();
    others.sort_by_key(|ch| ch.position);
    for channel in others {
        tree.uncategorized
            .push(read_channel_node(host, space_id, roles, channel, options).await);
    }

    tree
}

// ============================================================================
// SNAPSHOT ASSEMBLER
// ============================================================================

async fn optional_image<H: SpaceHost>(
    host: &H,
    url: Option<&str>,
    mode: ImageMode,
) -> Option<ImageRef> {
    match url {
        Some(url) => Some(capture_image(host, url, mode).await),
        None => None,
    }
}

fn channel_name_by_id(channels: &[LiveChannel], id: Option<&str>) -> Option<String> {
    let id = id?;
    channels
        .iter()
        .find(|ch| ch.id == id)
        .map(|ch| ch.name.clone())
}

/// Captures a complete snapshot of `space_id`.
///
/// Runs every entity reader not excluded by the options and assembles the
/// root document. The returned snapshot has not been persisted; the
/// engine decides that separately so a storage failure can never lose a
/// capture.
///
/// # Errors
/// - [`BackupError::SpaceNotFound`](crate::error::BackupError::SpaceNotFound)
///   if the source space cannot be resolved
pub(crate) async fn capture_space<H: SpaceHost>(
    host: &H,
    space_id: &str,
    options: &CaptureOptions,
) -> Result<Snapshot> {
    let profile: SpaceProfile = host
        .space_profile(space_id)
        .await
        .context(SpaceNotFoundSnafu { space_id })?;

    // fetched once: the channel list resolves AFK/widget names and feeds
    // the channel reader; the live role list keys overwrite extraction
    // even when role records themselves are excluded
    let live_channels = match host.list_channels(space_id).await {
        Ok(channels) => channels,
        Err(err) => {
            warn!(error = %err, "channel listing failed, capturing none");
            Vec::new()
        }
    };
    let live_roles = match host.list_roles(space_id).await {
        Ok(roles) => roles,
        Err(err) => {
            warn!(error = %err, "role listing failed, capturing none");
            Vec::new()
        }
    };

    let id = options
        .snapshot_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut snapshot = Snapshot {
        id,
        source_space_id: profile.id.clone(),
        created_at: Utc::now(),
        name: profile.name.clone(),
        verification_level: profile.verification_level,
        explicit_content_filter: profile.explicit_content_filter,
        default_notifications: profile.default_notifications,
        afk: channel_name_by_id(&live_channels, profile.afk_channel_id.as_deref()).map(
            |channel_name| AfkConfig {
                channel_name,
                timeout_secs: profile.afk_timeout_secs,
            },
        ),
        widget: WidgetConfig {
            enabled: profile.widget_enabled,
            channel_name: channel_name_by_id(&live_channels, profile.widget_channel_id.as_deref()),
        },
        icon: optional_image(host, profile.icon_url.as_deref(), options.image_mode).await,
        splash: optional_image(host, profile.splash_url.as_deref(), options.image_mode).await,
        banner: optional_image(host, profile.banner_url.as_deref(), options.image_mode).await,
        roles: Vec::new(),
        channels: ChannelTree::default(),
        emojis: Vec::new(),
        bans: Vec::new(),
    };

    if !options.excludes(EntityKind::Roles) {
        snapshot.roles = read_roles(space_id, &live_roles);
    }
    if !options.excludes(EntityKind::Emojis) {
        snapshot.emojis = read_emojis(host, space_id, options).await;
    }
    if !options.excludes(EntityKind::Channels) {
        snapshot.channels =
            read_channels(host, space_id, &live_channels, &live_roles, options).await;
    }
    if !options.excludes(EntityKind::Bans) {
        snapshot.bans = read_bans(host, space_id).await;
    }

    info!(
        snapshot_id = %snapshot.id,
        space = %profile.name,
        roles = snapshot.roles.len(),
        channels = snapshot.channels.channel_count(),
        emojis = snapshot.emojis.len(),
        bans = snapshot.bans.len(),
        "capture complete"
    );
    Ok(snapshot)
}
