//! # Restore
//!
//! Entity writers that re-create a snapshot's structure on a target
//! space, and the orchestration that sequences them.
//!
//! Structural dependencies drive the ordering: roles are written before
//! anything that resolves overwrites by role name; a category exists
//! before its children; AFK and widget settings are applied after the
//! channel tree because they reference channels by name. Everything else
//! runs concurrently, joined explicitly over the complete task set.
//!
//! Cross-space references never survive by identifier. The only stable
//! key after a restore is the name, so overwrites resolve by exact name
//! match against the target's roles; records whose name is absent are
//! dropped, and when the target holds duplicate names the first match
//! wins.

use std::collections::HashMap;

use futures::future::join_all;
use snafu::prelude::*;
use space_host::{
    ChannelKind, CreateChannel, DefaultRolePatch, HostError, ImagePayload, LiveChannel, LiveRole,
    NewRole, NewThread, PremiumTier, ResolvedOverwrite, SpaceFeature, SpaceHost, SpaceProfile,
    SpaceSetting,
};
use tracing::{debug, info, warn};

use crate::{
    Result,
    clear::clear_space,
    error::{BackupError, PartialFailureSnafu, SpaceNotFoundSnafu},
    options::{RestoreOptions, TICKET_PREFIX},
    replay::replay_messages,
    retry::{DEFAULT_MAX_ATTEMPTS, execute_with_retry},
    snapshot::{
        CategoryNode, ChannelNode, ChannelTree, ImageRef, PermissionOverwriteRecord, RoleRecord,
        Snapshot, TextChannelNode, VoiceChannelNode, WidgetConfig,
    },
};

/// Voice bitrate ceiling for each boost tier of a target space.
fn tier_ceiling(tier: PremiumTier) -> u32 {
    match tier {
        PremiumTier::None => 64_000,
        PremiumTier::Tier1 => 128_000,
        PremiumTier::Tier2 => 256_000,
        PremiumTier::Tier3 => 384_000,
    }
}

/// Downgrades a recorded bitrate to the highest value the target's tier
/// accepts.
fn clamp_bitrate(recorded: u32, tier: PremiumTier) -> u32 {
    recorded.min(tier_ceiling(tier))
}

/// Maximum representable voice user limit; recorded values above this are
/// omitted entirely.
const MAX_USER_LIMIT: u32 = 99;

// ============================================================================
// REPORT
// ============================================================================

/// Outcome of a restore: the snapshot that was applied plus per-entity
/// created/skipped/failed counts. Failed entities were logged and
/// omitted; the restore itself still completed.
#[derive(Debug, Clone)]
pub struct RestoreReport {
    /// The snapshot the restore applied
    pub snapshot: Snapshot,

    /// Whether the pre-clear step ran to completion
    pub cleared: bool,

    /// Failed space-setting writes across config, AFK, and widget
    pub config_failures: usize,

    pub roles_created: usize,
    pub roles_failed: usize,

    pub categories_created: usize,
    pub categories_failed: usize,
    pub channels_created: usize,
    pub channels_skipped: usize,
    pub channels_failed: usize,
    pub threads_created: usize,
    pub threads_failed: usize,
    pub messages_sent: usize,
    pub messages_failed: usize,
    /// Overwrites dropped because their role name is absent on the target
    pub overwrites_dropped: usize,

    pub emojis_created: usize,
    pub emojis_failed: usize,

    pub bans_applied: usize,
    pub bans_failed: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct ChannelStats {
    categories_created: usize,
    categories_failed: usize,
    channels_created: usize,
    channels_skipped: usize,
    channels_failed: usize,
    threads_created: usize,
    threads_failed: usize,
    messages_sent: usize,
    messages_failed: usize,
    overwrites_dropped: usize,
}

impl ChannelStats {
    fn absorb(&mut self, other: Self) {
        self.categories_created += other.categories_created;
        self.categories_failed += other.categories_failed;
        self.channels_created += other.channels_created;
        self.channels_skipped += other.channels_skipped;
        self.channels_failed += other.channels_failed;
        self.threads_created += other.threads_created;
        self.threads_failed += other.threads_failed;
        self.messages_sent += other.messages_sent;
        self.messages_failed += other.messages_failed;
        self.overwrites_dropped += other.overwrites_dropped;
    }
}

// ============================================================================
// NAME RESOLUTION
// ============================================================================

/// Maps role names to live role ids on the target. First match wins for
/// duplicate names.
fn build_role_map(roles: &[LiveRole]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for role in roles {
        map.entry(role.name.clone()).or_insert_with(|| role.id.clone());
    }
    map
}

fn resolve_overwrites(
    entity_name: &str,
    records: &[PermissionOverwriteRecord],
    role_map: &HashMap<String, String>,
) -> (Vec<ResolvedOverwrite>, usize) {
    let mut resolved = Vec::new();
    let mut dropped = 0;
    for record in records {
        match role_map.get(&record.role_name) {
            Some(role_id) => resolved.push(ResolvedOverwrite {
                role_id: role_id.clone(),
                allow: record.allow_bits(),
                deny: record.deny_bits(),
            }),
            None => {
                debug!(
                    entity = entity_name,
                    role = %record.role_name,
                    "overwrite role absent on target, dropping"
                );
                dropped += 1;
            }
        }
    }
    (resolved, dropped)
}

fn image_payload(image: &ImageRef) -> Option<ImagePayload> {
    match image {
        ImageRef::Url(url) => Some(ImagePayload::Url(url.clone())),
        ImageRef::Embedded(_) => match image.decode() {
            Some(bytes) => Some(ImagePayload::Bytes(bytes)),
            None => {
                warn!("embedded image payload is not valid base64, skipping");
                None
            }
        },
    }
}

// ============================================================================
// CONFIG WRITER
// ============================================================================

/// Applies the snapshot's space settings concurrently. Idempotent
/// single-shot: the orchestration deliberately does not retry it.
///
/// # Errors
/// - [`BackupError::PartialFailure`] when any sub-application failed;
///   the rest were still applied
async fn apply_config<H: SpaceHost>(
    host: &H,
    space_id: &str,
    snapshot: &Snapshot,
    profile: &SpaceProfile,
) -> Result<()> {
    let mut settings = vec![
        SpaceSetting::Name(snapshot.name.clone()),
        SpaceSetting::VerificationLevel(snapshot.verification_level),
        SpaceSetting::DefaultNotifications(snapshot.default_notifications),
    ];
    if let Some(payload) = snapshot.icon.as_ref().and_then(image_payload) {
        settings.push(SpaceSetting::Icon(Some(payload)));
    }
    if let Some(payload) = snapshot.splash.as_ref().and_then(image_payload) {
        settings.push(SpaceSetting::Splash(Some(payload)));
    }
    if let Some(payload) = snapshot.banner.as_ref().and_then(image_payload) {
        settings.push(SpaceSetting::Banner(Some(payload)));
    }
    // only community spaces accept this edit
    if profile.has_feature(SpaceFeature::Community) {
        settings.push(SpaceSetting::ExplicitContentFilter(
            snapshot.explicit_content_filter,
        ));
    }

    let total = settings.len();
    let applied = settings.into_iter().map(|setting| async move {
        let name = setting.op_name();
        (name, host.apply_setting(space_id, setting).await)
    });
    let mut failed: usize = 0;
    for (name, outcome) in join_all(applied).await {
        if let Err(err) = outcome {
            warn!(setting = name, error = %err, "config write failed");
            failed += 1;
        }
    }
    ensure!(
        failed == 0,
        PartialFailureSnafu {
            phase: "config".to_string(),
            failed,
            total,
        }
    );
    Ok(())
}

// ============================================================================
// ROLE WRITER
// ============================================================================

/// Writes the snapshot's roles onto the target and returns the live roles
/// that were created or edited, plus the per-record failure count.
///
/// The single default-role record always edits the target's existing
/// default role in place; hoist and position are not valid there. The
/// rest are created least-senior first so relative seniority lands in
/// creation order.
///
/// # Errors
/// - [`BackupError::PartialFailure`] when every record failed; a rerun
///   under retry cannot duplicate anything in that case
async fn apply_roles<H: SpaceHost>(
    host: &H,
    space_id: &str,
    records: &[RoleRecord],
) -> Result<(Vec<LiveRole>, usize)> {
    let mut written = Vec::new();
    let mut failed = 0;
    for record in records.iter().rev() {
        let outcome = if record.is_default {
            host.edit_default_role(
                space_id,
                DefaultRolePatch {
                    name: record.name.clone(),
                    color: record.color.clone(),
                    permissions: record.permission_bits(),
                    mentionable: record.mentionable,
                },
            )
            .await
        } else {
            host.create_role(
                space_id,
                NewRole {
                    name: record.name.clone(),
                    color: record.color.clone(),
                    hoist: record.hoist,
                    permissions: record.permission_bits(),
                    mentionable: record.mentionable,
                },
            )
            .await
        };
        match outcome {
            Ok(role) => {
                debug!(role = %role.name, "role written");
                written.push(role);
            }
            Err(err) => {
                warn!(role = %record.name, error = %err, "role write failed, continuing");
                failed += 1;
            }
        }
    }
    ensure!(
        records.is_empty() || !written.is_empty(),
        PartialFailureSnafu {
            phase: "role".to_string(),
            failed,
            total: records.len(),
        }
    );
    Ok((written, failed))
}

// ============================================================================
// CHANNEL WRITER
// ============================================================================

struct WriteCtx<'a> {
    role_map: &'a HashMap<String, String>,
    profile: &'a SpaceProfile,
    options: &'a RestoreOptions,
}

async fn apply_channel_overwrites<H: SpaceHost>(
    host: &H,
    space_id: &str,
    channel: &LiveChannel,
    records: &[PermissionOverwriteRecord],
    ctx: &WriteCtx<'_>,
    stats: &mut ChannelStats,
) {
    let (resolved, dropped) = resolve_overwrites(&channel.name, records, ctx.role_map);
    stats.overwrites_dropped += dropped;
    if resolved.is_empty() {
        return;
    }
    if let Err(err) = host.set_overwrites(space_id, &channel.id, resolved).await {
        warn!(channel = %channel.name, error = %err, "overwrite application failed");
    }
}

async fn create_text_channel<H: SpaceHost>(
    host: &H,
    space_id: &str,
    node: &TextChannelNode,
    parent_id: Option<&str>,
    ctx: &WriteCtx<'_>,
    stats: &mut ChannelStats,
) -> Result<(), HostError> {
    // announcement channels need a capability the target may lack
    let kind = if node.announcement && ctx.profile.has_feature(SpaceFeature::Announcements) {
        ChannelKind::Announcement
    } else {
        ChannelKind::Text
    };
    let mut request = CreateChannel::new(node.name.clone(), kind);
    request.parent_id = parent_id.map(ToString::to_string);
    request.topic = node.topic.clone();
    request.nsfw = node.nsfw;
    request.slowmode_secs = node.slowmode_secs;
    let channel = host.create_channel(space_id, request).await?;
    stats.channels_created += 1;

    apply_channel_overwrites(host, space_id, &channel, &node.overwrites, ctx, stats).await;

    for thread in &node.threads {
        match host
            .create_thread(
                space_id,
                &channel.id,
                NewThread {
                    name: thread.name.clone(),
                    auto_archive_minutes: thread.auto_archive_minutes,
                },
            )
            .await
        {
            Ok(created) => {
                stats.threads_created += 1;
                let replay = replay_messages(
                    host,
                    space_id,
                    &created.id,
                    &created.name,
                    &thread.messages,
                    ctx.options.message_cap,
                )
                .await;
                stats.messages_sent += replay.sent;
                stats.messages_failed += replay.failed;
            }
            Err(err) => {
                warn!(thread = %thread.name, error = %err, "thread creation failed, continuing");
                stats.threads_failed += 1;
            }
        }
    }

    if !node.messages.is_empty() {
        let replay = replay_messages(
            host,
            space_id,
            &channel.id,
            &channel.name,
            &node.messages,
            ctx.options.message_cap,
        )
        .await;
        stats.messages_sent += replay.sent;
        stats.messages_failed += replay.failed;
    }
    Ok(())
}

async fn create_voice_channel<H: SpaceHost>(
    host: &H,
    space_id: &str,
    node: &VoiceChannelNode,
    parent_id: Option<&str>,
    ctx: &WriteCtx<'_>,
    stats: &mut ChannelStats,
) -> Result<(), HostError> {
    let mut request = CreateChannel::new(node.name.clone(), ChannelKind::Voice);
    request.parent_id = parent_id.map(ToString::to_string);
    request.bitrate = Some(clamp_bitrate(node.bitrate, ctx.profile.premium_tier));
    if node.user_limit <= MAX_USER_LIMIT {
        request.user_limit = Some(node.user_limit);
    }
    let channel = host.create_channel(space_id, request).await?;
    stats.channels_created += 1;
    apply_channel_overwrites(host, space_id, &channel, &node.overwrites, ctx, stats).await;
    Ok(())
}

/// Creates one channel under an optional parent category. Ticket-channel
/// suppression is decided here, before any entity is produced.
async fn create_channel_node<H: SpaceHost>(
    host: &H,
    space_id: &str,
    node: &ChannelNode,
    parent_id: Option<&str>,
    ctx: &WriteCtx<'_>,
    stats: &mut ChannelStats,
) {
    if ctx.options.suppress_ticket_channels && node.name().starts_with(TICKET_PREFIX) {
        debug!(channel = %node.name(), "ticket channel suppressed");
        stats.channels_skipped += 1;
        return;
    }
    let outcome = match node {
        ChannelNode::Text(text) => {
            create_text_channel(host, space_id, text, parent_id, ctx, stats).await
        }
        ChannelNode::Voice(voice) => {
            create_voice_channel(host, space_id, voice, parent_id, ctx, stats).await
        }
    };
    if let Err(err) = outcome {
        warn!(channel = %node.name(), error = %err, "channel creation failed, continuing");
        stats.channels_failed += 1;
    }
}

/// Re-creates the channel tree on the target.
///
/// Category shells are created sequentially so their display order
/// matches the snapshot; each category's population (overwrites, then
/// children in order) runs as its own task, concurrent with the other
/// categories and with the uncategorized chain. Children are sequential
/// within a chain because creation order determines sibling order on the
/// target.
async fn apply_channel_tree<H: SpaceHost>(
    host: &H,
    space_id: &str,
    tree: &ChannelTree,
    ctx: &WriteCtx<'_>,
) -> Result<ChannelStats> {
    let mut stats = ChannelStats::default();

    let mut created: Vec<(LiveChannel, &CategoryNode)> = Vec::new();
    for category in &tree.categories {
        match host
            .create_channel(
                space_id,
                CreateChannel::new(category.name.clone(), ChannelKind::Category),
            )
            .await
        {
            Ok(live) => {
                stats.categories_created += 1;
                created.push((live, category));
            }
            Err(err) => {
                warn!(category = %category.name, error = %err, "category creation failed, skipping its children");
                stats.categories_failed += 1;
                stats.channels_failed += category.children.len();
            }
        }
    }

    let category_tasks = created.iter().map(|(live, category)| async move {
        let mut task_stats = ChannelStats::default();
        apply_channel_overwrites(host, space_id, live, &category.overwrites, ctx, &mut task_stats)
            .await;
        for child in &category.children {
            create_channel_node(host, space_id, child, Some(&live.id), ctx, &mut task_stats).await;
        }
        task_stats
    });
    let uncategorized_task = async {
        let mut task_stats = ChannelStats::default();
        for node in &tree.uncategorized {
            create_channel_node(host, space_id, node, None, ctx, &mut task_stats).await;
        }
        task_stats
    };

    let (category_stats, uncategorized_stats) =
        futures::join!(join_all(category_tasks), uncategorized_task);
    for task_stats in category_stats {
        stats.absorb(task_stats);
    }
    stats.absorb(uncategorized_stats);

    let attempted = tree.categories.len() + tree.channel_count();
    let succeeded = stats.categories_created + stats.channels_created + stats.channels_skipped;
    ensure!(
        attempted == 0 || succeeded > 0,
        PartialFailureSnafu {
            phase: "channel".to_string(),
            failed: attempted,
            total: attempted,
        }
    );
    Ok(stats)
}

// ============================================================================
// EMOJI, BAN, AFK, WIDGET WRITERS
// ============================================================================

async fn apply_emojis<H: SpaceHost>(
    host: &H,
    space_id: &str,
    emojis: &[crate::snapshot::EmojiRecord],
) -> Result<(usize, usize)> {
    let mut written = 0;
    let mut failed = 0;
    for emoji in emojis {
        let Some(payload) = image_payload(&emoji.image) else {
            failed += 1;
            continue;
        };
        match host.create_emoji(space_id, &emoji.name, payload).await {
            Ok(_) => written += 1,
            Err(err) => {
                warn!(emoji = %emoji.name, error = %err, "emoji creation failed, continuing");
                failed += 1;
            }
        }
    }
    ensure!(
        written > 0 || emojis.is_empty(),
        PartialFailureSnafu {
            phase: "emoji".to_string(),
            failed,
            total: emojis.len(),
        }
    );
    Ok((written, failed))
}

async fn apply_bans<H: SpaceHost>(
    host: &H,
    space_id: &str,
    bans: &[crate::snapshot::BanRecord],
) -> (usize, usize) {
    let outcomes = bans.iter().map(|ban| async move {
        (
            ban.user_id.clone(),
            host.ban(space_id, &ban.user_id, ban.reason.as_deref()).await,
        )
    });
    let mut applied = 0;
    let mut failed = 0;
    for (user_id, outcome) in join_all(outcomes).await {
        match outcome {
            Ok(()) => applied += 1,
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "ban failed, continuing");
                failed += 1;
            }
        }
    }
    (applied, failed)
}

/// Applies the AFK configuration, resolving the recorded voice channel by
/// name on the freshly restored tree. Returns the failed-write count.
async fn apply_afk<H: SpaceHost>(
    host: &H,
    space_id: &str,
    afk: Option<&crate::snapshot::AfkConfig>,
    channels: &[LiveChannel],
) -> usize {
    let Some(afk) = afk else {
        return 0;
    };
    let Some(channel) = channels
        .iter()
        .find(|ch| ch.kind == ChannelKind::Voice && ch.name == afk.channel_name)
    else {
        warn!(channel = %afk.channel_name, "AFK channel absent on target, skipping");
        return 0;
    };
    let writes = [
        SpaceSetting::AfkChannel(Some(channel.id.clone())),
        SpaceSetting::AfkTimeoutSecs(afk.timeout_secs),
    ];
    let mut failed = 0;
    for setting in writes {
        let name = setting.op_name();
        if let Err(err) = host.apply_setting(space_id, setting).await {
            warn!(setting = name, error = %err, "AFK write failed");
            failed += 1;
        }
    }
    failed
}

/// Applies the widget configuration when the snapshot recorded a widget
/// channel. Returns the failed-write count.
async fn apply_widget<H: SpaceHost>(
    host: &H,
    space_id: &str,
    widget: &WidgetConfig,
    channels: &[LiveChannel],
) -> usize {
    let Some(channel_name) = widget.channel_name.as_deref() else {
        return 0;
    };
    let channel_id = channels
        .iter()
        .find(|ch| ch.name == channel_name)
        .map(|ch| ch.id.clone());
    if channel_id.is_none() {
        warn!(channel = %channel_name, "widget channel absent on target");
    }
    match host
        .apply_setting(
            space_id,
            SpaceSetting::Widget {
                enabled: widget.enabled,
                channel_id,
            },
        )
        .await
    {
        Ok(()) => 0,
        Err(err) => {
            warn!(error = %err, "widget write failed");
            1
        }
    }
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

/// Restores a snapshot onto the target space.
///
/// Hard failures are limited to an unresolvable target space; everything
/// past that point is best-effort with per-entity isolation, and the
/// returned report carries what was created, skipped, and failed. There
/// is no cancellation: a partial restore leaves the target valid, just
/// incomplete.
pub(crate) async fn restore_space<H: SpaceHost>(
    host: &H,
    space_id: &str,
    snapshot: Snapshot,
    options: &RestoreOptions,
) -> Result<RestoreReport> {
    let profile = host
        .space_profile(space_id)
        .await
        .context(SpaceNotFoundSnafu { space_id })?;

    let mut cleared = false;
    if options.pre_clear {
        cleared = execute_with_retry("clear-target", DEFAULT_MAX_ATTEMPTS, || {
            clear_space(host, space_id)
        })
        .await
        .is_some();
    }

    // roles precede every overwrite resolution step
    let (roles_created, roles_failed) =
        execute_with_retry("roles", DEFAULT_MAX_ATTEMPTS, || {
            apply_roles(host, space_id, &snapshot.roles)
        })
        .await
        .map(|(written, failed)| (written.len(), failed))
        .unwrap_or((0, snapshot.roles.len()));

    let target_roles = match host.list_roles(space_id).await {
        Ok(roles) => roles,
        Err(err) => {
            warn!(error = %err, "target role listing failed, overwrites will be dropped");
            Vec::new()
        }
    };
    let role_map = build_role_map(&target_roles);
    let ctx = WriteCtx {
        role_map: &role_map,
        profile: &profile,
        options,
    };

    let (config_outcome, channel_outcome, emoji_outcome, (bans_applied, bans_failed)) = futures::join!(
        apply_config(host, space_id, &snapshot, &profile),
        execute_with_retry("channels", DEFAULT_MAX_ATTEMPTS, || {
            apply_channel_tree(host, space_id, &snapshot.channels, &ctx)
        }),
        execute_with_retry("emojis", DEFAULT_MAX_ATTEMPTS, || {
            apply_emojis(host, space_id, &snapshot.emojis)
        }),
        async {
            if options.restore_bans {
                apply_bans(host, space_id, &snapshot.bans).await
            } else {
                (0, 0)
            }
        },
    );

    let mut config_failures = match config_outcome {
        Ok(()) => 0,
        Err(BackupError::PartialFailure { failed, .. }) => failed,
        Err(err) => {
            warn!(error = %err, "config write failed");
            1
        }
    };
    let channel_stats = channel_outcome.unwrap_or_default();
    let (emojis_created, emojis_failed) =
        emoji_outcome.unwrap_or((0, snapshot.emojis.len()));

    // AFK and widget resolve channels by name, so they join last
    let live_channels = match host.list_channels(space_id).await {
        Ok(channels) => channels,
        Err(err) => {
            warn!(error = %err, "channel listing failed, skipping AFK and widget");
            Vec::new()
        }
    };
    let (afk_failures, widget_failures) = futures::join!(
        apply_afk(host, space_id, snapshot.afk.as_ref(), &live_channels),
        apply_widget(host, space_id, &snapshot.widget, &live_channels),
    );
    config_failures += afk_failures + widget_failures;

    let report = RestoreReport {
        snapshot,
        cleared,
        config_failures,
        roles_created,
        roles_failed,
        categories_created: channel_stats.categories_created,
        categories_failed: channel_stats.categories_failed,
        channels_created: channel_stats.channels_created,
        channels_skipped: channel_stats.channels_skipped,
        channels_failed: channel_stats.channels_failed,
        threads_created: channel_stats.threads_created,
        threads_failed: channel_stats.threads_failed,
        messages_sent: channel_stats.messages_sent,
        messages_failed: channel_stats.messages_failed,
        overwrites_dropped: channel_stats.overwrites_dropped,
        emojis_created,
        emojis_failed,
        bans_applied,
        bans_failed,
    };
    info!(
        space_id,
        roles = report.roles_created,
        categories = report.categories_created,
        channels = report.channels_created,
        messages = report.messages_sent,
        "restore complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ceiling_table() {
        assert_eq!(tier_ceiling(PremiumTier::None), 64_000);
        assert_eq!(tier_ceiling(PremiumTier::Tier1), 128_000);
        assert_eq!(tier_ceiling(PremiumTier::Tier2), 256_000);
        assert_eq!(tier_ceiling(PremiumTier::Tier3), 384_000);
    }

    #[test]
    fn test_clamp_bitrate_monotone() {
        assert_eq!(clamp_bitrate(300_000, PremiumTier::Tier3), 300_000);
        assert_eq!(clamp_bitrate(300_000, PremiumTier::Tier1), 128_000);
        assert_eq!(clamp_bitrate(48_000, PremiumTier::None), 48_000);
        for tier in [
            PremiumTier::None,
            PremiumTier::Tier1,
            PremiumTier::Tier2,
            PremiumTier::Tier3,
        ] {
            assert!(clamp_bitrate(u32::MAX, tier) <= tier_ceiling(tier));
        }
    }

    #[test]
    fn test_role_map_first_match_wins() {
        let role = |id: &str, name: &str| LiveRole {
            id: id.to_string(),
            name: name.to_string(),
            color: "#000000".to_string(),
            hoist: false,
            permissions: 0,
            mentionable: false,
            position: 0,
            managed: false,
            editable: true,
        };
        let map = build_role_map(&[role("r-1", "mods"), role("r-2", "mods")]);
        assert_eq!(map.get("mods"), Some(&"r-1".to_string()));
    }

    #[test]
    fn test_resolve_overwrites_drops_missing() {
        let mut role_map = HashMap::new();
        role_map.insert("mods".to_string(), "r-1".to_string());
        let records = vec![
            PermissionOverwriteRecord {
                role_name: "mods".to_string(),
                allow: "1024".to_string(),
                deny: "0".to_string(),
            },
            PermissionOverwriteRecord {
                role_name: "ghosts".to_string(),
                allow: "1".to_string(),
                deny: "1".to_string(),
            },
        ];
        let (resolved, dropped) = resolve_overwrites("general", &records, &role_map);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].role_id, "r-1");
        assert_eq!(resolved[0].allow, 1024);
        assert_eq!(dropped, 1);
    }
}
