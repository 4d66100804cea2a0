//! Restore policy behaviors: suppression, caps, clamps, exclusions, and
//! pre-clearing.


use fixtures::*;
use space_host::{
    ChannelKind, CreateChannel, ImagePayload, NewRole, SpaceHost, mock::MemorySpace,
    mock::SeedMessage,
};
use spaceback::prelude::*;

fn engine_with(host: MemorySpace, dir: &tempfile::TempDir) -> BackupEngine<MemorySpace> {
    BackupEngine::new(host, SnapshotStore::open(dir.path()).unwrap())
}

#[test_log::test(tokio::test)]
async fn ticket_channels_suppressed_when_enabled() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let target = host.create_space("Blank");
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    let snapshot = engine
        .capture(&source, &CaptureOptions::default())
        .await
        .unwrap();
    let report = engine
        .restore(
            snapshot.into(),
            &target,
            &RestoreOptions::default().suppress_ticket_channels(true),
        )
        .await
        .unwrap();

    assert!(try_channel_by_name(engine.host(), &target, CH_TICKET).is_none());
    assert_eq!(report.channels_skipped, 1);
    assert_eq!(report.channels_created, 5);
    // the sibling announcement channel was still created
    assert!(try_channel_by_name(engine.host(), &target, CH_NEWS).is_some());
}

#[test_log::test(tokio::test)]
async fn ticket_channels_created_when_disabled() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let target = host.create_space("Blank");
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    let snapshot = engine
        .capture(&source, &CaptureOptions::default())
        .await
        .unwrap();
    let report = engine
        .restore(snapshot.into(), &target, &RestoreOptions::default())
        .await
        .unwrap();

    assert!(try_channel_by_name(engine.host(), &target, CH_TICKET).is_some());
    assert_eq!(report.channels_skipped, 0);
}

#[test_log::test(tokio::test)]
async fn replay_respects_restore_cap_and_order() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let target = host.create_space("Blank");
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    let snapshot = engine
        .capture(&source, &CaptureOptions::default())
        .await
        .unwrap();
    engine
        .restore(
            snapshot.into(),
            &target,
            &RestoreOptions::default().message_cap(3),
        )
        .await
        .unwrap();

    let welcome = channel_by_name(engine.host(), &target, CH_WELCOME);
    let messages = engine.host().messages_of(&target, &welcome.id);
    let contents: Vec<_> = messages.iter().map(|msg| msg.content.clone()).collect();
    assert_eq!(contents, vec!["msg 13", "msg 14", "msg 15"]);
}

#[test_log::test(tokio::test)]
async fn capture_respects_message_cap() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    let snapshot = engine
        .capture(
            &source,
            &CaptureOptions::default().message_cap(5).json_save(false),
        )
        .await
        .unwrap();

    let welcome = match &snapshot.channels.categories[0].children[0] {
        ChannelNode::Text(node) => node,
        other => panic!("expected text channel, got {other:?}"),
    };
    assert_eq!(welcome.messages.len(), 5);
    assert_eq!(welcome.messages[0].content, "msg 11");
    assert_eq!(welcome.messages[4].content, "msg 15");
}

#[test_log::test(tokio::test)]
async fn unresolvable_author_ends_channel_capture() {
    let host = MemorySpace::new();
    let space_id = host.create_space("Ghosts");
    let channel = host
        .create_channel(&space_id, CreateChannel::new("log", ChannelKind::Text))
        .await
        .unwrap();
    for n in 1..=3 {
        host.push_message(&space_id, &channel.id, SeedMessage::text("ann", format!("old {n}")));
    }
    host.push_message(&space_id, &channel.id, SeedMessage::orphaned("from a deleted account"));
    for n in 1..=4 {
        host.push_message(&space_id, &channel.id, SeedMessage::text("bob", format!("new {n}")));
    }
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    let snapshot = engine
        .capture(&space_id, &CaptureOptions::default().json_save(false))
        .await
        .unwrap();

    let log = match &snapshot.channels.uncategorized[0] {
        ChannelNode::Text(node) => node,
        other => panic!("expected text channel, got {other:?}"),
    };
    // capture walked backward and stopped at the orphaned message
    let contents: Vec<_> = log.messages.iter().map(|msg| msg.content.clone()).collect();
    assert_eq!(contents, vec!["new 1", "new 2", "new 3", "new 4"]);
}

#[test_log::test(tokio::test)]
async fn excluded_entity_kinds_are_omitted() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    let options = CaptureOptions::default()
        .exclude(EntityKind::Roles)
        .exclude(EntityKind::Emojis)
        .exclude(EntityKind::Channels)
        .exclude(EntityKind::Bans)
        .json_save(false);
    let snapshot = engine.capture(&source, &options).await.unwrap();

    assert!(snapshot.roles.is_empty());
    assert!(snapshot.emojis.is_empty());
    assert!(snapshot.bans.is_empty());
    assert!(snapshot.channels.categories.is_empty());
    assert!(snapshot.channels.uncategorized.is_empty());
    // space metadata still captured
    assert_eq!(snapshot.name, "Origin");
    assert_eq!(snapshot.afk.as_ref().unwrap().channel_name, CH_AFK);
}

#[test_log::test(tokio::test)]
async fn embedded_image_mode_inlines_payloads() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    let snapshot = engine
        .capture(
            &source,
            &CaptureOptions::default()
                .image_mode(ImageMode::Embedded)
                .json_save(false),
        )
        .await
        .unwrap();

    // the mock host serves an image's url bytes as its payload
    let icon = snapshot.icon.as_ref().unwrap();
    assert_eq!(
        icon.decode().unwrap().as_ref(),
        b"mock://img/icon.png".as_slice()
    );
    assert!(matches!(snapshot.emojis[0].image, ImageRef::Embedded(_)));
}

#[test_log::test(tokio::test)]
async fn overwrites_referencing_absent_roles_are_dropped() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let target = host.create_space("Blank");
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    // a snapshot without role records restores onto a target that never
    // gains the referenced role names
    let snapshot = engine
        .capture(
            &source,
            &CaptureOptions::default().exclude(EntityKind::Roles).json_save(false),
        )
        .await
        .unwrap();
    let report = engine
        .restore(snapshot.into(), &target, &RestoreOptions::default())
        .await
        .unwrap();

    let welcome = channel_by_name(engine.host(), &target, CH_WELCOME);
    assert!(welcome.overwrites.is_empty());
    // welcome and the staff category each dropped one record
    assert_eq!(report.overwrites_dropped, 2);
    assert_eq!(report.roles_created, 0);
}

#[test_log::test(tokio::test)]
async fn pre_clear_wipes_target_before_restore() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let target = host.create_space("Crowded");
    host.create_role(
        &target,
        NewRole {
            name: "stale".to_string(),
            color: "#123456".to_string(),
            hoist: false,
            permissions: 0,
            mentionable: false,
        },
    )
    .await
    .unwrap();
    host.create_channel(&target, CreateChannel::new("old-town", ChannelKind::Text))
        .await
        .unwrap();
    host.create_emoji(&target, "stale", ImagePayload::Url("mock://e.png".to_string()))
        .await
        .unwrap();
    host.ban(&target, "u-1", None).await.unwrap();
    host.push_integration(&target, "old-bot");

    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);
    let snapshot = engine
        .capture(&source, &CaptureOptions::default().json_save(false))
        .await
        .unwrap();
    let report = engine
        .restore(
            snapshot.into(),
            &target,
            &RestoreOptions::default().pre_clear(true),
        )
        .await
        .unwrap();

    assert!(report.cleared);
    let host = engine.host();
    assert!(try_channel_by_name(host, &target, "old-town").is_none());
    assert!(host.roles_of(&target).iter().all(|role| role.name != "stale"));
    assert!(host.emojis_of(&target).iter().all(|emoji| emoji.name != "stale"));
    assert!(host.bans_of(&target).is_empty());
    assert!(host.integrations_of(&target).is_empty());
    // the restored structure replaced the junk
    assert!(try_channel_by_name(host, &target, CH_WELCOME).is_some());
}

#[test_log::test(tokio::test)]
async fn bans_restored_only_on_request() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let target = host.create_space("Blank");
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    let snapshot = engine
        .capture(&source, &CaptureOptions::default().json_save(false))
        .await
        .unwrap();
    let report = engine
        .restore(
            snapshot.into(),
            &target,
            &RestoreOptions::default().restore_bans(true),
        )
        .await
        .unwrap();

    let bans = engine.host().bans_of(&target);
    assert_eq!(bans.len(), 1);
    assert_eq!(bans[0].user_id, "u-99");
    assert_eq!(bans[0].reason.as_deref(), Some("spam"));
    assert_eq!(report.bans_applied, 1);
}
