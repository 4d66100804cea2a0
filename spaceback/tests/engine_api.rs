//! Engine entry-point behaviors: hard failures, storage lifecycle, and
//! persistence options.


use fixtures::*;
use space_host::mock::MemorySpace;
use spaceback::prelude::*;

fn engine_with(host: MemorySpace, dir: &tempfile::TempDir) -> BackupEngine<MemorySpace> {
    BackupEngine::new(host, SnapshotStore::open(dir.path()).unwrap())
}

#[test_log::test(tokio::test)]
async fn capture_of_unknown_space_is_a_hard_failure() {
    let host = MemorySpace::new();
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    let err = engine
        .capture("s-missing", &CaptureOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BackupError::SpaceNotFound { .. }));
}

#[test_log::test(tokio::test)]
async fn restore_onto_unknown_space_is_a_hard_failure() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    let snapshot = engine
        .capture(&source, &CaptureOptions::default().json_save(false))
        .await
        .unwrap();
    let err = engine
        .restore(snapshot.into(), "s-missing", &RestoreOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BackupError::SpaceNotFound { .. }));
}

#[test_log::test(tokio::test)]
async fn restore_of_unknown_snapshot_is_a_hard_failure() {
    let host = MemorySpace::new();
    let target = host.create_space("Blank");
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    let err = engine
        .restore("missing".into(), &target, &RestoreOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BackupError::SnapshotNotFound { .. }));
}

#[test_log::test(tokio::test)]
async fn json_save_disabled_skips_persistence() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    engine
        .capture(&source, &CaptureOptions::default().json_save(false))
        .await
        .unwrap();
    assert!(engine.list_snapshots().unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn snapshot_lifecycle_list_info_delete() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    engine
        .capture(&source, &CaptureOptions::default().snapshot_id("weekly"))
        .await
        .unwrap();
    engine
        .capture(&source, &CaptureOptions::default().snapshot_id("daily"))
        .await
        .unwrap();

    assert_eq!(engine.list_snapshots().unwrap(), vec!["daily", "weekly"]);

    let info = engine.snapshot_info("daily").unwrap();
    assert_eq!(info.snapshot.name, "Origin");
    assert!(info.size_bytes > 0);

    engine.delete_snapshot("weekly").unwrap();
    assert_eq!(engine.list_snapshots().unwrap(), vec!["daily"]);
    let err = engine.delete_snapshot("weekly").unwrap_err();
    assert!(matches!(err, BackupError::SnapshotNotFound { .. }));
}

#[test_log::test(tokio::test)]
async fn compact_documents_are_smaller_than_pretty() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    engine
        .capture(&source, &CaptureOptions::default().snapshot_id("pretty"))
        .await
        .unwrap();
    engine
        .capture(
            &source,
            &CaptureOptions::default()
                .snapshot_id("compact")
                .pretty_json(false),
        )
        .await
        .unwrap();

    let pretty = engine.snapshot_info("pretty").unwrap();
    let compact = engine.snapshot_info("compact").unwrap();
    assert!(compact.size_bytes < pretty.size_bytes);
}

#[test_log::test(tokio::test)]
async fn restored_snapshot_roundtrips_through_storage() {
    let host = MemorySpace::new();
    let source = seed_source(&host).await;
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(host, &dir);

    let captured = engine
        .capture(&source, &CaptureOptions::default().snapshot_id("rt"))
        .await
        .unwrap();
    let stored = engine.snapshot_info("rt").unwrap().snapshot;

    assert_eq!(stored.roles.len(), captured.roles.len());
    assert_eq!(
        stored.channels.categories.len(),
        captured.channels.categories.len()
    );
    assert_eq!(stored.created_at, captured.created_at);
    assert_eq!(stored.widget, captured.widget);
}
