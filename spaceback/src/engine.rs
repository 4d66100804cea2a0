//! # Engine entry points
//!
//! [`BackupEngine`] ties a [`SpaceHost`] capability to a
//! [`SnapshotStore`] and exposes the three operations a front-end drives:
//! capture, restore, and snapshot listing (plus inspection and deletion
//! of stored documents).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use space_host::mock::MemorySpace;
//! use spaceback::prelude::*;
//!
//! # async fn example() -> Result<(), BackupError> {
//! let host = MemorySpace::new();
//! let source = host.create_space("Our Community");
//! let target = host.create_space("Staging");
//!
//! let engine = BackupEngine::new(host, SnapshotStore::open("./snapshots")?);
//!
//! // Capture the source space
//! let snapshot = engine.capture(&source, &CaptureOptions::default()).await?;
//!
//! // Replay it onto the target
//! let report = engine
//!     .restore(snapshot.id.as_str().into(), &target, &RestoreOptions::default())
//!     .await?;
//! println!("created {} channels", report.channels_created);
//! # Ok(())
//! # }
//! ```

use space_host::SpaceHost;
use tracing::warn;

use crate::{
    Result,
    capture::capture_space,
    options::{CaptureOptions, RestoreOptions},
    restore::{RestoreReport, restore_space},
    snapshot::Snapshot,
    store::{SnapshotInfo, SnapshotStore},
};

/// Where a restore reads its snapshot from.
#[derive(Debug, Clone)]
pub enum RestoreSource {
    /// A snapshot persisted in the engine's store, by identifier.
    Stored(String),
    /// An in-memory snapshot, e.g. the value a capture just returned. No
    /// round trip through storage.
    InMemory(Snapshot),
}

impl From<&str> for RestoreSource {
    fn from(id: &str) -> Self {
        Self::Stored(id.to_string())
    }
}

impl From<Snapshot> for RestoreSource {
    fn from(snapshot: Snapshot) -> Self {
        Self::InMemory(snapshot)
    }
}

/// The snapshot and replay engine.
pub struct BackupEngine<H: SpaceHost> {
    host: H,
    store: SnapshotStore,
}

impl<H: SpaceHost> BackupEngine<H> {
    pub fn new(host: H, store: SnapshotStore) -> Self {
        Self { host, store }
    }

    /// The capability this engine operates through.
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Captures a snapshot of `space_id`.
    ///
    /// When the options request persistence the document is written to
    /// the store, but the in-memory snapshot is returned regardless of
    /// the persistence outcome so a restore can proceed without a round
    /// trip through storage.
    ///
    /// # Errors
    /// - [`BackupError::SpaceNotFound`](crate::error::BackupError::SpaceNotFound)
    ///   if the source space cannot be resolved
    pub async fn capture(&self, space_id: &str, options: &CaptureOptions) -> Result<Snapshot> {
        let snapshot = capture_space(&self.host, space_id, options).await?;
        if options.json_save
            && let Err(err) = self.store.write(&snapshot, options.pretty_json)
        {
            warn!(snapshot_id = %snapshot.id, error = %err, "snapshot persistence failed");
        }
        Ok(snapshot)
    }

    /// Restores a snapshot onto `space_id` and reports what was created,
    /// skipped, and failed.
    ///
    /// # Errors
    /// - [`BackupError::SnapshotNotFound`](crate::error::BackupError::SnapshotNotFound)
    ///   if `source` names a stored snapshot that does not exist
    /// - [`BackupError::SpaceNotFound`](crate::error::BackupError::SpaceNotFound)
    ///   if the target space cannot be resolved
    pub async fn restore(
        &self,
        source: RestoreSource,
        space_id: &str,
        options: &RestoreOptions,
    ) -> Result<RestoreReport> {
        let snapshot = match source {
            RestoreSource::Stored(id) => self.store.read(&id)?,
            RestoreSource::InMemory(snapshot) => snapshot,
        };
        restore_space(&self.host, space_id, snapshot, options).await
    }

    /// Lists the identifiers of every stored snapshot.
    pub fn list_snapshots(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Reads a stored snapshot and its document size.
    pub fn snapshot_info(&self, id: &str) -> Result<SnapshotInfo> {
        self.store.info(id)
    }

    /// Deletes a stored snapshot.
    pub fn delete_snapshot(&self, id: &str) -> Result<()> {
        self.store.delete(id)
    }
}
