//! # Snapshot storage
//!
//! A directory of JSON documents, one per snapshot, keyed by snapshot
//! identifier. Multiple snapshots are retained concurrently; deleting or
//! overwriting one never touches the others.

use std::{
    fs,
    path::{Path, PathBuf},
};

use snafu::prelude::*;
use tracing::debug;

use crate::{
    Result,
    error::{
        BackupError, DecodeSnafu, EncodeSnafu, InvalidSnapshotIdSnafu, SnapshotNotFoundSnafu,
        StorageSnafu,
    },
    snapshot::Snapshot,
};

/// Summary of one stored snapshot document.
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    pub id: String,
    pub size_bytes: u64,
    pub snapshot: Snapshot,
}

/// Filesystem-backed snapshot store.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).context(StorageSnafu { path: dir.clone() })?;
        Ok(Self { dir })
    }

    /// Persists a snapshot under its own id, replacing any previous
    /// document with that id. Returns the written path.
    pub fn write(&self, snapshot: &Snapshot, pretty: bool) -> Result<PathBuf> {
        let path = self.document_path(&snapshot.id)?;
        let json = if pretty {
            serde_json::to_vec_pretty(snapshot)
        } else {
            serde_json::to_vec(snapshot)
        }
        .context(EncodeSnafu)?;
        fs::write(&path, json).context(StorageSnafu { path: path.clone() })?;
        debug!(snapshot_id = %snapshot.id, path = %path.display(), "snapshot written");
        Ok(path)
    }

    /// Reads a stored snapshot by id.
    ///
    /// # Errors
    /// - [`BackupError::SnapshotNotFound`] if no document exists for `id`
    /// - [`BackupError::Decode`] if the document is not a valid snapshot
    pub fn read(&self, id: &str) -> Result<Snapshot> {
        let path = self.document_path(id)?;
        let raw = fs::read(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => BackupError::SnapshotNotFound {
                snapshot_id: id.to_string(),
            },
            _ => BackupError::Storage {
                path: path.clone(),
                source,
            },
        })?;
        let mut deserializer = serde_json::Deserializer::from_slice(&raw);
        serde_path_to_error::deserialize(&mut deserializer)
            .context(DecodeSnafu { path: path.clone() })
    }

    /// Reads a stored snapshot along with its document size.
    pub fn info(&self, id: &str) -> Result<SnapshotInfo> {
        let snapshot = self.read(id)?;
        let path = self.document_path(id)?;
        let size_bytes = fs::metadata(&path)
            .context(StorageSnafu { path: path.clone() })?
            .len();
        Ok(SnapshotInfo {
            id: id.to_string(),
            size_bytes,
            snapshot,
        })
    }

    /// True if a document exists for `id`.
    pub fn exists(&self, id: &str) -> bool {
        self.document_path(id)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Deletes a stored snapshot.
    ///
    /// # Errors
    /// - [`BackupError::SnapshotNotFound`] if no document exists for `id`
    pub fn delete(&self, id: &str) -> Result<()> {
        let path = self.document_path(id)?;
        if !path.is_file() {
            return SnapshotNotFoundSnafu {
                snapshot_id: id.to_string(),
            }
            .fail();
        }
        fs::remove_file(&path).context(StorageSnafu { path })
    }

    /// Lists the ids of every stored snapshot, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let entries = fs::read_dir(&self.dir).context(StorageSnafu {
            path: self.dir.clone(),
        })?;
        for entry in entries {
            let entry = entry.context(StorageSnafu {
                path: self.dir.clone(),
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json")
                && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Storage keys come from user input; restrict them to a safe charset
    // so an id can never escape the store directory.
    fn document_path(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
            && !id.starts_with('.');
        ensure!(
            valid,
            InvalidSnapshotIdSnafu {
                snapshot_id: id.to_string(),
            }
        );
        Ok(self.dir.join(format!("{id}.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_snapshot(id: &str) -> Snapshot {
        Snapshot {
            id: id.to_string(),
            source_space_id: "s-1".to_string(),
            created_at: Utc::now(),
            name: "Test Space".to_string(),
            verification_level: Default::default(),
            explicit_content_filter: Default::default(),
            default_notifications: Default::default(),
            afk: None,
            widget: Default::default(),
            icon: None,
            splash: None,
            banner: None,
            roles: Vec::new(),
            channels: Default::default(),
            emojis: Vec::new(),
            bans: Vec::new(),
        }
    }

    #[test]
    fn test_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        store.write(&sample_snapshot("snap-1"), true).unwrap();
        let loaded = store.read("snap-1").unwrap();
        assert_eq!(loaded.name, "Test Space");
        assert!(store.exists("snap-1"));
    }

    #[test]
    fn test_multiple_snapshots_retained() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        store.write(&sample_snapshot("alpha"), false).unwrap();
        store.write(&sample_snapshot("beta"), false).unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha", "beta"]);
        store.delete("alpha").unwrap();
        assert_eq!(store.list().unwrap(), vec!["beta"]);
        assert!(store.exists("beta"));
    }

    #[test]
    fn test_missing_snapshot_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        let err = store.read("nope").unwrap_err();
        assert!(matches!(err, BackupError::SnapshotNotFound { .. }));
        let err = store.delete("nope").unwrap_err();
        assert!(matches!(err, BackupError::SnapshotNotFound { .. }));
    }

    #[test]
    fn test_traversal_ids_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        for bad in ["../escape", "", "a/b", ".hidden"] {
            let err = store.read(bad).unwrap_err();
            assert!(
                matches!(err, BackupError::InvalidSnapshotId { .. }),
                "id {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_info_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        store.write(&sample_snapshot("sized"), true).unwrap();
        let info = store.info("sized").unwrap();
        assert_eq!(info.id, "sized");
        assert!(info.size_bytes > 0);
    }
}
