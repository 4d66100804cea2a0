//! Errors returned by the snapshot engine
//!
use std::path::PathBuf;

use snafu::prelude::*;
use space_host::HostError;

/// Errors surfaced to callers of the engine entry points.
///
/// Per-entity failures during capture or restore never appear here; they
/// are logged, counted, and converted into omissions. Only failures that
/// make the whole operation meaningless (an unresolvable space, a missing
/// stored snapshot, unusable storage) propagate.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BackupError {
    /// The source or target space could not be resolved on the host.
    #[snafu(display("space {space_id} not found"))]
    SpaceNotFound {
        space_id: String,
        source: HostError,
    },

    /// No stored snapshot exists under the requested identifier.
    #[snafu(display("snapshot {snapshot_id} not found"))]
    SnapshotNotFound { snapshot_id: String },

    /// A snapshot identifier contains characters unsafe for storage keys.
    #[snafu(display("invalid snapshot id {snapshot_id:?}"))]
    InvalidSnapshotId { snapshot_id: String },

    /// Filesystem error in the snapshot store.
    #[snafu(display("snapshot storage {}: {source}", path.display()))]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored snapshot document failed to decode. The path into the
    /// document pinpoints the offending field.
    #[snafu(display("snapshot decode {}: {source}", path.display()))]
    Decode {
        path: PathBuf,
        source: serde_path_to_error::Error<serde_json::Error>,
    },

    /// A snapshot failed to serialize. Unlikely; report as a bug.
    #[snafu(display("snapshot encode: {source}"))]
    Encode { source: serde_json::Error },

    /// One or more sub-operations of a fan-out failed while the rest
    /// succeeded.
    #[snafu(display("{failed} of {total} {phase} operations failed"))]
    PartialFailure {
        phase: String,
        failed: usize,
        total: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_partial_failure() {
        let err = BackupError::PartialFailure {
            phase: "config".to_string(),
            failed: 2,
            total: 7,
        };
        assert_eq!(err.to_string(), "2 of 7 config operations failed");
    }

    #[test]
    fn test_display_snapshot_not_found() {
        let err = BackupError::SnapshotNotFound {
            snapshot_id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "snapshot abc not found");
    }
}
