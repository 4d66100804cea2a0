/*
 * spaceback - snapshot and replay engine for community spaces
 *
 * SPDX-License-Identifier: Apache-2.0
 */
//! # Spaceback
//!
//! Captures the structure of a remote community space (roles, channel
//! hierarchy, emojis, bans, widget and AFK configuration, and a bounded
//! tail of channel messages) into a portable JSON snapshot, and replays
//! that snapshot onto a target space to reconstruct an equivalent
//! structure.
//!
//! ## Features
//!
//! - portable snapshot documents with name-keyed cross-references
//! - dependency-ordered restore (roles before overwrites, categories
//!   before children) with explicit joins over every launched task
//! - bounded message replay through a temporary impersonation proxy,
//!   preserving chronological order and pinned state
//! - per-entity error isolation: failures become logged, counted
//!   omissions, never aborts
//! - bounded retry for the fallible restore steps
//! - multi-snapshot storage keyed by snapshot identifier
//!
//! The remote space itself is reached through the
//! [`SpaceHost`](space_host::SpaceHost) capability trait; this crate
//! never speaks a wire protocol. Tests run against the in-memory
//! [`MemorySpace`](space_host::mock::MemorySpace) host.
//!
//! ## Quick Start
//!
//! See [`engine::BackupEngine`].
#![allow(clippy::missing_errors_doc)] // pedantic
#![allow(clippy::must_use_candidate)] // pedantic
#![warn(clippy::default_trait_access)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::match_same_arms)]
#![warn(clippy::redundant_clone)]
#![warn(clippy::redundant_closure)]
#![warn(clippy::uninlined_format_args)]
#![warn(clippy::unnecessary_wraps)]

mod capture;
mod clear;
pub mod engine;
pub mod error;
pub mod options;
pub mod permissions;
mod replay;
pub mod restore;
pub mod retry;
pub mod snapshot;
pub mod store;

/// Result type alias using `BackupError` as the default error.
pub type Result<T, E = crate::error::BackupError> = std::result::Result<T, E>;

/// Prelude module - import (nearly) all the things with
/// `use spaceback::prelude::*;`
pub mod prelude {
    pub use crate::{
        engine::{BackupEngine, RestoreSource},
        error::BackupError,
        options::{CaptureOptions, EntityKind, ImageMode, RestoreOptions},
        restore::RestoreReport,
        retry::execute_with_retry,
        snapshot::{
            AfkConfig, AttachmentRecord, BanRecord, CategoryNode, ChannelNode, ChannelTree,
            EmojiRecord, ImageRef, MessageRecord, PermissionOverwriteRecord, RoleRecord, Snapshot,
            TextChannelNode, ThreadNode, VoiceChannelNode, WidgetConfig,
        },
        store::{SnapshotInfo, SnapshotStore},
    };
}
