/*
 * space-host - remote community-space capability interface
 *
 * SPDX-License-Identifier: Apache-2.0
 */
//! # Space host capability
//!
//! The interface the spaceback engine consumes to talk to a remote
//! community space, and the entity view types that cross it.
//!
//! ## Contents
//!
//! - [`SpaceHost`](host::SpaceHost) - the async capability trait: bulk
//!   reads, backward message paging, and per-entity writes
//! - [`types`] - live entity views and write-request types
//! - [`HostError`](error::HostError) - the remote error taxonomy
//!   (not-found, capability-denied, rate-limited, validation, transport)
//! - [`mock::MemorySpace`] - a complete in-memory host used by the
//!   engine's tests
//!
//! The wire protocol behind a production implementation is deliberately
//! out of scope for this crate; it only defines what a host must be able
//! to do.
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

pub mod error;
pub mod host;
pub mod mock;
pub mod types;

/// Result type alias using `HostError` as the default error.
pub type Result<T, E = crate::error::HostError> = std::result::Result<T, E>;

pub use error::HostError;
pub use host::SpaceHost;
pub use mock::MemorySpace;
pub use types::*;
