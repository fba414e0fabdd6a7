//! drivesync Sync - Listers and reconciliation planning
//!
//! Provides:
//! - A local filesystem lister
//! - A remote lister backed by an exported JSON manifest
//! - A concurrent reconciler that turns two listings into an ordered plan
//!
//! ## Modules
//!
//! - [`filesystem`] - Local filesystem adapter (async directory walk)
//! - [`filter`] - Hidden-entry and depth filtering shared by both listers
//! - [`manifest`] - Remote listing read from a JSON manifest
//! - [`reconciler`] - Bounded-concurrency classification and ordering

pub mod filesystem;
pub mod filter;
pub mod manifest;
pub mod reconciler;

use std::path::PathBuf;

use drivesync_core::ports::Origin;
use thiserror::Error;

/// Errors that can occur while listing or planning
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error occurred during file operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The listing root exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The remote manifest could not be parsed
    #[error("Invalid manifest {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    /// One side could not be listed at all
    #[error("Failed to list {origin} side: {message}")]
    ListingFailed { origin: Origin, message: String },

    /// A classification worker panicked or was cancelled
    #[error("Classification task failed: {0}")]
    TaskFailed(String),

    /// A domain-level error propagated from drivesync-core
    #[error("Domain error: {0}")]
    DomainError(#[from] drivesync_core::domain::DomainError),
}
