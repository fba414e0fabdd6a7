//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`IFileLister`] for the local side using `tokio::fs`.
//!
//! ## Design Decisions
//!
//! - **File links are followed**: a symlink to a regular file is described by
//!   its target. Links to directories are skipped and never descended into, so
//!   a link back to an ancestor cannot make the walk loop.
//! - **Unreadable entries are skipped** with a warning instead of failing the
//!   whole listing. This includes subdirectories that cannot be read. Only an
//!   unreadable root is fatal.
//! - **No hashing here**: descriptors are built from `stat` results only;
//!   checksums are computed lazily during classification.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use anyhow::Context;
use drivesync_core::domain::{FileDescriptor, RemotePath};
use drivesync_core::ports::{IFileLister, Listing, Origin};
use tracing::{debug, instrument, warn};

use crate::filter::ListingFilter;
use crate::SyncError;

/// Adapter that lists a local directory tree as descriptors
#[derive(Debug, Clone)]
pub struct LocalFileSystemAdapter {
    root: PathBuf,
    filter: ListingFilter,
}

impl LocalFileSystemAdapter {
    /// Create an adapter rooted at `root` with the default filter.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter: ListingFilter::default(),
        }
    }

    /// Replace the listing filter.
    #[must_use]
    pub fn with_filter(mut self, filter: ListingFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps an absolute entry path to its logical path below the root
    fn logical_path(&self, entry_path: &Path) -> anyhow::Result<RemotePath> {
        let relative = entry_path.strip_prefix(&self.root).with_context(|| {
            format!("{} is outside {}", entry_path.display(), self.root.display())
        })?;
        Ok(RemotePath::from_relative(relative)?)
    }

    /// Recursively walks `dir`, inserting every admitted entry
    ///
    /// Read failures are returned only for the root. Below it they are logged
    /// and the affected directory contributes whatever was read before.
    fn walk_directory<'a>(
        &'a self,
        dir: &'a Path,
        listing: &'a mut Listing,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let is_root = dir == self.root.as_path();
            let mut entries = match tokio::fs::read_dir(dir).await {
                Ok(entries) => entries,
                Err(err) if !is_root => {
                    warn!(path = ?dir, %err, "Skipping unreadable directory");
                    return Ok(());
                }
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("Failed to read directory: {}", dir.display()));
                }
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(err) if !is_root => {
                        warn!(path = ?dir, %err, "Stopped reading directory");
                        break;
                    }
                    Err(err) => {
                        return Err(err)
                            .with_context(|| format!("Failed to read directory: {}", dir.display()));
                    }
                };

                let entry_path = entry.path();
                let logical = match self.logical_path(&entry_path) {
                    Ok(p) => p,
                    Err(err) => {
                        warn!(path = ?entry_path, %err, "Skipping entry with unusable path");
                        continue;
                    }
                };

                if !self.filter.admits(&logical) {
                    debug!(path = %logical, "Filtered out");
                    continue;
                }

                let Some(metadata) = self.entry_metadata(&entry, &logical).await else {
                    continue;
                };

                let descriptor = FileDescriptor::from_local(&entry_path, &metadata);
                listing.insert(logical, descriptor);

                if metadata.is_dir() && self.filter.recursive {
                    self.walk_directory(&entry_path, listing).await?;
                }
            }

            Ok(())
        })
    }

    /// Stats an entry without following directory links
    ///
    /// Returns `None` for entries that are not listed: unreadable entries,
    /// special files, dangling links and links to directories.
    async fn entry_metadata(
        &self,
        entry: &tokio::fs::DirEntry,
        logical: &RemotePath,
    ) -> Option<std::fs::Metadata> {
        let entry_path = entry.path();
        let mut metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(err) => {
                warn!(path = ?entry_path, %err, "Skipping unreadable entry");
                return None;
            }
        };

        if metadata.file_type().is_symlink() {
            metadata = match tokio::fs::metadata(&entry_path).await {
                Ok(target) if target.is_file() => target,
                Ok(target) if target.is_dir() => {
                    debug!(path = %logical, "Skipping link to directory");
                    return None;
                }
                Ok(_) => {
                    debug!(path = %logical, "Skipping link to special file");
                    return None;
                }
                Err(err) => {
                    warn!(path = ?entry_path, %err, "Skipping dangling link");
                    return None;
                }
            };
        }

        if !metadata.is_dir() && !metadata.is_file() {
            debug!(path = %logical, "Skipping special file");
            return None;
        }
        Some(metadata)
    }
}

#[async_trait::async_trait]
impl IFileLister for LocalFileSystemAdapter {
    fn origin(&self) -> Origin {
        Origin::Local
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn list(&self) -> anyhow::Result<Listing> {
        let metadata = match tokio::fs::metadata(&self.root).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SyncError::PathNotFound(self.root.clone()).into());
            }
            Err(e) => return Err(SyncError::from(e).into()),
        };
        if !metadata.is_dir() {
            return Err(SyncError::NotADirectory(self.root.clone()).into());
        }

        let mut listing = Listing::new();
        self.walk_directory(&self.root, &mut listing).await?;

        debug!(entries = listing.len(), "local listing complete");
        Ok(listing)
    }
}
