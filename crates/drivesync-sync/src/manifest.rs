//! Remote listing read from an exported JSON manifest
//!
//! The manifest is a JSON array of remote items in the shape the remote API
//! returns them, each with an extra `path` field giving its logical location:
//!
//! ```json
//! [
//!   {
//!     "path": "/docs/plan.txt",
//!     "id": "0B7xKq3aZ",
//!     "title": "plan.txt",
//!     "mimeType": "text/plain",
//!     "fileSize": 12,
//!     "modifiedDate": "2015-01-02T03:04:05.000Z",
//!     "md5Checksum": "..."
//!   }
//! ]
//! ```

use std::path::{Path, PathBuf};

use drivesync_core::domain::{FileDescriptor, RemoteEntry, RemotePath};
use drivesync_core::ports::{IFileLister, Listing, Origin};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::filter::ListingFilter;
use crate::SyncError;

/// One manifest record: a remote entry plus its logical path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    #[serde(flatten)]
    pub entry: RemoteEntry,
}

/// Lists the remote side from a manifest file
#[derive(Debug, Clone)]
pub struct ManifestLister {
    path: PathBuf,
    filter: ListingFilter,
}

impl ManifestLister {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            filter: ListingFilter::default(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: ListingFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses manifest JSON into a listing
    ///
    /// Records with an invalid path are skipped. If a path appears more than
    /// once the first record wins.
    pub fn parse(&self, json: &str) -> Result<Listing, SyncError> {
        let records: Vec<ManifestEntry> =
            serde_json::from_str(json).map_err(|e| SyncError::InvalidManifest {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        let mut listing = Listing::new();
        for record in records {
            let logical = match RemotePath::new(record.path.clone()) {
                Ok(p) => p,
                Err(err) => {
                    warn!(path = %record.path, %err, "Skipping manifest record with invalid path");
                    continue;
                }
            };
            if !self.filter.admits(&logical) {
                continue;
            }
            if listing.contains_key(&logical) {
                warn!(path = %logical, "Duplicate manifest record ignored");
                continue;
            }
            listing.insert(logical, FileDescriptor::from_remote(&record.entry));
        }
        Ok(listing)
    }
}

#[async_trait::async_trait]
impl IFileLister for ManifestLister {
    fn origin(&self) -> Origin {
        Origin::Remote
    }

    #[instrument(skip(self), fields(manifest = %self.path.display()))]
    async fn list(&self) -> anyhow::Result<Listing> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SyncError::PathNotFound(self.path.clone()).into());
            }
            Err(e) => return Err(SyncError::from(e).into()),
        };

        let listing = self.parse(&json)?;
        debug!(entries = listing.len(), "remote listing complete");
        Ok(listing)
    }
}
