//! File listing port (driven/secondary port)
//!
//! A lister produces the descriptors for one side of a reconciliation. Both
//! the local filesystem and the remote service are consumed through the
//! same trait, so the reconciler never knows which origin it is reading.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because listing failures are adapter-specific.
//!   Total inability to list one side is fatal for a pass; the reconciler
//!   does not try to recover from it.
//! - Pagination, authentication and transport are the implementation's
//!   concern. A lister returns the complete listing.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::descriptor::FileDescriptor;
use crate::domain::newtypes::RemotePath;

/// Descriptors of one side, keyed by logical path
///
/// The root path itself is never part of a listing.
pub type Listing = BTreeMap<RemotePath, FileDescriptor>;

/// Which side a lister reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Local => write!(f, "local"),
            Origin::Remote => write!(f, "remote"),
        }
    }
}

/// Port trait for listing one side of a reconciliation
#[async_trait::async_trait]
pub trait IFileLister: Send + Sync {
    /// The side this lister reads
    fn origin(&self) -> Origin;

    /// Lists every entry below the configured root
    ///
    /// # Returns
    /// The descriptors keyed by their logical path (e.g. "/docs/a.txt")
    async fn list(&self) -> anyhow::Result<Listing>;
}
