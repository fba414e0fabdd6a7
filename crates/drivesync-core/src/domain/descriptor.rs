//! FileDescriptor domain entity
//!
//! A [`FileDescriptor`] is the canonical, origin-independent representation
//! of one filesystem entry. Remote listings and local `stat` results are both
//! normalized into this shape before any reconciliation happens.
//!
//! ## Invariants
//!
//! - Absence of an entry is expressed as `Option::None` by callers, never as
//!   a descriptor with zeroed fields. A present, zero-byte file is a valid
//!   descriptor.
//! - Modification times are rounded to whole seconds, since sub-second
//!   precision is not preserved consistently by both origins.
//! - Construction performs no content I/O. Checksums are computed lazily by
//!   [`crate::domain::checksum::checksum`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// MIME type the remote service uses to mark folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Files larger than this (400 MiB) trigger an advisory before hashing
pub const LARGE_FILE_THRESHOLD: u64 = 400 * 1024 * 1024;

/// Path separator as it is escaped when a remote title is mapped to a local name
const ESCAPED_PATH_SEPARATOR: &str = "%2F";

// ============================================================================
// Raw remote metadata
// ============================================================================

/// Permission of the authenticated user on a remote item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermission {
    /// Permission identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Role granted, e.g. "owner", "writer" or "reader"
    #[serde(default)]
    pub role: String,
    /// Grantee type, e.g. "user" or "anyone"
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Raw metadata for one remote item, as supplied by a remote lister
///
/// This is a boundary DTO: fields mirror what the remote API returns and are
/// not validated. [`FileDescriptor::from_remote`] normalizes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEntry {
    /// Remote item identifier
    #[serde(default)]
    pub id: String,
    /// Display title (may contain characters illegal in local file names)
    pub title: String,
    /// MIME type; folders use [`FOLDER_MIME_TYPE`]
    #[serde(default)]
    pub mime_type: String,
    /// Size in bytes (absent for folders and native documents)
    #[serde(default)]
    pub file_size: Option<u64>,
    /// Modification time in `YYYY-MM-DDTHH:MM:SS.mmmZ` form
    #[serde(default)]
    pub modified_date: String,
    /// MD5 checksum pre-computed by the service, if any
    #[serde(default)]
    pub md5_checksum: Option<String>,
    /// Export format (MIME type) to download URL, for convertible documents
    #[serde(default)]
    pub export_links: BTreeMap<String, String>,
    /// Direct download URL
    #[serde(default)]
    pub download_url: Option<String>,
    /// Entity tag for the current revision
    #[serde(default)]
    pub etag: Option<String>,
    /// Whether the item is shared with others
    #[serde(default)]
    pub shared: bool,
    /// Permission of the authenticated user on this item
    #[serde(default)]
    pub user_permission: Option<UserPermission>,
}

/// Remote-only metadata carried through reconciliation without interpretation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMetadata {
    pub mime_type: String,
    pub export_links: BTreeMap<String, String>,
    pub etag: Option<String>,
    pub shared: bool,
    pub user_permission: Option<UserPermission>,
}

/// Where the content of a descriptor can be read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLocation {
    /// Absolute path on the local filesystem
    Local(PathBuf),
    /// Download URL on the remote service
    Remote(String),
    /// No readable content (folders, export-only documents)
    Unavailable,
}

// ============================================================================
// FileDescriptor
// ============================================================================

/// Canonical representation of one filesystem entry from either origin
pub struct FileDescriptor {
    /// Opaque remote identifier, empty for local-only entries
    id: String,
    /// Path-safe display name
    name: String,
    is_dir: bool,
    size: u64,
    /// Modification time, rounded to whole seconds
    mod_time: DateTime<Utc>,
    content: ContentLocation,
    /// Present only for descriptors built from a remote entry
    remote: Option<RemoteMetadata>,
    /// Whether a computed checksum may be stored back on this instance
    cache_checksum: bool,
    /// Origin-supplied or cached MD5 checksum (lower-case hex)
    md5_checksum: Mutex<Option<String>>,
}

impl FileDescriptor {
    /// Creates a descriptor from explicit attributes
    ///
    /// The modification time is rounded to the second. The descriptor has no
    /// content location and caches computed checksums.
    pub fn new(name: impl Into<String>, is_dir: bool, size: u64, mod_time: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            is_dir,
            size,
            mod_time: round_to_second(mod_time),
            content: ContentLocation::Unavailable,
            remote: None,
            cache_checksum: true,
            md5_checksum: Mutex::new(None),
        }
    }

    /// Normalizes a raw remote entry
    ///
    /// - A malformed `modified_date` yields the Unix epoch instead of failing,
    ///   so downstream comparisons flag a modification-time difference.
    /// - The title is mapped to a legal local file name.
    /// - `is_dir` is derived from the folder MIME type.
    pub fn from_remote(entry: &RemoteEntry) -> Self {
        let mod_time = parse_remote_time(&entry.modified_date);
        let is_dir = entry.mime_type == FOLDER_MIME_TYPE;
        let content = match &entry.download_url {
            Some(url) if !url.is_empty() => ContentLocation::Remote(url.clone()),
            _ => ContentLocation::Unavailable,
        };
        let checksum = entry
            .md5_checksum
            .as_ref()
            .filter(|c| !c.is_empty())
            .map(|c| c.to_ascii_lowercase());

        Self {
            id: entry.id.clone(),
            name: title_to_local_name(&entry.title),
            is_dir,
            size: entry.file_size.unwrap_or(0),
            mod_time,
            content,
            remote: Some(RemoteMetadata {
                mime_type: entry.mime_type.clone(),
                export_links: entry.export_links.clone(),
                etag: entry.etag.clone(),
                shared: entry.shared,
                user_permission: entry.user_permission.clone(),
            }),
            cache_checksum: false,
            md5_checksum: Mutex::new(checksum),
        }
    }

    /// Builds a descriptor from a local `stat` result
    ///
    /// Local descriptors cache their checksum by default: content is assumed
    /// to stay stable for the duration of one reconciliation pass. This is a
    /// performance trade-off, not a correctness guarantee. A file rewritten
    /// mid-pass keeps the digest computed first; use
    /// [`FileDescriptor::with_cache_checksum`] to opt out for files known to
    /// mutate rapidly.
    pub fn from_local(abs_path: &Path, metadata: &std::fs::Metadata) -> Self {
        let name = abs_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mod_time = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| zero_time());

        Self {
            id: String::new(),
            name,
            is_dir: metadata.is_dir(),
            size: metadata.len(),
            mod_time: round_to_second(mod_time),
            content: ContentLocation::Local(abs_path.to_path_buf()),
            remote: None,
            cache_checksum: true,
            md5_checksum: Mutex::new(None),
        }
    }

    /// Sets an origin-supplied checksum
    #[must_use]
    pub fn with_checksum(self, checksum: impl Into<String>) -> Self {
        let checksum = checksum.into();
        *self.checksum_slot() = if checksum.is_empty() {
            None
        } else {
            Some(checksum)
        };
        self
    }

    /// Sets where the content can be read from
    #[must_use]
    pub fn with_content(mut self, content: ContentLocation) -> Self {
        self.content = content;
        self
    }

    /// Sets the remote identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Controls whether computed checksums are stored on this instance
    #[must_use]
    pub fn with_cache_checksum(mut self, cache: bool) -> Self {
        self.cache_checksum = cache;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mod_time(&self) -> DateTime<Utc> {
        self.mod_time
    }

    pub fn content(&self) -> &ContentLocation {
        &self.content
    }

    /// Remote-only metadata (None for local descriptors)
    pub fn remote(&self) -> Option<&RemoteMetadata> {
        self.remote.as_ref()
    }

    /// Returns true if computed checksums are cached on this instance
    pub fn caches_checksum(&self) -> bool {
        self.cache_checksum
    }

    /// Returns true if hashing this file warrants an advisory
    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }

    /// Returns the checksum already known for this instance, without I/O
    pub fn known_checksum(&self) -> Option<String> {
        self.checksum_slot().clone()
    }

    /// Locks the checksum slot
    ///
    /// Poisoning is ignored: the slot holds either a complete digest or
    /// nothing, so a panic elsewhere cannot leave it half-written.
    pub(crate) fn checksum_slot(&self) -> MutexGuard<'_, Option<String>> {
        self.md5_checksum
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for FileDescriptor {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            is_dir: self.is_dir,
            size: self.size,
            mod_time: self.mod_time,
            content: self.content.clone(),
            remote: self.remote.clone(),
            cache_checksum: self.cache_checksum,
            md5_checksum: Mutex::new(self.known_checksum()),
        }
    }
}

impl fmt::Debug for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("is_dir", &self.is_dir)
            .field("size", &self.size)
            .field("mod_time", &self.mod_time)
            .field("content", &self.content)
            .field("remote", &self.remote)
            .field("cache_checksum", &self.cache_checksum)
            .field("md5_checksum", &self.known_checksum())
            .finish()
    }
}

// ============================================================================
// Normalization helpers
// ============================================================================

/// Rounds a timestamp to the nearest whole second (halves round up)
pub fn round_to_second(time: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = time.nanosecond();
    let truncated = time.with_nanosecond(0).unwrap_or(time);
    if nanos >= 500_000_000 {
        truncated + Duration::seconds(1)
    } else {
        truncated
    }
}

/// Parses a remote modification time, falling back to the Unix epoch
fn parse_remote_time(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| round_to_second(t.with_timezone(&Utc)))
        .unwrap_or_else(|_| zero_time())
}

fn zero_time() -> DateTime<Utc> {
    DateTime::<Utc>::from(SystemTime::UNIX_EPOCH)
}

/// Maps a remote title to a name that is legal on the local filesystem
fn title_to_local_name(title: &str) -> String {
    title.replace('\0', "").replace('/', ESCAPED_PATH_SEPARATOR)
}
