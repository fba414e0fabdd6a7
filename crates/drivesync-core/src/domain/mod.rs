//! Domain entities and business logic
//!
//! This module contains the core reconciliation types for drivesync:
//! - File descriptors normalized from local and remote origins
//! - Lazy, memoized content checksums
//! - Attribute difference classification
//! - Change resolution and application-safe ordering
//! - Newtypes for validated identifiers and paths
//! - Domain-specific error types

pub mod change;
pub mod checksum;
pub mod descriptor;
pub mod difference;
pub mod errors;
pub mod newtypes;
pub mod operation;
pub mod ordering;

// Re-export commonly used types
pub use change::{classify, resolve_operation, Change, ChangePolicy};
pub use checksum::checksum;
pub use descriptor::{
    ContentLocation, FileDescriptor, RemoteEntry, RemoteMetadata, UserPermission,
    FOLDER_MIME_TYPE, LARGE_FILE_THRESHOLD,
};
pub use difference::Differences;
pub use errors::DomainError;
pub use newtypes::*;
pub use operation::Operation;
pub use ordering::{compare_precedence, sort_by_precedence, sort_optional_by_precedence};
