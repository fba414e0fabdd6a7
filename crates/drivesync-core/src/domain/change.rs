//! Change entity and operation resolution
//!
//! A [`Change`] is the reconciliation decision for exactly one logical path.
//! Its [`Operation`] is resolved once, at construction, from the source
//! descriptor (the side being copied from), the destination descriptor (the
//! side being copied to) and the [`ChangePolicy`].
//!
//! ## Decision table
//!
//! ```text
//!   force                          -> Add
//!   no source, no destination      -> None
//!   source only                    -> Add
//!   destination only               -> Delete
//!   kinds differ (dir vs file)     -> Modify
//!   files, size/mtime/md5 differ   -> Modify
//!   otherwise                      -> None
//!   no_clobber and result != Add   -> None
//! ```
//!
//! Resolution never fails. Unreadable content degrades to "different", so a
//! single bad file cannot block reconciliation of the rest of the tree.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::checksum::checksums_match;
use super::descriptor::FileDescriptor;
use super::difference::{same_metadata, Differences};
use super::errors::DomainError;
use super::newtypes::RemotePath;
use super::operation::Operation;

/// Per-invocation policy flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePolicy {
    /// Always treat the path as a creation
    pub force: bool,
    /// Never overwrite or delete existing destination content
    pub no_clobber: bool,
}

impl ChangePolicy {
    pub fn new(force: bool, no_clobber: bool) -> Self {
        Self { force, no_clobber }
    }
}

/// Resolves the operation for a (source, destination) pair
pub fn resolve_operation(
    src: Option<&FileDescriptor>,
    dest: Option<&FileDescriptor>,
    policy: ChangePolicy,
) -> Operation {
    if policy.force {
        return Operation::Add;
    }

    let op = unconstrained_operation(src, dest);
    if policy.no_clobber && op != Operation::Add {
        return Operation::None;
    }
    op
}

fn unconstrained_operation(src: Option<&FileDescriptor>, dest: Option<&FileDescriptor>) -> Operation {
    match (src, dest) {
        (None, None) => Operation::None,
        (Some(_), None) => Operation::Add,
        (None, Some(_)) => Operation::Delete,
        (Some(src), Some(dest)) => {
            if src.is_dir() != dest.is_dir() {
                return Operation::Modify;
            }
            // Matching directories have no content to diff
            if src.is_dir() {
                return Operation::None;
            }
            if same_metadata(src, dest) && checksums_match(src, dest) {
                Operation::None
            } else {
                Operation::Modify
            }
        }
    }
}

/// Reconciliation decision for one logical path
#[derive(Debug, Clone)]
pub struct Change {
    path: RemotePath,
    parent: RemotePath,
    src: Option<Arc<FileDescriptor>>,
    dest: Option<Arc<FileDescriptor>>,
    policy: ChangePolicy,
    op: Operation,
}

impl Change {
    /// Builds a change and resolves its operation
    ///
    /// # Errors
    /// Returns `DomainError::EmptyChange` if both sides are absent
    pub fn new(
        path: RemotePath,
        src: Option<Arc<FileDescriptor>>,
        dest: Option<Arc<FileDescriptor>>,
        policy: ChangePolicy,
    ) -> Result<Self, DomainError> {
        if src.is_none() && dest.is_none() {
            return Err(DomainError::EmptyChange(path.to_string()));
        }

        let op = resolve_operation(src.as_deref(), dest.as_deref(), policy);
        debug!(path = %path, %op, force = policy.force, no_clobber = policy.no_clobber, "resolved change");

        let parent = path.parent().unwrap_or_else(RemotePath::root);
        Ok(Self {
            path,
            parent,
            src,
            dest,
            policy,
            op,
        })
    }

    pub fn path(&self) -> &RemotePath {
        &self.path
    }

    pub fn parent(&self) -> &RemotePath {
        &self.parent
    }

    /// Descriptor on the side being copied from
    pub fn src(&self) -> Option<&FileDescriptor> {
        self.src.as_deref()
    }

    /// Descriptor on the side being copied to
    pub fn dest(&self) -> Option<&FileDescriptor> {
        self.dest.as_deref()
    }

    pub fn policy(&self) -> ChangePolicy {
        self.policy
    }

    /// The resolved operation
    pub fn op(&self) -> Operation {
        self.op
    }

    pub fn symbol(&self) -> &'static str {
        self.op.symbol()
    }

    pub fn label(&self) -> &'static str {
        self.op.label()
    }

    /// Attribute differences between both sides, for presentation
    pub fn differences(&self) -> Differences {
        Differences::between(self.src(), self.dest())
    }
}

/// Classifies a single (source, destination, policy) tuple into a [`Change`]
///
/// # Errors
/// Returns `DomainError::EmptyChange` if both sides are absent
pub fn classify(
    path: RemotePath,
    src: Option<Arc<FileDescriptor>>,
    dest: Option<Arc<FileDescriptor>>,
    policy: ChangePolicy,
) -> Result<Change, DomainError> {
    Change::new(path, src, dest, policy)
}
