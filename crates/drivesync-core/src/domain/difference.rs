//! Attribute difference classification
//!
//! [`Differences`] records which attributes of two descriptors differ. It is
//! used by presentation code to explain a decision; the resolver itself uses
//! the cheaper [`same_metadata`] pre-check and only hashes when needed.

use std::fmt;

use serde::Serialize;

use super::checksum::checksums_match;
use super::descriptor::FileDescriptor;

/// Which attributes differ between two descriptors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Differences {
    pub size: bool,
    pub mod_time: bool,
    pub dir_type: bool,
    pub checksum: bool,
}

impl Differences {
    /// Nothing differs
    pub const NONE: Self = Self {
        size: false,
        mod_time: false,
        dir_type: false,
        checksum: false,
    };

    /// Everything differs (one side is absent)
    pub const ALL: Self = Self {
        size: true,
        mod_time: true,
        dir_type: true,
        checksum: true,
    };

    /// Classifies the differences between two possibly absent descriptors
    ///
    /// If either side is absent every attribute is reported as different.
    /// Checksums are only compared when both sides are regular files; an
    /// unknown checksum on either side counts as a difference.
    pub fn between(src: Option<&FileDescriptor>, dest: Option<&FileDescriptor>) -> Self {
        let (Some(src), Some(dest)) = (src, dest) else {
            return Self::ALL;
        };

        let dir_type = src.is_dir() != dest.is_dir();
        let both_files = !src.is_dir() && !dest.is_dir();

        Self {
            size: src.size() != dest.size(),
            mod_time: src.mod_time() != dest.mod_time(),
            dir_type,
            checksum: both_files && !checksums_match(src, dest),
        }
    }

    /// Returns true if no attribute differs
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Names of the differing attributes, in a fixed order
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.size, "size"),
            (self.mod_time, "mod_time"),
            (self.dir_type, "dir_type"),
            (self.checksum, "checksum"),
        ]
        .into_iter()
        .filter_map(|(differs, name)| differs.then_some(name))
        .collect()
    }
}

impl fmt::Display for Differences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        write!(f, "{}", self.names().join(", "))
    }
}

/// Cheap comparison of size, modification time and kind (no hashing)
pub fn same_metadata(src: &FileDescriptor, dest: &FileDescriptor) -> bool {
    src.size() == dest.size() && src.mod_time() == dest.mod_time() && src.is_dir() == dest.is_dir()
}
