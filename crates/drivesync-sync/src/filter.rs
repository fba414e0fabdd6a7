//! Listing filters shared by the local and remote listers

use drivesync_core::config::{ReconcileConfig, CONTEXT_DIR_NAME};
use drivesync_core::domain::RemotePath;

/// Decides which logical paths take part in a reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingFilter {
    /// Keep entries whose name starts with a dot
    pub include_hidden: bool,
    /// Descend below the first level
    pub recursive: bool,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            include_hidden: false,
            recursive: true,
        }
    }
}

impl From<&ReconcileConfig> for ListingFilter {
    fn from(config: &ReconcileConfig) -> Self {
        Self {
            include_hidden: config.include_hidden,
            recursive: config.recursive,
        }
    }
}

impl ListingFilter {
    /// Returns true if the entry at `path` belongs in a listing
    ///
    /// The drivesync context directory is never listed.
    pub fn admits(&self, path: &RemotePath) -> bool {
        if path.is_root() {
            return false;
        }

        let mut segments = path.as_str().split('/').filter(|s| !s.is_empty());
        let first = segments.clone().next();
        if first == Some(CONTEXT_DIR_NAME) {
            return false;
        }
        if !self.recursive && segments.clone().count() > 1 {
            return false;
        }
        self.include_hidden || !segments.any(is_hidden)
    }
}

/// Dot-files and dot-directories
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> RemotePath {
        RemotePath::new(p.to_string()).unwrap()
    }

    #[test]
    fn test_default_skips_hidden() {
        let filter = ListingFilter::default();
        assert!(filter.admits(&path("/docs/a.txt")));
        assert!(!filter.admits(&path("/.bashrc")));
        assert!(!filter.admits(&path("/.git/config")));
        assert!(!filter.admits(&path("/docs/.cache/x")));
    }

    #[test]
    fn test_include_hidden() {
        let filter = ListingFilter {
            include_hidden: true,
            recursive: true,
        };
        assert!(filter.admits(&path("/.bashrc")));
        assert!(filter.admits(&path("/docs/.cache/x")));
    }

    #[test]
    fn test_context_dir_is_never_listed() {
        let filter = ListingFilter {
            include_hidden: true,
            recursive: true,
        };
        assert!(!filter.admits(&path("/.drivesync")));
        assert!(!filter.admits(&path("/.drivesync/config.yaml")));
    }

    #[test]
    fn test_non_recursive_keeps_first_level() {
        let filter = ListingFilter {
            include_hidden: false,
            recursive: false,
        };
        assert!(filter.admits(&path("/docs")));
        assert!(filter.admits(&path("/a.txt")));
        assert!(!filter.admits(&path("/docs/a.txt")));
    }

    #[test]
    fn test_root_is_never_listed() {
        assert!(!ListingFilter::default().admits(&RemotePath::root()));
    }

    #[test]
    fn test_from_config() {
        let config = ReconcileConfig {
            concurrency: 4,
            include_hidden: true,
            recursive: false,
        };
        let filter = ListingFilter::from(&config);
        assert!(filter.include_hidden);
        assert!(!filter.recursive);
    }
}
