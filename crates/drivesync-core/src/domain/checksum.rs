//! Lazy, memoized content checksums
//!
//! [`checksum`] returns the MD5 digest (lower-case hex) of a descriptor's
//! content, computing it at most once per cacheable descriptor instance.
//! MD5 is used as a content fingerprint because the remote service reports
//! it, not for its security properties.
//!
//! An empty string means "unknown": directories, unreadable content and
//! content only reachable over the network all yield it, and
//! [`checksums_match`] treats it as different from everything, biasing
//! reconciliation toward re-transfer rather than a silent skip.

use std::fs::File;
use std::io;
use std::path::Path;

use md5::{Digest, Md5};
use tracing::{debug, warn};

use super::descriptor::{ContentLocation, FileDescriptor};

/// Returns the content checksum of `descriptor`, computing it on first use
///
/// The descriptor's checksum slot stays locked for the whole computation, so
/// concurrent callers on the same instance wait for the first digest instead
/// of hashing twice.
pub fn checksum(descriptor: &FileDescriptor) -> String {
    if descriptor.is_dir() {
        return String::new();
    }

    let mut slot = descriptor.checksum_slot();
    if let Some(known) = slot.as_ref() {
        return known.clone();
    }

    let path = match descriptor.content() {
        ContentLocation::Local(path) => path,
        ContentLocation::Remote(_) | ContentLocation::Unavailable => {
            debug!(name = descriptor.name(), "no local content to checksum");
            return String::new();
        }
    };

    if descriptor.is_large_file() {
        warn!(
            name = descriptor.name(),
            size = %pretty_bytes(descriptor.size()),
            "checksumming a large file, this might take a while"
        );
    }

    let digest = match md5_file(path) {
        Ok(digest) => digest,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read content, assuming it differs");
            return String::new();
        }
    };

    if descriptor.caches_checksum() {
        *slot = Some(digest.clone());
    }
    digest
}

/// Returns true only if both checksums are known and equal
pub fn checksums_match(src: &FileDescriptor, dest: &FileDescriptor) -> bool {
    let src_sum = checksum(src);
    if src_sum.is_empty() {
        return false;
    }
    let dest_sum = checksum(dest);
    !dest_sum.is_empty() && src_sum == dest_sum
}

fn md5_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Size with a binary unit, as shown in the large-file advisory
pub(crate) fn pretty_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";

    fn local_descriptor(dir: &TempDir, name: &str, content: &[u8]) -> FileDescriptor {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        let metadata = std::fs::metadata(&path).unwrap();
        FileDescriptor::from_local(&path, &metadata)
    }

    #[test]
    fn test_checksum_of_local_file() {
        let dir = TempDir::new().unwrap();
        let descriptor = local_descriptor(&dir, "hello.txt", b"hello");

        assert_eq!(checksum(&descriptor), HELLO_MD5);
        assert_eq!(descriptor.known_checksum().as_deref(), Some(HELLO_MD5));
    }

    #[test]
    fn test_checksum_is_cached_across_content_changes() {
        let dir = TempDir::new().unwrap();
        let descriptor = local_descriptor(&dir, "hello.txt", b"hello");

        let first = checksum(&descriptor);
        std::fs::write(dir.path().join("hello.txt"), b"changed").unwrap();
        let second = checksum(&descriptor);

        assert_eq!(first, second);
    }

    #[test]
    fn test_non_cacheable_descriptor_is_rehashed() {
        let dir = TempDir::new().unwrap();
        let descriptor = local_descriptor(&dir, "hot.log", b"hello").with_cache_checksum(false);

        assert_eq!(checksum(&descriptor), HELLO_MD5);
        assert_eq!(descriptor.known_checksum(), None);

        std::fs::write(dir.path().join("hot.log"), b"changed").unwrap();
        assert_ne!(checksum(&descriptor), HELLO_MD5);
    }

    #[test]
    fn test_directory_checksum_is_empty() {
        let dir = TempDir::new().unwrap();
        let metadata = std::fs::metadata(dir.path()).unwrap();
        let descriptor = FileDescriptor::from_local(dir.path(), &metadata);

        assert_eq!(checksum(&descriptor), "");
        assert_eq!(descriptor.known_checksum(), None);
    }

    #[test]
    fn test_supplied_checksum_skips_io() {
        let descriptor = FileDescriptor::new("a.txt", false, 3, Utc::now())
            .with_content(ContentLocation::Local("/nonexistent/a.txt".into()))
            .with_checksum("abc");

        assert_eq!(checksum(&descriptor), "abc");
    }

    #[test]
    fn test_unreadable_content_yields_empty() {
        let descriptor = FileDescriptor::new("gone.txt", false, 3, Utc::now())
            .with_content(ContentLocation::Local("/nonexistent/gone.txt".into()));

        assert_eq!(checksum(&descriptor), "");
        assert_eq!(descriptor.known_checksum(), None);
    }

    #[test]
    fn test_remote_content_without_checksum_yields_empty() {
        let descriptor = FileDescriptor::new("doc", false, 0, Utc::now())
            .with_content(ContentLocation::Remote("https://example.com/doc".into()));

        assert_eq!(checksum(&descriptor), "");
    }

    #[test]
    fn test_checksums_match_requires_known_values() {
        let now = Utc::now();
        let a = FileDescriptor::new("a", false, 1, now).with_checksum("x");
        let b = FileDescriptor::new("b", false, 1, now).with_checksum("x");
        let c = FileDescriptor::new("c", false, 1, now).with_checksum("y");
        let unknown_1 = FileDescriptor::new("d", false, 1, now);
        let unknown_2 = FileDescriptor::new("e", false, 1, now);

        assert!(checksums_match(&a, &b));
        assert!(!checksums_match(&a, &c));
        assert!(!checksums_match(&a, &unknown_1));
        assert!(!checksums_match(&unknown_1, &unknown_2));
    }

    #[test]
    fn test_concurrent_checksum_populates_cache_once() {
        let dir = TempDir::new().unwrap();
        let descriptor = local_descriptor(&dir, "shared.txt", b"hello");

        let results: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| checksum(&descriptor))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(|r| r == HELLO_MD5));
        assert_eq!(descriptor.known_checksum().as_deref(), Some(HELLO_MD5));
    }

    #[test]
    fn test_pretty_bytes() {
        assert_eq!(pretty_bytes(512), "512 B");
        assert_eq!(pretty_bytes(2048), "2.0 KiB");
        assert_eq!(pretty_bytes(400 * 1024 * 1024), "400.0 MiB");
        assert_eq!(pretty_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
        assert_eq!(pretty_bytes(5 << 50), "5120.0 TiB");
    }
}
