//! Application-safe ordering of a change batch
//!
//! Changes are applied lowest precedence first: None, Delete, Add, Modify.
//! The sort is stable, so changes of equal precedence keep their input
//! order. Ordering is a full-batch barrier: every change must be resolved
//! before the batch is sorted.

use std::cmp::Ordering;

use super::change::Change;

/// Compares two possibly absent changes by precedence
///
/// An absent change sorts after every present one.
pub fn compare_precedence(a: Option<&Change>, b: Option<&Change>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.op().precedence().cmp(&b.op().precedence()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stably sorts a batch into application-safe order
pub fn sort_by_precedence(changes: &mut [Change]) {
    changes.sort_by_key(|change| change.op().precedence());
}

/// Stably sorts a batch that may contain absent entries, which go last
pub fn sort_optional_by_precedence(changes: &mut [Option<Change>]) {
    changes.sort_by(|a, b| compare_precedence(a.as_ref(), b.as_ref()));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::domain::{ChangePolicy, FileDescriptor, Operation, RemotePath};

    fn descriptor(size: u64, checksum: &str) -> Arc<FileDescriptor> {
        Arc::new(FileDescriptor::new("f", false, size, Utc::now()).with_checksum(checksum))
    }

    fn change(p: &str, op: Operation) -> Change {
        let path = RemotePath::new(p.to_string()).unwrap();
        let policy = ChangePolicy::default();
        let result = match op {
            Operation::Add => Change::new(path, Some(descriptor(1, "a")), None, policy),
            Operation::Delete => Change::new(path, None, Some(descriptor(1, "a")), policy),
            Operation::Modify => {
                Change::new(path, Some(descriptor(1, "a")), Some(descriptor(2, "b")), policy)
            }
            Operation::None => {
                let same = descriptor(1, "a");
                Change::new(path, Some(same.clone()), Some(same), policy)
            }
        };
        let change = result.unwrap();
        assert_eq!(change.op(), op);
        change
    }

    fn paths(changes: &[Change]) -> Vec<&str> {
        changes.iter().map(|c| c.path().as_str()).collect()
    }

    #[test]
    fn test_reverse_batch_is_reordered() {
        let mut batch = vec![
            change("/m", Operation::Modify),
            change("/a", Operation::Add),
            change("/d", Operation::Delete),
        ];
        sort_by_precedence(&mut batch);
        assert_eq!(paths(&batch), vec!["/d", "/a", "/m"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut batch = vec![
            change("/a2", Operation::Add),
            change("/n1", Operation::None),
            change("/a1", Operation::Add),
            change("/d2", Operation::Delete),
            change("/n2", Operation::None),
            change("/d1", Operation::Delete),
        ];
        sort_by_precedence(&mut batch);
        assert_eq!(paths(&batch), vec!["/n1", "/n2", "/d2", "/d1", "/a2", "/a1"]);
    }

    #[test]
    fn test_absent_changes_sort_last() {
        let mut batch = vec![
            None,
            Some(change("/m", Operation::Modify)),
            None,
            Some(change("/d", Operation::Delete)),
        ];
        sort_optional_by_precedence(&mut batch);

        let ops: Vec<Option<Operation>> = batch.iter().map(|c| c.as_ref().map(Change::op)).collect();
        assert_eq!(
            ops,
            vec![Some(Operation::Delete), Some(Operation::Modify), None, None]
        );
    }

    #[test]
    fn test_compare_precedence() {
        let add = change("/a", Operation::Add);
        let delete = change("/d", Operation::Delete);
        assert_eq!(compare_precedence(Some(&delete), Some(&add)), Ordering::Less);
        assert_eq!(compare_precedence(Some(&add), None), Ordering::Less);
        assert_eq!(compare_precedence(None, Some(&add)), Ordering::Greater);
        assert_eq!(compare_precedence(None, None), Ordering::Equal);
    }
}
