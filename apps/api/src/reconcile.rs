//! Set reconciliation for many-to-many associations.
//!
//! Given the associations currently stored and the ones a client submitted,
//! `diff_by_key` says which to attach and which to detach. Items are compared
//! by key only, so the submitted side may carry stale names without causing
//! churn. Order carries no meaning.

use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq)]
pub struct Diff<T> {
    pub added: Vec<T>,
    pub removed: Vec<T>,
}

impl<T> Diff<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Duplicate keys on either side collapse to their first occurrence.
pub fn diff_by_key<T, K, F>(current: &[T], desired: &[T], key: F) -> Diff<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let current_keys: HashSet<K> = current.iter().map(&key).collect();
    let desired_keys: HashSet<K> = desired.iter().map(&key).collect();

    let added = unseen(desired, &current_keys, &key);
    let removed = unseen(current, &desired_keys, &key);

    Diff { added, removed }
}

fn unseen<T, K, F>(items: &[T], other: &HashSet<K>, key: &F) -> Vec<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let k = key(item);
        if !other.contains(&k) && seen.insert(k) {
            out.push(item.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: i64,
        name: &'static str,
    }

    fn tag(id: i64, name: &'static str) -> Tag {
        Tag { id, name }
    }

    #[test]
    fn test_swap_one_member() {
        let current = vec![tag(1, "x"), tag(2, "y")];
        let desired = vec![tag(2, "y"), tag(3, "z")];
        let diff = diff_by_key(&current, &desired, |t| t.id);
        assert_eq!(diff.added, vec![tag(3, "z")]);
        assert_eq!(diff.removed, vec![tag(1, "x")]);
    }

    #[test]
    fn test_same_set_in_other_order_is_empty() {
        let current = vec![tag(1, "x"), tag(2, "y")];
        let desired = vec![tag(2, "y"), tag(1, "x")];
        assert!(diff_by_key(&current, &desired, |t| t.id).is_empty());
    }

    #[test]
    fn test_compares_by_key_not_by_value() {
        let current = vec![tag(1, "old name")];
        let desired = vec![tag(1, "renamed")];
        assert!(diff_by_key(&current, &desired, |t| t.id).is_empty());
    }

    #[test]
    fn test_duplicate_submissions_attach_once() {
        let diff = diff_by_key(&[], &[tag(4, "w"), tag(4, "w")], |t| t.id);
        assert_eq!(diff.added, vec![tag(4, "w")]);
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn test_clearing_removes_everything() {
        let current = vec![tag(1, "x"), tag(2, "y")];
        let diff = diff_by_key(&current, &[], |t| t.id);
        assert!(diff.added.is_empty());
        assert_eq!(diff.removed.len(), 2);
    }
}
