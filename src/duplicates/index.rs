//! The duplicate-set index: keyed grouping of byte-identical files.
//!
//! # Overview
//!
//! Every admitted file is reduced to a [`ContentKey`], its size paired with
//! the uppercase hex of its 512-bit digest, and inserted into a
//! [`DuplicateIndex`]. Files sharing a key are byte-identical and land in
//! the same [`DuplicateSet`], ordered by
//! [`FilenameOrder`](crate::duplicates::FilenameOrder).
//!
//! The index itself is not synchronized; during a scan the engine holds it
//! behind one mutex so the lookup-and-insert and the first-to-two signal
//! stay atomic.
//!
//! # Example
//!
//! ```
//! use dupehunt::duplicates::{ContentKey, DuplicateIndex};
//! use std::path::PathBuf;
//!
//! let mut index = DuplicateIndex::new();
//! let key = ContentKey::new(2, "A".repeat(128));
//!
//! assert!(!index.insert(key.clone(), PathBuf::from("/data/a.txt")));
//! // The second path completes a duplicate pair.
//! assert!(index.insert(key, PathBuf::from("/data/b.txt")));
//! ```

use std::collections::btree_map::{self, BTreeMap};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::order::FilenameOrder;

/// Identity of a file's content: byte size plus uppercase hex fingerprint.
///
/// Two admitted files with equal keys are byte-identical: the hex component
/// is either the 128-character SHA-512 digest or, for files no larger than
/// the digest, the file's own bytes rendered as hex (padded to 128
/// characters). Keys order by size ascending, then hex ascending, which
/// fixes the index's iteration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ContentKey {
    /// File size in bytes
    pub size: u64,
    /// Uppercase base-16 fingerprint, always 128 characters
    pub hex: String,
}

impl ContentKey {
    /// Create a key from a size and hex fingerprint.
    #[must_use]
    pub fn new(size: u64, hex: String) -> Self {
        debug_assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        Self { size, hex }
    }
}

/// An ordered set of canonical paths sharing one content key.
///
/// Paths are kept sorted under the filename order; the **principal** is the
/// first path inserted and represents the set in the unique-files
/// projection.
#[derive(Debug, Clone)]
pub struct DuplicateSet {
    /// Member paths, sorted under [`FilenameOrder`]
    paths: Vec<PathBuf>,
    /// First path inserted
    principal: PathBuf,
}

impl DuplicateSet {
    fn new(first: PathBuf) -> Self {
        Self {
            paths: vec![first.clone()],
            principal: first,
        }
    }

    /// Insert a path, keeping the set sorted and free of equivalents.
    ///
    /// Returns `false` when the path (or another name for the same on-disk
    /// object) is already present.
    fn insert(&mut self, path: PathBuf, order: &FilenameOrder) -> bool {
        let mut at = self.paths.len();
        for (i, existing) in self.paths.iter().enumerate() {
            match order.cmp(existing, &path) {
                std::cmp::Ordering::Equal => return false,
                std::cmp::Ordering::Greater => {
                    at = i;
                    break;
                }
                std::cmp::Ordering::Less => {}
            }
        }
        // Entries past the insertion point still need the equivalence check.
        if self.paths[at..]
            .iter()
            .any(|p| order.cmp(p, &path) == std::cmp::Ordering::Equal)
        {
            return false;
        }
        self.paths.insert(at, path);
        true
    }

    /// Number of paths in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the set has no paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The first path in filename order.
    #[must_use]
    pub fn first(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    /// The first path that was inserted.
    #[must_use]
    pub fn principal(&self) -> &Path {
        &self.principal
    }

    /// Whether the set contains exactly this path.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Iterate the member paths in filename order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// The member paths in filename order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl<'a> IntoIterator for &'a DuplicateSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Keyed collection of duplicate sets.
///
/// A `BTreeMap` keyed by [`ContentKey`] gives deterministic, bidirectional
/// iteration ascending by `(size, hex)`.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    sets: BTreeMap<ContentKey, DuplicateSet>,
    order: FilenameOrder,
}

impl DuplicateIndex {
    /// Create an empty index.
    ///
    /// The filename-order regex is compiled here, once, and shared by every
    /// set insertion.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path under its content key.
    ///
    /// Creates the set when the key is new (the path becomes the
    /// principal). Returns `true` exactly when this insertion brings the
    /// set to size 2, the moment a duplicate pair is first known. Callers
    /// tracking a running `sets_found` count rely on that signal firing
    /// once per set.
    pub fn insert(&mut self, key: ContentKey, path: PathBuf) -> bool {
        match self.sets.entry(key) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(DuplicateSet::new(path));
                false
            }
            btree_map::Entry::Occupied(mut slot) => {
                let set = slot.get_mut();
                set.insert(path, &self.order) && set.len() == 2
            }
        }
    }

    /// Look up the set for a key.
    #[must_use]
    pub fn get(&self, key: &ContentKey) -> Option<&DuplicateSet> {
        self.sets.get(key)
    }

    /// Iterate sets ascending by `(size, hex)`.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&ContentKey, &DuplicateSet)> {
        self.sets.iter()
    }

    /// Remove every set holding a single path.
    ///
    /// Returns the number of sets removed.
    pub fn prune_singletons(&mut self) -> usize {
        let before = self.sets.len();
        self.sets.retain(|_, set| set.len() > 1);
        before - self.sets.len()
    }

    /// Number of sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether the index holds no sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Drop every set.
    pub fn clear(&mut self) {
        self.sets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(size: u64, fill: char) -> ContentKey {
        ContentKey::new(size, fill.to_string().repeat(128))
    }

    #[test]
    fn test_insert_creates_set_with_principal() {
        let mut index = DuplicateIndex::new();
        let reached_two = index.insert(key(10, 'A'), PathBuf::from("/d/first.txt"));

        assert!(!reached_two);
        assert_eq!(index.len(), 1);
        let set = index.get(&key(10, 'A')).unwrap();
        assert_eq!(set.principal(), Path::new("/d/first.txt"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_first_to_two_signals_once() {
        let mut index = DuplicateIndex::new();
        assert!(!index.insert(key(10, 'A'), PathBuf::from("/d/a.txt")));
        assert!(index.insert(key(10, 'A'), PathBuf::from("/d/b.txt")));
        assert!(!index.insert(key(10, 'A'), PathBuf::from("/d/c.txt")));

        assert_eq!(index.get(&key(10, 'A')).unwrap().len(), 3);
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut index = DuplicateIndex::new();
        index.insert(key(10, 'A'), PathBuf::from("/d/a.txt"));
        let reached_two = index.insert(key(10, 'A'), PathBuf::from("/d/a.txt"));

        assert!(!reached_two);
        assert_eq!(index.get(&key(10, 'A')).unwrap().len(), 1);
    }

    #[test]
    fn test_sets_kept_in_filename_order() {
        let mut index = DuplicateIndex::new();
        let k = key(10, 'A');
        index.insert(k.clone(), PathBuf::from("/d/zeta.txt"));
        index.insert(k.clone(), PathBuf::from("/d/alpha.txt"));
        index.insert(k.clone(), PathBuf::from("/d/Mid.txt"));

        let names: Vec<_> = index
            .get(&k)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["alpha.txt", "Mid.txt", "zeta.txt"]);

        // Order preserved while principal remembers insertion.
        assert_eq!(index.get(&k).unwrap().principal(), Path::new("/d/zeta.txt"));
    }

    #[test]
    fn test_numbered_copies_sort_by_token() {
        let mut index = DuplicateIndex::new();
        let k = key(10, 'B');
        index.insert(k.clone(), PathBuf::from("/d/img_(10).png"));
        index.insert(k.clone(), PathBuf::from("/d/img_(2).png"));
        index.insert(k.clone(), PathBuf::from("/d/img.png"));

        let names: Vec<_> = index
            .get(&k)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["img.png", "img_(2).png", "img_(10).png"]);
    }

    #[test]
    fn test_iteration_ascends_by_size_then_hex() {
        let mut index = DuplicateIndex::new();
        index.insert(key(20, 'B'), PathBuf::from("/d/c"));
        index.insert(key(10, 'F'), PathBuf::from("/d/a"));
        index.insert(key(10, 'A'), PathBuf::from("/d/b"));

        let keys: Vec<_> = index.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![key(10, 'A'), key(10, 'F'), key(20, 'B')]);
    }

    #[test]
    fn test_iteration_is_double_ended() {
        let mut index = DuplicateIndex::new();
        index.insert(key(10, 'A'), PathBuf::from("/d/a"));
        index.insert(key(20, 'B'), PathBuf::from("/d/b"));

        let mut iter = index.iter();
        assert_eq!(iter.next_back().unwrap().0, &key(20, 'B'));
        assert_eq!(iter.next().unwrap().0, &key(10, 'A'));
    }

    #[test]
    fn test_prune_singletons() {
        let mut index = DuplicateIndex::new();
        index.insert(key(10, 'A'), PathBuf::from("/d/a.txt"));
        index.insert(key(10, 'A'), PathBuf::from("/d/b.txt"));
        index.insert(key(20, 'B'), PathBuf::from("/d/lonely.txt"));
        index.insert(key(30, 'C'), PathBuf::from("/d/single.txt"));

        let removed = index.prune_singletons();

        assert_eq!(removed, 2);
        assert_eq!(index.len(), 1);
        assert!(index.get(&key(10, 'A')).is_some());
        assert!(index.get(&key(20, 'B')).is_none());
    }

    #[test]
    fn test_clear() {
        let mut index = DuplicateIndex::new();
        index.insert(key(10, 'A'), PathBuf::from("/d/a.txt"));
        index.clear();
        assert!(index.is_empty());
    }

    #[test]
    fn test_content_key_ordering() {
        let small = ContentKey::new(1, "0".repeat(128));
        let same_size_later_hex = ContentKey::new(1, "F".repeat(128));
        let bigger = ContentKey::new(2, "0".repeat(128));

        assert!(small < same_size_later_hex);
        assert!(same_size_later_hex < bigger);
    }

    #[test]
    #[cfg(unix)]
    fn test_hardlink_not_inserted_twice() {
        use std::fs::{hard_link, File};
        use std::io::Write;
        let dir = tempfile::TempDir::new().unwrap();

        let original = dir.path().join("original.txt");
        let mut f = File::create(&original).unwrap();
        writeln!(f, "content").unwrap();
        let link = dir.path().join("zz_link.txt");
        hard_link(&original, &link).unwrap();

        let mut index = DuplicateIndex::new();
        let k = key(8, 'D');
        index.insert(k.clone(), original.clone());
        let reached_two = index.insert(k.clone(), link);

        assert!(!reached_two);
        assert_eq!(index.get(&k).unwrap().len(), 1);
        assert_eq!(index.get(&k).unwrap().principal(), original.as_path());
    }
}
