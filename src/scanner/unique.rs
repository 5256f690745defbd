//! The unique-files projection: one representative per content class.
//!
//! # Overview
//!
//! [`UniqueFilesScanner`] drives a [`DuplicateFilesScanner`] with singleton
//! pruning turned off, then collects each set's principal (the first path
//! inserted) into an ordered list. The result names every distinct piece of
//! content beneath the root exactly once.
//!
//! # Example
//!
//! ```no_run
//! use dupehunt::scanner::{DirectoryScanner, UniqueFilesScanner};
//!
//! let mut scanner = UniqueFilesScanner::new("/data/photos").unwrap();
//! scanner.scan(true).unwrap();
//! scanner.sort();
//! for path in scanner.iter() {
//!     println!("{}", path.display());
//! }
//! ```

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::duplicates::FilenameOrder;
use crate::error::ScanError;

use super::engine::DuplicateFilesScanner;
use super::{
    CompletedCallback, DirectoryScanner, ErrorCallback, ProgressCallback, StartedCallback,
};

/// Scanner producing one path per equivalence class of file content.
#[derive(Debug)]
pub struct UniqueFilesScanner {
    scanner: DuplicateFilesScanner,
    files: Vec<PathBuf>,
    order: FilenameOrder,
}

impl UniqueFilesScanner {
    /// Create a projection rooted at an existing directory.
    ///
    /// # Errors
    ///
    /// Same validation as [`DuplicateFilesScanner::new`].
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let mut scanner = DuplicateFilesScanner::new(path)?;
        scanner.set_keep_singletons(true);
        Ok(Self {
            scanner,
            files: Vec::new(),
            order: FilenameOrder::new(),
        })
    }

    /// The canonicalized root directory.
    #[must_use]
    pub fn search_dir(&self) -> &Path {
        self.scanner.search_dir()
    }

    /// Scan the tree and collect one representative per class.
    ///
    /// Representatives appear in index-key order, ascending by
    /// `(size, hex)`; call [`sort`](Self::sort) or
    /// [`sort_by`](Self::sort_by) to reorder.
    ///
    /// # Errors
    ///
    /// Fails only when the root itself cannot be enumerated.
    pub fn scan(&mut self, recursive: bool) -> Result<(), ScanError> {
        self.scanner.scan(recursive)?;
        self.files = self
            .scanner
            .iter()
            .map(|(_, set)| set.principal().to_path_buf())
            .collect();
        Ok(())
    }

    /// Sort the representatives in place under the filename order.
    pub fn sort(&mut self) {
        let order = &self.order;
        self.files.sort_by(|a, b| order.cmp(a, b));
    }

    /// Sort the representatives in place under a caller-supplied order.
    ///
    /// ```no_run
    /// use dupehunt::duplicates::sort_by_file_size;
    /// use dupehunt::scanner::UniqueFilesScanner;
    ///
    /// let mut scanner = UniqueFilesScanner::new(".").unwrap();
    /// scanner.scan(true).unwrap();
    /// scanner.sort_by(sort_by_file_size);
    /// ```
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Path, &Path) -> Ordering,
    {
        self.files.sort_by(|a, b| compare(a, b));
    }

    /// Iterate the representatives.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// The representatives as a slice.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Statistics of the most recent scan.
    #[must_use]
    pub fn stats(&self) -> super::ScanStats {
        self.scanner.stats()
    }
}

impl<'a> IntoIterator for &'a UniqueFilesScanner {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl DirectoryScanner for UniqueFilesScanner {
    fn set_follow_symlinks(&mut self, flag: bool) {
        self.scanner.set_follow_symlinks(flag);
    }

    fn follow_symlinks(&self) -> bool {
        self.scanner.follow_symlinks()
    }

    fn set_skip_hidden(&mut self, flag: bool) {
        self.scanner.set_skip_hidden(flag);
    }

    fn skip_hidden(&self) -> bool {
        self.scanner.skip_hidden()
    }

    fn set_min_size(&mut self, bytes: u64) {
        self.scanner.set_min_size(bytes);
    }

    fn min_size(&self) -> u64 {
        self.scanner.min_size()
    }

    fn set_max_size(&mut self, bytes: u64) {
        self.scanner.set_max_size(bytes);
    }

    fn max_size(&self) -> u64 {
        self.scanner.max_size()
    }

    fn add_filter(&mut self, ext: &str) {
        self.scanner.add_filter(ext);
    }

    fn set_started_callback(&mut self, cb: StartedCallback) {
        self.scanner.set_started_callback(cb);
    }

    fn set_progress_callback(&mut self, cb: ProgressCallback) {
        self.scanner.set_progress_callback(cb);
    }

    fn set_completed_callback(&mut self, cb: CompletedCallback) {
        self.scanner.set_completed_callback(cb);
    }

    fn set_error_callback(&mut self, cb: ErrorCallback) {
        self.scanner.set_error_callback(cb);
    }

    fn files_examined(&self) -> u64 {
        self.scanner.files_examined()
    }

    fn scan(&mut self, recursive: bool) -> Result<(), ScanError> {
        UniqueFilesScanner::scan(self, recursive)
    }

    fn clear(&mut self) {
        self.scanner.clear();
        self.files.clear();
    }

    fn len(&self) -> usize {
        self.files.len()
    }
}
