//! The duplicate-files scanner engine.
//!
//! # Overview
//!
//! [`DuplicateFilesScanner`] walks a directory tree, classifies every entry,
//! digests each admitted regular file and groups byte-identical files into
//! a [`DuplicateIndex`](crate::duplicates::DuplicateIndex). Traversal is
//! depth-first through the retrying
//! [`DirEntries`](crate::scanner::DirEntries) enumerator; per-entry failures
//! are reported through the error callback and never abort the scan.
//!
//! During the scan the index and its counters live behind a single mutex,
//! held across each lookup-and-insert so the running duplicate-set counter
//! can never skip a value. Once `scan` returns, the index is owned again
//! and iteration borrows it directly.
//!
//! # Example
//!
//! ```no_run
//! use dupehunt::scanner::{DirectoryScanner, DuplicateFilesScanner};
//!
//! let mut scanner = DuplicateFilesScanner::new("/home/user/Pictures").unwrap();
//! scanner.set_skip_hidden(true);
//! scanner.add_filter("jpg");
//! scanner.scan(true).unwrap();
//!
//! for (key, set) in scanner.iter() {
//!     println!("{} bytes x{}:", key.size, set.len());
//!     for path in set {
//!         println!("  {}", path.display());
//!     }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::duplicates::{ContentKey, DuplicateIndex, DuplicateSet};
use crate::error::ScanError;

use super::digest::digest_file;
use super::enumerator::DirEntries;
use super::policy::{is_hidden, ExtensionFilter};
use super::{
    CompletedCallback, DirectoryScanner, ErrorCallback, ProgressCallback, StartedCallback,
};

/// Results of a completed scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Regular files that passed the extension and size filters and were
    /// handed to the digester
    pub files_encountered: u64,
    /// Sum of retained set sizes
    pub file_count: u64,
    /// Number of retained sets
    pub sets_found: u64,
    /// Bytes occupied by duplicate copies beyond each set's first member
    /// (retained singletons contribute their own size once)
    pub space_occupied: u64,
}

/// State shared between the traversal and (potential) hashing workers.
///
/// Mutated only under the engine's mutex; the first-to-two signal from
/// [`DuplicateIndex::insert`] is consumed in the same critical section
/// that performs the insert.
#[derive(Default)]
struct SharedState {
    index: DuplicateIndex,
    files_encountered: u64,
    sets_found: u64,
}

#[derive(Default)]
struct Callbacks {
    started: Option<StartedCallback>,
    progress: Option<ProgressCallback>,
    completed: Option<CompletedCallback>,
    error: Option<ErrorCallback>,
}

/// Scanner that groups byte-identical files beneath a root directory.
///
/// Configure filters and callbacks, call [`scan`](Self::scan), then iterate
/// the resulting duplicate sets. A second `scan` without
/// [`clear`](Self::clear) appends to the existing index; create a fresh
/// scanner per logical scan.
pub struct DuplicateFilesScanner {
    search_dir: PathBuf,
    follow_symlinks: bool,
    skip_hidden: bool,
    min_size: u64,
    max_size: u64,
    extensions: ExtensionFilter,
    remove_singletons: bool,
    callbacks: Callbacks,
    index: DuplicateIndex,
    files_encountered: u64,
    sets_found: u64,
    file_count: u64,
    space_occupied: u64,
}

impl std::fmt::Debug for DuplicateFilesScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFilesScanner")
            .field("search_dir", &self.search_dir)
            .field("follow_symlinks", &self.follow_symlinks)
            .field("skip_hidden", &self.skip_hidden)
            .field("min_size", &self.min_size)
            .field("max_size", &self.max_size)
            .field("extensions", &self.extensions)
            .field("remove_singletons", &self.remove_singletons)
            .field("sets", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl DuplicateFilesScanner {
    /// Create a scanner rooted at an existing directory.
    ///
    /// The root is canonicalized; defaults are: do not follow symlinks, do
    /// not skip hidden files, no size window, no extension filter, prune
    /// singleton sets after the scan.
    ///
    /// # Errors
    ///
    /// * [`ScanError::InvalidPath`] for an empty path.
    /// * [`ScanError::NotFound`] if the path does not exist.
    /// * [`ScanError::NotADirectory`] if it is not a directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ScanError::InvalidPath(path.to_path_buf()));
        }
        let search_dir =
            fs::canonicalize(path).map_err(|e| ScanError::from_io(path.to_path_buf(), e))?;
        if !search_dir.is_dir() {
            return Err(ScanError::NotADirectory(search_dir));
        }

        Ok(Self {
            search_dir,
            follow_symlinks: false,
            skip_hidden: false,
            min_size: 0,
            max_size: u64::MAX,
            extensions: ExtensionFilter::new(),
            remove_singletons: true,
            callbacks: Callbacks::default(),
            index: DuplicateIndex::new(),
            files_encountered: 0,
            sets_found: 0,
            file_count: 0,
            space_occupied: 0,
        })
    }

    /// The canonicalized root directory.
    #[must_use]
    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    /// Keep singleton sets in the index after the scan.
    ///
    /// Pruning is on by default; the unique-files projection turns it off.
    pub fn set_keep_singletons(&mut self, keep: bool) {
        self.remove_singletons = !keep;
    }

    /// The normalized extension filter.
    #[must_use]
    pub fn filters(&self) -> &ExtensionFilter {
        &self.extensions
    }

    /// Add several extensions to the filter.
    pub fn add_filters<I, S>(&mut self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions.add_all(extensions);
    }

    /// Statistics of the most recent scan.
    #[must_use]
    pub fn stats(&self) -> ScanStats {
        ScanStats {
            files_encountered: self.files_encountered,
            file_count: self.file_count,
            sets_found: self.index.len() as u64,
            space_occupied: self.space_occupied,
        }
    }

    /// Sum of retained set sizes from the most recent scan.
    #[must_use]
    pub fn file_count(&self) -> u64 {
        self.file_count
    }

    /// Number of sets currently in the index.
    #[must_use]
    pub fn set_count(&self) -> u64 {
        self.index.len() as u64
    }

    /// Bytes occupied by duplicate copies, per the most recent scan.
    #[must_use]
    pub fn space_occupied(&self) -> u64 {
        self.space_occupied
    }

    /// Iterate the duplicate sets ascending by `(size, hex)`.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&ContentKey, &DuplicateSet)> {
        self.index.iter()
    }

    /// The populated index.
    #[must_use]
    pub fn index(&self) -> &DuplicateIndex {
        &self.index
    }

    /// Walk the tree and populate the index.
    ///
    /// Fires `started`, then enumerates the root; every entry flows through
    /// the classification ladder. After traversal the statistics pass runs,
    /// singleton sets are pruned (unless kept), and `completed` fires with
    /// the final numbers. Derived statistics (`file_count`,
    /// `space_occupied`) are recomputed over the whole index each scan;
    /// `files_encountered` accumulates until [`clear`](Self::clear).
    ///
    /// # Errors
    ///
    /// Only a root that cannot be enumerated at all fails the call. Every
    /// per-entry failure is routed to the error callback instead.
    pub fn scan(&mut self, recursive: bool) -> Result<(), ScanError> {
        if let Some(cb) = &self.callbacks.started {
            cb(&self.search_dir);
        }

        let shared = Mutex::new(SharedState {
            index: std::mem::take(&mut self.index),
            files_encountered: self.files_encountered,
            sets_found: self.sets_found,
        });

        let root_entries = DirEntries::new(&self.search_dir)?;
        for entry in root_entries {
            match entry {
                Ok(dirent) => self.process_entry(&shared, &dirent, recursive),
                Err(err) => self.report(None, &err),
            }
        }

        let state = shared
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        self.index = state.index;
        self.files_encountered = state.files_encountered;
        self.sets_found = state.sets_found;

        self.file_count = 0;
        self.space_occupied = 0;
        for (key, set) in self.index.iter() {
            let members = set.len() as u64;
            if members == 1 {
                if self.remove_singletons {
                    continue;
                }
                self.file_count += 1;
                self.space_occupied += key.size;
            } else {
                self.file_count += members;
                self.space_occupied += key.size * (members - 1);
            }
        }
        if self.remove_singletons {
            let removed = self.index.prune_singletons();
            if removed > 0 {
                log::debug!("Pruned {removed} singleton set(s)");
            }
        }

        if let Some(cb) = &self.callbacks.completed {
            cb(
                &self.search_dir,
                self.files_encountered,
                self.file_count,
                self.index.len() as u64,
                self.space_occupied,
            );
        }

        Ok(())
    }

    /// Classify one directory entry and act on it.
    fn process_entry(&self, shared: &Mutex<SharedState>, dirent: &Path, recurse: bool) {
        if self.skip_hidden && is_hidden(dirent) {
            log::trace!("Skipping hidden entry: {}", dirent.display());
            return;
        }

        let symlink = match fs::symlink_metadata(dirent) {
            Ok(meta) => meta.file_type().is_symlink(),
            Err(e) => {
                self.report(
                    Some(dirent),
                    &ScanError::Metadata {
                        path: dirent.to_path_buf(),
                        source: e,
                    },
                );
                return;
            }
        };
        if symlink && !self.follow_symlinks {
            log::trace!("Skipping symlink: {}", dirent.display());
            return;
        }

        let path = match fs::canonicalize(dirent) {
            Ok(p) => p,
            Err(e) => {
                self.report(
                    Some(dirent),
                    &ScanError::Canonicalize {
                        path: dirent.to_path_buf(),
                        source: e,
                    },
                );
                return;
            }
        };

        let meta = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                // Entries can vanish between enumeration and the stat.
                self.report(Some(&path), &ScanError::from_io(path.clone(), e));
                return;
            }
        };

        if meta.is_dir() {
            if recurse {
                self.descend(shared, &path);
            }
            return;
        }

        if !meta.is_file() {
            return;
        }
        if !self.extensions.matches(&path) {
            log::trace!("Extension filter rejects: {}", path.display());
            return;
        }
        let size = meta.len();
        if size < self.min_size || size > self.max_size {
            log::trace!("Size window rejects ({size}): {}", path.display());
            return;
        }

        match digest_file(&path, size) {
            Ok(key) => {
                let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                state.files_encountered += 1;
                if state.index.insert(key, path) {
                    state.sets_found += 1;
                }
                if let Some(cb) = &self.callbacks.progress {
                    cb(&self.search_dir, state.files_encountered, state.sets_found);
                }
            }
            Err(err) => {
                {
                    let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    state.files_encountered += 1;
                }
                self.report(Some(&path), &err);
            }
        }
    }

    /// Recurse into a subdirectory, depth-first.
    fn descend(&self, shared: &Mutex<SharedState>, dir: &Path) {
        let entries = match DirEntries::new(dir) {
            Ok(entries) => entries,
            Err(err) => {
                // Typically permission denied; the subtree is skipped.
                self.report(Some(dir), &err);
                return;
            }
        };
        for entry in entries {
            match entry {
                Ok(dirent) => self.process_entry(shared, &dirent, true),
                Err(err) => self.report(Some(dir), &err),
            }
        }
    }

    fn report(&self, offending: Option<&Path>, err: &ScanError) {
        log::debug!("Scan error ({}): {err}", self.search_dir.display());
        if let Some(cb) = &self.callbacks.error {
            cb(&self.search_dir, offending, err);
        }
    }
}

impl DirectoryScanner for DuplicateFilesScanner {
    fn set_follow_symlinks(&mut self, flag: bool) {
        self.follow_symlinks = flag;
    }

    fn follow_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    fn set_skip_hidden(&mut self, flag: bool) {
        self.skip_hidden = flag;
    }

    fn skip_hidden(&self) -> bool {
        self.skip_hidden
    }

    fn set_min_size(&mut self, bytes: u64) {
        self.min_size = bytes;
    }

    fn min_size(&self) -> u64 {
        self.min_size
    }

    fn set_max_size(&mut self, bytes: u64) {
        self.max_size = bytes;
    }

    fn max_size(&self) -> u64 {
        self.max_size
    }

    fn add_filter(&mut self, ext: &str) {
        self.extensions.add(ext);
    }

    fn set_started_callback(&mut self, cb: StartedCallback) {
        self.callbacks.started = Some(cb);
    }

    fn set_progress_callback(&mut self, cb: ProgressCallback) {
        self.callbacks.progress = Some(cb);
    }

    fn set_completed_callback(&mut self, cb: CompletedCallback) {
        self.callbacks.completed = Some(cb);
    }

    fn set_error_callback(&mut self, cb: ErrorCallback) {
        self.callbacks.error = Some(cb);
    }

    fn files_examined(&self) -> u64 {
        self.files_encountered
    }

    fn scan(&mut self, recursive: bool) -> Result<(), ScanError> {
        DuplicateFilesScanner::scan(self, recursive)
    }

    fn clear(&mut self) {
        self.index.clear();
        self.files_encountered = 0;
        self.sets_found = 0;
        self.file_count = 0;
        self.space_occupied = 0;
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}
