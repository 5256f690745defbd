//! Directory scanning: traversal, classification and digesting.
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`enumerator`]: resilient single-directory iteration
//! - [`policy`]: hidden-file and extension admission rules
//! - [`digest`]: SHA-512 content fingerprinting
//! - [`engine`]: the duplicate-files scanner itself
//! - [`unique`]: the one-representative-per-class projection
//!
//! Both scanners implement [`DirectoryScanner`], the shared capability
//! surface: filter setters, callback setters and `scan`.
//!
//! # Example
//!
//! ```no_run
//! use dupehunt::scanner::{DirectoryScanner, DuplicateFilesScanner};
//!
//! let mut scanner = DuplicateFilesScanner::new("/data/photos").unwrap();
//! scanner.set_skip_hidden(true);
//! scanner.set_min_size(1024);
//! scanner.scan(true).unwrap();
//! println!("{} duplicate sets", scanner.len());
//! ```

pub mod digest;
pub mod engine;
pub mod enumerator;
pub mod policy;
pub mod unique;

use std::path::Path;

use crate::error::ScanError;

pub use digest::{digest_file, DIGEST_LENGTH, MAX_BUFFER_SIZE};
pub use engine::{DuplicateFilesScanner, ScanStats};
pub use enumerator::DirEntries;
pub use policy::{is_hidden, ExtensionFilter};
pub use unique::UniqueFilesScanner;

/// Fired once when a scan begins, with the canonical root.
pub type StartedCallback = Box<dyn Fn(&Path) + Send + Sync>;

/// Fired after each admitted file, with the root, the running count of
/// files handed to the digester, and the running count of duplicate sets.
pub type ProgressCallback = Box<dyn Fn(&Path, u64, u64) + Send + Sync>;

/// Fired once when a scan finishes, with the root, `files_encountered`,
/// `file_count`, the retained set count and `space_occupied`.
pub type CompletedCallback = Box<dyn Fn(&Path, u64, u64, u64, u64) + Send + Sync>;

/// Fired for each per-entry failure, with the root, the offending path
/// (absent for enumerator-terminal errors) and the error.
pub type ErrorCallback = Box<dyn Fn(&Path, Option<&Path>, &ScanError) + Send + Sync>;

/// Common capability surface of the scanners.
///
/// Filters and callbacks are set before [`scan`](Self::scan); results are
/// read through the implementor's own iteration after it returns. Per-entry
/// errors flow to the error callback; `scan` itself only fails on an
/// unusable root.
pub trait DirectoryScanner {
    /// Descend into symlinked directories and admit symlinked files.
    fn set_follow_symlinks(&mut self, flag: bool);

    /// Whether symlinks are followed.
    fn follow_symlinks(&self) -> bool;

    /// Skip entries whose filename starts with `.` (and, on Windows,
    /// entries carrying the hidden or system attribute).
    fn set_skip_hidden(&mut self, flag: bool);

    /// Whether hidden entries are skipped.
    fn skip_hidden(&self) -> bool;

    /// Inclusive lower bound on admitted file sizes.
    fn set_min_size(&mut self, bytes: u64);

    /// The inclusive lower size bound.
    fn min_size(&self) -> u64;

    /// Inclusive upper bound on admitted file sizes.
    fn set_max_size(&mut self, bytes: u64);

    /// The inclusive upper size bound.
    fn max_size(&self) -> u64;

    /// Add an extension to the admission filter (synonyms expand; an empty
    /// filter admits everything).
    fn add_filter(&mut self, ext: &str);

    /// Install the scan-started callback.
    fn set_started_callback(&mut self, cb: StartedCallback);

    /// Install the per-file progress callback.
    fn set_progress_callback(&mut self, cb: ProgressCallback);

    /// Install the scan-completed callback.
    fn set_completed_callback(&mut self, cb: CompletedCallback);

    /// Install the per-entry error callback.
    fn set_error_callback(&mut self, cb: ErrorCallback);

    /// Count of regular files that reached the digester.
    fn files_examined(&self) -> u64;

    /// Walk the tree rooted at the search directory.
    ///
    /// # Errors
    ///
    /// Fails only when the root itself cannot be enumerated.
    fn scan(&mut self, recursive: bool) -> Result<(), ScanError>;

    /// Drop all results and reset the counters.
    fn clear(&mut self);

    /// Number of result entries (sets or unique files).
    fn len(&self) -> usize;

    /// Whether there are no results.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
