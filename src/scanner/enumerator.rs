//! Single-directory enumeration with transient-error resilience.
//!
//! # Overview
//!
//! [`DirEntries`] iterates the immediate entries of one directory, yielding
//! each as an absolute path. It performs no classification: whether an entry
//! is a file, a directory or a symlink is the caller's business. The special
//! entries `.` and `..` are never yielded.
//!
//! The enumerator is lazy (the directory handle is opened on the first call
//! to `next`) and resilient: when the open or a read fails with transient
//! resource exhaustion (out of descriptors, out of memory, device busy), it
//! sleeps for a bounded interval and retries instead of giving up. Any other
//! error is yielded once and ends the iteration.
//!
//! # Example
//!
//! ```no_run
//! use dupehunt::scanner::DirEntries;
//! use std::path::Path;
//!
//! let entries = DirEntries::new(Path::new("/var/log")).unwrap();
//! for entry in entries {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};
use std::thread;

use crate::error::{is_transient, ScanError, RETRY_DELAY};

/// Iterator over the immediate entries of a single directory.
///
/// Yields absolute paths built from the canonicalized search directory.
/// Construction validates the path; the handle itself is opened on first use.
#[derive(Debug)]
pub struct DirEntries {
    /// Canonicalized directory being enumerated
    search_dir: PathBuf,
    /// Underlying handle, present once opened
    handle: Option<ReadDir>,
    /// Set after the terminal error or the natural end
    ended: bool,
}

impl DirEntries {
    /// Create an enumerator for the given directory.
    ///
    /// The path is canonicalized and must name an existing directory.
    ///
    /// # Errors
    ///
    /// * [`ScanError::InvalidPath`] if `path` is empty.
    /// * [`ScanError::NotFound`] if it does not exist.
    /// * [`ScanError::NotADirectory`] if it exists but is not a directory.
    pub fn new(path: &Path) -> Result<Self, ScanError> {
        if path.as_os_str().is_empty() {
            return Err(ScanError::InvalidPath(path.to_path_buf()));
        }
        let search_dir = fs::canonicalize(path)
            .map_err(|e| ScanError::from_io(path.to_path_buf(), e))?;
        if !search_dir.is_dir() {
            return Err(ScanError::NotADirectory(search_dir));
        }

        Ok(Self {
            search_dir,
            handle: None,
            ended: false,
        })
    }

    /// The canonicalized directory this enumerator walks.
    #[must_use]
    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    /// Open the directory handle, retrying transient failures.
    fn open(&mut self) -> Result<(), ScanError> {
        loop {
            match fs::read_dir(&self.search_dir) {
                Ok(handle) => {
                    self.handle = Some(handle);
                    return Ok(());
                }
                Err(e) if is_transient(&e) => {
                    log::warn!(
                        "Transient error opening {}, retrying: {}",
                        self.search_dir.display(),
                        e
                    );
                    thread::sleep(RETRY_DELAY);
                }
                Err(e) => return Err(ScanError::from_io(self.search_dir.clone(), e)),
            }
        }
    }
}

impl Iterator for DirEntries {
    type Item = Result<PathBuf, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ended {
            return None;
        }

        if self.handle.is_none() {
            if let Err(e) = self.open() {
                self.ended = true;
                return Some(Err(e));
            }
        }

        // The handle is present from here on.
        loop {
            let Some(handle) = self.handle.as_mut() else {
                self.ended = true;
                return None;
            };
            match handle.next() {
                Some(Ok(entry)) => {
                    // read_dir never yields `.` or `..`; the join keeps the
                    // yielded path absolute under the canonical search dir.
                    return Some(Ok(self.search_dir.join(entry.file_name())));
                }
                Some(Err(e)) if is_transient(&e) => {
                    log::warn!(
                        "Transient error reading {}, retrying: {}",
                        self.search_dir.display(),
                        e
                    );
                    thread::sleep(RETRY_DELAY);
                }
                Some(Err(e)) => {
                    self.ended = true;
                    self.handle = None;
                    return Some(Err(ScanError::from_io(self.search_dir.clone(), e)));
                }
                None => {
                    self.ended = true;
                    self.handle = None;
                    return None;
                }
            }
        }
    }
}
