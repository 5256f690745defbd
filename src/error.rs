//! Structured error handling for the scanner.
//!
//! Errors fall into three bands:
//!
//! 1. **Transient**: resource exhaustion on a directory or file open.
//!    These are retried after a bounded sleep ([`RETRY_DELAY`]) rather than
//!    surfaced; see [`is_transient`].
//! 2. **Per-item**: anything attributable to a single filesystem entry
//!    (canonicalization failure, stat failure, permission denied, read
//!    error). Reported through the error callback; the scan continues.
//! 3. **Fatal**: invalid configuration at the top of a scan. These fail the
//!    call that produced them.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// How long a worker sleeps before retrying a transiently failed open.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Errors that can occur while scanning a directory tree.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The search path was empty.
    #[error("Invalid search path: {0}")]
    InvalidPath(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The search path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A path could not be resolved to canonical form.
    #[error("Cannot canonicalize {path}: {source}")]
    Canonicalize {
        /// Path that failed to resolve
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// File metadata could not be read.
    #[error("Cannot stat {path}: {source}")]
    Metadata {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A read returned zero bytes before the file's stated size was consumed.
    #[error("Short read on {path}")]
    ShortRead {
        /// File that ended early
        path: PathBuf,
    },

    /// An I/O error occurred while accessing a file or directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Classify a raw I/O error against `path` into a [`ScanError`].
    pub(crate) fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }

    /// The path this error is attributed to.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::InvalidPath(p)
            | Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::PermissionDenied(p) => p,
            Self::Canonicalize { path, .. }
            | Self::Metadata { path, .. }
            | Self::ShortRead { path }
            | Self::Io { path, .. } => path,
        }
    }
}

/// Check whether an I/O error is transient resource exhaustion.
///
/// Transient errors are expected on busy systems: a process or the whole
/// machine runs out of descriptors, stream resources or memory, or a file is
/// briefly locked by another process. Opens that fail this way are retried
/// after [`RETRY_DELAY`] instead of being surfaced.
#[must_use]
pub fn is_transient(err: &io::Error) -> bool {
    // Portable kinds first; raw OS codes cover what std leaves uncategorized.
    if matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::OutOfMemory | io::ErrorKind::ResourceBusy
    ) {
        return true;
    }

    let Some(code) = err.raw_os_error() else {
        return false;
    };

    #[cfg(unix)]
    {
        matches!(
            code,
            libc::EMFILE | libc::ENFILE | libc::EAGAIN | libc::ENOMEM | libc::EBUSY
        ) || code == transient_nosr()
    }

    #[cfg(windows)]
    {
        // ERROR_TOO_MANY_OPEN_FILES, ERROR_NOT_ENOUGH_MEMORY, ERROR_OUTOFMEMORY,
        // ERROR_NOT_READY, ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION,
        // ERROR_NETWORK_BUSY, ERROR_PATH_BUSY, ERROR_BUSY.
        matches!(code, 4 | 8 | 14 | 21 | 32 | 33 | 54 | 148 | 170)
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = code;
        false
    }
}

/// ENOSR is absent from some libc targets; treat it as never-matching there.
#[cfg(unix)]
fn transient_nosr() -> i32 {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        libc::ENOSR
    }
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    {
        i32::MIN
    }
}
