//! Path orderings used inside duplicate sets.
//!
//! # Overview
//!
//! [`FilenameOrder`] is the default total order over canonical paths. It
//! understands bracketed numeric tokens in filenames (`photo_(2).jpg`,
//! `track[10].mp3`), so numbered copies sort by their number rather than
//! lexicographically, and it treats two paths naming the same on-disk object
//! as equal so a set never holds both names of a hardlink.
//!
//! [`sort_by_file_size`] and [`sort_by_modified`] are alternative
//! comparators for use with
//! [`UniqueFilesScanner::sort_by`](crate::scanner::UniqueFilesScanner::sort_by).

use std::cmp::Ordering;
use std::path::Path;

use regex::Regex;

/// Pattern matching a bracketed numeric token: `(7)`, `[12]`, `{3}` or `_4_`.
const NUMERIC_TOKEN: &str = r"[(\[{_](\d+)[)\]}_]";

/// Total order over paths combining numeric-token precedence with
/// case-insensitive lexicographic comparison.
///
/// Rules, applied in order:
///
/// 1. Equal paths compare equal.
/// 2. Paths naming the same on-disk object (device and inode) compare equal.
/// 3. When both filenames carry a numeric token, the token values order them.
/// 4. When exactly one carries a token, the token-bearing name sorts last.
/// 5. Otherwise filenames compare case-insensitively, with the full path as
///    the final tiebreak so the order stays strict over distinct paths.
///
/// The token regex is compiled once per instance; share one instance across
/// all comparisons on an index.
#[derive(Debug, Clone)]
pub struct FilenameOrder {
    token: Regex,
}

impl Default for FilenameOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl FilenameOrder {
    /// Create the order, compiling the token pattern.
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: Regex::new(NUMERIC_TOKEN).expect("numeric token pattern is valid"),
        }
    }

    /// Compare two paths under the filename order.
    #[must_use]
    pub fn cmp(&self, lhs: &Path, rhs: &Path) -> Ordering {
        if lhs == rhs {
            return Ordering::Equal;
        }
        if same_object(lhs, rhs) {
            return Ordering::Equal;
        }

        let lname = lhs.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let rname = rhs.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();

        let lnum = self.numeric_token(&lname);
        let rnum = self.numeric_token(&rname);

        match (lnum, rnum) {
            (Some(a), Some(b)) => match a.cmp(&b) {
                Ordering::Equal => Self::name_then_path(&lname, &rname, lhs, rhs),
                other => other,
            },
            // The token-bearing name is the numbered copy; it sorts after.
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Self::name_then_path(&lname, &rname, lhs, rhs),
        }
    }

    /// Extract the numeric token from a filename, if any.
    fn numeric_token(&self, name: &str) -> Option<u64> {
        let digits = self.token.captures(name)?.get(1)?.as_str();
        // Tokens longer than u64 fall back to digit-string order below.
        digits.parse().ok()
    }

    fn name_then_path(lname: &str, rname: &str, lhs: &Path, rhs: &Path) -> Ordering {
        lname
            .to_lowercase()
            .cmp(&rname.to_lowercase())
            .then_with(|| lhs.cmp(rhs))
    }
}

/// Check whether two paths refer to the same on-disk object.
///
/// Uses device and inode identity on Unix; on other platforms distinct paths
/// are assumed distinct (duplicate content still groups them by hash).
#[must_use]
pub fn same_object(lhs: &Path, rhs: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        match (std::fs::metadata(lhs), std::fs::metadata(rhs)) {
            (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
            _ => false,
        }
    }

    #[cfg(not(unix))]
    {
        let _ = (lhs, rhs);
        false
    }
}

/// Order paths by on-disk file size, smallest first.
///
/// Unstatable paths compare as size zero.
#[must_use]
pub fn sort_by_file_size(lhs: &Path, rhs: &Path) -> Ordering {
    let size = |p: &Path| std::fs::metadata(p).map(|m| m.len()).unwrap_or(0);
    size(lhs).cmp(&size(rhs)).then_with(|| lhs.cmp(rhs))
}

/// Order paths by modification time, oldest first.
///
/// Unstatable paths compare as the epoch.
#[must_use]
pub fn sort_by_modified(lhs: &Path, rhs: &Path) -> Ordering {
    let mtime = |p: &Path| {
        std::fs::metadata(p)
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
    };
    mtime(lhs).cmp(&mtime(rhs)).then_with(|| lhs.cmp(rhs))
}
