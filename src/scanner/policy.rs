//! Per-entry admission policy: hidden files and extension filtering.
//!
//! These helpers decide which directory entries the engine looks at. They
//! carry no I/O of their own beyond the optional Windows attribute probe.

use std::collections::BTreeSet;
use std::path::Path;

/// Check whether a path names a hidden file or directory.
///
/// A file is hidden when its final component begins with `.`. On Windows the
/// hidden and system attribute bits also count; attribute read failures fall
/// back to the dot test.
///
/// # Example
///
/// ```
/// use dupehunt::scanner::is_hidden;
/// use std::path::Path;
///
/// assert!(is_hidden(Path::new("/home/user/.bashrc")));
/// assert!(!is_hidden(Path::new("/home/user/notes.txt")));
/// ```
#[must_use]
pub fn is_hidden(path: &Path) -> bool {
    let dotted = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false);
    if dotted {
        return true;
    }

    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
        const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;
        if let Ok(meta) = std::fs::symlink_metadata(path) {
            return meta.file_attributes() & (FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_SYSTEM) != 0;
        }
    }

    false
}

/// Extension admission filter with synonym expansion.
///
/// Extensions are stored lowercase with a leading `.`. Adding one member of
/// a known synonym pair admits both, so a scan filtered to `jpg` still
/// groups a `1.jpg`/`1.jpeg` duplicate pair:
///
/// * `.jpg` ⇔ `.jpeg`
/// * `.tif` ⇔ `.tiff`
/// * `.htm` ⇔ `.html`
///
/// An empty filter admits every file.
///
/// # Example
///
/// ```
/// use dupehunt::scanner::ExtensionFilter;
/// use std::path::Path;
///
/// let mut filter = ExtensionFilter::new();
/// filter.add("JPG");
/// assert!(filter.matches(Path::new("photo.jpeg")));
/// assert!(!filter.matches(Path::new("notes.txt")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Create an empty filter (admits everything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an extension to the filter.
    ///
    /// The input is lowercased and given a leading `.` when missing; synonym
    /// pairs are expanded to both members.
    pub fn add(&mut self, ext: &str) {
        let mut ext = ext.to_lowercase();
        if !ext.starts_with('.') {
            ext.insert(0, '.');
        }

        match ext.as_str() {
            ".jpg" | ".jpeg" => {
                self.extensions.insert(".jpg".to_string());
                self.extensions.insert(".jpeg".to_string());
            }
            ".tif" | ".tiff" => {
                self.extensions.insert(".tif".to_string());
                self.extensions.insert(".tiff".to_string());
            }
            ".htm" | ".html" => {
                self.extensions.insert(".htm".to_string());
                self.extensions.insert(".html".to_string());
            }
            _ => {
                self.extensions.insert(ext);
            }
        }
    }

    /// Add every extension from an iterator.
    pub fn add_all<I, S>(&mut self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            self.add(ext.as_ref());
        }
    }

    /// Check whether a path passes the filter.
    ///
    /// An empty filter admits everything. A non-empty filter rejects paths
    /// without an extension; otherwise the extension is lowercased and
    /// looked up.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }

        match path.extension() {
            Some(ext) => {
                let key = format!(".{}", ext.to_string_lossy().to_lowercase());
                self.extensions.contains(&key)
            }
            None => false,
        }
    }

    /// Whether no extensions have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// The normalized extension set, in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}
