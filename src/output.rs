//! Report rendering for the CLI.
//!
//! Results are lifted into serializable report structs first, then rendered
//! as either a human-readable listing or JSON. The library's index stays
//! untouched; reports borrow nothing once built.

use std::io::{self, Write};
use std::path::PathBuf;

use bytesize::ByteSize;
use serde::Serialize;

use crate::scanner::{DuplicateFilesScanner, ScanStats, UniqueFilesScanner};

/// One duplicate set, flattened for output.
#[derive(Debug, Serialize)]
pub struct SetReport {
    /// Size of each member in bytes
    pub size: u64,
    /// Uppercase content fingerprint
    pub hash: String,
    /// Member paths in filename order
    pub paths: Vec<PathBuf>,
}

/// Full results of a duplicate scan.
#[derive(Debug, Serialize)]
pub struct DuplicateReport {
    /// Canonical root that was scanned
    pub root: PathBuf,
    /// Scan statistics
    pub stats: ScanStats,
    /// Retained sets ascending by (size, hash)
    pub sets: Vec<SetReport>,
}

/// Full results of a unique-files scan.
#[derive(Debug, Serialize)]
pub struct UniqueReport {
    /// Canonical root that was scanned
    pub root: PathBuf,
    /// Scan statistics
    pub stats: ScanStats,
    /// One representative per distinct content
    pub files: Vec<PathBuf>,
}

impl DuplicateReport {
    /// Build a report from a scanned duplicate scanner.
    #[must_use]
    pub fn from_scanner(scanner: &DuplicateFilesScanner) -> Self {
        Self {
            root: scanner.search_dir().to_path_buf(),
            stats: scanner.stats(),
            sets: scanner
                .iter()
                .map(|(key, set)| SetReport {
                    size: key.size,
                    hash: key.hex.clone(),
                    paths: set.paths().to_vec(),
                })
                .collect(),
        }
    }

    /// Render the human-readable listing.
    ///
    /// # Errors
    ///
    /// Propagates writer failures.
    pub fn render_text(&self, out: &mut impl Write) -> io::Result<()> {
        for set in &self.sets {
            writeln!(
                out,
                "{} x{} ({} each)",
                &set.hash[..16],
                set.paths.len(),
                ByteSize(set.size)
            )?;
            for path in &set.paths {
                writeln!(out, "  {}", path.display())?;
            }
            writeln!(out)?;
        }
        writeln!(
            out,
            "{} files examined, {} duplicate set(s), {} in {} file(s) occupied by extra copies",
            self.stats.files_encountered,
            self.stats.sets_found,
            ByteSize(self.stats.space_occupied),
            self.stats.file_count,
        )
    }
}

impl UniqueReport {
    /// Build a report from a scanned unique-files scanner.
    #[must_use]
    pub fn from_scanner(scanner: &UniqueFilesScanner) -> Self {
        Self {
            root: scanner.search_dir().to_path_buf(),
            stats: scanner.stats(),
            files: scanner.files().to_vec(),
        }
    }

    /// Render the human-readable listing.
    ///
    /// # Errors
    ///
    /// Propagates writer failures.
    pub fn render_text(&self, out: &mut impl Write) -> io::Result<()> {
        for path in &self.files {
            writeln!(out, "{}", path.display())?;
        }
        writeln!(
            out,
            "{} files examined, {} distinct content(s)",
            self.stats.files_encountered,
            self.files.len(),
        )
    }
}

/// Serialize any report as pretty JSON.
///
/// # Errors
///
/// Propagates writer and serialization failures.
pub fn render_json(report: &impl Serialize, out: &mut impl Write) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}
