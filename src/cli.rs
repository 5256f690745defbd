//! Command-line interface definitions.
//!
//! The CLI is a thin shell over the scanner library: it maps flags onto the
//! scanner's filter setters, picks the duplicate or unique projection, and
//! chooses an output format. Size arguments accept human-readable values
//! (`1K`, `10MiB`, `1.5GB`) via `bytesize`.

use std::path::PathBuf;
use std::str::FromStr;

use bytesize::ByteSize;
use clap::{ArgAction, Parser, ValueEnum};

/// Find duplicate files beneath a directory.
#[derive(Debug, Parser)]
#[command(name = "dupehunt", version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    pub directory: PathBuf,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Follow symbolic links (directories are descended, file links admitted)
    #[arg(short = 'L', long)]
    pub follow_symlinks: bool,

    /// Skip dotfiles and hidden entries
    #[arg(short = 'H', long)]
    pub skip_hidden: bool,

    /// Minimum file size, e.g. 4K or 1MiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size, e.g. 100MiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Only consider files with this extension (repeatable; jpg implies jpeg)
    #[arg(short = 'e', long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Keep single-copy files in the results
    #[arg(long)]
    pub keep_singletons: bool,

    /// List one representative per distinct content instead of duplicates
    #[arg(short, long)]
    pub unique: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Report rendering choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// Machine-readable JSON report
    Json,
}

/// Parse a human-readable size argument into bytes.
fn parse_size(value: &str) -> Result<u64, String> {
    ByteSize::from_str(value)
        .map(|b| b.as_u64())
        .map_err(|e| format!("invalid size '{value}': {e}"))
}
