//! dupehunt - Duplicate File Scanner
//!
//! Entry point for the CLI. Exit codes: 0 = duplicates found, 1 = fatal
//! error, 2 = completed with no duplicates, 3 = completed with per-entry
//! errors.

use std::io;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use dupehunt::cli::{Cli, OutputFormat};
use dupehunt::config::Config;
use dupehunt::logging;
use dupehunt::output::{self, DuplicateReport, UniqueReport};
use dupehunt::progress::ScanProgress;
use dupehunt::scanner::{DirectoryScanner, DuplicateFilesScanner, UniqueFilesScanner};

const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NO_DUPLICATES: i32 = 2;
const EXIT_PARTIAL: i32 = 3;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            log::error!("{e:#}");
            process::exit(EXIT_ERROR);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let config = Config::load();
    let errors = Arc::new(AtomicU64::new(0));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let code = if cli.unique {
        let mut scanner = UniqueFilesScanner::new(&cli.directory)
            .with_context(|| format!("cannot scan {}", cli.directory.display()))?;
        configure(&mut scanner, cli, &config, &errors);

        let progress = ScanProgress::new(cli.quiet || cli.no_progress);
        progress.attach(&mut scanner);
        scanner.scan(cli.recursive)?;
        progress.finish();

        scanner.sort();
        let report = UniqueReport::from_scanner(&scanner);
        match cli.format {
            OutputFormat::Text => report.render_text(&mut out)?,
            OutputFormat::Json => output::render_json(&report, &mut out)?,
        }
        EXIT_SUCCESS
    } else {
        let mut scanner = DuplicateFilesScanner::new(&cli.directory)
            .with_context(|| format!("cannot scan {}", cli.directory.display()))?;
        if cli.keep_singletons || config.keep_singletons {
            scanner.set_keep_singletons(true);
        }
        configure(&mut scanner, cli, &config, &errors);

        let progress = ScanProgress::new(cli.quiet || cli.no_progress);
        progress.attach(&mut scanner);
        scanner.scan(cli.recursive)?;
        progress.finish();

        let report = DuplicateReport::from_scanner(&scanner);
        match cli.format {
            OutputFormat::Text => report.render_text(&mut out)?,
            OutputFormat::Json => output::render_json(&report, &mut out)?,
        }
        if report.stats.sets_found == 0 {
            EXIT_NO_DUPLICATES
        } else {
            EXIT_SUCCESS
        }
    };

    let error_count = errors.load(Ordering::SeqCst);
    if error_count > 0 {
        log::warn!("Completed with {error_count} per-entry error(s)");
        return Ok(EXIT_PARTIAL);
    }
    Ok(code)
}

/// Apply config-file defaults and CLI overrides to a scanner.
fn configure(
    scanner: &mut dyn DirectoryScanner,
    cli: &Cli,
    config: &Config,
    errors: &Arc<AtomicU64>,
) {
    scanner.set_follow_symlinks(cli.follow_symlinks || config.follow_symlinks);
    scanner.set_skip_hidden(cli.skip_hidden || config.skip_hidden);

    if let Some(min) = cli.min_size.or(config.min_size) {
        scanner.set_min_size(min);
    }
    if let Some(max) = cli.max_size.or(config.max_size) {
        scanner.set_max_size(max);
    }

    let extensions = if cli.extensions.is_empty() {
        &config.extensions
    } else {
        &cli.extensions
    };
    for ext in extensions {
        scanner.add_filter(ext);
    }

    let errors = Arc::clone(errors);
    scanner.set_error_callback(Box::new(move |_, offending, err| {
        match offending {
            Some(path) => log::warn!("{}: {err}", path.display()),
            None => log::warn!("{err}"),
        }
        errors.fetch_add(1, Ordering::SeqCst);
    }));
}
