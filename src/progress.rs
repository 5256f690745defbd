//! Progress reporting for the CLI, built on `indicatif`.
//!
//! A spinner on stderr tracks the running file and duplicate-set counts
//! through the scanner's progress callback. Quiet mode keeps the type but
//! draws nothing, so the wiring in `main` stays unconditional.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::scanner::DirectoryScanner;

/// Spinner wired to a scanner's progress callback.
pub struct ScanProgress {
    bar: ProgressBar,
}

impl ScanProgress {
    /// Create the spinner.
    ///
    /// When `quiet` is set the bar is hidden and every update is a no-op.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        };
        Self { bar }
    }

    /// Install callbacks on a scanner to drive this spinner.
    pub fn attach(&self, scanner: &mut dyn DirectoryScanner) {
        let bar = self.bar.clone();
        scanner.set_progress_callback(Box::new(move |_, files, sets| {
            bar.set_message(format!("{files} files examined, {sets} duplicate sets"));
        }));

        let bar = self.bar.clone();
        scanner.set_started_callback(Box::new(move |root| {
            bar.set_message(format!("scanning {}", root.display()));
        }));
    }

    /// Stop the spinner and clear its line.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
