//! Progress bar for batch edits.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use announcebulk::BatchProgress;

/// Progress display for a batch, cancellable with Ctrl+C
pub struct CliProgress<'a> {
    bar: ProgressBar,
    interrupted: &'a AtomicBool,
}

impl<'a> CliProgress<'a> {
    /// Creates a new progress display
    pub fn new(quiet: bool, interrupted: &'a AtomicBool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(0);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta}) {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            pb.set_style(style);
            pb
        };

        Self { bar, interrupted }
    }

    /// Finishes the progress display
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Leaves the bar where it stopped
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl BatchProgress for CliProgress<'_> {
    fn on_total(&mut self, total_files: usize) {
        self.bar.set_length(total_files as u64);
    }

    fn on_file_start(&mut self, path: &Path, _index: usize) {
        let name = path.display().to_string();
        // Truncate long names
        let len = name.chars().count();
        let display_name = if len > 40 {
            let tail: String = name.chars().skip(len - 37).collect();
            format!("...{}", tail)
        } else {
            name
        };
        self.bar.set_message(display_name);
    }

    fn on_file_complete(&mut self, _path: &Path, _success: bool) {
        self.bar.inc(1);
    }

    fn on_warning(&mut self, message: &str) {
        self.bar.suspend(|| eprintln!("Warning: {}", message));
    }

    fn should_cancel(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}
