//! Progress reporting for batch processing.
//!
//! A batch advances one file at a time. Reporters are told when a file
//! starts and finishes and may request cancellation, which the driver
//! honours between files.
//!
//! # Example
//!
//! ```rust,ignore
//! use announcebulk::progress::StatisticsProgress;
//! use announcebulk::run_with_progress;
//!
//! let mut progress = StatisticsProgress::new();
//! let result = run_with_progress(&mut ctx, &mut progress)?;
//! println!("{} files in {}", progress.state().files_processed, progress.state().format_elapsed());
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Progress reporting trait for batch operations.
///
/// Every method has a no-op default.
pub trait BatchProgress {
    /// Called once before the first file with the number of files.
    fn on_total(&mut self, total_files: usize) {
        let _ = total_files;
    }

    /// Called when processing of a file begins.
    fn on_file_start(&mut self, path: &Path, index: usize) {
        let _ = (path, index);
    }

    /// Called when a file has been rewritten (`success`) or has failed.
    fn on_file_complete(&mut self, path: &Path, success: bool) {
        let _ = (path, success);
    }

    /// Called on any warning during processing.
    fn on_warning(&mut self, message: &str) {
        let _ = message;
    }

    /// Checks if cancellation has been requested.
    ///
    /// This is checked before each file is started.
    fn should_cancel(&self) -> bool {
        false
    }
}

/// Progress state with timing and rate calculation.
#[derive(Debug, Clone)]
pub struct ProgressState {
    /// Total number of files in the batch.
    pub files_total: usize,
    /// Files finished so far, successfully or not.
    pub files_processed: usize,
    /// Files that failed.
    pub files_failed: usize,
    /// File currently being processed.
    pub current_file: Option<PathBuf>,
    /// Processing start time.
    pub start_time: Instant,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            files_total: 0,
            files_processed: 0,
            files_failed: 0,
            current_file: None,
            start_time: Instant::now(),
        }
    }
}

impl ProgressState {
    /// Creates a new progress state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the completion percentage (0.0 - 100.0).
    pub fn percentage(&self) -> f64 {
        if self.files_total == 0 {
            0.0
        } else {
            (self.files_processed as f64 / self.files_total as f64) * 100.0
        }
    }

    /// Returns elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the processing rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            0.0
        } else {
            self.files_processed as f64 / elapsed
        }
    }

    /// Returns estimated time remaining.
    pub fn eta(&self) -> Option<Duration> {
        let rate = self.files_per_second();
        if rate <= 0.0 || self.files_processed >= self.files_total {
            return None;
        }
        let remaining = (self.files_total - self.files_processed) as f64;
        Some(Duration::from_secs_f64(remaining / rate))
    }

    /// Formats the elapsed time as a human-readable string.
    pub fn format_elapsed(&self) -> String {
        format_duration(self.elapsed())
    }

    /// Formats the ETA as a human-readable string.
    pub fn format_eta(&self) -> String {
        match self.eta() {
            Some(duration) => format_duration(duration),
            None => "unknown".to_string(),
        }
    }
}

/// A progress reporter that does nothing (null object pattern).
#[derive(Debug, Default, Clone)]
pub struct NoProgress;

impl BatchProgress for NoProgress {}

/// A progress reporter that collects statistics.
#[derive(Debug, Default, Clone)]
pub struct StatisticsProgress {
    /// The progress state.
    pub state: ProgressState,
    /// Whether cancellation was requested.
    pub cancelled: bool,
    /// Warnings collected.
    pub warnings: Vec<String>,
}

impl StatisticsProgress {
    /// Creates a new statistics progress reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected state.
    pub fn state(&self) -> &ProgressState {
        &self.state
    }
}

impl BatchProgress for StatisticsProgress {
    fn on_total(&mut self, total_files: usize) {
        self.state.files_total = total_files;
    }

    fn on_file_start(&mut self, path: &Path, _index: usize) {
        self.state.current_file = Some(path.to_path_buf());
    }

    fn on_file_complete(&mut self, _path: &Path, success: bool) {
        self.state.files_processed += 1;
        if !success {
            self.state.files_failed += 1;
        }
        self.state.current_file = None;
    }

    fn on_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn should_cancel(&self) -> bool {
        self.cancelled
    }
}

/// A progress reporter that calls a closure after every file.
pub struct ClosureProgress<F> {
    callback: F,
    processed: usize,
    total: usize,
    cancelled: bool,
}

impl<F> ClosureProgress<F>
where
    F: FnMut(usize, usize) -> bool,
{
    /// Creates a progress reporter from a closure.
    ///
    /// The closure receives (files_processed, files_total) and returns
    /// `true` to continue or `false` to cancel before the next file.
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            processed: 0,
            total: 0,
            cancelled: false,
        }
    }
}

impl<F> BatchProgress for ClosureProgress<F>
where
    F: FnMut(usize, usize) -> bool,
{
    fn on_total(&mut self, total_files: usize) {
        self.total = total_files;
    }

    fn on_file_complete(&mut self, _path: &Path, _success: bool) {
        self.processed += 1;
        if !(self.callback)(self.processed, self.total) {
            self.cancelled = true;
        }
    }

    fn should_cancel(&self) -> bool {
        self.cancelled
    }
}

/// Creates a closure-based progress reporter.
pub fn progress_fn<F>(f: F) -> ClosureProgress<F>
where
    F: FnMut(usize, usize) -> bool,
{
    ClosureProgress::new(f)
}

/// Formats a duration as a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
