//! Options controlling how a batch is processed.

/// Default upper bound on the size of a single batch file (64 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// How rewritten content reaches the disk.
///
/// # Example
///
/// ```rust
/// use announcebulk::{ProcessOptions, WriteMode};
///
/// let options = ProcessOptions::new().write_mode(WriteMode::Atomic);
/// assert_eq!(options.write_mode, WriteMode::Atomic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum WriteMode {
    /// Reopen the original file with truncation and write the new content
    /// into it.
    ///
    /// Between the reopen step and the write step the file is empty on
    /// disk. Tearing a context down inside that window loses the file.
    #[default]
    InPlace,
    /// Write the new content to a temporary file next to the original and
    /// rename it over the original once it is complete.
    ///
    /// The original is never truncated. The temporary file must live on
    /// the same filesystem, so it is created in the original's directory.
    Atomic,
}

/// What happens when a step fails for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ErrorPolicy {
    /// Report the error and leave the state unchanged.
    ///
    /// The caller is expected to treat the failure as fatal for the batch.
    #[default]
    Abort,
    /// Record the failure, release the file and continue with the next one.
    ///
    /// Only file-local errors are skipped. See
    /// [`Error::is_file_local`](crate::Error::is_file_local).
    SkipFile,
}

/// Options for a [`ProcessingContext`](crate::ProcessingContext).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    /// How new content is written.
    pub write_mode: WriteMode,
    /// How per-file failures are handled.
    pub error_policy: ErrorPolicy,
    /// Files larger than this are rejected in the read step.
    ///
    /// `None` disables the check.
    pub max_file_size: Option<u64>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            write_mode: WriteMode::default(),
            error_policy: ErrorPolicy::default(),
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
        }
    }
}

impl ProcessOptions {
    /// Creates options with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the write mode.
    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// Shorthand for `write_mode(WriteMode::Atomic)`.
    pub fn atomic(self) -> Self {
        self.write_mode(WriteMode::Atomic)
    }

    /// Sets the error policy.
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Shorthand for `error_policy(ErrorPolicy::SkipFile)`.
    pub fn keep_going(self) -> Self {
        self.error_policy(ErrorPolicy::SkipFile)
    }

    /// Sets the maximum accepted file size.
    pub fn max_file_size(mut self, limit: Option<u64>) -> Self {
        self.max_file_size = limit;
        self
    }
}
