//! Error types for bulk bencode editing.
//!
//! This module provides the [`Error`] enum which represents every way a
//! transform, a decode, or a processing step can fail, along with a
//! convenient [`Result<T>`] type alias and the [`ErrorKind`] classification
//! a [`ProcessingContext`] remembers after a failed step.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`:
//!
//! ```rust,no_run
//! use announcebulk::{BatchBuilder, Result, presets};
//!
//! fn migrate(files: Vec<std::path::PathBuf>) -> Result<()> {
//!     let mut ctx = BatchBuilder::new()
//!         .files(files)
//!         .transforms(presets::orpheus())
//!         .build();
//!     ctx.run()?;
//!     ctx.close()
//! }
//! ```
//!
//! ## Matching on Error Variants
//!
//! ```rust
//! use announcebulk::Error;
//!
//! fn describe(error: &Error) -> String {
//!     match error {
//!         Error::Filesystem { path, .. } => format!("cannot access {}", path.display()),
//!         Error::InvalidSyntax { offset, .. } => format!("not bencode (byte {offset})"),
//!         Error::WrongBencodeType { expected, found } => {
//!             format!("expected {expected}, found {found}")
//!         }
//!         other => other.to_string(),
//!     }
//! }
//! ```
//!
//! [`ProcessingContext`]: crate::ProcessingContext

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Coarse classification of an [`Error`].
///
/// Unlike [`Error`], this type is `Copy`, so a processing context can keep
/// the kind of its most recent failure after the owned error has been
/// handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A buffer could not be allocated.
    OutOfMemory,
    /// Opening, reading, writing, seeking or closing a file failed.
    Filesystem,
    /// A transform target had the wrong bencode type.
    WrongBencodeType,
    /// An operation name was not recognized.
    WrongTransformOperation,
    /// The document is not valid bencode.
    InvalidSyntax,
    /// A regular expression did not compile.
    RegexCompile,
    /// A key path could not be parsed.
    InvalidKeyPath,
    /// A configured resource limit was exceeded.
    ResourceLimit,
    /// Processing was cancelled by the caller.
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::OutOfMemory => "out of memory",
            Self::Filesystem => "filesystem error",
            Self::WrongBencodeType => "wrong bencode type (eg, int where string expected)",
            Self::WrongTransformOperation => "wrong transform operation (unknown)",
            Self::InvalidSyntax => "invalid bencode syntax",
            Self::RegexCompile => "regex compilation failed",
            Self::InvalidKeyPath => "invalid key path",
            Self::ResourceLimit => "resource limit exceeded",
            Self::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// The filesystem operation that failed for an [`Error::Filesystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOperation {
    /// Opening a file for reading.
    Open,
    /// Reading file contents.
    Read,
    /// Reopening (truncating) a file, or creating its replacement.
    Reopen,
    /// Writing file contents.
    Write,
    /// Flushing and closing a file handle.
    Close,
    /// Renaming a replacement file over the original.
    Rename,
    /// Walking a directory tree.
    Walk,
}

impl fmt::Display for FsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Open => "open",
            Self::Read => "read",
            Self::Reopen => "reopen",
            Self::Write => "write",
            Self::Close => "close",
            Self::Rename => "rename",
            Self::Walk => "walk",
        };
        f.write_str(text)
    }
}

/// The main error type for bulk editing operations.
///
/// | Category | Variants |
/// |----------|----------|
/// | I/O | [`Io`][Self::Io], [`Filesystem`][Self::Filesystem], [`OutOfMemory`][Self::OutOfMemory] |
/// | Document | [`InvalidSyntax`][Self::InvalidSyntax], [`WrongBencodeType`][Self::WrongBencodeType] |
/// | Transform definition | [`WrongTransformOperation`][Self::WrongTransformOperation], [`InvalidRegex`][Self::InvalidRegex], [`InvalidKeyPath`][Self::InvalidKeyPath] |
/// | Limits | [`ResourceLimitExceeded`][Self::ResourceLimitExceeded], [`Cancelled`][Self::Cancelled] |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error that is not tied to a particular batch file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A filesystem operation on a batch file failed.
    ///
    /// Returned for any open, read, write, close or rename failure while a
    /// file is being processed. The original file content is untouched
    /// unless the failure happened in the write step of an in-place edit.
    #[error("{operation} failed for {}: {source}", .path.display())]
    Filesystem {
        /// The file being processed.
        path: PathBuf,
        /// What was being done to it.
        operation: FsOperation,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// A buffer of the given size could not be allocated.
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
    },

    /// A transform target had the wrong shape.
    ///
    /// For example, a substitution whose key path resolves to an integer,
    /// or a delete whose key path resolves to a list.
    #[error("wrong bencode type: expected {expected}, found {found}")]
    WrongBencodeType {
        /// Description of the accepted shape(s).
        expected: &'static str,
        /// The type actually encountered.
        found: &'static str,
    },

    /// An operation name did not match any known transform operation.
    #[error("wrong transform operation: '{operation}'")]
    WrongTransformOperation {
        /// The unrecognized operation name.
        operation: String,
    },

    /// The document is not valid bencode.
    #[error("invalid bencode syntax at byte {offset}: {reason}")]
    InvalidSyntax {
        /// Byte offset at which decoding stopped.
        offset: usize,
        /// What was wrong.
        reason: &'static str,
    },

    /// An invalid regular expression pattern was provided.
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegex {
        /// The invalid regex pattern.
        pattern: String,
        /// Description of why the pattern is invalid.
        reason: String,
    },

    /// A textual key path could not be parsed.
    #[error("invalid key path: {0}")]
    InvalidKeyPath(String),

    /// A configured resource limit was exceeded.
    #[error("resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// Processing was stopped by the caller between files.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Creates a filesystem error for a batch file.
    pub(crate) fn fs(path: impl Into<PathBuf>, operation: FsOperation, source: io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            operation,
            source,
        }
    }

    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::Filesystem { .. } => ErrorKind::Filesystem,
            Error::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            Error::WrongBencodeType { .. } => ErrorKind::WrongBencodeType,
            Error::WrongTransformOperation { .. } => ErrorKind::WrongTransformOperation,
            Error::InvalidSyntax { .. } => ErrorKind::InvalidSyntax,
            Error::InvalidRegex { .. } => ErrorKind::RegexCompile,
            Error::InvalidKeyPath(_) => ErrorKind::InvalidKeyPath,
            Error::ResourceLimitExceeded(_) => ErrorKind::ResourceLimit,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Returns `true` if this error concerns only the file being processed.
    ///
    /// File-local errors are the ones a batch may skip past when per-file
    /// isolation is enabled. Transform definition errors and cancellation
    /// affect every file and are never file-local.
    pub fn is_file_local(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::Filesystem { .. }
                | Error::OutOfMemory { .. }
                | Error::WrongBencodeType { .. }
                | Error::InvalidSyntax { .. }
                | Error::ResourceLimitExceeded(_)
        )
    }

    /// Returns the file path associated with this error, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::Filesystem { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// A specialized Result type for bulk editing operations.
pub type Result<T> = std::result::Result<T, Error>;
