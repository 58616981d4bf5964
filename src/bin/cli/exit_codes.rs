//! Exit codes for the CLI tool.

use announcebulk::{Error, ErrorKind};

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Some files were skipped
pub const WARNING: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// A file is not valid bencode or has an unexpected shape
pub const BAD_TORRENT: i32 = 3;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Ctrl+C (128 + SIGINT)
pub const USER_INTERRUPT: i32 = 130;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Warning,
    FatalError,
    BadTorrent,
    IoError,
    UserInterrupt,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::Warning => WARNING,
            Self::FatalError => FATAL_ERROR,
            Self::BadTorrent => BAD_TORRENT,
            Self::IoError => IO_ERROR,
            Self::UserInterrupt => USER_INTERRUPT,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a library error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error.kind() {
        ErrorKind::Filesystem => ExitCode::IoError,
        ErrorKind::InvalidSyntax | ErrorKind::WrongBencodeType => ExitCode::BadTorrent,
        ErrorKind::WrongTransformOperation
        | ErrorKind::RegexCompile
        | ErrorKind::InvalidKeyPath => ExitCode::BadArgs,
        ErrorKind::Cancelled => ExitCode::UserInterrupt,
        ErrorKind::OutOfMemory | ErrorKind::ResourceLimit => ExitCode::FatalError,
        // Future error kinds - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
