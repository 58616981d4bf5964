//! Processing states and the status reported by each step.

use std::fmt;

/// The state of a [`ProcessingContext`](crate::ProcessingContext).
///
/// ```text
/// Next ──> Read ──> Transform ──> Reopen ──> Write ──┐
///  ^                                                  │
///  └──────────────────────────────────────────────────┘
/// Next ──> Done (past the last file)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessState {
    /// Close the previous file and open the next one.
    #[default]
    Next,
    /// Read the open file into memory.
    Read,
    /// Decode, transform and re-encode the buffer.
    Transform,
    /// Prepare the destination for writing.
    Reopen,
    /// Write the buffer to the destination.
    Write,
    /// Every file has been handled.
    Done,
}

impl ProcessState {
    /// Returns `true` if the in-memory buffer exists in this state.
    pub fn holds_buffer(self) -> bool {
        matches!(self, Self::Transform | Self::Reopen | Self::Write)
    }

    /// Returns the lowercase name of the state.
    pub fn name(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Read => "read",
            Self::Transform => "transform",
            Self::Reopen => "reopen",
            Self::Write => "write",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// More steps remain.
    InProgress,
    /// The context is in [`ProcessState::Done`].
    Finished,
}

impl Status {
    /// Returns `true` for [`Status::Finished`].
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}
