//! The per-file processing state machine.
//!
//! A [`ProcessingContext`] owns a batch of files and a list of transforms
//! and advances one bounded unit of work per [`step`](ProcessingContext::step):
//!
//! | State | Work |
//! |-------|------|
//! | `Next` | open the next file, or finish |
//! | `Read` | read the whole file into a buffer |
//! | `Transform` | decode, apply every transform, re-encode |
//! | `Reopen` | truncate the file, or create a temporary replacement |
//! | `Write` | write the buffer and sync |
//! | `Done` | nothing; stepping again is a no-op |
//!
//! No step spans more than one disk operation or one transform pass, so a
//! caller can interleave progress reporting or other work between steps
//! without threads.
//!
//! # Example
//!
//! ```rust,no_run
//! use announcebulk::{BatchBuilder, Status, presets};
//!
//! let mut ctx = BatchBuilder::new()
//!     .files(["one.torrent", "two.torrent"])
//!     .transforms(presets::orpheus())
//!     .build();
//!
//! while ctx.step_file()? != Status::Finished {
//!     println!("{}/{} done", ctx.files_completed(), ctx.files_total());
//! }
//! ctx.close()?;
//! # Ok::<(), announcebulk::Error>(())
//! ```

mod context;
mod options;
mod state;

pub use context::{BatchBuilder, BatchResult, FileFailure, ProcessingContext, run_with_progress};
pub use options::{DEFAULT_MAX_FILE_SIZE, ErrorPolicy, ProcessOptions, WriteMode};
pub use state::{ProcessState, Status};
