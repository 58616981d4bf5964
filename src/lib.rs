//! # announcebulk
//!
//! Bulk, declarative edits of fields inside bencoded torrent files.
//!
//! A batch is a list of files and an ordered list of [`Transform`]s. Each
//! file is read, decoded once, run through every transform, re-encoded and
//! written back. Fields the transforms do not touch keep their exact
//! encoding, including dictionary order.
//!
//! Processing is exposed as an explicit state machine rather than one
//! blocking call, so a caller can report progress or do other work between
//! files without threads.
//!
//! ## Quick Start
//!
//! ### Migrating a tracker
//!
//! ```rust,no_run
//! use announcebulk::{BatchBuilder, Result, discover, presets};
//!
//! fn main() -> Result<()> {
//!     let files = discover("/home/me/torrents", None).into_result()?;
//!     let mut ctx = BatchBuilder::new()
//!         .files(files)
//!         .transforms(presets::orpheus())
//!         .build();
//!     ctx.run()?;
//!     println!("rewrote {} files", ctx.files_completed());
//!     ctx.close()
//! }
//! ```
//!
//! ### Custom transforms
//!
//! ```rust,no_run
//! use announcebulk::{BatchBuilder, KeyPath, ProcessOptions, Result, TransformBuilder};
//!
//! fn main() -> Result<()> {
//!     let transforms = TransformBuilder::new()
//!         .delete(KeyPath::root(), "comment")
//!         .set_string(KeyPath::parse("info")?, "source", "OPS")
//!         .substitute_regex(KeyPath::parse("announce")?, r"passkey=\w+", "passkey=XXXX")?
//!         .build();
//!
//!     let mut ctx = BatchBuilder::new()
//!         .file("a.torrent")
//!         .transforms(transforms)
//!         .options(ProcessOptions::new().atomic().keep_going())
//!         .build();
//!     ctx.run()?;
//!     for failure in ctx.failures() {
//!         eprintln!("{}: {}", failure.path.display(), failure.message);
//!     }
//!     ctx.close()
//! }
//! ```
//!
//! ### Stepping
//!
//! ```rust,no_run
//! use announcebulk::{BatchBuilder, presets};
//!
//! # fn main() -> announcebulk::Result<()> {
//! let mut ctx = BatchBuilder::new()
//!     .files(["a.torrent", "b.torrent"])
//!     .transforms(presets::orpheus())
//!     .build();
//! while !ctx.step()?.is_finished() {
//!     // each step is at most one disk operation or one transform pass
//! }
//! # ctx.close()
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. By default any failure aborts the
//! batch and leaves the context where it was. With
//! [`ErrorPolicy::SkipFile`] failures that concern only one file are
//! recorded and the batch continues.
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade and never
//! installs a logger itself.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bencode;
pub mod clients;
pub mod discover;
pub mod error;
pub mod presets;
pub mod process;
pub mod progress;
pub mod transform;

pub use clients::{TorrentClient, discover_client};
pub use discover::{DEFAULT_EXTENSION, Discovery, discover};
pub use error::{Error, ErrorKind, FsOperation, Result};
pub use presets::Preset;
pub use process::{
    BatchBuilder, BatchResult, ErrorPolicy, FileFailure, ProcessOptions, ProcessState,
    ProcessingContext, Status, WriteMode, run_with_progress,
};
pub use progress::{BatchProgress, NoProgress, StatisticsProgress, progress_fn};
pub use transform::{
    Applied, KeyPath, Operation, OperationKind, Transform, TransformBuilder, TransformStats,
};
