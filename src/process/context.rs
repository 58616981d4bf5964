//! The processing context and its builder.

use std::fs::{self, File};
use std::io::{self, Read, Seek, Write};
use std::mem;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use super::options::{ErrorPolicy, ProcessOptions, WriteMode};
use super::state::{ProcessState, Status};
use crate::bencode;
use crate::error::FsOperation;
use crate::progress::BatchProgress;
use crate::transform::{Transform, TransformStats, apply_all};
use crate::{Error, ErrorKind, Result};

/// A file that failed and was skipped under [`ErrorPolicy::SkipFile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// The file that failed.
    pub path: PathBuf,
    /// Classification of the failure.
    pub kind: ErrorKind,
    /// Display text of the error.
    pub message: String,
}

/// Summary of a finished (or aborted) batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Number of files in the batch.
    pub files_total: usize,
    /// Files rewritten successfully.
    pub files_completed: usize,
    /// Files skipped after a failure.
    pub failures: Vec<FileFailure>,
    /// Transform counters summed over every rewritten file.
    pub stats: TransformStats,
}

impl BatchResult {
    /// Returns `true` if no file failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Where the write step sends the new content.
enum Destination {
    /// The original file, reopened with truncation.
    InPlace(File),
    /// A temporary file that replaces `target` after writing.
    ///
    /// `target` is the original with symlinks resolved, so a linked file is
    /// replaced and the link is kept.
    Atomic {
        temp: NamedTempFile,
        target: PathBuf,
    },
}

/// A state together with the resources that exist only in that state.
///
/// The buffer lives in `Transform`, `Reopen` and `Write` and nowhere else.
enum Stage {
    Next,
    Read { file: File },
    Transform { buffer: Vec<u8> },
    Reopen { buffer: Vec<u8> },
    Write { buffer: Vec<u8>, destination: Destination },
    Done,
}

impl Stage {
    fn state(&self) -> ProcessState {
        match self {
            Stage::Next => ProcessState::Next,
            Stage::Read { .. } => ProcessState::Read,
            Stage::Transform { .. } => ProcessState::Transform,
            Stage::Reopen { .. } => ProcessState::Reopen,
            Stage::Write { .. } => ProcessState::Write,
            Stage::Done => ProcessState::Done,
        }
    }

    fn buffer(&self) -> Option<&[u8]> {
        match self {
            Stage::Transform { buffer } | Stage::Reopen { buffer } | Stage::Write { buffer, .. } => {
                Some(buffer)
            }
            _ => None,
        }
    }
}

/// A failed transition hands the untouched stage back with the error.
type Transition = std::result::Result<Stage, (Stage, Error)>;

/// Builder for a [`ProcessingContext`].
///
/// The builder is consumed by [`build`](Self::build). A context has no
/// setters, so its file list and transform list cannot change once
/// processing has started.
///
/// # Example
///
/// ```rust,no_run
/// use announcebulk::{BatchBuilder, ProcessOptions, presets};
///
/// let mut ctx = BatchBuilder::new()
///     .file("a.torrent")
///     .file("b.torrent")
///     .transforms(presets::orpheus())
///     .options(ProcessOptions::new().atomic())
///     .build();
/// ctx.run()?;
/// ctx.close()?;
/// # Ok::<(), announcebulk::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct BatchBuilder {
    files: Vec<PathBuf>,
    transforms: Vec<Transform>,
    options: ProcessOptions,
}

impl BatchBuilder {
    /// Creates an empty builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one file to the batch.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Appends files to the batch.
    pub fn files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Appends one transform.
    pub fn transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Appends transforms, preserving their order.
    pub fn transforms(mut self, transforms: impl IntoIterator<Item = Transform>) -> Self {
        self.transforms.extend(transforms);
        self
    }

    /// Sets the processing options.
    pub fn options(mut self, options: ProcessOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the context, positioned before the first file.
    pub fn build(self) -> ProcessingContext {
        ProcessingContext::with_options(self.files, self.transforms, self.options)
    }
}

/// Drives a batch of files through read, decode, transform, encode and
/// write, one bounded unit of work per [`step`](Self::step).
///
/// Every step boundary is a suspension point: the caller may stop stepping
/// at any time and on-disk state is exactly what the last completed step
/// left. With [`WriteMode::InPlace`] the one exception is the window
/// between the reopen step (which truncates) and the write step; see
/// [`in_truncation_window`](Self::in_truncation_window).
pub struct ProcessingContext {
    files: Vec<PathBuf>,
    transforms: Vec<Transform>,
    options: ProcessOptions,
    stage: Stage,
    /// `None` before the first file; `files.len()` once done.
    index: Option<usize>,
    last_error: Option<ErrorKind>,
    completed: usize,
    errors: usize,
    failures: Vec<FileFailure>,
    stats: TransformStats,
}

impl std::fmt::Debug for ProcessingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingContext")
            .field("files", &self.files.len())
            .field("transforms", &self.transforms.len())
            .field("state", &self.state())
            .field("index", &self.index)
            .field("completed", &self.completed)
            .field("errors", &self.errors)
            .finish()
    }
}

impl ProcessingContext {
    /// Creates a context with default options.
    pub fn new(files: Vec<PathBuf>, transforms: Vec<Transform>) -> Self {
        Self::with_options(files, transforms, ProcessOptions::default())
    }

    /// Creates a context with the given options.
    pub fn with_options(
        files: Vec<PathBuf>,
        transforms: Vec<Transform>,
        options: ProcessOptions,
    ) -> Self {
        Self {
            files,
            transforms,
            options,
            stage: Stage::Next,
            index: None,
            last_error: None,
            completed: 0,
            errors: 0,
            failures: Vec::new(),
            stats: TransformStats::default(),
        }
    }

    // ========================================================================
    // Driving
    // ========================================================================

    /// Advances exactly one transition.
    ///
    /// Stepping a finished context is a no-op that returns
    /// [`Status::Finished`].
    ///
    /// # Errors
    ///
    /// Under [`ErrorPolicy::Abort`] any failure is returned and the state
    /// is left unchanged. Under [`ErrorPolicy::SkipFile`] a file-local
    /// failure is recorded in [`failures`](Self::failures), the file is
    /// released and the context moves on to the next file; only errors
    /// that are not file-local are returned.
    pub fn step(&mut self) -> Result<Status> {
        let from = self.stage.state();
        let stage = mem::replace(&mut self.stage, Stage::Done);
        match self.transition(stage) {
            Ok(next) => {
                self.stage = next;
                let to = self.stage.state();
                if from != to {
                    debug!("{} -> {}", from, to);
                }
                Ok(self.status())
            }
            Err((stage, error)) => {
                self.stage = stage;
                self.last_error = Some(error.kind());
                self.errors += 1;
                if self.options.error_policy == ErrorPolicy::SkipFile && error.is_file_local() {
                    self.skip_file(from, &error);
                    Ok(self.status())
                } else {
                    Err(error)
                }
            }
        }
    }

    /// Advances until the current file index changes or the batch is done.
    ///
    /// Starting before the first file, the first call finishes file 0 and
    /// opens file 1. A batch of N files is therefore done after N calls.
    pub fn step_file(&mut self) -> Result<Status> {
        let start = self.index.unwrap_or(0);
        while !self.is_done() && self.index.is_none_or(|index| index <= start) {
            self.step()?;
        }
        Ok(self.status())
    }

    /// Advances until the batch is done.
    pub fn run(&mut self) -> Result<()> {
        while !self.step()?.is_finished() {}
        Ok(())
    }

    /// Flushes and closes whatever file is still open and drops the context.
    ///
    /// Closing between the reopen and the write step of an in-place edit
    /// leaves that file truncated; this is logged as a warning.
    pub fn close(mut self) -> Result<()> {
        let path = self.active_path();
        match mem::replace(&mut self.stage, Stage::Done) {
            Stage::Write {
                destination: Destination::InPlace(file),
                ..
            } => {
                warn!(
                    "closing before write: {} was truncated and is now empty",
                    path.display()
                );
                file.sync_all()
                    .map_err(|e| Error::fs(&path, FsOperation::Close, e))?;
            }
            Stage::Write {
                destination: Destination::Atomic { temp, .. },
                ..
            } => {
                temp.close()
                    .map_err(|e| Error::fs(&path, FsOperation::Close, e))?;
            }
            _ => {}
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns `true` once every file has been handled.
    pub fn is_done(&self) -> bool {
        matches!(self.stage, Stage::Done)
    }

    /// Returns the current state.
    pub fn state(&self) -> ProcessState {
        self.stage.state()
    }

    /// Returns the index of the current file, or `None` before the first.
    ///
    /// Equals [`files_total`](Self::files_total) once done.
    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    /// Returns the file currently being processed.
    ///
    /// In [`ProcessState::Next`] this is the file that was just finished.
    pub fn current_path(&self) -> Option<&Path> {
        self.index
            .and_then(|index| self.files.get(index))
            .map(PathBuf::as_path)
    }

    /// Returns the file the next [`ProcessState::Next`] step will open.
    pub fn next_path(&self) -> Option<&Path> {
        self.files
            .get(self.pending_index())
            .map(PathBuf::as_path)
    }

    /// Returns the kind of the most recent failed step.
    ///
    /// The value sticks until another step fails.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    /// Returns the number of files in the batch.
    pub fn files_total(&self) -> usize {
        self.files.len()
    }

    /// Returns the batch's file list.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Returns the batch's transform list.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Returns the options this context was built with.
    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Returns the number of files rewritten successfully.
    pub fn files_completed(&self) -> usize {
        self.completed
    }

    /// Returns the number of failed steps so far.
    pub fn errors_count(&self) -> usize {
        self.errors
    }

    /// Returns the files skipped under [`ErrorPolicy::SkipFile`].
    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    /// Returns transform counters summed over every rewritten file.
    pub fn stats(&self) -> TransformStats {
        self.stats
    }

    /// Returns the length of the in-memory buffer, if one exists.
    pub fn buffer_len(&self) -> Option<usize> {
        self.stage.buffer().map(<[u8]>::len)
    }

    /// Returns `true` if the current file has been truncated but not yet
    /// rewritten.
    ///
    /// Only possible with [`WriteMode::InPlace`], in
    /// [`ProcessState::Write`].
    pub fn in_truncation_window(&self) -> bool {
        matches!(
            self.stage,
            Stage::Write {
                destination: Destination::InPlace(_),
                ..
            }
        )
    }

    /// Returns a summary of the batch so far.
    pub fn result(&self) -> BatchResult {
        BatchResult {
            files_total: self.files.len(),
            files_completed: self.completed,
            failures: self.failures.clone(),
            stats: self.stats,
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn status(&self) -> Status {
        if self.is_done() {
            Status::Finished
        } else {
            Status::InProgress
        }
    }

    fn pending_index(&self) -> usize {
        self.index.map_or(0, |index| index + 1)
    }

    fn active_path(&self) -> PathBuf {
        self.current_path().map(Path::to_path_buf).unwrap_or_default()
    }

    fn transition(&mut self, stage: Stage) -> Transition {
        match stage {
            Stage::Next => self.open_next(),
            Stage::Read { file } => self.read(file),
            Stage::Transform { buffer } => self.transform(buffer),
            Stage::Reopen { buffer } => self.reopen(buffer),
            Stage::Write {
                buffer,
                destination,
            } => self.write(buffer, destination),
            Stage::Done => Ok(Stage::Done),
        }
    }

    fn open_next(&mut self) -> Transition {
        let next = self.pending_index();
        let Some(path) = self.files.get(next) else {
            self.index = Some(self.files.len());
            info!(
                "batch finished: {} of {} files rewritten",
                self.completed,
                self.files.len()
            );
            return Ok(Stage::Done);
        };
        match File::open(path) {
            Ok(file) => {
                self.index = Some(next);
                Ok(Stage::Read { file })
            }
            Err(e) => Err((Stage::Next, Error::fs(path, FsOperation::Open, e))),
        }
    }

    fn read(&mut self, mut file: File) -> Transition {
        let path = self.active_path();
        match read_limited(&mut file, &path, self.options.max_file_size) {
            Ok(buffer) => Ok(Stage::Transform { buffer }),
            Err(error) => Err((Stage::Read { file }, error)),
        }
    }

    fn transform(&mut self, buffer: Vec<u8>) -> Transition {
        let encoded = bencode::decode(&buffer).and_then(|mut root| {
            let stats = apply_all(&self.transforms, &mut root)?;
            Ok((bencode::encode(&root), stats))
        });
        match encoded {
            Ok((encoded, stats)) => {
                self.stats += stats;
                Ok(Stage::Reopen { buffer: encoded })
            }
            Err(error) => Err((Stage::Transform { buffer }, error)),
        }
    }

    fn reopen(&mut self, buffer: Vec<u8>) -> Transition {
        let path = self.active_path();
        let destination = match self.options.write_mode {
            WriteMode::InPlace => File::create(&path).map(Destination::InPlace),
            WriteMode::Atomic => atomic_destination(&path),
        };
        match destination {
            Ok(destination) => Ok(Stage::Write {
                buffer,
                destination,
            }),
            Err(e) => Err((
                Stage::Reopen { buffer },
                Error::fs(&path, FsOperation::Reopen, e),
            )),
        }
    }

    fn write(&mut self, buffer: Vec<u8>, destination: Destination) -> Transition {
        let path = self.active_path();
        match destination {
            Destination::InPlace(mut file) => {
                if let Err(e) = write_whole(&mut file, &buffer) {
                    return Err((
                        Stage::Write {
                            buffer,
                            destination: Destination::InPlace(file),
                        },
                        Error::fs(&path, FsOperation::Write, e),
                    ));
                }
            }
            Destination::Atomic { mut temp, target } => {
                if let Err(e) = write_whole(temp.as_file_mut(), &buffer) {
                    return Err((
                        Stage::Write {
                            buffer,
                            destination: Destination::Atomic { temp, target },
                        },
                        Error::fs(&path, FsOperation::Write, e),
                    ));
                }
                if let Err(e) = temp.persist(&target) {
                    return Err((
                        Stage::Write {
                            buffer,
                            destination: Destination::Atomic {
                                temp: e.file,
                                target,
                            },
                        },
                        Error::fs(&path, FsOperation::Rename, e.error),
                    ));
                }
            }
        }
        self.completed += 1;
        info!("rewrote {} ({} bytes)", path.display(), buffer.len());
        Ok(Stage::Next)
    }

    /// Releases the current file after a failure and moves on.
    fn skip_file(&mut self, from: ProcessState, error: &Error) {
        if from == ProcessState::Next {
            self.index = Some(self.pending_index());
        }
        let path = error
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.active_path());
        if self.in_truncation_window() {
            warn!(
                "{} was truncated before the failure and is now empty",
                path.display()
            );
        }
        warn!("skipping {}: {}", path.display(), error);
        self.failures.push(FileFailure {
            path,
            kind: error.kind(),
            message: error.to_string(),
        });
        self.stage = Stage::Next;
    }
}

impl Drop for ProcessingContext {
    fn drop(&mut self) {
        if self.in_truncation_window() {
            warn!(
                "context dropped before write: {} is left empty",
                self.active_path().display()
            );
        }
    }
}

/// Reads all of `file`, refusing files larger than `limit`.
fn read_limited(file: &mut File, path: &Path, limit: Option<u64>) -> Result<Vec<u8>> {
    let len = file
        .metadata()
        .map_err(|e| Error::fs(path, FsOperation::Read, e))?
        .len();
    if let Some(limit) = limit {
        if len > limit {
            return Err(Error::ResourceLimitExceeded(format!(
                "{} is {} bytes, limit is {}",
                path.display(),
                len,
                limit
            )));
        }
    }

    let requested = usize::try_from(len).map_err(|_| Error::OutOfMemory {
        requested: usize::MAX,
    })?;
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(requested)
        .map_err(|_| Error::OutOfMemory { requested })?;

    let cap = limit.map_or(u64::MAX, |limit| limit.saturating_add(1));
    file.take(cap)
        .read_to_end(&mut buffer)
        .map_err(|e| Error::fs(path, FsOperation::Read, e))?;
    if let Some(limit) = limit {
        if buffer.len() as u64 > limit {
            return Err(Error::ResourceLimitExceeded(format!(
                "{} grew past the limit of {} bytes while reading",
                path.display(),
                limit
            )));
        }
    }
    Ok(buffer)
}

/// Creates the replacement for `path` next to the file it points to,
/// with the same permissions.
fn atomic_destination(path: &Path) -> io::Result<Destination> {
    let target = fs::canonicalize(path)?;
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let temp = NamedTempFile::new_in(dir)?;
    let permissions = fs::metadata(&target)?.permissions();
    temp.as_file().set_permissions(permissions)?;
    Ok(Destination::Atomic { temp, target })
}

/// Replaces the whole content of `file` with `data` and syncs it.
///
/// Safe to retry after a partial write.
fn write_whole(file: &mut File, data: &[u8]) -> io::Result<()> {
    file.set_len(0)?;
    file.rewind()?;
    file.write_all(data)?;
    file.sync_all()
}

/// Runs `ctx` to completion, reporting each file to `progress`.
///
/// Cancellation is checked before each file is opened, so a cancelled
/// batch never leaves a file half-written.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if the reporter asks to stop, or the first
/// error the context does not skip.
pub fn run_with_progress<P>(ctx: &mut ProcessingContext, progress: &mut P) -> Result<BatchResult>
where
    P: BatchProgress + ?Sized,
{
    progress.on_total(ctx.files_total());
    while !ctx.is_done() {
        if ctx.state() == ProcessState::Next {
            if progress.should_cancel() {
                ctx.last_error = Some(ErrorKind::Cancelled);
                return Err(Error::Cancelled);
            }
            if let Some(path) = ctx.next_path() {
                progress.on_file_start(path, ctx.pending_index());
            }
        }

        let completed = ctx.files_completed();
        let failed = ctx.failures().len();
        if let Err(error) = ctx.step() {
            let path = error
                .path()
                .map(Path::to_path_buf)
                .or_else(|| ctx.current_path().map(Path::to_path_buf))
                .unwrap_or_default();
            progress.on_file_complete(&path, false);
            return Err(error);
        }

        if ctx.files_completed() > completed {
            if let Some(path) = ctx.current_path() {
                progress.on_file_complete(path, true);
            }
        }
        if let Some(failure) = ctx.failures().get(failed) {
            progress.on_warning(&format!(
                "skipped {}: {}",
                failure.path.display(),
                failure.message
            ));
            progress.on_file_complete(&failure.path, false);
        }
    }
    Ok(ctx.result())
}
