//! Command implementations for the CLI tool.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use announcebulk::{
    BatchBuilder, ErrorPolicy, ProcessOptions, Transform, WriteMode, discover, discover_client,
    run_with_progress,
};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::create_formatter;
use crate::progress::CliProgress;
use crate::{EditArgs, OutputFormat};

/// Configuration for the edit command.
pub struct EditConfig<'a> {
    pub args: &'a EditArgs,
    pub transforms: Vec<Transform>,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Collects the files named by paths and clients.
///
/// Unreadable directory entries are reported and skipped.
fn collect_files(args: &EditArgs) -> Vec<PathBuf> {
    let mut found = announcebulk::Discovery::default();
    for path in &args.paths {
        found.extend(discover(path, Some(&args.ext)));
    }
    for client in &args.client {
        let dirs = client.existing_dirs();
        if dirs.is_empty() {
            eprintln!("Warning: no torrent directory found for {}", client);
        }
        found.extend(discover_client(*client));
    }
    for error in &found.errors {
        eprintln!("Warning: {}", error);
    }
    found.files
}

/// Edit command implementation
pub fn edit(config: &EditConfig<'_>, interrupted: &AtomicBool) -> ExitCode {
    let formatter = create_formatter(config.format);
    let args = config.args;

    if config.transforms.is_empty() {
        eprintln!("Error: no transforms given (use --preset, --delete, --set, --substitute, ...)");
        return ExitCode::BadArgs;
    }
    if args.paths.is_empty() && args.client.is_empty() {
        eprintln!("Error: no files given (pass paths or --client)");
        return ExitCode::BadArgs;
    }

    let files = collect_files(args);
    if files.is_empty() {
        eprintln!("Warning: no matching files found");
        return ExitCode::Warning;
    }

    if args.dry_run {
        print!("{}", formatter.format_plan(&files, &config.transforms));
        return ExitCode::Success;
    }

    let options = ProcessOptions::new()
        .write_mode(if args.atomic {
            WriteMode::Atomic
        } else {
            WriteMode::InPlace
        })
        .error_policy(if args.keep_going {
            ErrorPolicy::SkipFile
        } else {
            ErrorPolicy::Abort
        });

    let mut ctx = BatchBuilder::new()
        .files(files)
        .transforms(config.transforms.iter().cloned())
        .options(options)
        .build();

    let mut progress = CliProgress::new(config.quiet, interrupted);
    let start = Instant::now();
    let outcome = run_with_progress(&mut ctx, &mut progress);
    let summary = ctx.result();

    let code = match outcome {
        Ok(result) => {
            progress.finish();
            print!("{}", formatter.format_result(&result, start.elapsed()));
            if result.is_success() {
                ExitCode::Success
            } else {
                ExitCode::Warning
            }
        }
        Err(e) => {
            progress.abandon();
            let text = formatter.format_error(&e, &summary);
            match config.format {
                OutputFormat::Json => print!("{}", text),
                OutputFormat::Human => eprint!("{}", text),
            }
            error_to_exit_code(&e)
        }
    };

    if let Err(e) = ctx.close() {
        eprintln!("Error: {}", e);
        return error_to_exit_code(&e);
    }
    code
}
