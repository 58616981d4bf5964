//! CLI tool for bulk torrent edits.

mod commands;
mod exit_codes;
mod output;
mod progress;
mod transforms;

use clap::{ArgAction, Args, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

use announcebulk::{Preset, TorrentClient};
use exit_codes::ExitCode;

/// Bulk edit tracker URLs and other fields in .torrent files
#[derive(Parser)]
#[command(name = "announcebulk")]
#[command(author, version, about = "Bulk edit tracker URLs and other fields in .torrent files", long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    edit: EditArgs,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,
}

/// Files to edit and the transforms to apply, in command-line order.
#[derive(Args)]
pub struct EditArgs {
    /// Torrent files or directories to edit
    paths: Vec<PathBuf>,

    /// Also edit the torrent store of a client (qbittorrent, deluge,
    /// transmission, transmission-daemon, utorrent)
    #[arg(long, value_name = "CLIENT")]
    client: Vec<TorrentClient>,

    /// Extension of files to pick up inside directories
    #[arg(long, default_value = announcebulk::DEFAULT_EXTENSION)]
    ext: String,

    /// Apply a named preset (orpheus)
    #[arg(long, value_name = "NAME")]
    preset: Vec<Preset>,

    /// Delete the field at PATH (e.g. info/source)
    #[arg(long, value_name = "PATH")]
    delete: Vec<String>,

    /// Set the field at PATH to a string
    #[arg(long, value_name = "PATH=VALUE")]
    set: Vec<String>,

    /// Replace the first FIND with REPLACE in the string(s) at PATH
    #[arg(long, num_args = 3, value_names = ["PATH", "FIND", "REPLACE"])]
    substitute: Vec<String>,

    /// Replace the first match of PATTERN in the string(s) at PATH
    #[arg(long, num_args = 3, value_names = ["PATH", "PATTERN", "REPLACE"])]
    substitute_regex: Vec<String>,

    /// Read transforms from a JSON file
    #[arg(long, value_name = "FILE")]
    transform_file: Option<PathBuf>,

    /// Write through a temporary file and rename it over the original
    #[arg(long)]
    atomic: bool,

    /// Skip files that fail instead of stopping
    #[arg(long)]
    keep_going: bool,

    /// List files and transforms without editing anything
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    init_logging(cli.verbose, cli.quiet);

    // The flag is only checked between files, so a file that has been
    // truncated is always rewritten before the batch stops.
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        ctrlc::set_handler(move || {
            if !interrupted.swap(true, Ordering::SeqCst) {
                eprintln!("\nInterrupted, stopping after the current file");
            }
        })
        .ok();
    }

    let exit_code = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
        None => match transforms::collect(&cli.edit, &matches) {
            Ok(transforms) => commands::edit(
                &commands::EditConfig {
                    args: &cli.edit,
                    transforms,
                    format: cli.format,
                    quiet: cli.quiet,
                },
                &interrupted,
            ),
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::BadArgs
            }
        },
    };

    std::process::exit(exit_code.code());
}
