//! Output formatting for CLI operations.

use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

use announcebulk::progress::format_duration;
use announcebulk::{BatchResult, Error, Transform};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats what a dry run would do
    fn format_plan(&self, files: &[PathBuf], transforms: &[Transform]) -> String;

    /// Formats the summary of a finished batch
    fn format_result(&self, result: &BatchResult, elapsed: Duration) -> String;

    /// Formats the summary of a batch stopped by an error
    fn format_error(&self, error: &Error, result: &BatchResult) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_plan(&self, files: &[PathBuf], transforms: &[Transform]) -> String {
        let mut output = String::new();

        output.push_str(&format!("Transforms ({}):\n", transforms.len()));
        for (i, transform) in transforms.iter().enumerate() {
            output.push_str(&format!("  {:>3}. {}\n", i + 1, transform));
        }
        output.push_str(&"-".repeat(70));
        output.push('\n');
        for file in files {
            output.push_str(&format!("{}\n", file.display()));
        }
        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!("{} files would be edited\n", files.len()));

        output
    }

    fn format_result(&self, result: &BatchResult, elapsed: Duration) -> String {
        let mut output = String::new();

        if result.is_success() {
            output.push_str(&format!(
                "Rewrote {} of {} files in {}\n",
                result.files_completed,
                result.files_total,
                format_duration(elapsed)
            ));
        } else {
            output.push_str("Completed with errors:\n");
            output.push_str(&format!("  Rewritten: {}\n", result.files_completed));
            output.push_str(&format!("  Failed:    {}\n", result.failures.len()));
            output.push_str("\nFailures:\n");
            for failure in &result.failures {
                output.push_str(&format!(
                    "  {}: {}\n",
                    failure.path.display(),
                    failure.message
                ));
            }
        }

        let stats = &result.stats;
        if stats.applied + stats.skipped > 0 {
            output.push_str(&format!(
                "  {} strings substituted, {} fields set, {} fields deleted, {} transforms skipped\n",
                stats.substituted, stats.set, stats.deleted, stats.skipped
            ));
        }

        output
    }

    fn format_error(&self, error: &Error, result: &BatchResult) -> String {
        format!(
            "Error: {}\nStopped after {} of {} files\n",
            error, result.files_completed, result.files_total
        )
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_plan(&self, files: &[PathBuf], transforms: &[Transform]) -> String {
        let obj = json!({
            "dry_run": true,
            "transforms": transforms
                .iter()
                .map(|t| json!({
                    "op": t.kind().as_str(),
                    "path": t.key_path().to_string(),
                    "description": t.to_string(),
                }))
                .collect::<Vec<_>>(),
            "files": files.iter().map(|f| f.display().to_string()).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_result(&self, result: &BatchResult, elapsed: Duration) -> String {
        let obj = json!({
            "success": result.is_success(),
            "files_total": result.files_total,
            "files_completed": result.files_completed,
            "files_failed": result.failures.len(),
            "elapsed_ms": elapsed.as_millis() as u64,
            "stats": {
                "applied": result.stats.applied,
                "skipped": result.stats.skipped,
                "deleted": result.stats.deleted,
                "set": result.stats.set,
                "substituted": result.stats.substituted,
            },
            "failures": result
                .failures
                .iter()
                .map(|f| json!({
                    "path": f.path.display().to_string(),
                    "kind": f.kind.to_string(),
                    "error": f.message,
                }))
                .collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_error(&self, error: &Error, result: &BatchResult) -> String {
        let obj = json!({
            "success": false,
            "error": error.to_string(),
            "kind": error.kind().to_string(),
            "path": error.path().map(|p| p.display().to_string()),
            "files_total": result.files_total,
            "files_completed": result.files_completed,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}
