//! Command-line interface module for corruptscan.
//!
//! This module parses arguments, runs the scan, presents each outcome and
//! hands the invalid files to the deletion workflow.

use crate::config::{ConfigError, ScanConfig};
use crate::deletion::confirm_and_delete;
use crate::output::OutputFormatter;
use crate::report::{ReportError, ScanReport, ScanSummary};
use crate::scanner::{ScanError, ScanOutcome, Scanner, check_file};
use crate::validator::Verdict;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Find and delete image, PDF and spreadsheet files that fail to decode.
#[derive(Debug, Parser)]
#[command(name = "corruptscan", version, about)]
pub struct Args {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Descend into subdirectories
    #[arg(short, long, overrides_with = "no_recursive")]
    pub recursive: bool,

    /// Only check direct children of PATH
    #[arg(long, overrides_with = "recursive")]
    pub no_recursive: bool,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List corrupted files without asking to delete them
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON report of the scan
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Show a progress bar instead of per-file lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Converts parsed arguments into run options.
    pub fn into_options(self) -> RunOptions {
        let recursive = if self.recursive {
            Some(true)
        } else if self.no_recursive {
            Some(false)
        } else {
            None
        };
        RunOptions {
            root: self.path,
            recursive,
            config_path: self.config,
            dry_run: self.dry_run,
            report_path: self.report,
            quiet: self.quiet,
        }
    }
}

/// Everything a run needs besides console I/O.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub root: PathBuf,
    /// Overrides the configured traversal depth when set.
    pub recursive: Option<bool>,
    pub config_path: Option<PathBuf>,
    pub dry_run: bool,
    pub report_path: Option<PathBuf>,
    pub quiet: bool,
}

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// No invalid files remain on disk.
    Clean,
    /// This many invalid files remain on disk.
    InvalidRemaining(usize),
}

impl RunStatus {
    /// Process exit status: 0 when clean, 2 when invalid files remain.
    pub fn code(&self) -> u8 {
        match self {
            RunStatus::Clean => 0,
            RunStatus::InvalidRemaining(_) => 2,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

/// Errors that abort a run.
#[derive(Debug)]
pub enum RunError {
    Config(ConfigError),
    Scan(ScanError),
    Report(ReportError),
    Io(io::Error),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Config(e) => write!(f, "{}", e),
            RunError::Scan(e) => write!(f, "{}", e),
            RunError::Report(e) => write!(f, "{}", e),
            RunError::Io(e) => write!(f, "Console I/O failed: {}", e),
        }
    }
}

impl std::error::Error for RunError {}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        RunError::Config(e)
    }
}

impl From<ScanError> for RunError {
    fn from(e: ScanError) -> Self {
        RunError::Scan(e)
    }
}

impl From<ReportError> for RunError {
    fn from(e: ReportError) -> Self {
        RunError::Report(e)
    }
}

impl From<io::Error> for RunError {
    fn from(e: io::Error) -> Self {
        RunError::Io(e)
    }
}

/// Runs a scan against the process's stdin and stdout.
pub fn run_cli(options: &RunOptions) -> Result<RunStatus, RunError> {
    let stdin = io::stdin();
    run_with_io(options, stdin.lock(), io::stdout())
}

/// Runs a scan, reading the deletion answer from `input` and writing the
/// deletion dialogue to `output`.
pub fn run_with_io<R: BufRead, W: Write>(
    options: &RunOptions,
    input: R,
    output: W,
) -> Result<RunStatus, RunError> {
    let config = ScanConfig::load(options.config_path.as_deref())?;
    let mut scan_options = config.scan;
    if let Some(recursive) = options.recursive {
        scan_options.recursive = recursive;
    }
    let filter = config.filters.compile()?;
    let scanner = Scanner::new(&options.root, scan_options)?.with_filter(filter);

    OutputFormatter::info(&format!(
        "Checking files in directory: {}",
        options.root.display()
    ));
    tracing::info!(
        root = %options.root.display(),
        recursive = scan_options.recursive,
        "scan started"
    );

    let outcomes = present_outcomes(&scanner, options.quiet);
    let mut report = ScanReport::new(&options.root, scan_options.recursive, outcomes);
    OutputFormatter::summary_table(&report.summary);

    let invalid = report.invalid.clone();
    let status = handle_invalid(&invalid, options.dry_run, input, output, &mut report)?;

    if let Some(path) = &options.report_path {
        report.write(path)?;
    }
    Ok(status)
}

/// Validates every candidate, printing each outcome as it completes.
fn present_outcomes(scanner: &Scanner, quiet: bool) -> Vec<ScanOutcome> {
    if !quiet {
        return scanner
            .outcomes()
            .inspect(OutputFormatter::file_outcome)
            .collect();
    }

    let candidates = scanner.candidates();
    let pb = OutputFormatter::create_progress_bar(candidates.len() as u64);
    let mut summary = ScanSummary::default();
    let outcomes = candidates
        .iter()
        .map(|path| {
            pb.set_message(path.display().to_string());
            let outcome = check_file(path);
            summary.record(outcome.verdict);
            if outcome.verdict == Verdict::Invalid {
                pb.println(format!("Corrupted: {}", outcome.path.display()));
            }
            pb.inc(1);
            outcome
        })
        .collect();
    pb.finish_and_clear();
    tracing::debug!(checked = summary.total(), invalid = summary.invalid, "scan finished");
    outcomes
}

fn handle_invalid<R: BufRead, W: Write>(
    invalid: &[PathBuf],
    dry_run: bool,
    input: R,
    output: W,
    report: &mut ScanReport,
) -> Result<RunStatus, RunError> {
    if invalid.is_empty() {
        OutputFormatter::success("No corrupted files found.");
        return Ok(RunStatus::Clean);
    }

    if dry_run {
        OutputFormatter::header("Corrupted files found:");
        for path in invalid {
            println!("{}", path.display());
        }
        OutputFormatter::dry_run_notice("No files were deleted.");
        return Ok(RunStatus::InvalidRemaining(invalid.len()));
    }

    let deletion = confirm_and_delete(invalid, input, output)?;
    if deletion.declined {
        OutputFormatter::warning("No files were deleted.");
    } else if deletion.failed.is_empty() {
        OutputFormatter::success(&format!("Deleted {} file(s).", deletion.deleted.len()));
    } else {
        OutputFormatter::warning(&format!(
            "Deleted {} file(s); {} could not be deleted.",
            deletion.deleted.len(),
            deletion.failed.len()
        ));
    }

    let remaining = deletion.remaining(invalid.len());
    report.deleted = deletion.deleted;
    if remaining == 0 {
        Ok(RunStatus::Clean)
    } else {
        Ok(RunStatus::InvalidRemaining(remaining))
    }
}
