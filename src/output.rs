//! Console output formatting.
//!
//! All user-facing scan text goes through [`OutputFormatter`] so styling
//! stays consistent. Diagnostics go through `tracing` instead.

use crate::report::ScanSummary;
use crate::scanner::ScanOutcome;
use crate::validator::Verdict;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Width of the line printed between files.
const SEPARATOR_WIDTH: usize = 30;

/// Manages CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message to stderr in red.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints the line separating two files.
    pub fn separator() {
        println!("{}", "-".repeat(SEPARATOR_WIDTH));
    }

    /// Returns the "Checking file" line for `outcome`.
    pub fn checking_line(outcome: &ScanOutcome) -> String {
        format!("Checking file: {}", outcome.path.display())
    }

    /// Returns the verdict line, colored by verdict.
    pub fn verdict_line(verdict: Verdict) -> ColoredString {
        match verdict {
            Verdict::Valid => verdict.message().green(),
            Verdict::Invalid => verdict.message().red().bold(),
            Verdict::Unverifiable => verdict.message().yellow(),
        }
    }

    /// Prints the block for one file.
    pub fn file_outcome(outcome: &ScanOutcome) {
        Self::separator();
        println!("{}", Self::checking_line(outcome));
        println!("{}", Self::verdict_line(outcome.verdict));
    }

    /// Creates a progress bar for a scan over `total` files.
    ///
    /// ```no_run
    /// use corruptscan::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(10);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints verdict counts as a small table.
    pub fn summary_table(summary: &ScanSummary) {
        Self::header("SUMMARY");

        let rows = [
            ("Safe", summary.valid, summary.valid.to_string().green()),
            ("Corrupted", summary.invalid, summary.invalid.to_string().red()),
            (
                "Unverified",
                summary.unverifiable,
                summary.unverifiable.to_string().yellow(),
            ),
        ];
        let width = rows
            .iter()
            .map(|(label, _, _)| label.len())
            .max()
            .unwrap_or(0)
            .max("Verdict".len());

        println!("{:<width$} | {}", "Verdict".bold(), "Files".bold(), width = width);
        println!("{}", "-".repeat(width + 10));
        for (label, count, styled) in &rows {
            println!(
                "{:<width$} | {} {}",
                label,
                styled,
                if *count == 1 { "file" } else { "files" },
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            summary.total().to_string().bold(),
            if summary.total() == 1 { "file" } else { "files" },
            width = width
        );
    }

    /// Prints a dry-run notice.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
