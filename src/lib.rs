//! corruptscan - find files that no longer decode
//!
//! This library classifies files by extension, checks images, PDFs and
//! spreadsheets with their decoders, collects the ones that fail, and
//! deletes them after a single batch confirmation.

pub mod cli;
pub mod config;
pub mod deletion;
pub mod file_category;
pub mod output;
pub mod report;
pub mod scanner;
pub mod validator;

pub use config::{CandidateFilter, ConfigError, ScanConfig, ScanOptions};
pub use deletion::{DeletionReport, confirm_and_delete};
pub use file_category::{Category, classify};
pub use report::{ScanReport, ScanSummary};
pub use scanner::{ScanError, ScanOutcome, Scanner, scan};
pub use validator::{Verdict, validate};

pub use cli::{RunOptions, RunStatus, run_cli};
