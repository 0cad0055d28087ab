/// Scan summaries and the JSON run report.
///
/// A report is only written when the operator asks for one with `--report`;
/// nothing else persists between runs.
use crate::scanner::ScanOutcome;
use crate::validator::Verdict;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Verdict counts for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub valid: usize,
    pub invalid: usize,
    pub unverifiable: usize,
}

impl ScanSummary {
    /// Counts one verdict.
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Valid => self.valid += 1,
            Verdict::Invalid => self.invalid += 1,
            Verdict::Unverifiable => self.unverifiable += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.unverifiable
    }
}

/// Errors writing a report.
#[derive(Debug)]
pub enum ReportError {
    /// JSON serialization failed.
    Serialize(serde_json::Error),
    /// The report file could not be written.
    Write { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Serialize(e) => write!(f, "Failed to serialize report: {}", e),
            ReportError::Write { path, source } => {
                write!(f, "Failed to write report {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ReportError {}

/// Machine-readable record of a scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    pub root: PathBuf,
    pub recursive: bool,
    pub summary: ScanSummary,
    pub outcomes: Vec<ScanOutcome>,
    /// Invalid files in traversal order.
    pub invalid: Vec<PathBuf>,
    /// Invalid files that were removed, if deletion ran.
    pub deleted: Vec<PathBuf>,
}

impl ScanReport {
    /// Builds a report from the outcomes of a finished scan.
    pub fn new(root: &Path, recursive: bool, outcomes: Vec<ScanOutcome>) -> Self {
        let mut summary = ScanSummary::default();
        for outcome in &outcomes {
            summary.record(outcome.verdict);
        }
        let invalid = outcomes
            .iter()
            .filter(|o| o.verdict == Verdict::Invalid)
            .map(|o| o.path.clone())
            .collect();
        Self {
            generated_at: Utc::now(),
            root: root.to_path_buf(),
            recursive,
            summary,
            outcomes,
            invalid,
            deleted: Vec::new(),
        }
    }

    /// Serializes the report as pretty JSON.
    pub fn to_json(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self).map_err(ReportError::Serialize)
    }

    /// Writes the report to `path`.
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_category::Category;

    fn outcome(path: &str, category: Category, verdict: Verdict) -> ScanOutcome {
        ScanOutcome {
            path: PathBuf::from(path),
            category,
            verdict,
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = ScanSummary::default();
        summary.record(Verdict::Valid);
        summary.record(Verdict::Invalid);
        summary.record(Verdict::Invalid);
        assert_eq!(summary.valid, 1);
        assert_eq!(summary.invalid, 2);
        assert_eq!(summary.unverifiable, 0);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_report_collects_invalid_in_order() {
        let report = ScanReport::new(
            Path::new("/data"),
            true,
            vec![
                outcome("/data/b.pdf", Category::Pdf, Verdict::Invalid),
                outcome("/data/a.png", Category::Image, Verdict::Valid),
                outcome("/data/c.ods", Category::Spreadsheet, Verdict::Invalid),
            ],
        );
        assert_eq!(
            report.invalid,
            vec![PathBuf::from("/data/b.pdf"), PathBuf::from("/data/c.ods")]
        );
        assert_eq!(report.summary.invalid, 2);
    }

    #[test]
    fn test_report_json_shape() {
        let report = ScanReport::new(
            Path::new("/data"),
            false,
            vec![outcome("/data/x.xlsx", Category::Spreadsheet, Verdict::Invalid)],
        );
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["recursive"], false);
        assert_eq!(value["summary"]["invalid"], 1);
        assert_eq!(value["outcomes"][0]["category"], "spreadsheet");
        assert_eq!(value["outcomes"][0]["verdict"], "invalid");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        ScanReport::new(dir.path(), false, Vec::new())
            .write(&path)
            .unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"summary\""));
    }

    #[test]
    fn test_write_report_to_missing_dir_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("report.json");
        let err = ScanReport::new(dir.path(), false, Vec::new())
            .write(&path)
            .unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
    }
}
