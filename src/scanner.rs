//! Directory scanning.
//!
//! The scanner only judges files; it never prints and never deletes.
//! Outcomes are produced lazily, one file at a time, in whatever order the
//! filesystem enumerates them.

use crate::config::{CandidateFilter, ScanOptions};
use crate::file_category::{Category, classify, is_known_extension};
use crate::validator::{Verdict, validate};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The verdict for one candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    pub path: PathBuf,
    pub category: Category,
    pub verdict: Verdict,
}

/// Errors that stop a scan before it starts.
#[derive(Debug)]
pub enum ScanError {
    /// The root path does not exist.
    RootNotFound(PathBuf),
    /// The root path exists but is not a directory.
    NotADirectory(PathBuf),
    /// The root directory could not be read.
    Unreadable { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::RootNotFound(path) => {
                write!(f, "Directory not found: {}", path.display())
            }
            ScanError::NotADirectory(path) => {
                write!(f, "Not a directory: {}", path.display())
            }
            ScanError::Unreadable { path, source } => {
                write!(f, "Cannot read directory {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Classifies and validates a single file.
pub fn check_file(path: &Path) -> ScanOutcome {
    let category = classify(path);
    let verdict = validate(path, category);
    ScanOutcome {
        path: path.to_path_buf(),
        category,
        verdict,
    }
}

/// Scans a directory tree for candidate files.
#[derive(Debug)]
pub struct Scanner {
    root: PathBuf,
    options: ScanOptions,
    filter: CandidateFilter,
}

impl Scanner {
    /// Creates a scanner for `root`, failing fast if it cannot be read.
    pub fn new(root: &Path, options: ScanOptions) -> Result<Self, ScanError> {
        let metadata = fs::metadata(root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ScanError::RootNotFound(root.to_path_buf()),
            _ => ScanError::Unreadable {
                path: root.to_path_buf(),
                source: e,
            },
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }
        fs::read_dir(root).map_err(|e| ScanError::Unreadable {
            path: root.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            options,
            filter: CandidateFilter::default(),
        })
    }

    /// Replaces the candidate filter.
    pub fn with_filter(mut self, filter: CandidateFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> ScanOptions {
        self.options
    }

    fn walker(&self) -> WalkDir {
        let max_depth = if self.options.recursive { usize::MAX } else { 1 };
        WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(self.options.follow_links)
    }

    fn is_candidate(&self, path: &Path) -> bool {
        if !is_known_extension(path) {
            return false;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.filter.allows(relative)
    }

    /// Lazily enumerates candidate files without opening them.
    pub fn candidate_iter(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.walker()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.is_candidate(path))
    }

    /// Collects every candidate path.
    pub fn candidates(&self) -> Vec<PathBuf> {
        self.candidate_iter().collect()
    }

    /// Lazily yields one outcome per candidate, in traversal order.
    ///
    /// Each file is fully validated, and its handles released, before the
    /// next one is enumerated.
    pub fn outcomes(&self) -> impl Iterator<Item = ScanOutcome> + '_ {
        self.candidate_iter().map(|path| check_file(&path))
    }

    /// Returns the invalid files in traversal order.
    pub fn invalid_paths(&self) -> Vec<PathBuf> {
        self.outcomes()
            .filter(|outcome| outcome.verdict == Verdict::Invalid)
            .map(|outcome| outcome.path)
            .collect()
    }
}

/// Scans `root` with default filters and returns the invalid files.
pub fn scan(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    let options = ScanOptions {
        recursive,
        ..Default::default()
    };
    Ok(Scanner::new(root, options)?.invalid_paths())
}
