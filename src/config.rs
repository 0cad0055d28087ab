//! Scan configuration.
//!
//! Settings are read from a TOML file and control traversal depth and which
//! candidate files are skipped before any decoder runs.
//!
//! # Configuration File Format
//!
//! ```toml
//! [scan]
//! recursive = true
//! follow_links = false
//!
//! [filters]
//! skip_hidden_files = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["**/node_modules/**"]
//! extensions = ["xlsb"]
//! regex = ["^~\\$"]
//!
//! [filters.include]
//! patterns = []
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_NAME: &str = ".corruptscanrc.toml";

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    NotFound(PathBuf),
    /// The file could not be read.
    Io { path: PathBuf, reason: String },
    /// Invalid TOML syntax or structure.
    Invalid { path: PathBuf, reason: String },
    /// A glob pattern failed to compile.
    InvalidGlob { pattern: String, reason: String },
    /// A regex pattern failed to compile.
    InvalidRegex { pattern: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::Io { path, reason } => {
                write!(f, "Could not read {}: {}", path.display(), reason)
            }
            ConfigError::Invalid { path, reason } => {
                write!(f, "Invalid configuration in {}: {}", path.display(), reason)
            }
            ConfigError::InvalidGlob { pattern, reason } => {
                write!(f, "Invalid glob pattern '{}': {}", pattern, reason)
            }
            ConfigError::InvalidRegex { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub scan: ScanOptions,
    #[serde(default)]
    pub filters: FilterRules,
}

/// Traversal settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Descend into subdirectories.
    #[serde(default)]
    pub recursive: bool,
    /// Follow symbolic links while walking.
    #[serde(default)]
    pub follow_links: bool,
}

/// Candidate filtering rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Skip files whose name starts with ".".
    #[serde(default)]
    pub skip_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Include rules win over exclude rules.
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for skipping files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names, e.g. "Thumbs.db".
    #[serde(default)]
    pub filenames: Vec<String>,
    /// Glob patterns matched against the path relative to the scan root.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Extensions without the dot, case-insensitive.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Regexes matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules that force a file to be checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl ScanConfig {
    /// Loads configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if given (must exist)
    /// 2. `.corruptscanrc.toml` in the current directory
    /// 3. `~/.config/corruptscan/config.toml`
    /// 4. built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_NAME);
        if local.is_file() {
            return Self::load_from_file(&local);
        }

        if let Ok(home) = std::env::var("HOME") {
            let global = PathBuf::from(home)
                .join(".config")
                .join("corruptscan")
                .join("config.toml");
            if global.is_file() {
                return Self::load_from_file(&global);
            }
        }

        Ok(Self::default())
    }

    /// Loads configuration from one file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml(&content).map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

impl FilterRules {
    /// Compiles the rules for matching.
    pub fn compile(&self) -> Result<CandidateFilter, ConfigError> {
        CandidateFilter::new(self)
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| ConfigError::InvalidGlob {
                pattern: p.clone(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

/// Compiled filter rules.
#[derive(Debug, Default)]
pub struct CandidateFilter {
    skip_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_globs: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_globs: Vec<Pattern>,
}

impl CandidateFilter {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidRegex {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden_files: rules.skip_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_globs: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes,
            include_globs: compile_globs(&rules.include.patterns)?,
        })
    }

    /// Returns true if the file at `relative` (path below the scan root)
    /// should be checked.
    ///
    /// Include globs win. Otherwise the file is skipped when it is hidden
    /// and hidden files are skipped, or when it matches an excluded name,
    /// extension, glob or regex.
    pub fn allows(&self, relative: &Path) -> bool {
        if self.include_globs.iter().any(|g| g.matches_path(relative)) {
            return true;
        }

        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.skip_hidden_files && name.starts_with('.') {
            return false;
        }
        if self.exclude_filenames.contains(name.as_ref()) {
            return false;
        }
        if let Some(ext) = relative.extension()
            && self
                .exclude_extensions
                .contains(&ext.to_string_lossy().to_lowercase())
        {
            return false;
        }
        if self.exclude_globs.iter().any(|g| g.matches_path(relative)) {
            return false;
        }
        !self.exclude_regexes.iter().any(|r| r.is_match(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(rules: FilterRules) -> CandidateFilter {
        rules.compile().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert!(!config.scan.recursive);
        assert!(!config.scan.follow_links);
        assert!(!config.filters.skip_hidden_files);
    }

    #[test]
    fn test_parse_full_toml() {
        let config = ScanConfig::from_toml(
            r#"
            [scan]
            recursive = true

            [filters]
            skip_hidden_files = true

            [filters.exclude]
            filenames = ["Thumbs.db"]
            extensions = ["xlsb"]
            "#,
        )
        .unwrap();
        assert!(config.scan.recursive);
        assert!(!config.scan.follow_links);
        assert!(config.filters.skip_hidden_files);
        assert_eq!(config.filters.exclude.filenames, vec!["Thumbs.db"]);
        assert_eq!(config.filters.exclude.extensions, vec!["xlsb"]);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = ScanConfig::from_toml("").unwrap();
        assert!(!config.scan.recursive);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(ScanConfig::from_toml("[scan]\nrecursive = \"maybe\"").is_err());
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = ScanConfig::load(Some(Path::new("/no/such/corruptscan.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scan]\nrecursive = true\nfollow_links = true\n").unwrap();
        let config = ScanConfig::load(Some(&path)).unwrap();
        assert!(config.scan.recursive);
        assert!(config.scan.follow_links);
    }

    #[test]
    fn test_load_from_file_reports_path_on_bad_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[scan\n").unwrap();
        let err = ScanConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_hidden_files_checked_by_default() {
        let f = filter(FilterRules::default());
        assert!(f.allows(Path::new(".cache.png")));
        assert!(f.allows(Path::new("photo.png")));
    }

    #[test]
    fn test_hidden_files_skipped_when_configured() {
        let f = filter(FilterRules {
            skip_hidden_files: true,
            ..Default::default()
        });
        assert!(!f.allows(Path::new(".cache.png")));
        assert!(f.allows(Path::new("photo.png")));
    }

    #[test]
    fn test_exclude_filename_and_extension() {
        let f = filter(FilterRules {
            exclude: ExcludeRules {
                filenames: vec!["scratch.pdf".to_string()],
                extensions: vec![".XLSB".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(!f.allows(Path::new("scratch.pdf")));
        assert!(!f.allows(Path::new("book.xlsb")));
        assert!(f.allows(Path::new("book.xlsx")));
    }

    #[test]
    fn test_exclude_glob_respects_directory_boundaries() {
        let f = filter(FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["**/backup/**".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(!f.allows(Path::new("backup/a.png")));
        assert!(!f.allows(Path::new("2024/backup/a.png")));
        assert!(f.allows(Path::new("old_backup/a.png")));
    }

    #[test]
    fn test_exclude_regex_on_file_name() {
        let f = filter(FilterRules {
            exclude: ExcludeRules {
                regex: vec![r"^~\$".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(!f.allows(Path::new("reports/~$budget.xlsx")));
        assert!(f.allows(Path::new("reports/budget.xlsx")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let f = filter(FilterRules {
            exclude: ExcludeRules {
                extensions: vec!["pdf".to_string()],
                ..Default::default()
            },
            include: IncludeRules {
                patterns: vec!["keep/*.pdf".to_string()],
            },
            ..Default::default()
        });
        assert!(f.allows(Path::new("keep/a.pdf")));
        assert!(!f.allows(Path::new("other/a.pdf")));
    }

    #[test]
    fn test_invalid_patterns_are_errors() {
        let bad_glob = FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["[unclosed".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            bad_glob.compile(),
            Err(ConfigError::InvalidGlob { .. })
        ));

        let bad_regex = FilterRules {
            exclude: ExcludeRules {
                regex: vec!["(".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            bad_regex.compile(),
            Err(ConfigError::InvalidRegex { .. })
        ));
    }
}
