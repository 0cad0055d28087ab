/// Confirmation and deletion of invalid files.
///
/// The operator sees every path first and answers a single yes/no question
/// for the whole batch. Nothing is removed without an exact `y` or `Y`.
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// What happened to a batch of invalid files.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Files that were removed.
    pub deleted: Vec<PathBuf>,
    /// Files that could not be removed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
    /// True if the operator declined; nothing was attempted.
    pub declined: bool,
}

impl DeletionReport {
    /// Number of files still on disk after the workflow.
    pub fn remaining(&self, total: usize) -> usize {
        total.saturating_sub(self.deleted.len())
    }

    /// Returns true if every file was removed.
    pub fn is_complete_success(&self) -> bool {
        !self.declined && self.failed.is_empty()
    }
}

/// Returns true only for the affirmative token.
///
/// The trailing line terminator is stripped; any other whitespace makes
/// the answer a decline.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer
        .strip_suffix('\n')
        .map(|a| a.strip_suffix('\r').unwrap_or(a))
        .unwrap_or(answer);
    answer.eq_ignore_ascii_case("y")
}

/// Lists `paths`, asks once, and deletes them with `fs::remove_file`.
pub fn confirm_and_delete<R: BufRead, W: Write>(
    paths: &[PathBuf],
    input: R,
    output: W,
) -> io::Result<DeletionReport> {
    confirm_and_delete_with(paths, input, output, |path| fs::remove_file(path))
}

/// Same as [`confirm_and_delete`] with a caller-supplied removal function.
///
/// Every path is attempted even if earlier ones fail.
pub fn confirm_and_delete_with<R, W, F>(
    paths: &[PathBuf],
    mut input: R,
    mut output: W,
    mut remove: F,
) -> io::Result<DeletionReport>
where
    R: BufRead,
    W: Write,
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut report = DeletionReport::default();
    if paths.is_empty() {
        return Ok(report);
    }

    writeln!(output, "\nCorrupted files found:")?;
    for path in paths {
        writeln!(output, "{}", path.display())?;
    }
    writeln!(output, "\nDo you want to delete these files? (y/n)")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    if !is_affirmative(&answer) {
        tracing::info!(count = paths.len(), "deletion declined");
        report.declined = true;
        return Ok(report);
    }

    for path in paths {
        let line = match remove(path) {
            Ok(()) => {
                report.deleted.push(path.clone());
                format!("Deleted file: {}", path.display())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "delete failed");
                let line = format!("Error deleting file: {}. Error: {}", path.display(), e);
                report.failed.push((path.clone(), e.to_string()));
                line
            }
        };
        // A broken console must not stop the remaining removals.
        if let Err(e) = writeln!(output, "{}", line) {
            tracing::warn!(error = %e, "could not write deletion result");
        }
    }
    Ok(report)
}
