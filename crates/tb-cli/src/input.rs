//! Loading timebook files from disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tb_core::{
    LineError, NegativeDurationPolicy, TaskInterval, parse_budgets, parse_documents, split_lines,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file unavailable: {}", .path.display())]
    FileUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A rejected task line and the file it came from.
#[derive(Debug, Clone)]
pub struct RejectedLine {
    pub path: PathBuf,
    pub line: LineError,
}

/// Everything parsed from a set of timebook files.
#[derive(Debug, Default)]
pub struct Timebook {
    /// Intervals of all files, in file order then line order.
    pub intervals: Vec<TaskInterval>,
    pub rejected: Vec<RejectedLine>,
    /// Budget minutes per lowercase task key.
    pub budgets: HashMap<String, i64>,
}

/// Reads a whole file as UTF-8 text.
pub fn load_document(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::FileUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads and parses `paths`.
///
/// Any unreadable file fails the whole load. Malformed task lines do not;
/// they are reported in [`Timebook::rejected`].
pub fn load_timebook(
    paths: &[PathBuf],
    policy: NegativeDurationPolicy,
) -> Result<Timebook, LoadError> {
    let documents = paths
        .iter()
        .map(|path| load_document(path))
        .collect::<Result<Vec<_>, _>>()?;

    let budgets = parse_budgets(documents.iter().flat_map(|doc| split_lines(doc)));

    let mut timebook = Timebook {
        budgets,
        ..Timebook::default()
    };
    for (path, outcome) in paths.iter().zip(parse_documents(&documents, policy)) {
        tracing::debug!(
            path = %path.display(),
            intervals = outcome.intervals.len(),
            rejected = outcome.errors.len(),
            "parsed timebook file"
        );
        timebook.intervals.extend(outcome.intervals);
        timebook
            .rejected
            .extend(outcome.errors.into_iter().map(|line| RejectedLine {
                path: path.clone(),
                line,
            }));
    }

    Ok(timebook)
}
