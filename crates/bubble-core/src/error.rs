// File: crates/bubble-core/src/error.rs
// Summary: Typed failures for loading generation files and validating their rows.

use std::path::PathBuf;
use std::time::Duration;

/// A row (or header) that does not satisfy the generation file schema.
/// Line numbers are 1-based and count the header as line 1.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("line {line}: empty surname")]
    EmptySurname { line: u64 },
    #[error("line {line}: count `{value}` for `{surname}` is not a non-negative integer")]
    InvalidCount { line: u64, surname: String, value: String },
    #[error("line {line}: surname `{surname}` appears more than once")]
    DuplicateSurname { line: u64, surname: String },
}

/// Failure to produce one generation's dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid data in {}: {source}", path.display())]
    Data {
        path: PathBuf,
        #[source]
        source: DataError,
    },
    #[error("loading {} timed out after {timeout:?}", path.display())]
    Timeout { path: PathBuf, timeout: Duration },
}

impl LoadError {
    /// File the failure refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Csv { path, .. }
            | LoadError::Data { path, .. }
            | LoadError::Timeout { path, .. } => path,
        }
    }
}
