// File: crates/bubble-core/src/loader.rs
// Summary: Frame loader; resolves a generation index to its CSV file and parses it into SurnameRecords.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::{DataError, LoadError};
use crate::record::{Columns, RowValidator, SurnameRecord};

/// Placeholder replaced by the zero-padded generation index.
pub const GEN_PLACEHOLDER: &str = "{gen}";
pub const DEFAULT_TEMPLATE: &str = "generations/generation_{gen}.csv";

/// Zero-padded, at least two-digit decimal tag for a generation (`3` -> `"03"`).
pub fn generation_tag(generation: usize) -> String {
    format!("{generation:02}")
}

#[derive(Clone, Debug)]
pub struct FrameLoader {
    data_dir: PathBuf,
    template: String,
    timeout: Option<Duration>,
}

impl FrameLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), template: DEFAULT_TEMPLATE.to_string(), timeout: None }
    }

    /// Relative path template; must contain `{gen}`.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn resource_path(&self, generation: usize) -> PathBuf {
        let rel = self.template.replace(GEN_PLACEHOLDER, &generation_tag(generation));
        self.data_dir.join(rel)
    }

    /// Read and validate one generation's dataset.
    pub async fn load(&self, generation: usize) -> Result<Vec<SurnameRecord>, LoadError> {
        let path = self.resource_path(generation);
        let bytes = read_within(&path, self.timeout, tokio::fs::read(&path)).await?;

        let records = parse_generation(&path, &bytes)?;
        debug!(generation, rows = records.len(), path = %path.display(), "loaded generation");
        Ok(records)
    }
}

/// Await `read`, giving up after `timeout` when one is set.
pub async fn read_within<F>(path: &Path, timeout: Option<Duration>, read: F) -> Result<Vec<u8>, LoadError>
where
    F: Future<Output = std::io::Result<Vec<u8>>>,
{
    let res = match timeout {
        Some(timeout) => tokio::time::timeout(timeout, read)
            .await
            .map_err(|_| LoadError::Timeout { path: path.to_path_buf(), timeout })?,
        None => read.await,
    };
    res.map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

/// Parse CSV bytes (header row + data rows). `path` is only used for error reporting.
pub fn parse_generation(path: &Path, bytes: &[u8]) -> Result<Vec<SurnameRecord>, LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv { path: path.to_path_buf(), source };
    let data_err = |source: DataError| LoadError::Data { path: path.to_path_buf(), source };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let mut validator = RowValidator::new(Columns::from_headers(&headers).map_err(data_err)?);

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(csv_err)?;
        // blank lines come through as a single empty field
        if rec.iter().all(|f| f.is_empty()) {
            continue;
        }
        let line = rec.position().map(|p| p.line()).unwrap_or(0);
        out.push(validator.validate(line, &rec).map_err(data_err)?);
    }
    Ok(out)
}
