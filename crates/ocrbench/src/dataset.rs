//! Tab-separated dataset loading.
//!
//! A dataset is a TSV file with a header row containing at least `index`,
//! `image` (base64 payload, may be blank) and `answer`. Extra columns are
//! ignored. The whole table is held in memory.

use crate::{OcrBenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Columns every dataset must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["index", "image", "answer"];

/// One row of a source dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Join key and file stem of the materialized image.
    pub index: i64,

    /// Base64-encoded image payload; `None` when the cell is empty.
    #[serde(default)]
    pub image: Option<String>,

    /// Ground-truth text.
    #[serde(default)]
    pub answer: String,
}

impl DatasetRecord {
    /// Image payload with surrounding whitespace removed, or `None` when blank.
    pub fn image_payload(&self) -> Option<&str> {
        self.image.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// An in-memory dataset in original row order.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    path: PathBuf,
    records: Vec<DatasetRecord>,
}

impl Dataset {
    /// Build a dataset from records already in memory.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, records: Vec<DatasetRecord>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            records,
        }
    }

    /// Load a dataset from a TSV file.
    ///
    /// # Errors
    ///
    /// - `OcrBenchError::Io` if the file cannot be read
    /// - `OcrBenchError::Dataset` if a required column is missing or a row is malformed
    pub fn from_tsv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(OcrBenchError::dataset(format!(
                    "{} is missing required column '{}'",
                    path.display(),
                    column
                )));
            }
        }

        let mut records = Vec::new();
        for (row, result) in reader.deserialize::<DatasetRecord>().enumerate() {
            let record = result.map_err(|e| {
                OcrBenchError::dataset_with_source(format!("{}: malformed row {}", path.display(), row + 1), e)
            })?;
            records.push(record);
        }

        tracing::debug!(dataset = %path.display(), rows = records.len(), "Loaded dataset");

        Ok(Self {
            name: dataset_name_from_path(path),
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Dataset name: the file's base name up to its first `.`.
///
/// `data/ru_handwriting.v2.tsv` becomes `ru_handwriting`.
pub fn dataset_name_from_path(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .and_then(|n| n.split('.').next().map(str::to_string))
        .unwrap_or_default()
}
