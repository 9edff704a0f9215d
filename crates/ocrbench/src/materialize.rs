//! Image materialization.
//!
//! Decodes the base64 `image` column of a dataset into `<dir>/<index>.png`
//! files. The extension is fixed; payloads are written verbatim without
//! sniffing their format.
//!
//! The existence of the target directory is the only completeness signal:
//! [`ensure_materialized`] skips datasets whose directory already exists, even
//! if a previous run was interrupted half way.

use crate::dataset::Dataset;
use crate::layout::ArtifactLayout;
use crate::{OcrBenchError, Result};
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use std::fs;
use std::path::Path;

/// Standard alphabet, padding required, non-zero trailing bits accepted.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Outcome of one materialization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Image files written.
    pub written: usize,
    /// Rows with a missing or blank payload.
    pub skipped_blank: usize,
    /// Rows whose payload failed to decode, by index.
    pub failed: Vec<i64>,
}

/// Decode every non-blank image of `dataset` into `target_dir`.
///
/// Decode failures are logged with the offending index and skipped; only I/O
/// errors abort the pass.
pub fn materialize(dataset: &Dataset, target_dir: &Path) -> Result<MaterializeReport> {
    fs::create_dir_all(target_dir)?;

    let mut report = MaterializeReport::default();

    for record in dataset.records() {
        let Some(payload) = record.image_payload() else {
            report.skipped_blank += 1;
            continue;
        };

        // line-wrapped payloads are common in exported TSVs
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();

        let bytes = match PAYLOAD_ENGINE.decode(compact) {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = OcrBenchError::Decode {
                    index: record.index,
                    message: e.to_string(),
                };
                tracing::warn!(index = record.index, "{}", err);
                report.failed.push(record.index);
                continue;
            }
        };

        fs::write(ArtifactLayout::image_path(target_dir, record.index), bytes)?;
        report.written += 1;
    }

    tracing::info!(
        dataset = dataset.name(),
        written = report.written,
        skipped = report.skipped_blank,
        failed = report.failed.len(),
        "Materialized images into {}",
        target_dir.display()
    );

    Ok(report)
}

/// Materialize `dataset` into `target_dir` unless the directory already exists.
///
/// Returns `None` when the existing directory was reused.
pub fn ensure_materialized(dataset: &Dataset, target_dir: &Path) -> Result<Option<MaterializeReport>> {
    if target_dir.exists() {
        tracing::info!(dataset = dataset.name(), "Images folder found at {}", target_dir.display());
        return Ok(None);
    }

    tracing::info!(dataset = dataset.name(), "Extracting images into {}", target_dir.display());
    materialize(dataset, target_dir).map(Some)
}
