//! On-disk layout of materialized images and run artifacts.
//!
//! ```text
//! <images_root>/<dataset>/<index>.png
//! <output_root>/<model>/<dataset>[_debug]/<model>_<dataset>.csv
//! <output_root>/<model>/<dataset>[_debug]/<base_name>_summary.json
//! <output_root>/<model>/<dataset>[_debug]/<base_name>_evaluated.csv
//! ```
//!
//! Debug runs live in a `_debug` sibling directory so they never share
//! artifacts with full runs.

use std::path::{Path, PathBuf};

const DEBUG_SUFFIX: &str = "_debug";

/// Root directories every artifact path is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    images_root: PathBuf,
    output_root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(images_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            images_root: images_root.into(),
            output_root: output_root.into(),
        }
    }

    pub fn images_root(&self) -> &Path {
        &self.images_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Directory holding the materialized images of `dataset`.
    pub fn images_dir(&self, dataset: &str) -> PathBuf {
        self.images_root.join(dataset)
    }

    /// Materialized image of one row.
    pub fn image_path(images_dir: &Path, index: i64) -> PathBuf {
        images_dir.join(format!("{}.png", index))
    }

    /// Directory owning every artifact of one `(model, dataset, debug)` run.
    pub fn run_dir(&self, model: &str, dataset: &str, debug: bool) -> PathBuf {
        let leaf = if debug {
            format!("{}{}", dataset, DEBUG_SUFFIX)
        } else {
            dataset.to_string()
        };
        self.output_root.join(model).join(leaf)
    }

    /// Predictions artifact; its existence memoizes the inference phase.
    pub fn predictions_path(&self, model: &str, dataset: &str, debug: bool) -> PathBuf {
        self.run_dir(model, dataset, debug)
            .join(format!("{}_{}.csv", model, dataset))
    }

    pub fn summary_path(run_dir: &Path, base_name: &str) -> PathBuf {
        run_dir.join(format!("{}_summary.json", base_name))
    }

    pub fn evaluated_path(run_dir: &Path, base_name: &str) -> PathBuf {
        run_dir.join(format!("{}_evaluated.csv", base_name))
    }
}

/// File name of `path` without its final extension.
pub fn artifact_base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
