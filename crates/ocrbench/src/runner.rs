//! Resumable inference.
//!
//! For one `(model, dataset, debug)` key the runner produces a predictions
//! artifact exactly once. If the artifact is already on disk the whole phase
//! is skipped and the engine is never called.
//!
//! Policy for rows that cannot be processed:
//! - a row whose image was never materialized (blank or undecodable payload)
//!   is skipped with a warning and produces no prediction
//! - an engine failure aborts the run; no artifact is written, so the next
//!   invocation starts over

use crate::dataset::Dataset;
use crate::engine::OcrEngine;
use crate::layout::ArtifactLayout;
use crate::materialize::ensure_materialized;
use crate::output::write_csv;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Rows inspected in debug mode, counted in iteration order.
pub const DEBUG_ROW_LIMIT: usize = 6;

/// Column order of the predictions artifact.
pub const PREDICTION_COLUMNS: [&str; 3] = ["index", "answer", "prediction"];

/// One processed dataset row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub index: i64,
    pub answer: String,
    pub prediction: String,
}

/// What a call to [`InferenceRunner::run`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceOutcome {
    pub predictions_path: PathBuf,
    pub dataset_name: String,
    /// `true` when an existing artifact was reused.
    pub cached: bool,
    /// Engine invocations made by this call.
    pub processed: usize,
    /// Rows skipped because no image was materialized for them.
    pub skipped: usize,
}

/// Drives one engine over one dataset.
pub struct InferenceRunner {
    layout: ArtifactLayout,
}

impl InferenceRunner {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Produce (or reuse) the predictions artifact for `dataset_path`.
    ///
    /// The engine's name is the model name of the run.
    ///
    /// # Errors
    ///
    /// - `OcrBenchError::Io` / `OcrBenchError::Dataset` if the dataset cannot be loaded
    /// - `OcrBenchError::Engine` if the engine fails on any processed row
    pub async fn run(&self, dataset_path: &Path, engine: &dyn OcrEngine, debug: bool) -> Result<InferenceOutcome> {
        let model = engine.name().to_string();
        let dataset_name = crate::dataset::dataset_name_from_path(dataset_path);
        let predictions_path = self.layout.predictions_path(&model, &dataset_name, debug);

        if predictions_path.exists() {
            tracing::info!(
                model = %model,
                dataset = %dataset_name,
                "The results of model {} on dataset {} are already done: {}",
                model,
                dataset_name,
                predictions_path.display()
            );
            return Ok(InferenceOutcome {
                predictions_path,
                dataset_name,
                cached: true,
                processed: 0,
                skipped: 0,
            });
        }

        let dataset = Dataset::from_tsv(dataset_path)?;
        let images_dir = self.layout.images_dir(&dataset_name);
        ensure_materialized(&dataset, &images_dir)?;

        engine.setup().await?;
        let collected = self.predict(&dataset, &images_dir, engine, debug).await;
        engine.teardown().await?;
        let (records, skipped) = collected?;

        write_csv(&PREDICTION_COLUMNS, &records, &predictions_path)?;

        tracing::info!(
            model = %model,
            dataset = %dataset_name,
            rows = records.len(),
            skipped,
            "OCR results saved to {}",
            predictions_path.display()
        );

        Ok(InferenceOutcome {
            predictions_path,
            dataset_name,
            cached: false,
            processed: records.len(),
            skipped,
        })
    }

    async fn predict(
        &self,
        dataset: &Dataset,
        images_dir: &Path,
        engine: &dyn OcrEngine,
        debug: bool,
    ) -> Result<(Vec<PredictionRecord>, usize)> {
        let limit = if debug { DEBUG_ROW_LIMIT } else { usize::MAX };
        let total = dataset.len().min(limit);

        let mut records = Vec::with_capacity(total);
        let mut skipped = 0;

        for (position, row) in dataset.records().iter().take(limit).enumerate() {
            let image_path = ArtifactLayout::image_path(images_dir, row.index);

            if !image_path.is_file() {
                tracing::warn!(index = row.index, "No materialized image at {}, skipping row", image_path.display());
                skipped += 1;
                continue;
            }

            let prediction = engine.recognize(&image_path).await?;
            tracing::debug!(index = row.index, "Processed row {}/{}", position + 1, total);

            records.push(PredictionRecord {
                index: row.index,
                answer: row.answer.clone(),
                prediction,
            });
        }

        Ok((records, skipped))
    }
}
