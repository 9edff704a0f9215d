//! End-to-end benchmark: inference followed by scoring.

use crate::config::BenchConfig;
use crate::engine::OcrEngine;
use crate::runner::InferenceRunner;
use crate::scorer::{EvaluationSummary, Scorer};
use crate::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything a benchmark run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub model: String,
    pub dataset: String,
    pub debug: bool,
    /// Whether inference was skipped because predictions already existed.
    pub cached: bool,
    pub predictions_path: PathBuf,
    pub summary_path: PathBuf,
    pub evaluated_path: PathBuf,
    pub summary: EvaluationSummary,
}

/// Run `engine` over the TSV at `dataset_path` and score the predictions.
pub async fn run_with_engine(
    config: &BenchConfig,
    dataset_path: &Path,
    engine: &dyn OcrEngine,
    debug: bool,
) -> Result<BenchmarkReport> {
    let layout = config.layout();

    let outcome = InferenceRunner::new(layout.clone())
        .run(dataset_path, engine, debug)
        .await?;

    let evaluation = Scorer::new(layout).evaluate(
        &outcome.predictions_path,
        &outcome.dataset_name,
        Some(engine.name()),
        debug,
    )?;

    Ok(BenchmarkReport {
        model: engine.name().to_string(),
        dataset: outcome.dataset_name,
        debug,
        cached: outcome.cached,
        predictions_path: outcome.predictions_path,
        summary_path: evaluation.summary_path,
        evaluated_path: evaluation.evaluated_path,
        summary: evaluation.summary,
    })
}

/// Resolve `dataset` and `model` through `config`, then run the benchmark.
///
/// # Errors
///
/// - `OcrBenchError::UnknownDataset` / `OcrBenchError::UnknownModel` for unregistered names
/// - any error of inference or scoring
pub async fn run_benchmark(config: &BenchConfig, dataset: &str, model: &str, debug: bool) -> Result<BenchmarkReport> {
    config.validate()?;

    let dataset_path = config.dataset_path(dataset)?;
    let engine = config.engine_registry()?.require(model)?;

    let debug_mode = debug;
    tracing::info!(dataset, model, debug_mode, "Running benchmark");
    run_with_engine(config, dataset_path, engine.as_ref(), debug).await
}
