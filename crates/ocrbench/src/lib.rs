//! ocrbench - resumable OCR benchmarking over labeled TSV datasets
//!
//! Datasets are tab-separated files whose `image` column holds base64 image
//! payloads and whose `answer` column holds the ground truth. A benchmark run:
//!
//! 1. materializes the images into `<images_root>/<dataset>/<index>.png`
//!    (once per dataset, memoized by directory existence)
//! 2. runs an [`OcrEngine`] over every row and writes a predictions CSV
//!    (once per `(model, dataset, debug)`, memoized by file existence)
//! 3. scores the predictions with case- and whitespace-insensitive exact
//!    match and writes a JSON summary and an evaluated CSV (every time)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ocrbench::{BenchConfig, run_benchmark};
//!
//! # async fn example() -> ocrbench::Result<()> {
//! let config = BenchConfig::discover()?.unwrap_or_default();
//! let report = run_benchmark(&config, "cyrillic_handwriting", "EasyOCR", false).await?;
//! println!("accuracy: {}", report.summary.ratio);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod layout;
pub mod materialize;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod runner;
pub mod scorer;

pub use config::{BenchConfig, EngineSpec};
pub use dataset::{Dataset, DatasetRecord};
pub use engine::{EngineRegistry, OcrEngine, SubprocessEngine};
pub use error::{OcrBenchError, Result};
pub use layout::ArtifactLayout;
pub use materialize::{MaterializeReport, ensure_materialized, materialize};
pub use normalize::normalize;
pub use pipeline::{BenchmarkReport, run_benchmark, run_with_engine};
pub use runner::{DEBUG_ROW_LIMIT, InferenceOutcome, InferenceRunner, PredictionRecord};
pub use scorer::{EvaluatedRecord, Evaluation, EvaluationSummary, Scorer};
