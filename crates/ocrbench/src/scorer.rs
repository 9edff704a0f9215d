//! Exact-match scoring of a predictions artifact.
//!
//! Scoring is never memoized: every call rewrites the summary and evaluated
//! artifacts of its run directory.

use crate::layout::{ArtifactLayout, artifact_base_name};
use crate::normalize::is_match;
use crate::output::{write_csv_records, write_json};
use crate::{OcrBenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ANSWER_COLUMN: &str = "answer";
const PREDICTION_COLUMN: &str = "prediction";
const CORRECT_COLUMN: &str = "correct";

/// Aggregate accuracy of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub total: usize,
    pub correct: usize,
    /// `correct / total` rounded to 4 decimals (ties to even), `0.0` for an empty run.
    pub ratio: f64,
}

impl EvaluationSummary {
    pub fn new(total: usize, correct: usize) -> Self {
        let ratio = if total > 0 {
            ((correct as f64 / total as f64) * 10_000.0).round_ties_even() / 10_000.0
        } else {
            0.0
        };
        Self { total, correct, ratio }
    }
}

/// A prediction row with its correctness flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedRecord {
    /// `None` when the artifact has no parsable `index` column.
    pub index: Option<i64>,
    pub answer: String,
    pub prediction: String,
    pub correct: bool,
}

/// Result of [`Scorer::evaluate`].
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub summary: EvaluationSummary,
    pub records: Vec<EvaluatedRecord>,
    pub summary_path: PathBuf,
    pub evaluated_path: PathBuf,
}

fn column_position(headers: &csv::StringRecord, column: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| OcrBenchError::Schema {
            path: path.to_path_buf(),
            missing: column.to_string(),
        })
}

/// Scores predictions artifacts into a run directory.
pub struct Scorer {
    layout: ArtifactLayout,
}

impl Scorer {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    /// Score `predictions_path` and write `<base>_summary.json` and
    /// `<base>_evaluated.csv` into the run directory of
    /// `(model_name, dataset_name, debug)`.
    ///
    /// # Errors
    ///
    /// - `OcrBenchError::Precondition` if `model_name` is missing or empty
    /// - `OcrBenchError::Schema` if the artifact lacks `answer` or `prediction`
    /// - `OcrBenchError::Io` / `OcrBenchError::Serialization` on read or write failures
    pub fn evaluate(
        &self,
        predictions_path: &Path,
        dataset_name: &str,
        model_name: Option<&str>,
        debug: bool,
    ) -> Result<Evaluation> {
        let model_name = model_name
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| OcrBenchError::Precondition("model name must be set before evaluating results".to_string()))?;

        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(predictions_path)?;
        let mut headers = reader.headers()?.clone();

        let answer_at = column_position(&headers, ANSWER_COLUMN, predictions_path)?;
        let prediction_at = column_position(&headers, PREDICTION_COLUMN, predictions_path)?;
        let index_at = headers.iter().position(|h| h == "index");
        let existing_correct_at = headers.iter().position(|h| h == CORRECT_COLUMN);
        if existing_correct_at.is_none() {
            headers.push_field(CORRECT_COLUMN);
        }

        let mut rows = Vec::new();
        let mut records = Vec::new();

        for result in reader.records() {
            let row = result?;
            let answer = row.get(answer_at).unwrap_or_default();
            let prediction = row.get(prediction_at).unwrap_or_default();
            let correct = is_match(answer, prediction);

            records.push(EvaluatedRecord {
                index: index_at.and_then(|i| row.get(i)).and_then(|v| v.trim().parse().ok()),
                answer: answer.to_string(),
                prediction: prediction.to_string(),
                correct,
            });

            let flag = if correct { "true" } else { "false" };
            let out = match existing_correct_at {
                Some(at) => row
                    .iter()
                    .enumerate()
                    .map(|(i, v)| if i == at { flag } else { v })
                    .collect(),
                None => {
                    let mut out = row.clone();
                    out.push_field(flag);
                    out
                }
            };
            rows.push(out);
        }

        let summary = EvaluationSummary::new(records.len(), records.iter().filter(|r| r.correct).count());

        let run_dir = self.layout.run_dir(model_name, dataset_name, debug);
        let base_name = artifact_base_name(predictions_path);
        let summary_path = ArtifactLayout::summary_path(&run_dir, &base_name);
        let evaluated_path = ArtifactLayout::evaluated_path(&run_dir, &base_name);

        write_json(&summary, &summary_path)?;
        write_csv_records(&headers, &rows, &evaluated_path)?;

        tracing::info!(
            model = model_name,
            dataset = dataset_name,
            total = summary.total,
            correct = summary.correct,
            ratio = summary.ratio,
            "Evaluation results saved to {} and {}",
            summary_path.display(),
            evaluated_path.display()
        );

        Ok(Evaluation {
            summary,
            records,
            summary_path,
            evaluated_path,
        })
    }
}
