//! Integration tests for the benchmark pipeline.
//!
//! These exercise dataset loading, image materialization, memoized inference
//! and scoring together against a temporary directory tree.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use ocrbench::{
    BenchConfig, EngineSpec, InferenceRunner, OcrBenchError, OcrEngine, Result, Scorer, run_benchmark,
    run_with_engine,
};
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

fn png_base64() -> String {
    let img = image::RgbImage::from_pixel(8, 4, image::Rgb([255, 255, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("PNG encoding should succeed");
    STANDARD.encode(bytes)
}

/// Returns a fixed text per image stem and counts its calls.
struct LookupEngine {
    name: String,
    answers: HashMap<String, String>,
    calls: AtomicUsize,
}

impl LookupEngine {
    fn new(name: &str, answers: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            answers: answers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for LookupEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn recognize(&self, image_path: &Path) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stem = image_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.answers.get(&stem).cloned().unwrap_or_default())
    }
}

fn config_for(dir: &Path) -> BenchConfig {
    BenchConfig {
        images_root: dir.join("images"),
        output_root: dir.join("results"),
        ..Default::default()
    }
}

fn write_tsv(dir: &Path, name: &str, rows: &[(i64, &str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let mut tsv = String::from("index\timage\tanswer\n");
    for (index, image, answer) in rows {
        tsv.push_str(&format!("{}\t{}\t{}\n", index, image, answer));
    }
    fs::write(&path, tsv).unwrap();
    path
}

#[tokio::test]
async fn test_cat_dog_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let png = png_base64();
    let dataset_path = write_tsv(temp_dir.path(), "animals.tsv", &[(0, png.as_str(), "Cat"), (1, "", "Dog")]);
    let engine = LookupEngine::new("mock", &[("0", "cat")]);

    let report = run_with_engine(&config_for(temp_dir.path()), &dataset_path, &engine, false)
        .await
        .unwrap();

    assert_eq!(engine.calls(), 1);
    assert_eq!(report.summary.total, 1);
    assert_eq!(report.summary.correct, 1);
    assert_eq!(report.summary.ratio, 1.0);

    let images_dir = temp_dir.path().join("images/animals");
    assert!(images_dir.join("0.png").exists());
    assert!(!images_dir.join("1.png").exists());
    assert!(image::open(images_dir.join("0.png")).is_ok());

    let predictions = fs::read_to_string(&report.predictions_path).unwrap();
    assert_eq!(predictions, "index,answer,prediction\n0,Cat,cat\n");
}

#[tokio::test]
async fn test_rerun_is_idempotent_but_rescored() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(temp_dir.path());
    let png = png_base64();
    let dataset_path = write_tsv(
        temp_dir.path(),
        "words.tsv",
        &[(10, png.as_str(), "PARIS"), (11, png.as_str(), "Berlin"), (12, png.as_str(), "Rome")],
    );

    let first_engine = LookupEngine::new("mock", &[("10", "  paris\n"), ("11", "Bern"), ("12", "rome")]);
    let first = run_with_engine(&config, &dataset_path, &first_engine, false).await.unwrap();
    let first_bytes = fs::read(&first.predictions_path).unwrap();

    assert!(!first.cached);
    assert_eq!(first.summary.correct, 2);
    assert_eq!(first.summary.ratio, 0.6667);

    fs::remove_file(&first.summary_path).unwrap();

    let second_engine = LookupEngine::new("mock", &[]);
    let second = run_with_engine(&config, &dataset_path, &second_engine, false).await.unwrap();

    assert!(second.cached);
    assert_eq!(second_engine.calls(), 0);
    assert_eq!(fs::read(&second.predictions_path).unwrap(), first_bytes);
    assert!(second.summary_path.exists());
    assert_eq!(second.summary, first.summary);
}

#[tokio::test]
async fn test_debug_bound_on_large_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let png = png_base64();
    let rows: Vec<(i64, &str, &str)> = (0..100).map(|i| (i, png.as_str(), "x")).collect();
    let dataset_path = write_tsv(temp_dir.path(), "big.tsv", &rows);
    let engine = LookupEngine::new("mock", &[]);

    let report = run_with_engine(&config_for(temp_dir.path()), &dataset_path, &engine, true)
        .await
        .unwrap();

    assert_eq!(engine.calls(), 6);
    assert_eq!(report.summary.total, 6);
    assert_eq!(report.summary.correct, 0);
    assert_eq!(
        report.predictions_path,
        temp_dir.path().join("results/mock/big_debug/mock_big.csv")
    );
    assert_eq!(
        report.summary_path,
        temp_dir.path().join("results/mock/big_debug/mock_big_summary.json")
    );
    // the image cache is shared between modes and holds every row
    assert_eq!(fs::read_dir(temp_dir.path().join("images/big")).unwrap().count(), 100);
}

#[tokio::test]
async fn test_corrupt_payload_does_not_abort_run() {
    let temp_dir = TempDir::new().unwrap();
    let png = png_base64();
    let dataset_path = write_tsv(
        temp_dir.path(),
        "noisy.tsv",
        &[(0, "%%%corrupt%%%", "a"), (1, png.as_str(), "b")],
    );
    let engine = LookupEngine::new("mock", &[("1", "B")]);

    let report = run_with_engine(&config_for(temp_dir.path()), &dataset_path, &engine, false)
        .await
        .unwrap();

    assert_eq!(engine.calls(), 1);
    assert_eq!(report.summary.total, 1);
    assert_eq!(report.summary.ratio, 1.0);
}

#[tokio::test]
async fn test_empty_dataset_scores_zero() {
    let temp_dir = TempDir::new().unwrap();
    let dataset_path = write_tsv(temp_dir.path(), "empty.tsv", &[]);
    let engine = LookupEngine::new("mock", &[]);

    let report = run_with_engine(&config_for(temp_dir.path()), &dataset_path, &engine, false)
        .await
        .unwrap();

    assert_eq!(report.summary.total, 0);
    assert_eq!(report.summary.ratio, 0.0);
}

#[tokio::test]
async fn test_run_benchmark_unknown_names() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = config_for(temp_dir.path());
    config
        .datasets
        .insert("animals".to_string(), temp_dir.path().join("animals.tsv"));
    config.models.insert(
        "Tesseract".to_string(),
        EngineSpec::Tesseract {
            language: "eng".to_string(),
            psm: None,
            binary: "tesseract".to_string(),
            timeout_secs: 5,
        },
    );

    let err = run_benchmark(&config, "plants", "Tesseract", false).await.unwrap_err();
    assert!(matches!(err, OcrBenchError::UnknownDataset { .. }));

    let err = run_benchmark(&config, "animals", "Paddle", false).await.unwrap_err();
    assert!(matches!(err, OcrBenchError::UnknownModel { .. }));
}

#[tokio::test]
async fn test_run_benchmark_in_debug_mode() {
    let temp_dir = TempDir::new().unwrap();
    let dataset_path = write_tsv(temp_dir.path(), "blank.tsv", &[(0, "", "a"), (1, "", "b")]);

    let mut config = config_for(temp_dir.path());
    config.datasets.insert("blank".to_string(), dataset_path);
    config.models.insert(
        "Tesseract".to_string(),
        EngineSpec::Tesseract {
            language: "eng".to_string(),
            psm: None,
            binary: "tesseract".to_string(),
            timeout_secs: 5,
        },
    );

    // no row has an image, so the engine binary is never spawned
    let report = run_benchmark(&config, "blank", "Tesseract", true).await.unwrap();

    assert!(report.debug);
    assert_eq!(report.summary.total, 0);
    assert_eq!(
        report.predictions_path,
        temp_dir.path().join("results/Tesseract/blank_debug/Tesseract_blank.csv")
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_benchmark_with_subprocess_engine() {
    let temp_dir = TempDir::new().unwrap();
    let png = png_base64();
    let dataset_path = write_tsv(temp_dir.path(), "shell.tsv", &[(0, png.as_str(), "Hello World"), (1, png.as_str(), "nope")]);

    let mut config = config_for(temp_dir.path());
    config.datasets.insert("shell".to_string(), dataset_path);
    config.models.insert(
        "echo".to_string(),
        EngineSpec::Subprocess {
            command: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "printf 'hello\\nWORLD\\n'".to_string(),
                "--".to_string(),
                "{image}".to_string(),
            ],
            env: Default::default(),
            timeout_secs: 10,
        },
    );

    let report = run_benchmark(&config, "shell", "echo", false).await.unwrap();

    assert_eq!(report.model, "echo");
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.correct, 1);
    assert_eq!(report.summary.ratio, 0.5);
}

#[tokio::test]
async fn test_scorer_on_runner_output_with_separate_layouts() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(temp_dir.path());
    let png = png_base64();
    let dataset_path = write_tsv(temp_dir.path(), "split.tsv", &[(0, png.as_str(), "x")]);
    let engine = LookupEngine::new("mock", &[("0", "X")]);

    let outcome = InferenceRunner::new(config.layout())
        .run(&dataset_path, &engine, false)
        .await
        .unwrap();
    let evaluation = Scorer::new(config.layout())
        .evaluate(&outcome.predictions_path, &outcome.dataset_name, Some("mock"), false)
        .unwrap();

    assert_eq!(evaluation.summary.ratio, 1.0);
    assert_eq!(
        evaluation.evaluated_path,
        temp_dir.path().join("results/mock/split/mock_split_evaluated.csv")
    );
}
