//! Benchmark configuration.
//!
//! Root directories and the dataset/model registries are explicit
//! configuration, loaded from `ocrbench.toml`:
//!
//! ```toml
//! images_root = "data/images"
//! output_root = "results"
//!
//! [datasets]
//! cyrillic_handwriting = "data/cyrillic_handwriting.tsv"
//!
//! [models.EasyOCR]
//! backend = "subprocess"
//! command = "python3"
//! args = ["scripts/easyocr_recognize.py", "--lang", "ru", "{image}"]
//!
//! [models.Tesseract]
//! backend = "tesseract"
//! language = "rus"
//! ```

use crate::engine::EngineRegistry;
use crate::layout::ArtifactLayout;
use crate::{OcrBenchError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`BenchConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "ocrbench.toml";

/// How to construct the OCR engine for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum EngineSpec {
    /// Any recognizer runnable as `command args... <image>`, printing text on stdout.
    Subprocess {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: IndexMap<String, String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// The `tesseract` CLI.
    Tesseract {
        #[serde(default = "default_language")]
        language: String,
        #[serde(default)]
        psm: Option<u8>,
        #[serde(default = "default_tesseract_binary")]
        binary: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl EngineSpec {
    fn timeout_secs(&self) -> u64 {
        match self {
            EngineSpec::Subprocess { timeout_secs, .. } | EngineSpec::Tesseract { timeout_secs, .. } => *timeout_secs,
        }
    }

    fn command(&self) -> &str {
        match self {
            EngineSpec::Subprocess { command, .. } => command,
            EngineSpec::Tesseract { binary, .. } => binary,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Root of the materialized image cache
    #[serde(default = "default_images_root")]
    pub images_root: PathBuf,

    /// Root of all run artifacts
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Dataset name to TSV path
    #[serde(default)]
    pub datasets: IndexMap<String, PathBuf>,

    /// Model name to engine
    #[serde(default)]
    pub models: IndexMap<String, EngineSpec>,
}

fn default_images_root() -> PathBuf {
    PathBuf::from("data/images")
}
fn default_output_root() -> PathBuf {
    PathBuf::from("results")
}
fn default_timeout_secs() -> u64 {
    300
}
fn default_language() -> String {
    "eng".to_string()
}
fn default_tesseract_binary() -> String {
    "tesseract".to_string()
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            images_root: default_images_root(),
            output_root: default_output_root(),
            datasets: IndexMap::new(),
            models: IndexMap::new(),
        }
    }
}

impl BenchConfig {
    /// Load configuration from a TOML file.
    ///
    /// Relative paths inside the file are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns `OcrBenchError::Config` if the file is unreadable or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            OcrBenchError::config_with_source(format!("Failed to read config file {}", path.display()), e)
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| OcrBenchError::config_with_source(format!("Invalid TOML in {}", path.display()), e))?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve_relative_to(base_dir))
    }

    /// Discover `ocrbench.toml` in the current directory or its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir()?;
        Self::discover_from(&current)
    }

    /// Same as [`BenchConfig::discover`], starting from `start`.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!("Using configuration {}", candidate.display());
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
        }

        Ok(None)
    }

    fn resolve_relative_to(mut self, base_dir: &Path) -> Self {
        let resolve = |p: &Path| -> PathBuf {
            if p.is_absolute() || base_dir.as_os_str().is_empty() {
                p.to_path_buf()
            } else {
                base_dir.join(p)
            }
        };

        self.images_root = resolve(&self.images_root);
        self.output_root = resolve(&self.output_root);
        for path in self.datasets.values_mut() {
            *path = resolve(path);
        }
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `OcrBenchError::Config` if any configuration value is invalid
    pub fn validate(&self) -> Result<()> {
        if self.images_root.as_os_str().is_empty() {
            return Err(OcrBenchError::config("images_root cannot be empty"));
        }

        if self.output_root.as_os_str().is_empty() {
            return Err(OcrBenchError::config("output_root cannot be empty"));
        }

        for (name, spec) in &self.models {
            if spec.command().trim().is_empty() {
                return Err(OcrBenchError::config(format!("models.{}: command cannot be empty", name)));
            }
            if spec.timeout_secs() == 0 {
                return Err(OcrBenchError::config(format!("models.{}: timeout_secs must be > 0", name)));
            }
        }

        Ok(())
    }

    pub fn layout(&self) -> ArtifactLayout {
        ArtifactLayout::new(&self.images_root, &self.output_root)
    }

    /// TSV path of the dataset registered as `name`.
    pub fn dataset_path(&self, name: &str) -> Result<&Path> {
        self.datasets
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| OcrBenchError::UnknownDataset {
                name: name.to_string(),
                known: self.datasets.keys().cloned().collect::<Vec<_>>().join(", "),
            })
    }

    /// One engine per configured model.
    pub fn engine_registry(&self) -> Result<EngineRegistry> {
        EngineRegistry::from_specs(&self.models)
    }
}
