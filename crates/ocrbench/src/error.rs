//! Error types for ocrbench.
//!
//! All fallible operations return [`OcrBenchError`]. The variants split into two
//! groups:
//!
//! **Fatal to the call that raised them:**
//! - `Io` - file system errors, always bubbled up unchanged
//! - `Schema` - a predictions artifact lacks a required column
//! - `Precondition` - evaluation requested without a model identity
//! - `Engine` - an OCR engine failed on an image (aborts the run)
//! - `Config`, `UnknownDataset`, `UnknownModel` - invalid or incomplete configuration
//!
//! **Row-level, reported but never returned from a run:**
//! - `Decode` - a malformed base64 image payload; the row is skipped
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `OcrBenchError`.
pub type Result<T> = std::result::Result<T, OcrBenchError>;

/// Main error type for all ocrbench operations.
#[derive(Debug, Error)]
pub enum OcrBenchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image for index {index}: {message}")]
    Decode { index: i64, message: String },

    #[error("Schema error in {}: missing required column '{missing}'", path.display())]
    Schema { path: PathBuf, missing: String },

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Engine '{engine}' failed on {}: {message}", image.display())]
    Engine {
        engine: String,
        image: PathBuf,
        message: String,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Dataset error: {message}")]
    Dataset {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unknown dataset '{name}' (known: {known})")]
    UnknownDataset { name: String, known: String },

    #[error("Unknown model '{name}' (known: {known})")]
    UnknownModel { name: String, known: String },
}

impl From<serde_json::Error> for OcrBenchError {
    fn from(err: serde_json::Error) -> Self {
        OcrBenchError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<csv::Error> for OcrBenchError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => return OcrBenchError::Io(io),
                other => {
                    return OcrBenchError::Serialization {
                        message: format!("{:?}", other),
                        source: None,
                    };
                }
            }
        }

        OcrBenchError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl OcrBenchError {
    error_constructor!(config, Config);
    error_constructor!(dataset, Dataset);
    error_constructor!(serialization, Serialization);

    /// Create an Engine error for a single recognition call.
    pub fn engine<E: Into<String>, M: Into<String>>(engine: E, image: impl Into<PathBuf>, message: M) -> Self {
        Self::Engine {
            engine: engine.into(),
            image: image.into(),
            message: message.into(),
        }
    }
}
