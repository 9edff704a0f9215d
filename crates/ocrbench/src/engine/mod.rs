//! OCR engine capability and registry.
//!
//! The benchmark core only ever sees [`OcrEngine`]: one image path in, one
//! string out. Concrete backends are chosen by configuration
//! ([`crate::config::EngineSpec`]) rather than by subclassing.

pub mod subprocess;

pub use subprocess::SubprocessEngine;

use crate::config::EngineSpec;
use crate::{OcrBenchError, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// An OCR backend.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use ocrbench::engine::OcrEngine;
/// use ocrbench::Result;
/// use std::path::Path;
///
/// struct Constant;
///
/// #[async_trait]
/// impl OcrEngine for Constant {
///     fn name(&self) -> &str {
///         "constant"
///     }
///
///     async fn recognize(&self, _image_path: &Path) -> Result<String> {
///         Ok("hello".to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Model name, used as the artifact namespace.
    fn name(&self) -> &str;

    /// Recognize the text in a single image file.
    ///
    /// # Errors
    ///
    /// Returns `OcrBenchError::Engine` when the backend fails on this image.
    async fn recognize(&self, image_path: &Path) -> Result<String>;

    /// Called once before the first recognition of a run.
    async fn setup(&self) -> Result<()> {
        Ok(())
    }

    /// Called once after the last recognition of a run.
    async fn teardown(&self) -> Result<()> {
        Ok(())
    }
}

/// Build an engine named `name` from its configuration.
pub fn build_engine(name: &str, spec: &EngineSpec) -> Arc<dyn OcrEngine> {
    match spec {
        EngineSpec::Subprocess {
            command,
            args,
            env,
            timeout_secs,
        } => Arc::new(SubprocessEngine::new(
            name,
            command.clone(),
            args.clone(),
            env.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Duration::from_secs(*timeout_secs),
        )),
        EngineSpec::Tesseract {
            language,
            psm,
            binary,
            timeout_secs,
        } => Arc::new(SubprocessEngine::tesseract(
            name,
            binary.clone(),
            language,
            *psm,
            Duration::from_secs(*timeout_secs),
        )),
    }
}

fn validate_engine_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(OcrBenchError::config("Engine name cannot be empty"));
    }

    if name.contains(char::is_whitespace) {
        return Err(OcrBenchError::config(format!(
            "Engine name '{}' cannot contain whitespace",
            name
        )));
    }

    Ok(())
}

/// Name-keyed registry of OCR engines, in registration order.
#[derive(Default)]
pub struct EngineRegistry {
    engines: IndexMap<String, Arc<dyn OcrEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding one engine per configured model.
    pub fn from_specs<'a>(specs: impl IntoIterator<Item = (&'a String, &'a EngineSpec)>) -> Result<Self> {
        let mut registry = Self::new();
        for (name, spec) in specs {
            registry.register(build_engine(name, spec))?;
        }
        Ok(registry)
    }

    /// Register an engine under its own name.
    ///
    /// # Errors
    ///
    /// `OcrBenchError::Config` if the name is invalid or already taken.
    pub fn register(&mut self, engine: Arc<dyn OcrEngine>) -> Result<()> {
        let name = engine.name().to_string();
        validate_engine_name(&name)?;

        if self.engines.contains_key(&name) {
            return Err(OcrBenchError::config(format!("Engine '{}' is already registered", name)));
        }

        self.engines.insert(name, engine);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn OcrEngine>> {
        self.engines.get(name).cloned()
    }

    /// Look up `name`, failing with the list of known engines.
    pub fn require(&self, name: &str) -> Result<Arc<dyn OcrEngine>> {
        self.get(name).ok_or_else(|| OcrBenchError::UnknownModel {
            name: name.to_string(),
            known: self.names().join(", "),
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.engines.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
