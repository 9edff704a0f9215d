//! Subprocess-backed OCR engine.
//!
//! Runs an external recognizer once per image and reads the recognized text
//! from stdout. This covers Python-based engines (EasyOCR, PaddleOCR) behind a
//! small wrapper script as well as native CLIs such as `tesseract`.

use super::OcrEngine;
use crate::{OcrBenchError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Placeholder replaced by the image path inside engine arguments.
pub const IMAGE_PLACEHOLDER: &str = "{image}";

/// OCR engine that shells out per image.
///
/// If no argument contains [`IMAGE_PLACEHOLDER`], the image path is appended
/// as the last argument.
#[derive(Debug, Clone)]
pub struct SubprocessEngine {
    name: String,
    command: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    timeout: Duration,
}

impl SubprocessEngine {
    /// Create a new subprocess engine
    ///
    /// # Arguments
    /// * `name` - Model name used in logs and errors (e.g., "EasyOCR")
    /// * `command` - Executable (e.g., "python3", "tesseract")
    /// * `args` - Arguments, optionally containing `{image}`
    /// * `env` - Extra environment variables
    /// * `timeout` - Upper bound for a single recognition
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        args: Vec<String>,
        env: Vec<(String, String)>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
            env,
            timeout,
        }
    }

    /// Engine running `tesseract <image> stdout -l <language> [--psm <psm>]`.
    pub fn tesseract(
        name: impl Into<String>,
        binary: impl Into<String>,
        language: &str,
        psm: Option<u8>,
        timeout: Duration,
    ) -> Self {
        let mut args = vec![
            IMAGE_PLACEHOLDER.to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            language.to_string(),
        ];
        if let Some(psm) = psm {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        Self::new(name, binary, args, Vec::new(), timeout)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arguments with the image path substituted in.
    pub fn build_args(&self, image_path: &Path) -> Vec<String> {
        let image = image_path.to_string_lossy();
        let mut substituted = false;

        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains(IMAGE_PLACEHOLDER) {
                    substituted = true;
                    arg.replace(IMAGE_PLACEHOLDER, &image)
                } else {
                    arg.clone()
                }
            })
            .collect();

        if !substituted {
            args.push(image.into_owned());
        }

        args
    }
}

/// Join the non-empty lines of engine stdout with single spaces.
fn parse_output(stdout: &str) -> String {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl OcrEngine for SubprocessEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn recognize(&self, image_path: &Path) -> Result<String> {
        let mut cmd = Command::new(&self.command);
        cmd.args(self.build_args(image_path));

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            OcrBenchError::engine(&self.name, image_path, format!("Failed to spawn '{}': {}", self.command, e))
        })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(OcrBenchError::engine(
                    &self.name,
                    image_path,
                    format!("Failed to wait for subprocess: {}", e),
                ));
            }
            Err(_) => {
                return Err(OcrBenchError::engine(
                    &self.name,
                    image_path,
                    format!("Subprocess exceeded {:?}", self.timeout),
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrBenchError::engine(
                &self.name,
                image_path,
                format!(
                    "Subprocess failed with exit code {:?}\nstderr: {}",
                    output.status.code(),
                    stderr.trim()
                ),
            ));
        }

        Ok(parse_output(&String::from_utf8_lossy(&output.stdout)))
    }
}
