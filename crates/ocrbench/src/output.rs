//! Artifact writers.
//!
//! Every artifact is written to a temporary sibling file and renamed into
//! place, so an interrupted run never leaves a half-written file at the final
//! path. Parent directories are created as needed.

use crate::{OcrBenchError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    path.with_file_name(format!(".{}.tmp.{}.{}", file_name, pid, timestamp))
}

/// Write `bytes` to `path` via temp file + rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path);
    fs::write(&temp_path, bytes)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        OcrBenchError::Io(e)
    })?;

    Ok(())
}

/// Write `value` as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| OcrBenchError::serialization_with_source("Failed to serialize JSON artifact", e))?;

    write_atomic(output_path, json.as_bytes())
}

/// Write serializable rows as CSV under an explicit header.
///
/// The header is written even when `rows` is empty.
pub fn write_csv<T: Serialize>(headers: &[&str], rows: &[T], output_path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OcrBenchError::serialization(format!("Failed to flush CSV: {}", e)))?;

    write_atomic(output_path, &bytes)
}

/// Write raw string records as CSV under an explicit header.
pub fn write_csv_records(headers: &csv::StringRecord, rows: &[csv::StringRecord], output_path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OcrBenchError::serialization(format!("Failed to flush CSV: {}", e)))?;

    write_atomic(output_path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        index: i64,
        text: String,
    }

    #[test]
    fn test_write_json_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("subdir/nested/summary.json");

        write_json(&serde_json::json!({"total": 0}), &output_path).unwrap();

        assert!(output_path.exists());
        let contents = fs::read_to_string(&output_path).unwrap();
        assert!(contents.contains("\"total\": 0"));
    }

    #[test]
    fn test_write_csv_with_rows() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("rows.csv");

        let rows = vec![
            Row {
                index: 0,
                text: "hello, world".to_string(),
            },
            Row {
                index: 1,
                text: "line\nbreak".to_string(),
            },
        ];
        write_csv(&["index", "text"], &rows, &output_path).unwrap();

        let mut reader = csv::Reader::from_path(&output_path).unwrap();
        let parsed: Vec<Row> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_write_csv_empty_keeps_header() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("empty.csv");

        write_csv::<Row>(&["index", "text"], &[], &output_path).unwrap();

        assert_eq!(fs::read_to_string(&output_path).unwrap(), "index,text\n");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("artifact.csv");

        write_atomic(&output_path, b"a\n").unwrap();
        write_atomic(&output_path, b"b\n").unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().flatten().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(fs::read_to_string(&output_path).unwrap(), "b\n");
    }
}
