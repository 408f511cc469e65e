use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::SinkError;
use crate::model::Report;

// ============================================================================
// FUNCTIONAL CORE: Pure serialization
// ============================================================================

/// Serialize any report document to pretty JSON.
/// Pure function: no side effects, deterministic.
pub fn serialize_json<T: Serialize>(value: &T) -> Result<String, SinkError> {
    Ok(serde_json::to_string_pretty(value)?)
}

// ============================================================================
// IMPERATIVE SHELL: File output
// ============================================================================

/// Destination for a finished report.
pub trait Sink {
    fn write(&self, report: &Report) -> Result<(), SinkError>;

    /// Human-readable destination, for logs.
    fn describe(&self) -> String;
}

/// Writes the report as pretty JSON to a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for JsonFileSink {
    fn write(&self, report: &Report) -> Result<(), SinkError> {
        write_json(&self.path, report).map(|_| ())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Save a document to disk as pretty JSON.
/// I/O operation: writes file, creates parent directories if needed.
///
/// # Returns
/// * `Ok(PathBuf)` - Path to saved file
/// * `Err(SinkError)` - I/O or serialization error
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf, SinkError> {
    let content = serialize_json(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SinkError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }

    fs::write(path, content).map_err(|source| SinkError::Write {
        path: path.display().to_string(),
        source,
    })?;

    Ok(path.to_path_buf())
}
