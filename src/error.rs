//! Error types for agent-progress
//!
//! Domain-specific error enums using thiserror. Sources and sinks report
//! failures through these; the aggregator decides which ones degrade and
//! which ones reach the caller.

#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("JSON parse: {0}")]
    Json(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

/// A session or registry source could not deliver data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("I/O {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}")]
    Exit { command: String, status: String },
    #[error("`{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },
    #[error("parse {origin}: {error}")]
    Parse { origin: String, error: ParseError },
    #[error("{0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    #[error("notify: {0}")]
    Notify(String),
    #[error("I/O: {0}")]
    Io(String),
}

impl From<notify::Error> for WatcherError {
    fn from(e: notify::Error) -> Self {
        WatcherError::Notify(e.to_string())
    }
}

impl From<std::io::Error> for WatcherError {
    fn from(e: std::io::Error) -> Self {
        WatcherError::Io(e.to_string())
    }
}
