use super::{parsers, RegistrySource};
use crate::error::SourceError;
use crate::model::Registry;
use std::path::{Path, PathBuf};

/// Agent registry stored as `{ "agents": [...] }` JSON.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    path: PathBuf,
}

impl FileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistrySource for FileRegistry {
    fn fetch_registry(&self) -> Result<Registry, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        parsers::parse_registry(&content).map_err(|error| SourceError::Parse {
            origin: self.path.display().to_string(),
            error,
        })
    }

    fn tag(&self) -> &str {
        "agent_registry"
    }
}
