mod parsers;
mod registry;
mod sessions;

pub use parsers::*;
pub use registry::FileRegistry;
pub use sessions::{run_with_timeout, CommandSessionSource, FileSessionSource};

use crate::error::SourceError;
use crate::model::{Registry, SessionRecord};

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Supplier of live session records.
pub trait SessionSource {
    fn fetch_sessions(&self) -> SourceResult<Vec<SessionRecord>>;

    /// Provenance tag recorded in the report.
    fn tag(&self) -> &str;
}

/// Supplier of the static agent registry.
pub trait RegistrySource {
    fn fetch_registry(&self) -> SourceResult<Registry>;

    fn tag(&self) -> &str;
}

/// Fixed session list, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSessions(pub Vec<SessionRecord>);

impl SessionSource for StaticSessions {
    fn fetch_sessions(&self) -> SourceResult<Vec<SessionRecord>> {
        Ok(self.0.clone())
    }

    fn tag(&self) -> &str {
        "static_sessions"
    }
}

/// Fixed registry, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry(pub Registry);

impl RegistrySource for StaticRegistry {
    fn fetch_registry(&self) -> SourceResult<Registry> {
        Ok(self.0.clone())
    }

    fn tag(&self) -> &str {
        "static_registry"
    }
}
