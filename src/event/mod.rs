use std::path::PathBuf;

use crate::error::WatcherError;

/// Triggers delivered to the watch loop.
#[derive(Debug)]
pub enum RefreshEvent {
    /// Periodic refresh interval elapsed
    Tick,

    /// A watched input file was created, modified or replaced
    InputChanged(PathBuf),

    /// Watcher backend reported an error (non-fatal)
    Error(WatcherError),
}
