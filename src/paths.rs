use std::path::{Path, PathBuf};

/// Default file locations for an OpenClaw installation.
/// Pure data structure with no I/O.
#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    /// Session list written by the OpenClaw gateway, read when the CLI is unavailable
    /// Example: ~/.openclaw/agents/main/sessions/sessions.json
    pub sessions_file: PathBuf,

    /// Directory holding per-session transcript files (*.jsonl)
    /// Example: ~/.openclaw/agents/main/sessions/
    pub sessions_dir: PathBuf,

    /// Agent registry JSON
    /// Example: ~/openclaw/shared_assets/tasks/agent_registry.json
    pub registry: PathBuf,

    /// Report consumed by the dashboard
    /// Example: ~/openclaw/agent_progress_data.json
    pub output: PathBuf,

    /// Workspace scanned by the activity analysis
    /// Example: ~/openclaw
    pub workspace: PathBuf,

    /// Activity analysis output
    /// Example: ~/openclaw/real_progress.json
    pub activity_output: PathBuf,
}

impl Paths {
    /// Resolves all paths relative to the given home directory.
    ///
    /// Pure function: only performs path concatenation.
    /// Does NOT create directories or verify file existence.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use agent_progress::paths::Paths;
    ///
    /// let paths = Paths::resolve(Path::new("/home/jim"));
    ///
    /// assert_eq!(
    ///     paths.registry,
    ///     Path::new("/home/jim/openclaw/shared_assets/tasks/agent_registry.json")
    /// );
    /// ```
    pub fn resolve(home: &Path) -> Self {
        let sessions_dir = home
            .join(".openclaw")
            .join("agents")
            .join("main")
            .join("sessions");
        let workspace = home.join("openclaw");

        Self {
            sessions_file: sessions_dir.join("sessions.json"),
            sessions_dir,
            registry: workspace
                .join("shared_assets")
                .join("tasks")
                .join("agent_registry.json"),
            output: workspace.join("agent_progress_data.json"),
            activity_output: workspace.join("real_progress.json"),
            workspace,
        }
    }

    /// Resolves against `$HOME`, defaulting to `/tmp` when unset.
    pub fn from_env() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        Self::resolve(Path::new(&home))
    }
}
