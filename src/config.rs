use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::engine::{
    Aggregator, Classifier, ClassifierRule, EngineOptions, FileQuality, QualityProvider,
    SimulatedQuality,
};
use crate::error::ConfigError;
use crate::paths::Paths;
use crate::sink::JsonFileSink;
use crate::sources::{
    CommandSessionSource, FileRegistry, FileSessionSource, RegistrySource, SessionSource,
};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "agent-progress.toml";

/// Top-level configuration, loaded from `agent-progress.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sessions: SessionsConfig,
    pub registry: RegistryConfig,
    pub output: OutputConfig,
    pub engine: EngineConfig,
    pub quality: QualityConfig,
    pub classifier: ClassifierConfig,
    pub watch: WatchConfig,
    pub activity: ActivityConfig,
}

/// Where sessions come from. A non-empty `command` is tried first and
/// `path` is read when it fails; an empty `command` means file only.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub command: Vec<String>,
    pub path: PathBuf,
    pub timeout_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "openclaw".to_string(),
                "sessions".to_string(),
                "--json".to_string(),
            ],
            path: Paths::from_env().sessions_file,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub path: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: Paths::from_env().registry,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: Paths::from_env().output,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub stale_after_hours: i64,
    pub derive_active_hours: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let defaults = EngineOptions::default();
        Self {
            stale_after_hours: defaults.stale_after_hours,
            derive_active_hours: defaults.derive_active_hours,
        }
    }
}

impl From<&EngineConfig> for EngineOptions {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            stale_after_hours: cfg.stale_after_hours,
            derive_active_hours: cfg.derive_active_hours,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityKind {
    #[default]
    Simulated,
    File,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub provider: QualityKind,
    /// Metrics export read by the `file` provider.
    pub path: Option<PathBuf>,
    /// Fixed seed for the simulated provider.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Evaluated ahead of the built-in rules.
    pub rules: Vec<ClassifierRule>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    pub workspace: PathBuf,
    pub sessions_dir: PathBuf,
    pub output: PathBuf,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        let paths = Paths::from_env();
        Self {
            workspace: paths.workspace,
            sessions_dir: paths.sessions_dir,
            output: paths.activity_output,
        }
    }
}

/// Command-line overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sessions_file: Option<PathBuf>,
    pub registry: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub no_command: bool,
}

impl Config {
    /// Defaults rooted at an explicit home directory instead of `$HOME`.
    pub fn for_paths(paths: &Paths) -> Self {
        Self {
            sessions: SessionsConfig {
                path: paths.sessions_file.clone(),
                ..SessionsConfig::default()
            },
            registry: RegistryConfig {
                path: paths.registry.clone(),
            },
            output: OutputConfig {
                path: paths.output.clone(),
            },
            activity: ActivityConfig {
                workspace: paths.workspace.clone(),
                sessions_dir: paths.sessions_dir.clone(),
                output: paths.activity_output.clone(),
            },
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: origin.display().to_string(),
            source,
        })
    }

    /// Load the config file, then apply environment overrides and validate.
    ///
    /// An explicit path must exist and parse. Without one,
    /// `agent-progress.toml` in the working directory is tried leniently.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                        path: path.display().to_string(),
                        source,
                    })?;
                let cfg = Self::from_toml_str(&content, path)?;
                tracing::info!(path = %path.display(), "loaded configuration");
                cfg
            }
            None => Self::load_or_default(Path::new(DEFAULT_CONFIG_FILE)),
        };

        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Config from `path`, or the defaults when it is absent, unreadable or
    /// malformed. Anything other than a missing file is logged as a warning.
    pub fn load_or_default(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read config, using defaults");
                return Self::default();
            }
        };

        match Self::from_toml_str(&content, path) {
            Ok(cfg) => {
                tracing::info!(path = %path.display(), "loaded configuration");
                cfg
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse config, using defaults");
                Self::default()
            }
        }
    }

    /// Environment overrides. `lookup` is `std::env::var` outside of tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(path) = non_empty("AGENT_PROGRESS_SESSIONS_FILE") {
            self.sessions.path = PathBuf::from(path);
        }
        if let Some(path) = non_empty("AGENT_PROGRESS_REGISTRY") {
            self.registry.path = PathBuf::from(path);
        }
        if let Some(path) = non_empty("AGENT_PROGRESS_OUTPUT") {
            self.output.path = PathBuf::from(path);
        }
        if let Some(command) = non_empty("AGENT_PROGRESS_SESSION_COMMAND") {
            self.sessions.command = command.split_whitespace().map(str::to_string).collect();
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(path) = &overrides.sessions_file {
            self.sessions.path = path.clone();
            self.sessions.command.clear();
        }
        if overrides.no_command {
            self.sessions.command.clear();
        }
        if let Some(path) = &overrides.registry {
            self.registry.path = path.clone();
        }
        if let Some(path) = &overrides.output {
            self.output.path = path.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sessions.timeout_secs == 0 {
            return Err(invalid("sessions.timeout_secs", "must be > 0"));
        }
        if self.watch.interval_secs == 0 {
            return Err(invalid("watch.interval_secs", "must be > 0"));
        }
        if self.engine.stale_after_hours < 0 {
            return Err(invalid("engine.stale_after_hours", "must be >= 0"));
        }
        if self.quality.provider == QualityKind::File && self.quality.path.is_none() {
            return Err(invalid("quality.path", "required when provider = \"file\""));
        }
        for (i, rule) in self.classifier.rules.iter().enumerate() {
            if rule.agent_id.as_str().trim().is_empty() {
                return Err(invalid(&format!("classifier.rules[{i}].agent_id"), "must not be empty"));
            }
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(invalid(&format!("classifier.rules[{i}].keywords"), "needs a keyword"));
            }
        }
        Ok(())
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.sessions.timeout_secs)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch.interval_secs)
    }

    pub fn session_source(&self) -> Box<dyn SessionSource> {
        let file = FileSessionSource::new(self.sessions.path.clone());
        match CommandSessionSource::from_argv(&self.sessions.command, self.session_timeout()) {
            Some(command) => Box::new(command.with_fallback(file)),
            None => Box::new(file),
        }
    }

    pub fn registry_source(&self) -> Box<dyn RegistrySource> {
        Box::new(FileRegistry::new(self.registry.path.clone()))
    }

    /// Quality provider per `[quality]`. An unreadable metrics file degrades
    /// to a provider with no data, never to simulated numbers.
    pub fn quality_provider(&self) -> Box<dyn QualityProvider> {
        match (self.quality.provider, &self.quality.path) {
            (QualityKind::File, Some(path)) => match FileQuality::load(path) {
                Ok(provider) => Box::new(provider),
                Err(e) => {
                    tracing::warn!(error = %e, "quality file unavailable, metrics left unmeasured");
                    Box::new(FileQuality::from_map(BTreeMap::new()))
                }
            },
            _ => match self.quality.seed {
                Some(seed) => Box::new(SimulatedQuality::seeded(seed)),
                None => Box::new(SimulatedQuality::new()),
            },
        }
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::with_extra_rules(self.classifier.rules.clone())
    }

    pub fn sink(&self) -> JsonFileSink {
        JsonFileSink::new(self.output.path.clone())
    }

    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(
            self.session_source(),
            self.registry_source(),
            self.quality_provider(),
        )
        .with_classifier(self.classifier())
        .with_options(EngineOptions::from(&self.engine))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
