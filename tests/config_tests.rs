use agent_progress::config::{Config, Overrides, QualityKind};
use agent_progress::engine::QualityProvider;
use agent_progress::error::ConfigError;
use agent_progress::paths::Paths;
use agent_progress::sources::{RegistrySource, SessionSource};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn home_config() -> Config {
    Config::for_paths(&Paths::resolve(Path::new("/home/ops")))
}

#[test]
fn defaults_follow_install_layout() {
    let config = home_config();

    assert_eq!(
        config.sessions.path,
        PathBuf::from("/home/ops/.openclaw/agents/main/sessions/sessions.json")
    );
    assert_eq!(
        config.output.path,
        PathBuf::from("/home/ops/openclaw/agent_progress_data.json")
    );
    assert_eq!(config.sessions.command, vec!["openclaw", "sessions", "--json"]);
    assert_eq!(config.session_timeout(), Duration::from_secs(5));
    assert_eq!(config.watch_interval(), Duration::from_secs(30));
    assert_eq!(config.engine.stale_after_hours, 4);
    assert!(config.engine.derive_active_hours);
    assert_eq!(config.quality.provider, QualityKind::Simulated);
    assert!(config.validate().is_ok());
}

#[test]
fn partial_toml_keeps_other_defaults() {
    let config = Config::from_toml_str(
        r#"
        [registry]
        path = "/srv/registry.json"

        [engine]
        stale_after_hours = 8

        [quality]
        seed = 42

        [[classifier.rules]]
        keywords = ["sales"]
        agent_id = "sales"
        task = "Running sales outreach"
        "#,
        Path::new("agent-progress.toml"),
    )
    .unwrap();

    assert_eq!(config.registry.path, PathBuf::from("/srv/registry.json"));
    assert_eq!(config.engine.stale_after_hours, 8);
    assert!(config.engine.derive_active_hours);
    assert_eq!(config.quality.seed, Some(42));
    assert_eq!(config.watch.interval_secs, 30);

    let classifier = config.classifier();
    assert_eq!(classifier.identify("subagent:x:sales-team").as_str(), "sales");
    assert_eq!(classifier.identify("subagent:x:design").as_str(), "designer");
}

#[test]
fn bad_toml_names_the_file() {
    let err = Config::from_toml_str("[engine\n", Path::new("custom.toml")).unwrap_err();
    assert!(matches!(&err, ConfigError::Toml { path, .. } if path == "custom.toml"));
}

#[test]
fn invalid_values_are_rejected() {
    let mut config = home_config();
    config.watch.interval_secs = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field, .. }) if field == "watch.interval_secs"
    ));

    let mut config = home_config();
    config.quality.provider = QualityKind::File;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field, .. }) if field == "quality.path"
    ));
}

#[test]
fn env_overrides_paths_and_command() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("AGENT_PROGRESS_REGISTRY", "/env/registry.json"),
        ("AGENT_PROGRESS_OUTPUT", ""),
        ("AGENT_PROGRESS_SESSION_COMMAND", "openclaw sessions --json --all"),
    ]);
    let mut config = home_config();
    config.apply_env(|name| env.get(name).map(|v| v.to_string()));

    assert_eq!(config.registry.path, PathBuf::from("/env/registry.json"));
    // blank values are ignored
    assert_eq!(
        config.output.path,
        PathBuf::from("/home/ops/openclaw/agent_progress_data.json")
    );
    assert_eq!(config.sessions.command.len(), 4);
}

#[test]
fn sessions_file_override_disables_command() {
    let mut config = home_config();
    config.apply_overrides(&Overrides {
        sessions_file: Some(PathBuf::from("/tmp/sessions.json")),
        output: Some(PathBuf::from("/tmp/out.json")),
        ..Overrides::default()
    });

    assert!(config.sessions.command.is_empty());
    assert_eq!(config.sessions.path, PathBuf::from("/tmp/sessions.json"));
    assert_eq!(config.sink().path(), Path::new("/tmp/out.json"));
    assert_eq!(config.session_source().tag(), "session_file");
}

#[test]
fn command_source_by_default() {
    assert_eq!(home_config().session_source().tag(), "openclaw_sessions");
    assert_eq!(home_config().registry_source().tag(), "agent_registry");
    assert_eq!(home_config().quality_provider().tag(), "simulated_quality");
}

#[test]
fn unreadable_quality_file_degrades_to_unmeasured() {
    let mut config = home_config();
    config.quality.provider = QualityKind::File;
    config.quality.path = Some(PathBuf::from("/nonexistent/quality.json"));

    let provider = config.quality_provider();
    assert_eq!(provider.tag(), "quality_file");
    assert!(provider.metrics(&"main".into()).is_none());
}

#[test]
fn load_reads_explicit_file() {
    let tmpdir = TempDir::new().unwrap();
    let path = tmpdir.path().join("agent-progress.toml");
    fs::write(&path, "[watch]\ninterval_secs = 10\n").unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config.watch_interval(), Duration::from_secs(10));
}

#[test]
fn load_missing_explicit_file_fails() {
    let tmpdir = TempDir::new().unwrap();
    let err = Config::load(Some(tmpdir.path().join("absent.toml").as_path())).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn end_to_end_snapshot_from_config() {
    let tmpdir = TempDir::new().unwrap();
    let sessions = tmpdir.path().join("sessions.json");
    let registry = tmpdir.path().join("registry.json");
    let output = tmpdir.path().join("out").join("report.json");
    fs::write(&sessions, r#"[{"key": "subagent:x:design", "age": "2 minutes"}]"#).unwrap();
    fs::write(&registry, r#"{"agents": [{"id": "designer", "name": "Designer"}]}"#).unwrap();

    let mut config = home_config();
    config.apply_overrides(&Overrides {
        sessions_file: Some(sessions),
        registry: Some(registry),
        output: Some(output.clone()),
        no_command: true,
    });
    config.quality.seed = Some(1);

    let outcome = config.aggregator().run(&config.sink());
    assert!(outcome.persisted());
    assert_eq!(outcome.report.total_agents, 1);
    assert_eq!(outcome.report.agents[0].name, "Designer");
    assert_eq!(
        outcome.report.sources,
        vec!["session_file", "agent_registry", "simulated_quality"]
    );
    assert!(output.exists());
}

#[test]
fn malformed_implicit_config_falls_back_to_defaults() {
    let tmpdir = TempDir::new().unwrap();
    let path = tmpdir.path().join("agent-progress.toml");
    fs::write(&path, "[engine\nstale_after_hours = 9\n").unwrap();

    let config = Config::load_or_default(&path);
    assert_eq!(config.engine.stale_after_hours, 4);
    assert_eq!(config.watch.interval_secs, 30);

    // the same file passed explicitly is fatal
    let err = Config::load(Some(path.as_path())).unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
}

#[test]
fn unreadable_implicit_config_falls_back_to_defaults() {
    let tmpdir = TempDir::new().unwrap();
    // a directory where the file is expected
    let as_dir = tmpdir.path().join("agent-progress.toml");
    fs::create_dir(&as_dir).unwrap();

    assert_eq!(Config::load_or_default(&as_dir).watch.interval_secs, 30);
    assert_eq!(
        Config::load_or_default(&tmpdir.path().join("absent.toml")).engine.stale_after_hours,
        4
    );
}

#[test]
fn valid_implicit_config_is_used() {
    let tmpdir = TempDir::new().unwrap();
    let path = tmpdir.path().join("agent-progress.toml");
    fs::write(&path, "[engine]\nstale_after_hours = 9\n").unwrap();

    assert_eq!(Config::load_or_default(&path).engine.stale_after_hours, 9);
}
