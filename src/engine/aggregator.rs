use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::alerts::check_alerts;
use super::classifier::Classifier;
use super::eta::{estimate_eta, ASSUMED_ELAPSED_HOURS};
use super::progress::estimate_progress;
use super::quality::{QualityProvider, UNMEASURED};
use crate::error::SinkError;
use crate::model::{AgentId, AgentRecord, Registry, Report, SessionRecord, NOT_AVAILABLE};
use crate::sink::Sink;
use crate::sources::{RegistrySource, SessionSource};

/// Tunables for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Non-main sessions whose age reads as more than this many hours are dropped.
    pub stale_after_hours: i64,
    /// Fill `active_hours` from the session age so the time-based alerts can fire.
    pub derive_active_hours: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            stale_after_hours: 4,
            derive_active_hours: true,
        }
    }
}

/// Report plus the sink result of a [`Aggregator::run`].
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub sink_error: Option<SinkError>,
}

impl RunOutcome {
    pub fn persisted(&self) -> bool {
        self.sink_error.is_none()
    }
}

/// Builds progress snapshots from a session source and a registry.
///
/// Holds no state between snapshots.
pub struct Aggregator {
    sessions: Box<dyn SessionSource>,
    registry: Box<dyn RegistrySource>,
    quality: Box<dyn QualityProvider>,
    classifier: Classifier,
    options: EngineOptions,
}

impl Aggregator {
    pub fn new(
        sessions: Box<dyn SessionSource>,
        registry: Box<dyn RegistrySource>,
        quality: Box<dyn QualityProvider>,
    ) -> Self {
        Self {
            sessions,
            registry,
            quality,
            classifier: Classifier::default(),
            options: EngineOptions::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn snapshot(&self) -> Report {
        self.snapshot_at(Utc::now())
    }

    /// Fetch both sources and build a report stamped with `now`.
    ///
    /// Source failures are logged and treated as empty input.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Report {
        let sessions = self.sessions.fetch_sessions().unwrap_or_else(|e| {
            tracing::warn!(source = self.sessions.tag(), error = %e, "session source unavailable");
            Vec::new()
        });
        let registry = self.registry.fetch_registry().unwrap_or_else(|e| {
            tracing::warn!(source = self.registry.tag(), error = %e, "agent registry unavailable");
            Registry::new()
        });

        let agents = build_agents(
            &sessions,
            &registry,
            &self.classifier,
            self.quality.as_ref(),
            &self.options,
        );
        let alerts = check_alerts(&agents);
        let sources = vec![
            self.sessions.tag().to_string(),
            self.registry.tag().to_string(),
            self.quality.tag().to_string(),
        ];

        let report = Report::new(agents, alerts, now, sources);
        tracing::info!(
            sessions = sessions.len(),
            registry = registry.len(),
            agents = report.total_agents,
            active = report.active_agents,
            alerts = report.alerts.len(),
            "snapshot built"
        );
        report
    }

    /// Snapshot and hand the report to `sink`. A sink failure is returned
    /// alongside the report instead of replacing it.
    pub fn run(&self, sink: &dyn Sink) -> RunOutcome {
        let report = self.snapshot();
        let sink_error = match sink.write(&report) {
            Ok(()) => {
                tracing::info!(sink = %sink.describe(), "report written");
                None
            }
            Err(e) => {
                tracing::warn!(sink = %sink.describe(), error = %e, "failed to write report");
                Some(e)
            }
        };
        RunOutcome { report, sink_error }
    }
}

/// One record per fresh session, then one `available` record per registry
/// agent that no session claimed.
///
/// Sessions that classify onto the same id collapse: the later session's
/// record replaces the earlier one in its original position.
pub fn build_agents(
    sessions: &[SessionRecord],
    registry: &Registry,
    classifier: &Classifier,
    quality: &dyn QualityProvider,
    options: &EngineOptions,
) -> Vec<AgentRecord> {
    let mut agents: Vec<AgentRecord> = Vec::new();
    let mut positions: HashMap<AgentId, usize> = HashMap::new();

    for session in sessions {
        if session.is_stale(options.stale_after_hours) {
            tracing::debug!(key = %session.key, age = %session.age, "skipping stale session");
            continue;
        }

        let record = record_for_session(session, registry, classifier, quality, options);
        match positions.get(&record.id) {
            Some(&pos) => {
                tracing::debug!(
                    id = %record.id,
                    replaced = %agents[pos].session_key,
                    key = %record.session_key,
                    "sessions collide on agent id, keeping the later one"
                );
                agents[pos] = record;
            }
            None => {
                positions.insert(record.id.clone(), agents.len());
                agents.push(record);
            }
        }
    }

    for entry in registry.entries() {
        if !positions.contains_key(&entry.id) {
            agents.push(AgentRecord::available(entry));
        }
    }

    agents
}

/// Classify and score a single live session.
pub fn record_for_session(
    session: &SessionRecord,
    registry: &Registry,
    classifier: &Classifier,
    quality: &dyn QualityProvider,
    options: &EngineOptions,
) -> AgentRecord {
    let class = classifier.classify(&session.key, registry);
    let progress = estimate_progress(session);
    let metrics = quality.metrics(&class.agent_id).unwrap_or(UNMEASURED);

    AgentRecord {
        id: class.agent_id,
        name: class.name,
        session_key: session.key.clone(),
        specialization: class.specialization,
        status: class.status,
        progress,
        eta: estimate_eta(progress, ASSUMED_ELAPSED_HOURS),
        active_since: if session.age.is_empty() {
            "Recently".to_string()
        } else {
            session.age.clone()
        },
        quality: metrics,
        task: class.task,
        token_usage: session
            .tokens
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        model: session.model.clone().unwrap_or_else(|| "unknown".to_string()),
        active_hours: if options.derive_active_hours {
            session.age_hours()
        } else {
            None
        },
    }
}
