use super::{AgentId, RegistryEntry};
use serde::{Deserialize, Serialize};

/// Placeholder text used for fields that have no live session behind them.
pub const NOT_AVAILABLE: &str = "N/A";

/// Session key reported for agents without a live session.
pub const NO_SESSION: &str = "None";

/// Status of a tracked agent.
///
/// Serialized as a plain string: `"available"`, `"active"`, or whatever the
/// registry declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AgentStatus {
    Available,
    Active,
    Declared(String),
}

impl AgentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AgentStatus::Available => "available",
            AgentStatus::Active => "active",
            AgentStatus::Declared(s) => s,
        }
    }
}

impl From<String> for AgentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "available" => AgentStatus::Available,
            "active" => AgentStatus::Active,
            _ => AgentStatus::Declared(s),
        }
    }
}

impl From<AgentStatus> for String {
    fn from(status: AgentStatus) -> Self {
        match status {
            AgentStatus::Declared(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// Quality and test figures attached to an agent record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityMetrics {
    #[serde(rename = "quality_score")]
    pub score: u8,
    pub tests_passed: u32,
    pub bugs_found: u32,
    pub code_quality: u8,
}

impl QualityMetrics {
    pub fn new(score: u8, tests_passed: u32, bugs_found: u32, code_quality: u8) -> Self {
        Self {
            score,
            tests_passed,
            bugs_found,
            code_quality,
        }
    }
}

/// One tracked agent in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub name: String,
    pub session_key: String,
    pub specialization: String,
    pub status: AgentStatus,
    pub progress: u8,
    pub eta: String,
    pub active_since: String,
    #[serde(flatten)]
    pub quality: QualityMetrics,
    pub task: String,
    pub token_usage: String,
    pub model: String,
    /// Hours the session has been running, when known. Read by the alert
    /// rules; not part of the published document.
    #[serde(skip)]
    pub active_hours: Option<f64>,
}

impl AgentRecord {
    /// Record for a registry agent that has no live session.
    pub fn available(entry: &RegistryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.display_name().to_string(),
            session_key: NO_SESSION.to_string(),
            specialization: entry.specialization.clone(),
            status: AgentStatus::Available,
            progress: 0,
            eta: NOT_AVAILABLE.to_string(),
            active_since: "Not active".to_string(),
            quality: QualityMetrics::default(),
            task: "Awaiting assignment".to_string(),
            token_usage: NOT_AVAILABLE.to_string(),
            model: NOT_AVAILABLE.to_string(),
            active_hours: None,
        }
    }

    pub fn with_active_hours(mut self, hours: f64) -> Self {
        self.active_hours = Some(hours);
        self
    }

    pub fn has_session(&self) -> bool {
        self.session_key != NO_SESSION
    }
}
