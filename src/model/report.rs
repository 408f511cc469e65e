use super::AgentRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Stuck,
    SlowProgress,
    QualityIssue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Display name of the agent the alert is about.
    pub agent: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
}

/// Aggregated snapshot handed to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub agents: Vec<AgentRecord>,
    pub total_agents: usize,
    pub active_agents: usize,
    pub average_progress: f64,
    pub alerts: Vec<Alert>,
    pub last_updated: DateTime<Utc>,
    pub sources: Vec<String>,
}

impl Report {
    /// Builds a report and derives the summary counters from `agents`.
    pub fn new(
        agents: Vec<AgentRecord>,
        alerts: Vec<Alert>,
        last_updated: DateTime<Utc>,
        sources: Vec<String>,
    ) -> Self {
        let total_agents = agents.len();
        let active_agents = agents.iter().filter(|a| a.progress > 0).count();
        let average_progress = if agents.is_empty() {
            0.0
        } else {
            agents.iter().map(|a| f64::from(a.progress)).sum::<f64>() / total_agents as f64
        };

        Self {
            agents,
            total_agents,
            active_agents,
            average_progress,
            alerts,
            last_updated,
            sources,
        }
    }
}
