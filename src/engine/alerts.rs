use crate::model::{AgentRecord, Alert, AlertKind};

pub const STUCK_AFTER_HOURS: f64 = 2.0;
pub const SLOW_AFTER_HOURS: f64 = 1.0;
pub const SLOW_PROGRESS_BELOW: u8 = 20;
pub const QUALITY_SCORE_BELOW: u8 = 70;

/// Alerts for each record, in record order and then rule order.
///
/// Records are judged independently. `active_hours` counts as 0 when unknown.
pub fn check_alerts(agents: &[AgentRecord]) -> Vec<Alert> {
    agents.iter().flat_map(alerts_for).collect()
}

fn alerts_for(agent: &AgentRecord) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let hours = agent.active_hours.unwrap_or(0.0);

    if hours > STUCK_AFTER_HOURS {
        alerts.push(Alert {
            agent: agent.name.clone(),
            kind: AlertKind::Stuck,
            message: format!(
                "{} has been working for {:.1} hours - may need assistance",
                agent.name, hours
            ),
        });
    }

    if agent.progress < SLOW_PROGRESS_BELOW && hours > SLOW_AFTER_HOURS {
        alerts.push(Alert {
            agent: agent.name.clone(),
            kind: AlertKind::SlowProgress,
            message: format!("{} showing slow progress ({}%)", agent.name, agent.progress),
        });
    }

    if agent.quality.score < QUALITY_SCORE_BELOW {
        alerts.push(Alert {
            agent: agent.name.clone(),
            kind: AlertKind::QualityIssue,
            message: format!(
                "{} quality score low ({}/100)",
                agent.name, agent.quality.score
            ),
        });
    }

    alerts
}
