use agent_progress::engine::check_alerts;
use agent_progress::model::{AgentRecord, AlertKind, QualityMetrics, RegistryEntry};

fn working(name: &str, progress: u8, hours: Option<f64>, score: u8) -> AgentRecord {
    let mut agent = AgentRecord::available(&RegistryEntry::new(name.to_lowercase()).with_name(name));
    agent.progress = progress;
    agent.quality = QualityMetrics::new(score, 8, 0, 90);
    agent.active_hours = hours;
    agent
}

#[test]
fn healthy_agent_has_no_alerts() {
    assert!(check_alerts(&[working("Developer", 70, Some(0.5), 92)]).is_empty());
}

#[test]
fn stuck_after_two_hours() {
    let alerts = check_alerts(&[working("Developer", 70, Some(2.5), 92)]);

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::Stuck);
    assert_eq!(alerts[0].agent, "Developer");
    assert_eq!(
        alerts[0].message,
        "Developer has been working for 2.5 hours - may need assistance"
    );
}

#[test]
fn thresholds_are_strict() {
    assert!(check_alerts(&[working("Developer", 70, Some(2.0), 70)]).is_empty());
    assert!(check_alerts(&[working("Developer", 20, Some(1.5), 90)]).is_empty());
}

#[test]
fn slow_progress_needs_time_and_low_progress() {
    let alerts = check_alerts(&[working("Designer", 15, Some(1.5), 90)]);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::SlowProgress);
    assert_eq!(alerts[0].message, "Designer showing slow progress (15%)");

    assert!(check_alerts(&[working("Designer", 15, Some(0.5), 90)]).is_empty());
}

#[test]
fn unknown_hours_count_as_zero() {
    assert!(check_alerts(&[working("Designer", 5, None, 90)]).is_empty());
}

#[test]
fn low_quality_score() {
    let alerts = check_alerts(&[working("Developer", 70, None, 64)]);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::QualityIssue);
    assert_eq!(alerts[0].message, "Developer quality score low (64/100)");
}

#[test]
fn alerts_follow_record_then_rule_order() {
    let agents = vec![
        working("Developer", 10, Some(3.0), 50),
        working("Designer", 80, None, 60),
    ];
    let alerts = check_alerts(&agents);

    let kinds: Vec<_> = alerts.iter().map(|a| (a.agent.as_str(), a.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            ("Developer", AlertKind::Stuck),
            ("Developer", AlertKind::SlowProgress),
            ("Developer", AlertKind::QualityIssue),
            ("Designer", AlertKind::QualityIssue),
        ]
    );
}

#[test]
fn check_is_pure() {
    let agents = vec![working("Developer", 10, Some(3.0), 50)];
    let before = agents.clone();

    let first = check_alerts(&agents);
    let second = check_alerts(&agents);

    assert_eq!(first, second);
    assert_eq!(agents, before);
}

#[test]
fn alert_serializes_kind_as_type() {
    let alerts = check_alerts(&[working("Developer", 70, Some(4.0), 90)]);
    let value = serde_json::to_value(&alerts[0]).unwrap();

    assert_eq!(value["type"], "stuck");
    assert_eq!(value["agent"], "Developer");
}
