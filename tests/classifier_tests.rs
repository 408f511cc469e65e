use agent_progress::engine::{Classifier, ClassifierRule};
use agent_progress::model::{AgentStatus, Registry, RegistryEntry};

fn classifier() -> Classifier {
    Classifier::default()
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn built_in_rules_map_third_field() {
    let cases = [
        ("subagent:x:content-writer", "content_creator"),
        ("subagent:x:LinkedIn-Post", "content_creator"),
        ("subagent:x:ui-design", "designer"),
        ("subagent:x:crm-backend", "developer"),
        ("subagent:x:developer", "developer"),
        ("subagent:x:dashboard-v2", "dashboard"),
        ("subagent:x:research", "main"),
    ];
    for (key, expected) in cases {
        assert_eq!(classifier().identify(key).as_str(), expected, "key {key}");
    }
}

#[test]
fn non_subagent_keys_are_main() {
    for key in ["main:session:abc", "agent:main:slack", "", "design:content:crm"] {
        assert_eq!(classifier().identify(key).as_str(), "main", "key {key:?}");
    }
}

#[test]
fn short_subagent_keys_are_main() {
    assert_eq!(classifier().identify("subagent").as_str(), "main");
    assert_eq!(classifier().identify("subagent:content").as_str(), "main");
}

// ============================================================================
// Task labels
// ============================================================================

#[test]
fn subagent_without_matching_rule_gets_default_task() {
    assert_eq!(
        classifier().describe_task("subagent:x:research", None),
        "Working on assigned task"
    );
}

#[test]
fn role_tasks_for_main_and_slack() {
    assert_eq!(
        classifier().describe_task("agent:main:session", None),
        "Coordinating team & tasks"
    );
    assert_eq!(
        classifier().describe_task("agent:Slack:channel", None),
        "Monitoring Slack channels"
    );
}

#[test]
fn other_keys_use_specialization_or_fallback() {
    let entry = RegistryEntry::new("ops").with_specialization("Operations");
    assert_eq!(classifier().describe_task("agent:cron", Some(&entry)), "Operations");
    assert_eq!(classifier().describe_task("agent:cron", None), "Active");
}

// ============================================================================
// Classification against the registry
// ============================================================================

#[test]
fn registered_agent_takes_registry_fields() {
    let registry = Registry::from_entries([RegistryEntry::new("designer")
        .with_name("Designer")
        .with_specialization("Visual design")
        .with_status("busy")]);

    let class = classifier().classify("subagent:x:design", &registry);
    assert_eq!(class.agent_id.as_str(), "designer");
    assert_eq!(class.name, "Designer");
    assert_eq!(class.specialization, "Visual design");
    assert_eq!(class.status, AgentStatus::Declared("busy".into()));
    assert_eq!(class.task, "Designing visual assets");
}

#[test]
fn registered_agent_without_name_is_main_agent() {
    let registry = Registry::from_entries([RegistryEntry::new("main")]);
    let class = classifier().classify("main:session:abc", &registry);

    assert_eq!(class.name, "Main Agent");
    assert_eq!(class.status, AgentStatus::Declared("unknown".into()));
}

#[test]
fn unregistered_agent_is_active_main_agent() {
    let class = classifier().classify("subagent:x:dashboard", &Registry::new());

    assert_eq!(class.agent_id.as_str(), "dashboard");
    assert_eq!(class.name, "Main Agent");
    assert_eq!(class.status, AgentStatus::Active);
    assert_eq!(class.specialization, "Building dashboard");
    assert_eq!(class.task, "Building dashboard");
}

#[test]
fn custom_rules_are_case_insensitive() {
    let classifier = Classifier::new(vec![ClassifierRule {
        keywords: vec!["QA".into()],
        agent_id: "qa".into(),
        task: "Testing".into(),
    }]);

    assert_eq!(classifier.identify("subagent:x:qa-sweep").as_str(), "qa");
    assert_eq!(classifier.describe_task("SUBAGENT:x:QA", None), "Testing");
    assert_eq!(classifier.identify("subagent:x:design").as_str(), "main");
}
