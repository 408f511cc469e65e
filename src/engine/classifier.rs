//! Session key classification.
//!
//! A session key is mapped to an agent identity and a task label by an ordered
//! rule table. Rules are tried top to bottom; the first rule with a keyword
//! contained in the inspected text wins.

use crate::model::{AgentId, AgentStatus, Registry, RegistryEntry};
use serde::{Deserialize, Serialize};

pub const MAIN_AGENT_NAME: &str = "Main Agent";
pub const SUBAGENT_DEFAULT_TASK: &str = "Working on assigned task";
pub const FALLBACK_TASK: &str = "Active";

/// Task labels for non-subagent sessions, matched against the lower-cased key.
const ROLE_TASKS: &[(&str, &str)] = &[
    ("main", "Coordinating team & tasks"),
    ("slack", "Monitoring Slack channels"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierRule {
    pub keywords: Vec<String>,
    pub agent_id: AgentId,
    pub task: String,
}

impl ClassifierRule {
    pub fn new(keywords: &[&str], agent_id: &str, task: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            agent_id: AgentId::new(agent_id),
            task: task.to_string(),
        }
    }

    /// `text` must already be lower-cased.
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|kw| !kw.is_empty() && text.contains(kw))
    }
}

/// Built-in subagent rules.
pub fn default_rules() -> Vec<ClassifierRule> {
    vec![
        ClassifierRule::new(
            &["content", "linkedin"],
            "content_creator",
            "Creating LinkedIn content",
        ),
        ClassifierRule::new(&["design"], "designer", "Designing visual assets"),
        ClassifierRule::new(&["developer", "crm"], "developer", "Developing CRM system"),
        ClassifierRule::new(&["dashboard"], "dashboard", "Building dashboard"),
    ]
}

/// Result of classifying one session key against the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub agent_id: AgentId,
    pub name: String,
    pub specialization: String,
    pub status: AgentStatus,
    pub task: String,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<ClassifierRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl Classifier {
    pub fn new(rules: Vec<ClassifierRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|mut rule| {
                rule.keywords = rule.keywords.iter().map(|k| k.to_lowercase()).collect();
                rule
            })
            .collect();
        Self { rules }
    }

    /// Custom rules evaluated ahead of the built-in table.
    pub fn with_extra_rules(extra: Vec<ClassifierRule>) -> Self {
        let mut rules = extra;
        rules.extend(default_rules());
        Self::new(rules)
    }

    pub fn rules(&self) -> &[ClassifierRule] {
        &self.rules
    }

    /// Agent id for a session key.
    ///
    /// Only subagent keys with at least three `:`-separated fields are
    /// inspected, and only their third field. Anything else is `main`.
    pub fn identify(&self, key: &str) -> AgentId {
        if !key.contains("subagent") {
            return AgentId::main();
        }

        let Some(segment) = key.split(':').nth(2) else {
            return AgentId::main();
        };
        let segment = segment.to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.matches(&segment))
            .map(|rule| rule.agent_id.clone())
            .unwrap_or_else(AgentId::main)
    }

    /// Human task label for a session key.
    pub fn describe_task(&self, key: &str, entry: Option<&RegistryEntry>) -> String {
        let lower = key.to_lowercase();

        if lower.contains("subagent") {
            return self
                .rules
                .iter()
                .find(|rule| rule.matches(&lower))
                .map(|rule| rule.task.clone())
                .unwrap_or_else(|| SUBAGENT_DEFAULT_TASK.to_string());
        }

        if let Some((_, task)) = ROLE_TASKS.iter().find(|(kw, _)| lower.contains(kw)) {
            return (*task).to_string();
        }

        match entry {
            Some(entry) => entry.specialization.clone(),
            None => FALLBACK_TASK.to_string(),
        }
    }

    /// Identity, registry overrides and task label for one session key.
    pub fn classify(&self, key: &str, registry: &Registry) -> Classification {
        let agent_id = self.identify(key);

        match registry.get(&agent_id) {
            Some(entry) => Classification {
                name: entry
                    .name
                    .clone()
                    .unwrap_or_else(|| MAIN_AGENT_NAME.to_string()),
                specialization: entry.specialization.clone(),
                status: AgentStatus::from(entry.status().to_string()),
                task: self.describe_task(key, Some(entry)),
                agent_id,
            },
            None => {
                let task = self.describe_task(key, None);
                // unregistered identities keep the main agent's display name
                Classification {
                    name: MAIN_AGENT_NAME.to_string(),
                    specialization: task.clone(),
                    status: AgentStatus::Active,
                    task,
                    agent_id,
                }
            }
        }
    }
}
