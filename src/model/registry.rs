use super::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Static metadata for one known agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryEntry {
    pub id: AgentId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub current_status: Option<String>,
}

impl RegistryEntry {
    pub fn new(id: impl Into<AgentId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            specialization: String::new(),
            current_status: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_specialization(mut self, specialization: impl Into<String>) -> Self {
        self.specialization = specialization.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.current_status = Some(status.into());
        self
    }

    /// Registry name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn status(&self) -> &str {
        self.current_status.as_deref().unwrap_or("unknown")
    }
}

/// Registry keyed by agent id. Iteration follows file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
    index: BTreeMap<AgentId, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry; a repeated id replaces the earlier entry in place.
    pub fn from_entries(entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            registry.insert(entry);
        }
        registry
    }

    pub fn insert(&mut self, entry: RegistryEntry) {
        match self.index.get(&entry.id) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(entry.id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, id: &AgentId) -> Option<&RegistryEntry> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
