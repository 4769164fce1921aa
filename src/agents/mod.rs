//! The six fixed domain-specialist agents and the registry that holds them.

pub mod data_analyst;
pub mod historian;
pub mod inventory;
pub mod marketing;
pub mod sales;
pub mod support;

use crate::domain::ports::Agent;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A fixed map from agent name to the value implementing its capability
/// set. No class hierarchy — values, not subtypes.
pub struct AgentRegistry {
    agents: BTreeMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new(agents: Vec<Arc<dyn Agent>>) -> Self {
        let mut map = BTreeMap::new();
        for agent in agents {
            let name = agent.get_metadata().name.to_string();
            map.insert(name, agent);
        }
        Self { agents: map }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Agent>> {
        self.agents.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Agent>)> {
        self.agents.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Returns whether `query` (case-insensitive) contains any of `patterns`,
/// used uniformly by every agent's scope-discipline check. Every trigger
/// phrase is a literal substring, so no regex engine is needed.
pub(crate) fn matches_any(query: &str, patterns: &[&str]) -> bool {
    let lowered = query.to_lowercase();
    patterns.iter().any(|p| lowered.contains(p))
}
