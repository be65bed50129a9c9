//! Per-agent conversation context store

use std::{collections::HashMap, sync::RwLock};

/// Maps agent identity to the last-known conversation context token
///
/// Read before and written after each exchange. Writes are
/// last-writer-wins; tokens are never deleted during a process lifetime.
#[derive(Debug, Default)]
pub struct ContextStore {
    contexts: RwLock<HashMap<String, String>>,
}

impl ContextStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// The context token for an agent, if a prior exchange produced one
    pub fn get(&self, agent_name: &str) -> Option<String> {
        self.contexts
            .read()
            .expect("context store lock poisoned")
            .get(agent_name)
            .cloned()
    }

    /// Record the context token for an agent, overwriting any prior token
    pub fn insert(&self, agent_name: impl Into<String>, context_id: impl Into<String>) {
        self.contexts
            .write()
            .expect("context store lock poisoned")
            .insert(agent_name.into(), context_id.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_before_first_exchange() {
        let store = ContextStore::new();
        assert_eq!(store.get("subgraph_agent"), None);
    }

    #[test]
    fn test_insert_and_overwrite() {
        let store = ContextStore::new();

        store.insert("subgraph_agent", "ctx-1");
        assert_eq!(store.get("subgraph_agent").as_deref(), Some("ctx-1"));

        store.insert("subgraph_agent", "ctx-2");
        assert_eq!(store.get("subgraph_agent").as_deref(), Some("ctx-2"));
    }

    #[test]
    fn test_agents_are_independent() {
        let store = ContextStore::new();

        store.insert("alpha", "ctx-a");
        store.insert("beta", "ctx-b");

        assert_eq!(store.get("alpha").as_deref(), Some("ctx-a"));
        assert_eq!(store.get("beta").as_deref(), Some("ctx-b"));
    }
}
