use opsmesh_agent::Agent;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// The agent registry: a mapping from agent-type tag to the instances of
/// that type, built once at orchestrator startup.
///
/// Registration order is preserved globally and per type; it is the stable
/// tie-break order for least-loaded selection, and the first instance of a
/// type is its representative for aggregation calls.
pub struct AgentRegistry {
    by_type: HashMap<String, Vec<Arc<dyn Agent>>>,
    order: Vec<Arc<dyn Agent>>,
}

impl AgentRegistry {
    /// Builds the registry from constructed agent instances.
    pub fn from_agents(agents: Vec<Arc<dyn Agent>>) -> Self {
        let mut by_type: HashMap<String, Vec<Arc<dyn Agent>>> = HashMap::new();
        for agent in &agents {
            by_type
                .entry(agent.agent_type().to_string())
                .or_default()
                .push(Arc::clone(agent));
        }
        Self {
            by_type,
            order: agents,
        }
    }

    /// All instances of the given type, in registration order.
    pub fn agents_of(&self, agent_type: &str) -> &[Arc<dyn Agent>] {
        self.by_type.get(agent_type).map_or(&[], Vec::as_slice)
    }

    /// The representative instance (first registered) of the given type.
    pub fn representative(&self, agent_type: &str) -> Option<&Arc<dyn Agent>> {
        self.agents_of(agent_type).first()
    }

    /// Every registered instance, in registration order.
    pub fn all(&self) -> &[Arc<dyn Agent>] {
        &self.order
    }

    /// The registered agent types, in first-registration order.
    pub fn agent_types(&self) -> Vec<String> {
        let mut types = Vec::new();
        for agent in &self.order {
            let tag = agent.agent_type();
            if !types.iter().any(|t| t == tag) {
                types.push(tag.to_string());
            }
        }
        types
    }

    /// Looks up one instance by identity.
    pub fn find(&self, id: Uuid) -> Option<&Arc<dyn Agent>> {
        self.order.iter().find(|a| a.id() == id)
    }

    /// Total number of registered instances.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsmesh_agent::catalog::{self, default_agents};

    #[test]
    fn test_registry_groups_by_type() {
        let registry = AgentRegistry::from_agents(default_agents(3));
        assert_eq!(registry.agents_of(catalog::COST_OPTIMIZATION).len(), 2);
        assert_eq!(registry.agents_of(catalog::GENERAL).len(), 1);
        assert!(registry.agents_of("no-such-type").is_empty());
    }

    #[test]
    fn test_representative_is_first_registered() {
        let registry = AgentRegistry::from_agents(default_agents(3));
        let rep = registry.representative(catalog::SECURITY).unwrap();
        let first = registry
            .agents_of(catalog::SECURITY)
            .first()
            .unwrap();
        assert_eq!(rep.id(), first.id());
    }

    #[test]
    fn test_agent_types_in_registration_order() {
        let registry = AgentRegistry::from_agents(default_agents(3));
        let types = registry.agent_types();
        assert_eq!(types.first().map(String::as_str), Some(catalog::COST_OPTIMIZATION));
        assert_eq!(types.last().map(String::as_str), Some(catalog::GENERAL));
        assert_eq!(types.len(), 8);
    }

    #[test]
    fn test_find_by_id() {
        let registry = AgentRegistry::from_agents(default_agents(3));
        let id = registry.all()[4].id();
        assert!(registry.find(id).is_some());
        assert!(registry.find(Uuid::new_v4()).is_none());
    }
}
