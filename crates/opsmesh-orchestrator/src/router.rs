//! Keyword classification of task types to agent types.

use opsmesh_agent::catalog;

/// Fallback agent type when no rule matches.
pub const DEFAULT_AGENT_TYPE: &str = catalog::GENERAL;

/// Ordered classification rules. Evaluated top to bottom; the first rule
/// with any matching keyword wins, so the order is part of the contract.
const RULES: &[(&[&str], &str)] = &[
    (&["cost", "budget", "billing", "spend"], catalog::COST_OPTIMIZATION),
    (&["security", "vulnerability", "threat", "cve"], catalog::SECURITY),
    (&["performance", "latency", "slow", "throughput"], catalog::PERFORMANCE),
    (&["compliance", "audit", "policy", "governance"], catalog::COMPLIANCE),
    (&["database", "sql", "query", "index"], catalog::DATABASE),
    (&["network", "dns", "firewall", "routing"], catalog::NETWORK),
    (&["deploy", "provision", "infrastructure", "terraform"], catalog::INFRASTRUCTURE),
];

/// Maps a task's type string to the agent type that should handle it.
///
/// Pure and deterministic: case-insensitive substring matching against the
/// ordered rule table, falling back to [`DEFAULT_AGENT_TYPE`].
pub fn classify(task_type: &str) -> &'static str {
    let needle = task_type.to_lowercase();
    for (keywords, agent_type) in RULES {
        if keywords.iter().any(|k| needle.contains(k)) {
            return agent_type;
        }
    }
    DEFAULT_AGENT_TYPE
}
