//! The catalog of concrete agent kinds.
//!
//! Each kind is a thin struct around [`AgentContext`](crate::AgentContext)
//! with its own task logic, recommendation heuristic, and chat behavior.
//! [`default_agents`] instantiates the full catalog at orchestrator
//! startup; high-traffic kinds get two instances.

/// Regulatory and policy auditing.
pub mod compliance;
/// Cloud spend analysis.
pub mod cost;
/// Database health and query tuning.
pub mod database;
/// Catch-all fallback kind.
pub mod general;
/// Provisioning and deployment.
pub mod infrastructure;
/// Connectivity and DNS diagnostics.
pub mod network;
/// Latency and throughput analysis.
pub mod performance;
/// Vulnerability and threat assessment.
pub mod security;

pub use compliance::ComplianceAgent;
pub use cost::CostOptimizationAgent;
pub use database::DatabaseAgent;
pub use general::GeneralAgent;
pub use infrastructure::InfrastructureAgent;
pub use network::NetworkAgent;
pub use performance::PerformanceAgent;
pub use security::SecurityAgent;

use crate::Agent;
use std::sync::Arc;

/// Agent-type tag for [`CostOptimizationAgent`].
pub const COST_OPTIMIZATION: &str = "cost-optimization";
/// Agent-type tag for [`SecurityAgent`].
pub const SECURITY: &str = "security";
/// Agent-type tag for [`PerformanceAgent`].
pub const PERFORMANCE: &str = "performance";
/// Agent-type tag for [`ComplianceAgent`].
pub const COMPLIANCE: &str = "compliance";
/// Agent-type tag for [`DatabaseAgent`].
pub const DATABASE: &str = "database";
/// Agent-type tag for [`NetworkAgent`].
pub const NETWORK: &str = "network";
/// Agent-type tag for [`InfrastructureAgent`].
pub const INFRASTRUCTURE: &str = "infrastructure";
/// Agent-type tag for [`GeneralAgent`], the routing fallback.
pub const GENERAL: &str = "general";

/// Instantiates every known concrete agent.
///
/// Registration order is stable and is the tie-break order for
/// least-loaded selection. `max_concurrent_tasks` is the global per-agent
/// default from the orchestrator configuration.
pub fn default_agents(max_concurrent_tasks: usize) -> Vec<Arc<dyn Agent>> {
    vec![
        Arc::new(CostOptimizationAgent::new(max_concurrent_tasks)),
        Arc::new(CostOptimizationAgent::new(max_concurrent_tasks)),
        Arc::new(SecurityAgent::new(max_concurrent_tasks)),
        Arc::new(SecurityAgent::new(max_concurrent_tasks)),
        Arc::new(PerformanceAgent::new(max_concurrent_tasks)),
        Arc::new(ComplianceAgent::new(max_concurrent_tasks)),
        Arc::new(DatabaseAgent::new(max_concurrent_tasks)),
        Arc::new(NetworkAgent::new(max_concurrent_tasks)),
        Arc::new(InfrastructureAgent::new(max_concurrent_tasks)),
        Arc::new(GeneralAgent::new(max_concurrent_tasks)),
    ]
}
