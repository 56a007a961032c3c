use crate::catalog::NETWORK;
use crate::{Agent, AgentCapabilities, AgentContext};
use async_trait::async_trait;
use opsmesh_core::{OpsmeshResult, Recommendation, RiskLevel, Task};
use serde_json::json;

/// Connectivity, DNS, and firewall diagnostics.
pub struct NetworkAgent {
    ctx: AgentContext,
}

impl NetworkAgent {
    /// Creates an instance with the given concurrency cap.
    pub fn new(max_concurrent_tasks: usize) -> Self {
        let capabilities = AgentCapabilities {
            supported_tasks: vec![
                "dns-diagnostics".to_string(),
                "firewall-review".to_string(),
                "connectivity-check".to_string(),
            ],
            max_concurrent_tasks,
            average_response_time_secs: 3.0,
            success_rate: 0.98,
        };
        Self {
            ctx: AgentContext::new(NETWORK, capabilities),
        }
    }
}

#[async_trait]
impl Agent for NetworkAgent {
    fn context(&self) -> &AgentContext {
        &self.ctx
    }

    async fn handle_task(&self, task: &Task) -> OpsmeshResult<serde_json::Value> {
        Ok(json!({
            "summary": format!("Network diagnostics done: {}", task.description),
            "unreachable_endpoints": 0,
            "open_ingress_rules": 5,
            "dns_anomalies": 1,
        }))
    }

    async fn build_recommendation(
        &self,
        _context: &serde_json::Value,
        _task_type: &str,
    ) -> OpsmeshResult<Recommendation> {
        Ok(Recommendation::new(
            NETWORK,
            "Tighten 0.0.0.0/0 ingress on the staging security group",
            "Restrict SSH ingress to the VPN CIDR",
            "Five rules allow world ingress; only the load balancer ports need it",
            0.9,
            RiskLevel::Medium,
        )
        .with_rollback("Re-apply the previous security group revision"))
    }

    async fn reply(&self, message: &str, _context: &serde_json::Value) -> OpsmeshResult<String> {
        Ok(format!(
            "All endpoints reachable; one DNS anomaly under watch. For \"{message}\", run a connectivity-check task with the target host to get a full trace."
        ))
    }
}
