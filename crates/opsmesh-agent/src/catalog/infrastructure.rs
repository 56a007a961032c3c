use crate::catalog::INFRASTRUCTURE;
use crate::{Agent, AgentCapabilities, AgentContext};
use async_trait::async_trait;
use opsmesh_core::{OpsmeshResult, Recommendation, RiskLevel, Task};
use serde_json::json;

/// Provisioning and deployment planning.
pub struct InfrastructureAgent {
    ctx: AgentContext,
}

impl InfrastructureAgent {
    /// Creates an instance with the given concurrency cap.
    pub fn new(max_concurrent_tasks: usize) -> Self {
        let capabilities = AgentCapabilities {
            supported_tasks: vec![
                "deploy-plan".to_string(),
                "provision-review".to_string(),
                "drift-detection".to_string(),
            ],
            max_concurrent_tasks,
            average_response_time_secs: 15.0,
            success_rate: 0.91,
        };
        Self {
            ctx: AgentContext::new(INFRASTRUCTURE, capabilities),
        }
    }
}

#[async_trait]
impl Agent for InfrastructureAgent {
    fn context(&self) -> &AgentContext {
        &self.ctx
    }

    async fn handle_task(&self, task: &Task) -> OpsmeshResult<serde_json::Value> {
        let environment = task
            .context
            .get("environment")
            .and_then(|v| v.as_str())
            .unwrap_or("staging");
        Ok(json!({
            "summary": format!("Infrastructure plan ready for {environment}"),
            "resources_to_create": 4,
            "resources_to_change": 9,
            "resources_to_destroy": 0,
            "drifted_resources": 2,
        }))
    }

    async fn build_recommendation(
        &self,
        _context: &serde_json::Value,
        _task_type: &str,
    ) -> OpsmeshResult<Recommendation> {
        Ok(Recommendation::new(
            INFRASTRUCTURE,
            "Reconcile drifted resources before the next deploy",
            "Two manually-edited resources will be clobbered by the next apply",
            "Plan output shows drift on the bastion security group and an IAM role",
            0.72,
            RiskLevel::High,
        )
        .with_prerequisites(vec![
            "Change window approval".to_string(),
            "State file backup".to_string(),
        ])
        .with_rollback("Restore the backed-up state file and re-import the resources"))
    }

    async fn reply(&self, message: &str, _context: &serde_json::Value) -> OpsmeshResult<String> {
        Ok(format!(
            "Two resources have drifted from the declared state. To follow up on \"{message}\", submit a drift-detection task for the full diff."
        ))
    }
}
