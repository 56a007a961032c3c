use crate::catalog::COMPLIANCE;
use crate::{Agent, AgentCapabilities, AgentContext};
use async_trait::async_trait;
use opsmesh_core::{OpsmeshResult, Recommendation, RiskLevel, Task};
use serde_json::json;

/// Policy and regulatory auditing.
pub struct ComplianceAgent {
    ctx: AgentContext,
}

impl ComplianceAgent {
    /// Creates an instance with the given concurrency cap.
    pub fn new(max_concurrent_tasks: usize) -> Self {
        let capabilities = AgentCapabilities {
            supported_tasks: vec![
                "policy-audit".to_string(),
                "governance-review".to_string(),
                "access-review".to_string(),
            ],
            max_concurrent_tasks,
            average_response_time_secs: 12.0,
            success_rate: 0.92,
        };
        Self {
            ctx: AgentContext::new(COMPLIANCE, capabilities),
        }
    }
}

#[async_trait]
impl Agent for ComplianceAgent {
    fn context(&self) -> &AgentContext {
        &self.ctx
    }

    async fn handle_task(&self, task: &Task) -> OpsmeshResult<serde_json::Value> {
        let framework = task
            .context
            .get("framework")
            .and_then(|v| v.as_str())
            .unwrap_or("SOC 2");
        Ok(json!({
            "summary": format!("Audit pass complete against {framework}"),
            "controls_checked": 96,
            "controls_failing": 4,
            "expiring_access_grants": 12,
        }))
    }

    async fn build_recommendation(
        &self,
        context: &serde_json::Value,
        _task_type: &str,
    ) -> OpsmeshResult<Recommendation> {
        let framework = context
            .get("framework")
            .and_then(|v| v.as_str())
            .unwrap_or("SOC 2");
        Ok(Recommendation::new(
            COMPLIANCE,
            "Automate quarterly access reviews",
            "Wire the identity provider's review campaigns to the ticketing system",
            format!("4 {framework} controls fail on evidence of periodic access review"),
            0.81,
            RiskLevel::Medium,
        )
        .with_prerequisites(vec!["Identity provider API access".to_string()]))
    }

    async fn reply(&self, message: &str, _context: &serde_json::Value) -> OpsmeshResult<String> {
        Ok(format!(
            "4 controls are currently failing, all around access review evidence. For \"{message}\", a policy-audit task will produce the full control matrix."
        ))
    }
}
