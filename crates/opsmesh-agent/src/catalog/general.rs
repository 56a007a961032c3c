use crate::catalog::GENERAL;
use crate::{Agent, AgentCapabilities, AgentContext};
use async_trait::async_trait;
use opsmesh_core::{OpsmeshResult, Recommendation, RiskLevel, Task};
use serde_json::json;

/// Catch-all kind; receives every task type the router cannot classify.
pub struct GeneralAgent {
    ctx: AgentContext,
}

impl GeneralAgent {
    /// Creates an instance with the given concurrency cap.
    pub fn new(max_concurrent_tasks: usize) -> Self {
        let capabilities = AgentCapabilities {
            supported_tasks: vec!["general-inquiry".to_string()],
            max_concurrent_tasks,
            average_response_time_secs: 5.0,
            success_rate: 0.9,
        };
        Self {
            ctx: AgentContext::new(GENERAL, capabilities),
        }
    }
}

#[async_trait]
impl Agent for GeneralAgent {
    fn context(&self) -> &AgentContext {
        &self.ctx
    }

    async fn handle_task(&self, task: &Task) -> OpsmeshResult<serde_json::Value> {
        Ok(json!({
            "summary": format!("Handled: {}", task.description),
            "task_type": task.task_type,
            "note": "routed to the general agent; no specialist matched",
        }))
    }

    async fn build_recommendation(
        &self,
        _context: &serde_json::Value,
        task_type: &str,
    ) -> OpsmeshResult<Recommendation> {
        Ok(Recommendation::new(
            GENERAL,
            "Review unclassified task types",
            format!("Task type '{task_type}' has no specialist route; consider adding one"),
            "Unrouted work lands on the general pool and loses specialist context",
            0.5,
            RiskLevel::Low,
        ))
    }

    async fn reply(&self, message: &str, _context: &serde_json::Value) -> OpsmeshResult<String> {
        Ok(format!(
            "I can route that to a specialist if you rephrase with a domain keyword. You said: \"{message}\""
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handles_any_task_type() {
        let agent = GeneralAgent::new(2);
        agent.start().await;
        let done = agent
            .execute_task(Task::new("something-unheard-of", "mystery work"))
            .await;
        assert_eq!(done.status, opsmesh_core::TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_low_confidence_recommendation() {
        let agent = GeneralAgent::new(2);
        let rec = agent
            .generate_recommendation(&json!({}), "mystery-type")
            .await
            .unwrap();
        assert_eq!(rec.confidence, 0.5);
        assert_eq!(rec.risk_level, RiskLevel::Low);
    }
}
