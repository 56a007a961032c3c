use crate::catalog::PERFORMANCE;
use crate::{Agent, AgentCapabilities, AgentContext};
use async_trait::async_trait;
use opsmesh_core::{OpsmeshResult, Recommendation, RiskLevel, Task};
use serde_json::json;

/// Latency and throughput analysis.
pub struct PerformanceAgent {
    ctx: AgentContext,
}

impl PerformanceAgent {
    /// Creates an instance with the given concurrency cap.
    pub fn new(max_concurrent_tasks: usize) -> Self {
        let capabilities = AgentCapabilities {
            supported_tasks: vec![
                "latency-analysis".to_string(),
                "throughput-review".to_string(),
                "slow-endpoint-triage".to_string(),
            ],
            max_concurrent_tasks,
            average_response_time_secs: 6.0,
            success_rate: 0.96,
        };
        Self {
            ctx: AgentContext::new(PERFORMANCE, capabilities),
        }
    }
}

#[async_trait]
impl Agent for PerformanceAgent {
    fn context(&self) -> &AgentContext {
        &self.ctx
    }

    async fn handle_task(&self, task: &Task) -> OpsmeshResult<serde_json::Value> {
        Ok(json!({
            "summary": format!("Performance profile captured: {}", task.description),
            "p50_ms": 42,
            "p99_ms": 870,
            "slowest_endpoint": "/api/v2/search",
            "regression_vs_baseline": true,
        }))
    }

    async fn build_recommendation(
        &self,
        _context: &serde_json::Value,
        _task_type: &str,
    ) -> OpsmeshResult<Recommendation> {
        Ok(Recommendation::new(
            PERFORMANCE,
            "Cache search facet counts",
            "Add a 60-second cache in front of the facet aggregation on /api/v2/search",
            "The endpoint recomputes identical aggregations on 80% of requests; p99 is 20x p50",
            0.78,
            RiskLevel::Medium,
        )
        .with_alternatives(vec!["Precompute facets in the indexing pipeline".to_string()])
        .with_rollback("Remove the cache layer; requests fall through to the aggregation"))
    }

    async fn reply(&self, message: &str, _context: &serde_json::Value) -> OpsmeshResult<String> {
        Ok(format!(
            "p99 is currently 870ms with /api/v2/search as the main offender. I can dig into \"{message}\" via a latency-analysis task."
        ))
    }
}
