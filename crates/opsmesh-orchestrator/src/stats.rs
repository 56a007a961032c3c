use opsmesh_core::TaskStatus;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Aggregate dispatch statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrchestratorStats {
    /// Tasks accepted by `submit_task`.
    pub tasks_submitted: u64,
    /// Tasks assigned to an agent.
    pub tasks_dispatched: u64,
    /// Tasks that entered the FIFO queue at least once.
    pub tasks_queued: u64,
    /// Terminal outcome counts.
    pub tasks_completed: u64,
    /// See `tasks_completed`.
    pub tasks_failed: u64,
    /// See `tasks_completed`.
    pub tasks_timed_out: u64,
    /// See `tasks_completed`.
    pub tasks_cancelled: u64,
    /// Routing decisions per target agent type.
    pub routed_by_type: HashMap<String, u64>,
}

/// Tracks dispatch statistics for the orchestrator.
pub struct StatsTracker {
    inner: RwLock<OrchestratorStats>,
}

impl StatsTracker {
    /// Creates a zeroed tracker.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(OrchestratorStats::default()),
        }
    }

    /// Records a submission and its routing decision.
    pub async fn record_submitted(&self, agent_type: &str) {
        let mut stats = self.inner.write().await;
        stats.tasks_submitted += 1;
        *stats.routed_by_type.entry(agent_type.to_string()).or_insert(0) += 1;
    }

    /// Records a successful dispatch to an agent.
    pub async fn record_dispatched(&self) {
        self.inner.write().await.tasks_dispatched += 1;
    }

    /// Records a task entering the queue.
    pub async fn record_queued(&self) {
        self.inner.write().await.tasks_queued += 1;
    }

    /// Records a terminal outcome.
    pub async fn record_outcome(&self, status: TaskStatus) {
        let mut stats = self.inner.write().await;
        match status {
            TaskStatus::Completed => stats.tasks_completed += 1,
            TaskStatus::Failed => stats.tasks_failed += 1,
            TaskStatus::Timeout => stats.tasks_timed_out += 1,
            TaskStatus::Cancelled => stats.tasks_cancelled += 1,
            TaskStatus::Pending | TaskStatus::InProgress => {}
        }
    }

    /// Returns a copy of the current statistics.
    pub async fn snapshot(&self) -> OrchestratorStats {
        self.inner.read().await.clone()
    }

    /// Serializes the current statistics.
    pub async fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self.snapshot().await)
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_submissions_and_routing() {
        let tracker = StatsTracker::new();
        tracker.record_submitted("security").await;
        tracker.record_submitted("security").await;
        tracker.record_submitted("general").await;

        let stats = tracker.snapshot().await;
        assert_eq!(stats.tasks_submitted, 3);
        assert_eq!(stats.routed_by_type["security"], 2);
        assert_eq!(stats.routed_by_type["general"], 1);
    }

    #[tokio::test]
    async fn test_record_outcomes() {
        let tracker = StatsTracker::new();
        tracker.record_outcome(TaskStatus::Completed).await;
        tracker.record_outcome(TaskStatus::Failed).await;
        tracker.record_outcome(TaskStatus::Timeout).await;
        tracker.record_outcome(TaskStatus::Cancelled).await;
        // Non-terminal statuses are ignored.
        tracker.record_outcome(TaskStatus::Pending).await;

        let stats = tracker.snapshot().await;
        assert_eq!(stats.tasks_completed, 1);
        assert_eq!(stats.tasks_failed, 1);
        assert_eq!(stats.tasks_timed_out, 1);
        assert_eq!(stats.tasks_cancelled, 1);
    }

    #[tokio::test]
    async fn test_to_json_shape() {
        let tracker = StatsTracker::new();
        tracker.record_submitted("database").await;
        tracker.record_dispatched().await;
        let json = tracker.to_json().await;
        assert_eq!(json["tasks_submitted"], 1);
        assert_eq!(json["tasks_dispatched"], 1);
        assert!(json["routed_by_type"].is_object());
    }
}
