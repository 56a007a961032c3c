use crate::{AgentCapabilities, AgentStatus};
use opsmesh_core::{OpsmeshError, OpsmeshResult, Task};
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Per-agent completed-history bound.
const COMPLETED_HISTORY_LIMIT: usize = 100;

/// Mutable state shared by every agent instance.
struct AgentState {
    active: bool,
    current_tasks: HashMap<Uuid, Task>,
    completed_tasks: VecDeque<Task>,
}

impl AgentState {
    fn push_completed(&mut self, task: Task) {
        self.completed_tasks.push_back(task);
        if self.completed_tasks.len() > COMPLETED_HISTORY_LIMIT {
            self.completed_tasks.pop_front();
        }
    }
}

/// Identity, capabilities, and lifecycle state owned by one agent instance.
///
/// Check-then-act pairs (active check + registration, capacity check +
/// insert) happen under a single write-lock acquisition, so the in-flight
/// map can never exceed `capabilities.max_concurrent_tasks`.
pub struct AgentContext {
    /// Instance identity, generated at construction.
    pub id: Uuid,
    /// Agent-type tag.
    pub agent_type: String,
    /// The advertised capability descriptor.
    pub capabilities: AgentCapabilities,
    state: RwLock<AgentState>,
}

impl AgentContext {
    /// Creates an inactive context for a new agent instance.
    pub fn new(agent_type: impl Into<String>, capabilities: AgentCapabilities) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent_type: agent_type.into(),
            capabilities,
            state: RwLock::new(AgentState {
                active: false,
                current_tasks: HashMap::new(),
                completed_tasks: VecDeque::new(),
            }),
        }
    }

    /// Sets the active flag.
    pub async fn activate(&self) {
        self.state.write().await.active = true;
    }

    /// Clears the active flag and cancels all in-flight tasks, moving them
    /// to the completed history. Returns how many were cancelled.
    pub async fn deactivate(&self) -> usize {
        let mut state = self.state.write().await;
        state.active = false;
        let in_flight: Vec<Task> = state.current_tasks.drain().map(|(_, t)| t).collect();
        let cancelled = in_flight.len();
        for mut task in in_flight {
            task.cancel();
            state.push_completed(task);
        }
        cancelled
    }

    /// Whether the agent currently accepts new tasks.
    pub async fn is_active(&self) -> bool {
        self.state.read().await.active
    }

    /// Atomically verifies the agent is active and below capacity, marks
    /// the task `InProgress`, and registers it as owned by this instance.
    pub async fn begin_task(&self, task: &mut Task) -> OpsmeshResult<()> {
        let mut state = self.state.write().await;
        if !state.active {
            return Err(OpsmeshError::Agent("agent not active".to_string()));
        }
        if state.current_tasks.len() >= self.capabilities.max_concurrent_tasks {
            return Err(OpsmeshError::Agent(format!(
                "agent at capacity ({} tasks)",
                self.capabilities.max_concurrent_tasks
            )));
        }
        task.begin();
        state.current_tasks.insert(task.id, task.clone());
        Ok(())
    }

    /// Records the outcome of a task previously registered with
    /// [`begin_task`](Self::begin_task) and returns it with a terminal
    /// status.
    ///
    /// If the task is no longer in the in-flight map a concurrent
    /// [`deactivate`](Self::deactivate) already cancelled it; the
    /// cancellation wins over the late outcome and the history is not
    /// touched again.
    pub async fn finish_task(
        &self,
        mut task: Task,
        outcome: OpsmeshResult<serde_json::Value>,
    ) -> Task {
        let mut state = self.state.write().await;
        if state.current_tasks.remove(&task.id).is_none() {
            task.cancel();
            return task;
        }
        match outcome {
            Ok(result) => task.complete(result),
            Err(e) => task.fail(e.to_string()),
        }
        state.push_completed(task.clone());
        task
    }

    /// Observability snapshot.
    pub async fn snapshot(&self) -> AgentStatus {
        let state = self.state.read().await;
        AgentStatus {
            id: self.id,
            agent_type: self.agent_type.clone(),
            active: state.active,
            current_task_count: state.current_tasks.len(),
            completed_task_count: state.completed_tasks.len(),
            capabilities: self.capabilities.clone(),
        }
    }

    /// Number of tasks currently in flight.
    pub async fn current_task_count(&self) -> usize {
        self.state.read().await.current_tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_context(max_concurrent: usize) -> AgentContext {
        AgentContext::new(
            "general",
            AgentCapabilities {
                supported_tasks: vec!["anything".to_string()],
                max_concurrent_tasks: max_concurrent,
                average_response_time_secs: 1.0,
                success_rate: 0.99,
            },
        )
    }

    #[tokio::test]
    async fn test_new_context_inactive() {
        let ctx = test_context(2);
        assert!(!ctx.is_active().await);
        assert_eq!(ctx.current_task_count().await, 0);
    }

    #[tokio::test]
    async fn test_begin_task_rejected_while_inactive() {
        let ctx = test_context(2);
        let mut task = Task::new("t", "d");
        let err = ctx.begin_task(&mut task).await.unwrap_err();
        assert!(err.to_string().contains("agent not active"));
        // Never entered in-progress.
        assert_eq!(task.status, opsmesh_core::TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_capacity_enforced() {
        let ctx = test_context(1);
        ctx.activate().await;

        let mut first = Task::new("t", "one");
        ctx.begin_task(&mut first).await.unwrap();

        let mut second = Task::new("t", "two");
        let err = ctx.begin_task(&mut second).await.unwrap_err();
        assert!(err.to_string().contains("at capacity"));
        assert_eq!(ctx.current_task_count().await, 1);
    }

    #[tokio::test]
    async fn test_finish_task_success() {
        let ctx = test_context(2);
        ctx.activate().await;

        let mut task = Task::new("t", "d");
        ctx.begin_task(&mut task).await.unwrap();

        let done = ctx.finish_task(task, Ok(json!({"ok": true}))).await;
        assert_eq!(done.status, opsmesh_core::TaskStatus::Completed);
        assert_eq!(ctx.current_task_count().await, 0);

        let status = ctx.snapshot().await;
        assert_eq!(status.completed_task_count, 1);
    }

    #[tokio::test]
    async fn test_finish_task_failure_captures_message() {
        let ctx = test_context(2);
        ctx.activate().await;

        let mut task = Task::new("t", "d");
        ctx.begin_task(&mut task).await.unwrap();

        let done = ctx
            .finish_task(task, Err(OpsmeshError::Agent("exploded".to_string())))
            .await;
        assert_eq!(done.status, opsmesh_core::TaskStatus::Failed);
        assert!(done.error.as_deref().unwrap_or_default().contains("exploded"));
    }

    #[tokio::test]
    async fn test_deactivate_cancels_in_flight() {
        let ctx = test_context(3);
        ctx.activate().await;

        for i in 0..3 {
            let mut task = Task::new("t", format!("task {i}"));
            ctx.begin_task(&mut task).await.unwrap();
        }

        let cancelled = ctx.deactivate().await;
        assert_eq!(cancelled, 3);
        assert_eq!(ctx.current_task_count().await, 0);

        let status = ctx.snapshot().await;
        assert!(!status.active);
        assert_eq!(status.completed_task_count, 3);
    }

    #[tokio::test]
    async fn test_cancellation_wins_over_late_outcome() {
        let ctx = test_context(2);
        ctx.activate().await;

        let mut task = Task::new("t", "d");
        ctx.begin_task(&mut task).await.unwrap();

        // Agent stops while the task is mid-flight.
        ctx.deactivate().await;

        let done = ctx.finish_task(task, Ok(json!("late result"))).await;
        assert_eq!(done.status, opsmesh_core::TaskStatus::Cancelled);
        // History holds only the entry recorded by deactivate.
        assert_eq!(ctx.snapshot().await.completed_task_count, 1);
    }

    #[tokio::test]
    async fn test_completed_history_bounded() {
        let ctx = test_context(1);
        ctx.activate().await;

        for i in 0..(COMPLETED_HISTORY_LIMIT + 10) {
            let mut task = Task::new("t", format!("task {i}"));
            ctx.begin_task(&mut task).await.unwrap();
            ctx.finish_task(task, Ok(json!(i))).await;
        }

        let status = ctx.snapshot().await;
        assert_eq!(status.completed_task_count, COMPLETED_HISTORY_LIMIT);
    }
}
