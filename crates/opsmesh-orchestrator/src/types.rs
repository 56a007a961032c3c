use chrono::{DateTime, Utc};
use opsmesh_agent::AgentStatus;
use opsmesh_core::Task;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Binds a task to the agent instance chosen to run it.
///
/// Exists in the active map while the task is outstanding; on any terminal
/// outcome it moves to the bounded completed history.
#[derive(Debug, Clone, Serialize)]
pub struct TaskAssignment {
    /// The orchestrator's view of the task.
    pub task: Task,
    /// Identity of the executing agent instance.
    pub agent_id: Uuid,
    /// Type tag of the executing agent.
    pub agent_type: String,
    /// When the assignment was made.
    pub assigned_at: DateTime<Utc>,
}

impl TaskAssignment {
    /// Creates an assignment stamped with the current time.
    pub fn new(task: Task, agent_id: Uuid, agent_type: impl Into<String>) -> Self {
        Self {
            task,
            agent_id,
            agent_type: agent_type.into(),
            assigned_at: Utc::now(),
        }
    }
}

/// Lifecycle state of the orchestrator itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrchestratorState {
    /// Constructed; agents registered but not started.
    Initializing,
    /// Accepting and dispatching tasks.
    Running,
    /// Accepting tasks; the queue drainer is idle.
    Paused,
    /// Shutting down; cancelling active assignments.
    Stopping,
    /// Fully stopped.
    Stopped,
    /// Unrecoverable failure during construction or shutdown.
    Error,
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrchestratorState::Initializing => write!(f, "initializing"),
            OrchestratorState::Running => write!(f, "running"),
            OrchestratorState::Paused => write!(f, "paused"),
            OrchestratorState::Stopping => write!(f, "stopping"),
            OrchestratorState::Stopped => write!(f, "stopped"),
            OrchestratorState::Error => write!(f, "error"),
        }
    }
}

/// Configuration surface of the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Global per-agent default for simultaneous in-flight tasks.
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,
    /// Wall-clock budget for one task execution.
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
    /// Carried configuration; not consulted by the dispatch logic.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Interval between queue-drain attempts.
    #[serde(default = "default_queue_drain_interval_ms")]
    pub queue_drain_interval_ms: u64,
    /// Interval between liveness-restoration sweeps.
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,
}

fn default_max_concurrent_tasks() -> usize {
    5
}
fn default_task_timeout_secs() -> u64 {
    300
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_queue_drain_interval_ms() -> u64 {
    1000
}
fn default_health_check_interval_secs() -> u64 {
    30
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: default_max_concurrent_tasks(),
            task_timeout_secs: default_task_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            queue_drain_interval_ms: default_queue_drain_interval_ms(),
            health_check_interval_secs: default_health_check_interval_secs(),
        }
    }
}

impl OrchestratorConfig {
    /// The per-task execution timeout as a [`Duration`].
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    /// The queue-drain interval as a [`Duration`].
    pub fn drain_interval(&self) -> Duration {
        Duration::from_millis(self.queue_drain_interval_ms)
    }

    /// The health-check interval as a [`Duration`].
    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs)
    }
}

/// Result of a task-status lookup.
///
/// Lookup order is active assignments, then the bounded completed history.
/// A task that is queued but never dispatched, or whose history entry was
/// evicted, reports `NotFound`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskReport {
    /// The task has an outstanding assignment.
    Active {
        /// The orchestrator's view of the task.
        task: Task,
        /// Executing agent instance.
        agent_id: Uuid,
        /// Executing agent type.
        agent_type: String,
        /// When the assignment was made.
        assigned_at: DateTime<Utc>,
    },
    /// The task reached a terminal status.
    Finished {
        /// The terminal task.
        task: Task,
    },
    /// Unknown id: never submitted, still queued, or evicted.
    NotFound,
}

/// Full observability snapshot of the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorSnapshot {
    /// Current lifecycle state.
    pub state: OrchestratorState,
    /// Number of registered agent instances.
    pub agent_count: usize,
    /// Number of outstanding assignments.
    pub active_task_count: usize,
    /// Number of tasks waiting in the FIFO queue.
    pub queued_task_count: usize,
    /// Per-instance agent statuses.
    pub agents: Vec<AgentStatus>,
    /// Dispatch statistics.
    pub stats: crate::stats::OrchestratorStats,
}
