use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Advisory priority of a task.
///
/// The queue is FIFO regardless of priority; the field is carried and
/// serialized so that callers and future schedulers can use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Background work with no urgency.
    Low,
    /// Normal work.
    Medium,
    /// Urgent work.
    High,
    /// Drop-everything work.
    Critical,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Status of a task in its lifecycle.
///
/// `Completed`, `Failed`, `Timeout`, and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created but not yet picked up by an agent (may be queued).
    Pending,
    /// Currently owned and executed by exactly one agent.
    InProgress,
    /// Finished successfully; `result` is set.
    Completed,
    /// Finished with an error; `error` is set.
    Failed,
    /// Execution exceeded the configured timeout; `error` is set.
    Timeout,
    /// Abandoned (agent or orchestrator stopped); distinct from `Failed`.
    Cancelled,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Timeout => write!(f, "timeout"),
            TaskStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A unit of work dispatched to an agent.
///
/// The id is immutable after creation; status, result, and error are
/// mutated exclusively by the current owner (orchestrator or the one
/// agent executing it). Every status transition refreshes `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Globally unique identifier, generated at creation.
    pub id: Uuid,
    /// Free-form string classifying the work; drives routing.
    pub task_type: String,
    /// Human-readable label, diagnostic only.
    pub description: String,
    /// Arbitrary key-value payload passed to the agent.
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
    /// Advisory priority.
    #[serde(default)]
    pub priority: TaskPriority,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Payload set only on successful completion.
    pub result: Option<serde_json::Value>,
    /// Message set only on failed/timeout/cancelled outcomes.
    pub error: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every status transition.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new pending task of the given type.
    pub fn new(task_type: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            task_type: task_type.into(),
            description: description.into(),
            context: HashMap::new(),
            priority: TaskPriority::default(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the advisory priority.
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Attaches a context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Transitions to `InProgress`.
    pub fn begin(&mut self) {
        self.set_status(TaskStatus::InProgress);
    }

    /// Transitions to `Completed` with the given result payload.
    pub fn complete(&mut self, result: serde_json::Value) {
        self.result = Some(result);
        self.set_status(TaskStatus::Completed);
    }

    /// Transitions to `Failed` with the given error message.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.set_status(TaskStatus::Failed);
    }

    /// Transitions to `Timeout` with the given error message.
    pub fn time_out(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.set_status(TaskStatus::Timeout);
    }

    /// Transitions to `Cancelled`.
    pub fn cancel(&mut self) {
        self.set_status(TaskStatus::Cancelled);
    }

    /// True for `Completed`, `Failed`, `Timeout`, and `Cancelled`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Timeout | TaskStatus::Cancelled
        )
    }

    fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
