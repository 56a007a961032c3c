//! The agent contract for the Opsmesh platform.
//!
//! An agent is a long-lived, stateful worker identified by an agent-type
//! tag. It advertises a capability descriptor and executes tasks routed to
//! it by the orchestrator. Concrete agent kinds live in [`catalog`]; they
//! implement the [`Agent`] trait's required hooks while the lifecycle
//! methods (`start`, `stop`, `execute_task`, `chat`, `status`) are provided
//! by the trait and shared by every kind.
//!
//! # Main types
//!
//! - [`Agent`] — The polymorphic worker contract.
//! - [`AgentContext`] — Shared per-instance state (active flag, in-flight tasks).
//! - [`AgentCapabilities`] — Supported task types and concurrency limits.
//! - [`AgentStatus`] — Observability snapshot of one instance.

/// Concrete agent implementations and the startup constructor.
pub mod catalog;
/// Shared per-instance agent state.
pub mod context;

pub use context::AgentContext;

use async_trait::async_trait;
use opsmesh_core::{OpsmeshError, OpsmeshResult, Recommendation, Task};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Capability descriptor advertised by an agent instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCapabilities {
    /// Task-type strings the agent declares it can execute. Advisory: the
    /// router's classification may deliver a task type not listed here.
    pub supported_tasks: Vec<String>,
    /// Upper bound on simultaneous in-flight tasks for one instance.
    pub max_concurrent_tasks: usize,
    /// Nominal response time in seconds, informational only.
    pub average_response_time_secs: f64,
    /// Historical success rate, informational only.
    pub success_rate: f64,
}

/// Observability snapshot of one agent instance.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    /// Instance identity.
    pub id: Uuid,
    /// Agent-type tag.
    pub agent_type: String,
    /// Whether the agent accepts new tasks.
    pub active: bool,
    /// Number of tasks currently owned by this instance.
    pub current_task_count: usize,
    /// Number of entries in the per-agent completed history.
    pub completed_task_count: usize,
    /// The advertised capability descriptor.
    pub capabilities: AgentCapabilities,
}

/// The polymorphic worker contract.
///
/// Implementors supply the agent-kind-specific hooks (`handle_task`,
/// `build_recommendation`, `reply`, optionally `warm_up`) and expose their
/// [`AgentContext`]; everything else is provided. Lifecycle failures are
/// recovered here and surfaced as data: `start` and `chat` never propagate
/// errors, and `execute_task` always returns the task with a terminal
/// status on any failure.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The instance's shared state.
    fn context(&self) -> &AgentContext;

    /// Agent-kind-specific task logic. Called only while the task is
    /// registered as in-flight on this instance.
    async fn handle_task(&self, task: &Task) -> OpsmeshResult<serde_json::Value>;

    /// Agent-kind-specific recommendation heuristic.
    async fn build_recommendation(
        &self,
        context: &serde_json::Value,
        task_type: &str,
    ) -> OpsmeshResult<Recommendation>;

    /// Agent-kind-specific conversational reply.
    async fn reply(&self, message: &str, context: &serde_json::Value) -> OpsmeshResult<String>;

    /// Warm-up hook run by `start`. Defaults to a no-op.
    async fn warm_up(&self) -> OpsmeshResult<()> {
        Ok(())
    }

    /// Instance identity.
    fn id(&self) -> Uuid {
        self.context().id
    }

    /// Agent-type tag.
    fn agent_type(&self) -> &str {
        &self.context().agent_type
    }

    /// The advertised capability descriptor.
    fn capabilities(&self) -> &AgentCapabilities {
        &self.context().capabilities
    }

    /// Runs the warm-up hook and sets the active flag.
    ///
    /// A warm-up failure is logged and leaves the agent inactive; it is
    /// never thrown to the caller.
    async fn start(&self) -> bool {
        match self.warm_up().await {
            Ok(()) => {
                self.context().activate().await;
                info!(agent_type = %self.agent_type(), id = %self.id(), "agent started");
                true
            }
            Err(e) => {
                warn!(agent_type = %self.agent_type(), id = %self.id(), error = %e, "agent failed to start");
                false
            }
        }
    }

    /// Clears the active flag and cancels every in-flight task.
    ///
    /// Cancelled tasks move to the per-agent completed history with status
    /// `Cancelled` (abandoned, not erred).
    async fn stop(&self) -> bool {
        let cancelled = self.context().deactivate().await;
        info!(agent_type = %self.agent_type(), id = %self.id(), cancelled, "agent stopped");
        true
    }

    /// Executes one task to a terminal status.
    ///
    /// An inactive agent fails the task immediately with "agent not
    /// active" without it ever entering `InProgress`. Otherwise the task
    /// is registered as in-flight, the kind-specific logic runs, and the
    /// outcome (completed/failed) is recorded; if a concurrent `stop`
    /// cancelled the task mid-flight, the cancellation wins.
    async fn execute_task(&self, mut task: Task) -> Task {
        if let Err(e) = self.context().begin_task(&mut task).await {
            let reason = match e {
                OpsmeshError::Agent(msg) => msg,
                other => other.to_string(),
            };
            task.fail(reason);
            return task;
        }
        let outcome = self.handle_task(&task).await;
        self.context().finish_task(task, outcome).await
    }

    /// Best-effort conversational reply; internal failures become an
    /// apologetic text response rather than propagating.
    async fn chat(&self, message: &str, context: &serde_json::Value) -> String {
        match self.reply(message, context).await {
            Ok(text) => text,
            Err(e) => {
                warn!(agent_type = %self.agent_type(), error = %e, "chat failed");
                "I'm sorry, I couldn't process that request right now. Please try again.".to_string()
            }
        }
    }

    /// Produces a structured recommendation from arbitrary context.
    async fn generate_recommendation(
        &self,
        context: &serde_json::Value,
        task_type: &str,
    ) -> OpsmeshResult<Recommendation> {
        self.build_recommendation(context, task_type).await
    }

    /// Observability snapshot of this instance.
    async fn status(&self) -> AgentStatus {
        self.context().snapshot().await
    }
}
