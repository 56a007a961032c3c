use crate::history::CompletedHistory;
use crate::registry::AgentRegistry;
use crate::router;
use crate::stats::StatsTracker;
use crate::task_queue::TaskQueue;
use crate::types::{
    OrchestratorConfig, OrchestratorSnapshot, OrchestratorState, TaskAssignment, TaskReport,
};
use opsmesh_agent::{Agent, AgentStatus};
use opsmesh_core::{OpsmeshError, OpsmeshResult, Recommendation, Task};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Dispatch bookkeeping guarded by one lock, so capacity checks and their
/// corresponding inserts cannot interleave across submitters.
struct DispatchState {
    active: HashMap<Uuid, TaskAssignment>,
    queue: TaskQueue,
    history: CompletedHistory,
}

/// How one execution ended, as observed by the engine.
enum Outcome {
    /// The agent returned the task with a terminal status.
    Finished(Box<Task>),
    /// The execution task itself died (panic or runtime shutdown).
    Aborted(String),
    /// The wait expired; the agent-side work may still be running.
    TimedOut(u64),
}

struct Core {
    config: OrchestratorConfig,
    registry: AgentRegistry,
    state: RwLock<OrchestratorState>,
    dispatch: Mutex<DispatchState>,
    stats: StatsTracker,
}

/// The task orchestration engine.
///
/// Composes the agent registry, the router, the FIFO queue, the bounded
/// completed history, and two background loops (queue drainer, health
/// monitor), and exposes the platform's public contract: submit tasks,
/// query status, collect recommendations, broadcast chat.
pub struct Orchestrator {
    core: Arc<Core>,
    loops: Mutex<Vec<JoinHandle<()>>>,
}

impl Orchestrator {
    /// Creates an orchestrator over the default agent catalog.
    ///
    /// The only fatal, propagated failure in the platform: an empty
    /// registry out of agent construction.
    pub fn new(config: OrchestratorConfig) -> OpsmeshResult<Self> {
        let agents = opsmesh_agent::catalog::default_agents(config.max_concurrent_tasks);
        Self::with_agents(config, agents)
    }

    /// Creates an orchestrator over explicitly constructed agents.
    pub fn with_agents(
        config: OrchestratorConfig,
        agents: Vec<Arc<dyn Agent>>,
    ) -> OpsmeshResult<Self> {
        if agents.is_empty() {
            return Err(OpsmeshError::Orchestrator(
                "agent construction produced an empty registry".to_string(),
            ));
        }
        let registry = AgentRegistry::from_agents(agents);
        info!(
            agents = registry.len(),
            types = registry.agent_types().len(),
            "agent registry populated"
        );
        Ok(Self {
            core: Arc::new(Core {
                config,
                registry,
                state: RwLock::new(OrchestratorState::Initializing),
                dispatch: Mutex::new(DispatchState {
                    active: HashMap::new(),
                    queue: TaskQueue::new(),
                    history: CompletedHistory::new(),
                }),
                stats: StatsTracker::new(),
            }),
            loops: Mutex::new(Vec::new()),
        })
    }

    /// The orchestrator's current lifecycle state.
    pub async fn state(&self) -> OrchestratorState {
        *self.core.state.read().await
    }

    /// Starts every registered agent and launches the background loops.
    ///
    /// Per-agent start failures are logged and leave that agent inactive;
    /// the orchestrator still transitions to `Running`. The health monitor
    /// will keep retrying failed agents.
    pub async fn start(&self) {
        {
            let state = *self.core.state.read().await;
            if matches!(state, OrchestratorState::Running | OrchestratorState::Paused) {
                warn!(%state, "start called while already started");
                return;
            }
        }

        for agent in self.core.registry.all() {
            if !agent.start().await {
                warn!(
                    agent_type = %agent.agent_type(),
                    id = %agent.id(),
                    "agent failed to start; continuing without it"
                );
            }
        }

        let mut loops = self.loops.lock().await;
        loops.push(Core::spawn_queue_drainer(Arc::clone(&self.core)));
        loops.push(Core::spawn_health_monitor(Arc::clone(&self.core)));

        *self.core.state.write().await = OrchestratorState::Running;
        info!(agents = self.core.registry.len(), "orchestrator running");
    }

    /// Cancels all active assignments, stops every agent, and shuts the
    /// background loops down.
    pub async fn stop(&self) {
        *self.core.state.write().await = OrchestratorState::Stopping;

        let cancelled = {
            let mut dispatch = self.core.dispatch.lock().await;
            let active = std::mem::take(&mut dispatch.active);
            let count = active.len();
            for (_, mut assignment) in active {
                assignment.task.cancel();
                dispatch.history.push(assignment);
            }
            count
        };
        for _ in 0..cancelled {
            self.core
                .stats
                .record_outcome(opsmesh_core::TaskStatus::Cancelled)
                .await;
        }
        if cancelled > 0 {
            info!(cancelled, "active assignments cancelled on shutdown");
        }

        for agent in self.core.registry.all() {
            agent.stop().await;
        }

        for handle in self.loops.lock().await.drain(..) {
            handle.abort();
        }

        *self.core.state.write().await = OrchestratorState::Stopped;
        info!("orchestrator stopped");
    }

    /// Pauses the queue drainer. Submissions are still accepted and
    /// in-flight work continues.
    pub async fn pause(&self) -> bool {
        let mut state = self.core.state.write().await;
        if *state == OrchestratorState::Running {
            *state = OrchestratorState::Paused;
            info!("orchestrator paused");
            true
        } else {
            false
        }
    }

    /// Resumes from `Paused`.
    pub async fn resume(&self) -> bool {
        let mut state = self.core.state.write().await;
        if *state == OrchestratorState::Paused {
            *state = OrchestratorState::Running;
            info!("orchestrator resumed");
            true
        } else {
            false
        }
    }

    /// Classifies and dispatches a task, or queues it when no agent of the
    /// target type has capacity. Returns the task id immediately either
    /// way; callers poll [`task_status`](Self::task_status) for progress.
    pub async fn submit_task(&self, task: Task) -> OpsmeshResult<Uuid> {
        self.core.submit(task).await
    }

    /// Looks a task up in the active assignments, then in the bounded
    /// completed history.
    pub async fn task_status(&self, task_id: Uuid) -> TaskReport {
        self.core.task_status(task_id).await
    }

    /// Status of a single agent instance.
    pub async fn agent_status(&self, agent_id: Uuid) -> Option<AgentStatus> {
        match self.core.registry.find(agent_id) {
            Some(agent) => Some(agent.status().await),
            None => None,
        }
    }

    /// Full-registry snapshot plus orchestrator-level aggregates.
    pub async fn snapshot(&self) -> OrchestratorSnapshot {
        let state = *self.core.state.read().await;
        let (active_task_count, queued_task_count) = {
            let dispatch = self.core.dispatch.lock().await;
            (dispatch.active.len(), dispatch.queue.len())
        };
        let mut agents = Vec::with_capacity(self.core.registry.len());
        for agent in self.core.registry.all() {
            agents.push(agent.status().await);
        }
        OrchestratorSnapshot {
            state,
            agent_count: self.core.registry.len(),
            active_task_count,
            queued_task_count,
            agents,
            stats: self.core.stats.snapshot().await,
        }
    }

    /// Collects one recommendation per requested agent type (default: all
    /// registered types), sorted by descending confidence.
    ///
    /// A failing type is logged and omitted; partial success is normal.
    pub async fn recommendations(
        &self,
        context: &serde_json::Value,
        agent_types: Option<&[String]>,
    ) -> Vec<Recommendation> {
        let types: Vec<String> = match agent_types {
            Some(requested) => requested.to_vec(),
            None => self.core.registry.agent_types(),
        };

        let mut recs = Vec::new();
        for agent_type in &types {
            let Some(agent) = self.core.registry.representative(agent_type) else {
                warn!(agent_type = %agent_type, "no registered agent of requested type; omitting");
                continue;
            };
            match agent.generate_recommendation(context, agent_type).await {
                Ok(rec) => recs.push(rec),
                Err(e) => {
                    warn!(agent_type = %agent_type, error = %e, "recommendation failed; omitting");
                }
            }
        }
        recs.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        recs
    }

    /// Fans a chat message out to one representative instance per
    /// requested type. A per-type failure becomes an error string value
    /// rather than aborting the whole call.
    pub async fn chat_with_agents(
        &self,
        message: &str,
        agent_types: &[String],
        context: &serde_json::Value,
    ) -> HashMap<String, String> {
        let mut replies = HashMap::new();
        for agent_type in agent_types {
            match self.core.registry.representative(agent_type) {
                Some(agent) => {
                    replies.insert(agent_type.clone(), agent.chat(message, context).await);
                }
                None => {
                    replies.insert(
                        agent_type.clone(),
                        format!("error: no registered agent of type '{agent_type}'"),
                    );
                }
            }
        }
        replies
    }
}

impl Core {
    async fn submit(self: &Arc<Self>, task: Task) -> OpsmeshResult<Uuid> {
        let state = *self.state.read().await;
        if !matches!(
            state,
            OrchestratorState::Running | OrchestratorState::Paused
        ) {
            return Err(OpsmeshError::Orchestrator(format!(
                "not accepting tasks while {state}"
            )));
        }

        let agent_type = router::classify(&task.task_type);
        self.stats.record_submitted(agent_type).await;
        let task_id = task.id;

        let mut dispatch = self.dispatch.lock().await;
        match self.select_agent(&dispatch, agent_type).await {
            Some(agent) => {
                let mut recorded = task.clone();
                recorded.begin();
                dispatch
                    .active
                    .insert(task_id, TaskAssignment::new(recorded, agent.id(), agent_type));
                drop(dispatch);
                self.stats.record_dispatched().await;
                debug!(task_id = %task_id, agent_type, agent_id = %agent.id(), "task dispatched");
                Self::spawn_execution(Arc::clone(self), agent, task);
            }
            None => {
                dispatch.queue.push_back(task);
                drop(dispatch);
                self.stats.record_queued().await;
                debug!(task_id = %task_id, agent_type, "no agent available; task queued");
            }
        }
        Ok(task_id)
    }

    /// Least-loaded selection among active, under-capacity instances of
    /// the target type. Load is counted from the active-assignment map so
    /// the check and the subsequent insert happen under the same lock.
    async fn select_agent(
        &self,
        dispatch: &DispatchState,
        agent_type: &str,
    ) -> Option<Arc<dyn Agent>> {
        let mut best: Option<(Arc<dyn Agent>, usize)> = None;
        for agent in self.registry.agents_of(agent_type) {
            if !agent.context().is_active().await {
                continue;
            }
            let load = dispatch
                .active
                .values()
                .filter(|a| a.agent_id == agent.id())
                .count();
            if load >= agent.capabilities().max_concurrent_tasks {
                continue;
            }
            // Strictly-fewer keeps ties on the earlier-registered instance.
            if best.as_ref().map_or(true, |(_, b)| load < *b) {
                best = Some((Arc::clone(agent), load));
            }
        }
        best.map(|(agent, _)| agent)
    }

    /// Runs one assignment to completion in its own task, bounded by the
    /// configured timeout. The timeout applies to the wait, not the work:
    /// on expiry the agent-side future keeps running unobserved and the
    /// recorded `Timeout` status is authoritative.
    fn spawn_execution(core: Arc<Self>, agent: Arc<dyn Agent>, task: Task) {
        tokio::spawn(async move {
            let task_id = task.id;
            let timeout = core.config.task_timeout();
            let agent_type = agent.agent_type().to_string();

            let work = tokio::spawn(async move { agent.execute_task(task).await });

            match tokio::time::timeout(timeout, work).await {
                Ok(Ok(done)) => {
                    core.finalize(task_id, &agent_type, Outcome::Finished(Box::new(done)))
                        .await;
                }
                Ok(Err(join_err)) => {
                    error!(task_id = %task_id, error = %join_err, "task execution aborted");
                    core.finalize(task_id, &agent_type, Outcome::Aborted(join_err.to_string()))
                        .await;
                }
                Err(_) => {
                    warn!(
                        task_id = %task_id,
                        timeout_secs = timeout.as_secs(),
                        "task execution timed out"
                    );
                    core.finalize(task_id, &agent_type, Outcome::TimedOut(timeout.as_secs()))
                        .await;
                }
            }
        });
    }

    async fn finalize(&self, task_id: Uuid, agent_type: &str, outcome: Outcome) {
        let mut dispatch = self.dispatch.lock().await;
        let Some(mut assignment) = dispatch.active.remove(&task_id) else {
            // Cancelled by stop() while in flight; the late outcome loses.
            return;
        };
        match outcome {
            Outcome::Finished(task) => assignment.task = *task,
            Outcome::Aborted(reason) => {
                assignment.task.fail(format!("execution aborted: {reason}"));
            }
            Outcome::TimedOut(secs) => {
                assignment
                    .task
                    .time_out(format!("execution exceeded the {secs}s timeout"));
            }
        }
        let status = assignment.task.status;
        dispatch.history.push(assignment);
        drop(dispatch);
        self.stats.record_outcome(status).await;
        info!(task_id = %task_id, agent_type, %status, "task finished");
    }

    async fn task_status(&self, task_id: Uuid) -> TaskReport {
        let dispatch = self.dispatch.lock().await;
        if let Some(a) = dispatch.active.get(&task_id) {
            return TaskReport::Active {
                task: a.task.clone(),
                agent_id: a.agent_id,
                agent_type: a.agent_type.clone(),
                assigned_at: a.assigned_at,
            };
        }
        if let Some(a) = dispatch.history.get(task_id) {
            return TaskReport::Finished {
                task: a.task.clone(),
            };
        }
        TaskReport::NotFound
    }

    /// Pops the queue head on a short interval and re-runs submit
    /// semantics; a task that still finds no agent re-enters the queue at
    /// the tail. Errors back off with a longer sleep instead of spinning.
    fn spawn_queue_drainer(core: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let interval = core.config.drain_interval();
            loop {
                tokio::time::sleep(interval).await;
                match *core.state.read().await {
                    OrchestratorState::Running => {}
                    OrchestratorState::Paused => continue,
                    _ => break,
                }
                let queued = core.dispatch.lock().await.queue.pop_front();
                let Some(task) = queued else { continue };
                debug!(task_id = %task.id, "draining queued task");
                if let Err(e) = core.submit(task).await {
                    warn!(error = %e, "queue drain failed; backing off");
                    tokio::time::sleep(interval * 5).await;
                }
            }
        })
    }

    /// Re-attempts `start()` on every inactive agent at a long interval.
    /// Liveness restoration only: no backoff, no circuit breaker.
    fn spawn_health_monitor(core: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let interval = core.config.health_interval();
            loop {
                tokio::time::sleep(interval).await;
                match *core.state.read().await {
                    OrchestratorState::Running | OrchestratorState::Paused => {}
                    _ => break,
                }
                for agent in core.registry.all() {
                    if agent.context().is_active().await {
                        continue;
                    }
                    info!(
                        agent_type = %agent.agent_type(),
                        id = %agent.id(),
                        "restarting inactive agent"
                    );
                    if !agent.start().await {
                        warn!(
                            agent_type = %agent.agent_type(),
                            id = %agent.id(),
                            "agent restart failed; will retry next sweep"
                        );
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_is_fatal() {
        let result = Orchestrator::with_agents(OrchestratorConfig::default(), Vec::new());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_initial_state() {
        let orch = Orchestrator::new(OrchestratorConfig::default()).unwrap();
        assert_eq!(orch.state().await, OrchestratorState::Initializing);
    }

    #[tokio::test]
    async fn test_submit_rejected_before_start() {
        let orch = Orchestrator::new(OrchestratorConfig::default()).unwrap();
        let err = orch
            .submit_task(Task::new("cost-analysis", "d"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not accepting tasks"));
    }

    #[tokio::test]
    async fn test_pause_resume_cycle() {
        let orch = Orchestrator::new(OrchestratorConfig::default()).unwrap();
        // Cannot pause before running.
        assert!(!orch.pause().await);

        orch.start().await;
        assert!(orch.pause().await);
        assert_eq!(orch.state().await, OrchestratorState::Paused);
        assert!(orch.resume().await);
        assert_eq!(orch.state().await, OrchestratorState::Running);

        orch.stop().await;
        assert_eq!(orch.state().await, OrchestratorState::Stopped);
    }

    #[tokio::test]
    async fn test_unknown_task_id_not_found() {
        let orch = Orchestrator::new(OrchestratorConfig::default()).unwrap();
        let report = orch.task_status(Uuid::new_v4()).await;
        assert!(matches!(report, TaskReport::NotFound));
    }
}
