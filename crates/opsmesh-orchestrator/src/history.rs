use crate::types::TaskAssignment;
use std::collections::VecDeque;
use uuid::Uuid;

/// Orchestrator-wide bound on retained completed assignments.
pub const COMPLETED_HISTORY_LIMIT: usize = 1000;

/// Bounded history of completed task assignments.
///
/// Once at capacity, inserting a new entry evicts the oldest. The bound is
/// a deliberate memory invariant for a process that may run indefinitely.
pub struct CompletedHistory {
    entries: VecDeque<TaskAssignment>,
    limit: usize,
}

impl CompletedHistory {
    /// Creates a history with the standard bound.
    pub fn new() -> Self {
        Self::with_limit(COMPLETED_HISTORY_LIMIT)
    }

    /// Creates a history with a custom bound.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    /// Appends an assignment, evicting the oldest entry when at capacity.
    pub fn push(&mut self, assignment: TaskAssignment) {
        self.entries.push_back(assignment);
        if self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    /// Looks up an assignment by its task id.
    pub fn get(&self, task_id: Uuid) -> Option<&TaskAssignment> {
        self.entries.iter().find(|a| a.task.id == task_id)
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CompletedHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsmesh_core::Task;

    fn assignment(label: &str) -> TaskAssignment {
        TaskAssignment::new(Task::new("t", label), Uuid::new_v4(), "general")
    }

    #[test]
    fn test_push_and_get() {
        let mut history = CompletedHistory::new();
        let a = assignment("one");
        let id = a.task.id;
        history.push(a);
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(id).unwrap().task.description, "one");
    }

    #[test]
    fn test_eviction_at_capacity() {
        let mut history = CompletedHistory::with_limit(3);
        let first = assignment("first");
        let first_id = first.task.id;
        history.push(first);
        for i in 0..3 {
            history.push(assignment(&format!("later {i}")));
        }
        assert_eq!(history.len(), 3);
        // Oldest entry is gone.
        assert!(history.get(first_id).is_none());
    }

    #[test]
    fn test_standard_limit() {
        let history = CompletedHistory::new();
        assert_eq!(history.limit, COMPLETED_HISTORY_LIMIT);
        assert!(history.is_empty());
    }
}
