use opsmesh_core::Task;
use std::collections::VecDeque;
use uuid::Uuid;

/// FIFO buffer for tasks that could not be immediately routed.
///
/// Queued tasks are attempted for dispatch in submission order; a task
/// that still finds no agent is re-appended at the tail by the re-submit.
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    /// Appends a task at the tail.
    pub fn push_back(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    /// Removes and returns the head task.
    pub fn pop_front(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    /// Whether the given task id is waiting in the queue.
    pub fn contains(&self, id: Uuid) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Number of waiting tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = TaskQueue::new();
        let first = Task::new("t", "first");
        let second = Task::new("t", "second");
        let first_id = first.id;
        queue.push_back(first);
        queue.push_back(second);

        assert_eq!(queue.len(), 2);
        let popped = queue.pop_front().unwrap();
        assert_eq!(popped.id, first_id);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_contains() {
        let mut queue = TaskQueue::new();
        let task = Task::new("t", "d");
        let id = task.id;
        queue.push_back(task);
        assert!(queue.contains(id));
        queue.pop_front();
        assert!(!queue.contains(id));
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = TaskQueue::new();
        assert!(queue.is_empty());
        assert!(queue.pop_front().is_none());
    }
}
