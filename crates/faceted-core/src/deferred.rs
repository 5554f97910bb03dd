//! Deferred task queue for next-tick processing.
//!
//! Work posted here runs when the host drains the queue on its next
//! cooperative tick, after the current synchronous update batch settles.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// A unique identifier for a deferred task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeferredTaskId(u64);

impl DeferredTaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique task IDs.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> DeferredTaskId {
    DeferredTaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

/// Internal task data.
struct TaskData<T> {
    id: DeferredTaskId,
    task: T,
}

/// A FIFO queue of deferred work items.
///
/// `T` is the task payload: a command enum, a boxed closure, whatever the
/// owner dispatches on when draining.
pub struct DeferredQueue<T> {
    /// Pending tasks to execute.
    tasks: VecDeque<TaskData<T>>,
}

impl<T> DeferredQueue<T> {
    /// Create a new, empty queue.
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    /// Post a task to be executed on the next drain.
    ///
    /// Returns the task ID that can be used to cancel the task.
    pub fn post(&mut self, task: T) -> DeferredTaskId {
        let id = next_task_id();
        self.tasks.push_back(TaskData { id, task });
        tracing::trace!(target: "faceted_core::deferred", ?id, pending = self.tasks.len(), "posted task");
        id
    }

    /// Cancel a pending task.
    ///
    /// Returns `true` if the task was found and removed.
    pub fn cancel(&mut self, id: DeferredTaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Take every task currently in the queue, in post order.
    ///
    /// Tasks posted while the returned batch is being processed land in the
    /// queue for the *next* drain.
    pub fn drain_ready(&mut self) -> Vec<T> {
        self.tasks.drain(..).map(|t| t.task).collect()
    }

    /// The number of pending tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_post_order() {
        let mut queue = DeferredQueue::new();
        queue.post("a");
        queue.post("b");
        queue.post("c");

        assert_eq!(queue.drain_ready(), vec!["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cancel_removes_pending_task() {
        let mut queue = DeferredQueue::new();
        queue.post(1);
        let id = queue.post(2);
        queue.post(3);

        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert_eq!(queue.drain_ready(), vec![1, 3]);
    }

    #[test]
    fn test_tasks_posted_during_drain_wait_for_next_drain() {
        let mut queue = DeferredQueue::new();
        queue.post(1);

        let batch = queue.drain_ready();
        for _ in batch {
            queue.post(2);
        }

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain_ready(), vec![2]);
    }
}
