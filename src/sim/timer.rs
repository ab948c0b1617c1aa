//! Virtual-time task scheduler
//!
//! Delayed game actions are queued here instead of on a wall-clock timer.
//! Time only moves when the owner calls [`Scheduler::advance`], so tests can
//! step it deterministically and a torn-down session simply drops its queue.

use serde::{Deserialize, Serialize};

/// Handle for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Scheduled<T> {
    id: TaskId,
    due_tick: u64,
    task: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler<T> {
    now: u64,
    next_id: u64,
    /// Pending tasks, kept sorted by (due_tick, id)
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: 0,
            next_id: 1,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in ticks
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Queue `task` to fire `delay_ticks` from now
    pub fn schedule(&mut self, delay_ticks: u64, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let due_tick = self.now + delay_ticks;
        let pos = self
            .pending
            .iter()
            .position(|s| s.due_tick > due_tick)
            .unwrap_or(self.pending.len());
        self.pending.insert(pos, Scheduled { id, due_tick, task });
        id
    }

    /// Drop a pending task; false if it already fired or was cancelled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }

    /// Drop every pending task, returning how many were cancelled
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Move time forward and return every task that came due, in order
    pub fn advance(&mut self, ticks: u64) -> Vec<T> {
        self.now += ticks;
        let due = self
            .pending
            .iter()
            .take_while(|s| s.due_tick <= self.now)
            .count();
        self.pending.drain(..due).map(|s| s.task).collect()
    }
}
