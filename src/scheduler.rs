use std::collections::VecDeque;

use tracing::trace;

use crate::tree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Measure the node and report its geometry.
    Reflow { node: NodeId, generation: u64 },
    /// Apply the node's pending state and publish its pending box.
    Commit { node: NodeId, generation: u64 },
}

impl Task {
    pub fn node(&self) -> NodeId {
        match self {
            Task::Reflow { node, .. } | Task::Commit { node, .. } => *node,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            Task::Reflow { generation, .. } | Task::Commit { generation, .. } => *generation,
        }
    }
}

/// Single-threaded next-turn task queue.
///
/// Anything scheduled while a turn is running waits for the following turn,
/// so a state change can never be applied inside the turn that requested it.
#[derive(Debug, Default)]
pub struct Scheduler {
    next: VecDeque<Task>,
    turn: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: Task) {
        trace!(?task, turn = self.turn + 1, "scheduled");
        self.next.push_back(task);
    }

    /// Take every task queued for the upcoming turn.
    pub fn begin_turn(&mut self) -> Vec<Task> {
        if self.next.is_empty() {
            return Vec::new();
        }
        self.turn += 1;
        self.next.drain(..).collect()
    }

    pub fn is_idle(&self) -> bool {
        self.next.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.next.len()
    }

    /// Number of turns run so far.
    pub fn turn(&self) -> u64 {
        self.turn
    }
}
