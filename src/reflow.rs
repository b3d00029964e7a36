//! Measurement lifecycle shared by every node.
//!
//! A node renders first, is measured after the render commits, and has its
//! corrective state applied on the following scheduler turn. Only then is its
//! box published to the parent.

use serde::Serialize;

use crate::layout::{BoundingBox, Matrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReflowState {
    /// Content changed since the last measurement.
    Unmeasured,
    /// Reflow ran; the measured box has not been committed yet (or the node
    /// could not be measured).
    PendingMeasurement,
    /// Measured box and corrective state are committed.
    Settled,
}

/// Committed per-node state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeState {
    /// Transform applied to the node's own content.
    pub transform: Option<Matrix>,
    /// Placement of each child, written by the node's own layout pass.
    pub child_transforms: Vec<Matrix>,
}

/// Partial [`NodeState`]; unset fields keep their committed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub transform: Option<Matrix>,
    pub child_transforms: Option<Vec<Matrix>>,
}

impl StateUpdate {
    pub fn transform(transform: Matrix) -> Self {
        Self {
            transform: Some(transform),
            ..Default::default()
        }
    }

    pub fn child_transforms(transforms: Vec<Matrix>) -> Self {
        Self {
            child_transforms: Some(transforms),
            ..Default::default()
        }
    }

    fn merge(&mut self, other: StateUpdate) {
        if other.transform.is_some() {
            self.transform = other.transform;
        }
        if other.child_transforms.is_some() {
            self.child_transforms = other.child_transforms;
        }
    }

    fn apply_to(self, state: &mut NodeState) {
        if let Some(transform) = self.transform {
            state.transform = Some(transform);
        }
        if let Some(transforms) = self.child_transforms {
            state.child_transforms = transforms;
        }
    }
}

/// The reflow capability composed into each node.
#[derive(Debug, Clone)]
pub struct Reflowable {
    state: ReflowState,
    generation: u64,
    bbox: Option<BoundingBox>,
    pending_bbox: Option<BoundingBox>,
    node_state: NodeState,
    pending_update: Option<StateUpdate>,
    commit_scheduled: bool,
    reflow_scheduled: bool,
}

impl Default for Reflowable {
    fn default() -> Self {
        Self::new()
    }
}

impl Reflowable {
    pub fn new() -> Self {
        Self {
            state: ReflowState::Unmeasured,
            generation: 0,
            bbox: None,
            pending_bbox: None,
            node_state: NodeState::default(),
            pending_update: None,
            commit_scheduled: false,
            reflow_scheduled: false,
        }
    }

    /// Fresh lifecycle whose generation starts at `generation`, for a node
    /// that takes over a slot whose previous occupant still has tasks queued.
    pub(crate) fn with_generation(generation: u64) -> Self {
        Self {
            generation,
            ..Self::new()
        }
    }

    pub fn state(&self) -> ReflowState {
        self.state
    }

    pub fn is_settled(&self) -> bool {
        self.state == ReflowState::Settled
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Last committed box, if any. It may be stale while the node is not
    /// settled.
    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    /// Committed box, only while settled.
    pub fn settled_bbox(&self) -> Option<&BoundingBox> {
        if self.is_settled() {
            self.bbox.as_ref()
        } else {
            None
        }
    }

    pub fn pending_bbox(&self) -> Option<&BoundingBox> {
        self.pending_bbox.as_ref()
    }

    pub fn node_state(&self) -> &NodeState {
        &self.node_state
    }

    /// Discard in-flight measurement after a content change.
    ///
    /// Committed state survives so the node keeps drawing where it was until
    /// the next commit; the generation bump drops any queued task.
    pub fn invalidate(&mut self) {
        self.state = ReflowState::Unmeasured;
        self.generation += 1;
        self.pending_bbox = None;
        self.pending_update = None;
        self.commit_scheduled = false;
        self.reflow_scheduled = false;
    }

    /// Mark the start of a reflow pass for the current generation.
    pub(crate) fn begin_reflow(&mut self) {
        self.reflow_scheduled = false;
        self.state = ReflowState::PendingMeasurement;
    }

    /// Returns `true` when the caller should queue a reflow task.
    pub(crate) fn request_reflow(&mut self) -> bool {
        !std::mem::replace(&mut self.reflow_scheduled, true)
    }

    /// Record a freshly measured box. It is published by the next commit.
    ///
    /// Returns `true` when the caller should queue a commit task.
    pub fn set_bbox(&mut self, bbox: BoundingBox) -> bool {
        self.pending_bbox = Some(bbox);
        self.state = ReflowState::PendingMeasurement;
        self.request_commit()
    }

    /// Queue a state change for the next turn.
    ///
    /// Returns `true` when the caller should queue a commit task.
    pub fn set_state_async(&mut self, update: StateUpdate) -> bool {
        match self.pending_update.as_mut() {
            Some(pending) => pending.merge(update),
            None => self.pending_update = Some(update),
        }
        self.request_commit()
    }

    fn request_commit(&mut self) -> bool {
        !std::mem::replace(&mut self.commit_scheduled, true)
    }

    /// Apply the pending update and publish the pending box.
    ///
    /// Returns `true` when the node became settled.
    pub(crate) fn commit(&mut self) -> bool {
        self.commit_scheduled = false;
        if let Some(update) = self.pending_update.take() {
            update.apply_to(&mut self.node_state);
        }
        match self.pending_bbox.take() {
            Some(bbox) => {
                self.bbox = Some(bbox);
                self.state = ReflowState::Settled;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_runs_unmeasured_pending_settled() {
        let mut node = Reflowable::new();
        assert_eq!(node.state(), ReflowState::Unmeasured);
        node.begin_reflow();
        assert!(node.set_bbox(BoundingBox::sized(4.0, 2.0)));
        assert_eq!(node.state(), ReflowState::PendingMeasurement);
        assert!(node.settled_bbox().is_none());
        assert!(node.commit());
        assert_eq!(node.state(), ReflowState::Settled);
        assert_eq!(node.settled_bbox(), Some(&BoundingBox::sized(4.0, 2.0)));
    }

    #[test]
    fn state_updates_wait_for_commit() {
        let mut node = Reflowable::new();
        assert!(node.set_state_async(StateUpdate::transform(Matrix::translate(1.0, 2.0))));
        assert!(node.node_state().transform.is_none());
        node.commit();
        assert_eq!(
            node.node_state().transform,
            Some(Matrix::translate(1.0, 2.0))
        );
    }

    #[test]
    fn one_commit_is_requested_per_turn() {
        let mut node = Reflowable::new();
        assert!(node.set_state_async(StateUpdate::transform(Matrix::translate(1.0, 0.0))));
        assert!(!node.set_bbox(BoundingBox::sized(1.0, 1.0)));
        assert!(!node.set_state_async(StateUpdate::child_transforms(vec![])));
        node.commit();
        assert!(node.set_bbox(BoundingBox::sized(2.0, 1.0)));
    }

    #[test]
    fn partial_updates_merge() {
        let mut node = Reflowable::new();
        node.set_state_async(StateUpdate::transform(Matrix::translate(1.0, 0.0)));
        node.set_state_async(StateUpdate::child_transforms(vec![Matrix::identity()]));
        node.commit();
        assert_eq!(
            node.node_state().transform,
            Some(Matrix::translate(1.0, 0.0))
        );
        assert_eq!(node.node_state().child_transforms.len(), 1);
    }

    #[test]
    fn invalidate_discards_pending_measurement() {
        let mut node = Reflowable::new();
        node.set_bbox(BoundingBox::sized(4.0, 2.0));
        node.commit();
        let generation = node.generation();
        node.set_bbox(BoundingBox::sized(8.0, 2.0));
        node.invalidate();
        assert_eq!(node.state(), ReflowState::Unmeasured);
        assert!(node.generation() > generation);
        assert!(node.pending_bbox().is_none());
        assert!(!node.commit());
        assert_eq!(node.bbox(), Some(&BoundingBox::sized(4.0, 2.0)));
        assert!(node.settled_bbox().is_none());
    }
}
