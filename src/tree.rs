//! Host for a mounted diagram: owns every node, drives the scheduler, and
//! resolves nodes into primitives.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::LayoutConfig;
use crate::dispatch::Registry;
use crate::error::{DiagramError, Result};
use crate::ir::{Child, NodeDescription};
use crate::layout::BoundingBox;
use crate::measure::{HeadlessMeasurer, Measurer};
use crate::nodes::{ChildGeometry, NodeRenderer, ReflowContext, RenderContext};
use crate::primitive::{Element, Primitive};
use crate::reflow::{NodeState, ReflowState, Reflowable};
use crate::scheduler::{Scheduler, Task};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct NodeEntry {
    renderer: Box<dyn NodeRenderer>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    reflow: Reflowable,
}

/// Outcome of [`RenderTree::run_until_idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Turns run by this call.
    pub turns: u64,
    /// No work is left in the queue.
    pub idle: bool,
    pub root_state: Option<ReflowState>,
}

impl Settlement {
    pub fn is_settled(&self) -> bool {
        self.root_state == Some(ReflowState::Settled)
    }
}

pub struct RenderTree {
    nodes: Vec<Option<NodeEntry>>,
    /// Vacant slots with the first generation their next occupant may use.
    free: Vec<(usize, u64)>,
    root: Option<NodeId>,
    registry: Registry,
    measurer: Box<dyn Measurer>,
    scheduler: Scheduler,
    theme: Theme,
    config: LayoutConfig,
}

impl fmt::Debug for RenderTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTree")
            .field("root", &self.root)
            .field("nodes", &self.len())
            .field("pending_tasks", &self.scheduler.pending())
            .finish()
    }
}

impl RenderTree {
    pub fn new(theme: Theme, config: LayoutConfig) -> Self {
        let measurer = HeadlessMeasurer::new(&theme, config.fast_text_metrics);
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            registry: Registry::default(),
            measurer: Box::new(measurer),
            scheduler: Scheduler::new(),
            theme,
            config,
        }
    }

    pub fn with_measurer(mut self, measurer: impl Measurer + 'static) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the node tree for `description`, replacing any previous root.
    ///
    /// Nothing is measured yet: every node gets a reflow queued for the next
    /// turn, children before parents.
    pub fn mount(&mut self, description: &NodeDescription) -> Result<NodeId> {
        let root = self.build_node(description, None)?;
        if let Some(old) = self.root.replace(root) {
            self.remove_subtree(old);
        }
        debug!(root = %root, nodes = self.len(), "mounted");
        self.schedule_subtree_reflow(root);
        Ok(root)
    }

    /// Replace the content of `node` in place.
    ///
    /// The node keeps its id and its place in the parent. Its old children are
    /// dropped, pending measurement is discarded, and the node plus all of its
    /// ancestors go back to `Unmeasured`.
    pub fn update(&mut self, node: NodeId, description: &NodeDescription) -> Result<()> {
        if self.entry(node).is_none() {
            return Err(DiagramError::UnknownNode(node));
        }
        let renderer = self.registry.create(description)?;
        let mut children = Vec::with_capacity(description.children.len());
        for child in &description.children {
            match self.build_child(child, Some(node)) {
                Ok(id) => children.push(id),
                Err(err) => {
                    for id in children {
                        self.remove_subtree(id);
                    }
                    return Err(err);
                }
            }
        }

        let old_children = {
            let entry = self.entry_mut(node).ok_or(DiagramError::UnknownNode(node))?;
            entry.renderer = renderer;
            entry.reflow.invalidate();
            std::mem::replace(&mut entry.children, children)
        };
        for id in old_children {
            self.remove_subtree(id);
        }
        debug!(node = %node, type_tag = %description.type_tag, "content changed");

        self.schedule_subtree_reflow(node);
        let mut current = self.entry(node).and_then(|entry| entry.parent);
        while let Some(ancestor) = current {
            let Some(entry) = self.entry_mut(ancestor) else {
                break;
            };
            entry.reflow.invalidate();
            current = entry.parent;
            self.schedule_reflow(ancestor);
        }
        Ok(())
    }

    /// Run one scheduler turn. Returns `false` when there was nothing to do.
    pub fn tick(&mut self) -> bool {
        let tasks = self.scheduler.begin_turn();
        if tasks.is_empty() {
            return false;
        }
        trace!(turn = self.scheduler.turn(), tasks = tasks.len(), "turn");
        for task in tasks {
            self.run_task(task);
        }
        true
    }

    /// Run turns until the queue drains or `max_turns` have run.
    pub fn run_until_idle(&mut self, max_turns: u64) -> Settlement {
        let mut turns = 0;
        while turns < max_turns && self.tick() {
            turns += 1;
        }
        let settlement = Settlement {
            turns,
            idle: self.scheduler.is_idle(),
            root_state: self.root.and_then(|root| self.state(root)),
        };
        if !settlement.is_settled() {
            warn!(
                turns,
                idle = settlement.idle,
                root_state = ?settlement.root_state,
                "diagram did not settle"
            );
        }
        settlement
    }

    pub fn state(&self, node: NodeId) -> Option<ReflowState> {
        self.entry(node).map(|entry| entry.reflow.state())
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.entry(node)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.entry(node).and_then(|entry| entry.parent)
    }

    /// Direct handle on a mounted node.
    pub fn node_ref(&self, node: NodeId) -> Option<NodeRef<'_>> {
        let entry = self.entry(node)?;
        Some(NodeRef {
            tree: self,
            id: node,
            entry,
        })
    }

    /// Handle on the root node, for callers that need to read geometry from
    /// outside the declarative tree. This deliberately bypasses the
    /// description: anything read here is only stable once settled.
    pub fn image_ref(&self) -> Option<NodeRef<'_>> {
        self.node_ref(self.root?)
    }

    /// Pre-order ids of every node below and including `node`.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(entry) = self.entry(id) else {
                continue;
            };
            out.push(id);
            stack.extend(entry.children.iter().rev().copied());
        }
        out
    }

    /// Ids of mounted nodes rendered by `type_tag`, in document order.
    pub fn nodes_of_type(&self, type_tag: &str) -> Vec<NodeId> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        self.descendants(root)
            .into_iter()
            .filter(|id| {
                self.entry(*id)
                    .is_some_and(|entry| entry.renderer.type_tag() == type_tag)
            })
            .collect()
    }

    /// Fully expanded primitive for `node`, children included.
    pub fn resolve(&self, node: NodeId) -> Primitive {
        let Some(entry) = self.entry(node) else {
            return Primitive::Child(node);
        };
        let cx = RenderContext {
            children: &entry.children,
            state: entry.reflow.node_state(),
            bbox: entry.reflow.bbox(),
            theme: &self.theme,
            config: &self.config,
        };
        self.expand(entry.renderer.render(&cx))
    }

    fn expand(&self, primitive: Primitive) -> Primitive {
        match primitive {
            Primitive::Child(id) => self.resolve(id),
            Primitive::Element(element) => {
                let Element {
                    tag,
                    attrs,
                    children,
                } = element;
                Primitive::Element(Element {
                    tag,
                    attrs,
                    children: children.into_iter().map(|child| self.expand(child)).collect(),
                })
            }
            text @ Primitive::Text(_) => text,
        }
    }

    fn run_task(&mut self, task: Task) {
        let node = task.node();
        match self.entry(node) {
            Some(entry) if entry.reflow.generation() == task.generation() => {}
            _ => {
                trace!(?task, "dropping stale task");
                return;
            }
        }
        match task {
            Task::Reflow { .. } => self.run_reflow(node),
            Task::Commit { .. } => self.run_commit(node),
        }
    }

    fn run_reflow(&mut self, node: NodeId) {
        let children: Vec<ChildGeometry> = self
            .children(node)
            .iter()
            .filter_map(|child| {
                let entry = self.entry(*child)?;
                Some(ChildGeometry {
                    id: *child,
                    state: entry.reflow.state(),
                    bbox: entry.reflow.bbox().copied(),
                })
            })
            .collect();
        let content = self.resolve(node);

        let measurer = self.measurer.as_ref();
        let config = &self.config;
        let Some(entry) = self.nodes.get_mut(node.0).and_then(Option::as_mut) else {
            return;
        };
        entry.reflow.begin_reflow();
        let NodeEntry {
            renderer, reflow, ..
        } = entry;
        let mut cx = ReflowContext::new(node, &content, &children, measurer, config, reflow);
        renderer.reflow(&mut cx);
        let commit = cx.commit_requested();
        let generation = reflow.generation();
        trace!(node = %node, type_tag = renderer.type_tag(), commit, "reflowed");

        if commit {
            self.scheduler.schedule(Task::Commit { node, generation });
        }
    }

    fn run_commit(&mut self, node: NodeId) {
        let Some(entry) = self.entry_mut(node) else {
            return;
        };
        if !entry.reflow.commit() {
            return;
        }
        debug!(
            node = %node,
            type_tag = entry.renderer.type_tag(),
            bbox = ?entry.reflow.bbox(),
            "settled"
        );
        // The parent's content embeds this node, so its box is stale now.
        if let Some(parent) = entry.parent {
            self.schedule_reflow(parent);
        }
    }

    fn schedule_reflow(&mut self, node: NodeId) {
        let Some(entry) = self.entry_mut(node) else {
            return;
        };
        if entry.reflow.request_reflow() {
            let generation = entry.reflow.generation();
            self.scheduler.schedule(Task::Reflow { node, generation });
        }
    }

    fn schedule_subtree_reflow(&mut self, node: NodeId) {
        // Children measure before their parents, as after a real commit.
        let mut order = self.descendants(node);
        order.reverse();
        for id in order {
            self.schedule_reflow(id);
        }
    }

    fn build_node(&mut self, description: &NodeDescription, parent: Option<NodeId>) -> Result<NodeId> {
        let renderer = self.registry.create(description)?;
        let id = self.alloc(NodeEntry {
            renderer,
            parent,
            children: Vec::with_capacity(description.children.len()),
            reflow: Reflowable::new(),
        });
        for child in &description.children {
            match self.build_child(child, Some(id)) {
                Ok(child_id) => {
                    if let Some(entry) = self.entry_mut(id) {
                        entry.children.push(child_id);
                    }
                }
                Err(err) => {
                    self.remove_subtree(id);
                    return Err(err);
                }
            }
        }
        Ok(id)
    }

    fn build_child(&mut self, child: &Child, parent: Option<NodeId>) -> Result<NodeId> {
        match child {
            Child::Node(description) => self.build_node(description, parent),
            Child::Text(text) => {
                let renderer = self.registry.create_text_run(text);
                Ok(self.alloc(NodeEntry {
                    renderer,
                    parent,
                    children: Vec::new(),
                    reflow: Reflowable::new(),
                }))
            }
        }
    }

    fn alloc(&mut self, mut entry: NodeEntry) -> NodeId {
        match self.free.pop() {
            Some((index, generation)) => {
                entry.reflow = Reflowable::with_generation(generation);
                self.nodes[index] = Some(entry);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(entry));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn remove_subtree(&mut self, node: NodeId) {
        for id in self.descendants(node) {
            let Some(entry) = self.nodes.get_mut(id.0).and_then(Option::take) else {
                continue;
            };
            // Tasks still queued for the removed node carry at most this
            // generation, so they cannot match the next occupant.
            self.free.push((id.0, entry.reflow.generation() + 1));
        }
    }

    fn entry(&self, node: NodeId) -> Option<&NodeEntry> {
        self.nodes.get(node.0).and_then(Option::as_ref)
    }

    fn entry_mut(&mut self, node: NodeId) -> Option<&mut NodeEntry> {
        self.nodes.get_mut(node.0).and_then(Option::as_mut)
    }
}

/// Read-only view of one mounted node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a RenderTree,
    id: NodeId,
    entry: &'a NodeEntry,
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("type_tag", &self.type_tag())
            .field("state", &self.state())
            .finish()
    }
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn type_tag(&self) -> &'a str {
        self.entry.renderer.type_tag()
    }

    pub fn renderer(&self) -> &'a dyn NodeRenderer {
        self.entry.renderer.as_ref()
    }

    pub fn state(&self) -> ReflowState {
        self.entry.reflow.state()
    }

    /// Box in the node's own coordinates, only once settled.
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.entry.reflow.settled_bbox().copied()
    }

    /// Last committed box, even while a new measurement is in flight.
    pub fn committed_bbox(&self) -> Option<BoundingBox> {
        self.entry.reflow.bbox().copied()
    }

    pub fn node_state(&self) -> &'a NodeState {
        self.entry.reflow.node_state()
    }

    pub fn primitive(&self) -> Primitive {
        self.tree.resolve(self.id)
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.tree.node_ref(self.entry.parent?)
    }

    pub fn children(&self) -> Vec<NodeRef<'a>> {
        self.entry
            .children
            .iter()
            .filter_map(|child| self.tree.node_ref(*child))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Matrix;
    use crate::nodes::testing::FixedMeasurer;

    const TURNS: u64 = 64;

    fn tree() -> RenderTree {
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..Default::default()
        };
        RenderTree::new(Theme::classic(), config)
    }

    fn two_pins() -> NodeDescription {
        NodeDescription::new("HorizontalLayout")
            .prop("padding", 10)
            .child(NodeDescription::new("Pin"))
            .child(NodeDescription::new("Pin"))
    }

    #[test]
    fn pin_settles_on_the_turn_after_its_reflow() {
        let mut tree = tree();
        let root = tree.mount(&NodeDescription::new("Pin")).expect("mount");
        assert_eq!(tree.state(root), Some(ReflowState::Unmeasured));
        assert!(tree.tick());
        assert_eq!(tree.state(root), Some(ReflowState::PendingMeasurement));
        assert!(tree.tick());
        assert_eq!(tree.state(root), Some(ReflowState::Settled));
        assert!(!tree.tick());
    }

    #[test]
    fn text_is_measured_after_its_runs_and_committed_a_turn_later() {
        let measured = BoundingBox::new(2.0, -11.0, 40.0, 14.0);
        let mut tree = tree().with_measurer(FixedMeasurer(Some(measured)));
        let root = tree
            .mount(&NodeDescription::new("Text").text("Sample text"))
            .expect("mount");
        let run = tree.children(root)[0];
        tree.tick();
        tree.tick();
        assert_eq!(tree.state(run), Some(ReflowState::Settled));
        assert!(tree.node_ref(root).expect("mounted").bbox().is_none());

        tree.tick();
        let text = tree.node_ref(root).expect("mounted");
        assert_eq!(text.state(), ReflowState::PendingMeasurement);
        assert!(text.node_state().transform.is_none());
        assert!(text.bbox().is_none());

        tree.tick();
        let text = tree.node_ref(root).expect("mounted");
        assert_eq!(text.state(), ReflowState::Settled);
        assert_eq!(text.bbox(), Some(BoundingBox::sized(40.0, 14.0)));
        assert_eq!(
            text.node_state().transform,
            Some(Matrix::translate(-2.0, 11.0))
        );
        let primitive = text.primitive();
        let element = primitive.as_element().expect("text element");
        assert_eq!(element.get("transform"), Some("translate(-2 11)"));
        assert_eq!(primitive.text_content(), "Sample text");
    }

    #[test]
    fn horizontal_layout_of_two_pins() {
        let mut tree = tree();
        let root = tree.mount(&two_pins()).expect("mount");
        let settlement = tree.run_until_idle(TURNS);
        assert!(settlement.is_settled());
        assert!(settlement.idle);

        let layout = tree.node_ref(root).expect("root");
        assert_eq!(
            layout.node_state().child_transforms,
            vec![Matrix::translate(0.0, 0.0), Matrix::translate(20.0, 0.0)]
        );
        let bbox = layout.bbox().expect("settled");
        assert_eq!((bbox.width, bbox.height), (30.0, 10.0));
        assert_eq!(bbox.ay, Some(5.0));
    }

    #[test]
    fn growing_a_pin_relayouts_its_siblings() {
        let mut tree = tree();
        let root = tree.mount(&two_pins()).expect("mount");
        tree.run_until_idle(TURNS);
        let first = tree.children(root)[0];

        tree.update(first, &NodeDescription::new("Pin").prop("radius", 10))
            .expect("update");
        assert_eq!(tree.state(root), Some(ReflowState::Unmeasured));
        assert!(tree.run_until_idle(TURNS).is_settled());

        let transforms = tree
            .node_ref(root)
            .expect("root")
            .node_state()
            .child_transforms
            .clone();
        assert_eq!(
            transforms,
            vec![Matrix::translate(0.0, 0.0), Matrix::translate(30.0, 5.0)]
        );

        // Nothing changed: running again leaves the layout as it was.
        assert_eq!(tree.run_until_idle(TURNS).turns, 0);
        tree.update(first, &NodeDescription::new("Pin").prop("radius", 10))
            .expect("update");
        tree.run_until_idle(TURNS);
        assert_eq!(
            tree.node_ref(root).expect("root").node_state().child_transforms,
            transforms
        );
    }

    fn group_around_two_pins() -> NodeDescription {
        NodeDescription::new("HorizontalLayout")
            .child(NodeDescription::new("g").child(two_pins()))
            .child(NodeDescription::new("Pin"))
    }

    fn size_of(tree: &RenderTree, node: NodeId) -> Option<(f32, f32)> {
        let bbox = tree.node_ref(node)?.bbox()?;
        Some((bbox.width, bbox.height))
    }

    #[test]
    fn markup_is_measured_after_the_layout_it_wraps() {
        let mut tree = tree();
        let root = tree.mount(&group_around_two_pins()).expect("mount");
        assert!(tree.run_until_idle(TURNS).is_settled());

        let group = tree.children(root)[0];
        let inner = tree.children(group)[0];
        assert_eq!(size_of(&tree, inner), Some((30.0, 10.0)));
        assert_eq!(size_of(&tree, group), Some((30.0, 10.0)));
        assert_eq!(
            tree.node_ref(root).expect("root").node_state().child_transforms,
            vec![Matrix::translate(0.0, 0.0), Matrix::translate(40.0, 0.0)]
        );
        assert_eq!(size_of(&tree, root), Some((50.0, 10.0)));
    }

    #[test]
    fn update_below_markup_remeasures_the_markup() {
        let mut tree = tree();
        let root = tree.mount(&group_around_two_pins()).expect("mount");
        tree.run_until_idle(TURNS);
        let group = tree.children(root)[0];
        let inner = tree.children(group)[0];
        let first = tree.children(inner)[0];

        tree.update(first, &NodeDescription::new("Pin").prop("radius", 10))
            .expect("update");
        assert_eq!(tree.state(group), Some(ReflowState::Unmeasured));
        assert!(tree.run_until_idle(TURNS).is_settled());

        assert_eq!(size_of(&tree, group), Some((40.0, 20.0)));
        assert_eq!(
            tree.node_ref(root).expect("root").node_state().child_transforms,
            vec![Matrix::translate(0.0, 0.0), Matrix::translate(50.0, 5.0)]
        );
    }

    #[test]
    fn nested_layouts_settle_inside_out() {
        let mut tree = tree();
        let description = NodeDescription::new("VerticalLayout")
            .child(two_pins())
            .child(NodeDescription::new("Pin"));
        let root = tree.mount(&description).expect("mount");
        assert!(tree.run_until_idle(TURNS).is_settled());

        let row = tree.children(root)[0];
        assert_eq!(
            tree.node_ref(row).expect("row").node_state().child_transforms,
            vec![Matrix::translate(0.0, 0.0), Matrix::translate(20.0, 0.0)]
        );
        assert_eq!(
            tree.node_ref(root).expect("root").node_state().child_transforms,
            vec![Matrix::translate(0.0, 0.0), Matrix::translate(10.0, 15.0)]
        );
        assert_eq!(size_of(&tree, root), Some((30.0, 25.0)));
    }

    #[test]
    fn empty_container_settles_with_zero_box() {
        let mut tree = tree();
        let root = tree
            .mount(&NodeDescription::new("VerticalLayout"))
            .expect("mount");
        let settlement = tree.run_until_idle(TURNS);
        assert!(settlement.is_settled());
        assert_eq!(settlement.turns, 2);
        assert_eq!(
            tree.node_ref(root).expect("root").bbox(),
            Some(BoundingBox::default())
        );
    }

    #[test]
    fn unknown_tags_render_as_markup_with_children() {
        let mut tree = tree();
        let description = NodeDescription::new("Text")
            .child(NodeDescription::new("tspan").text("Sample text"));
        let root = tree.mount(&description).expect("mount");
        tree.run_until_idle(TURNS);

        let text = tree.node_ref(root).expect("root");
        let children = text.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].type_tag(), "tspan");
        assert_eq!(children[0].children()[0].type_tag(), "#text");

        let primitive = text.primitive();
        let element = primitive.as_element().expect("text element");
        let tspan = element.children[0].as_element().expect("tspan");
        assert_eq!(tspan.tag, "tspan");
        assert_eq!(primitive.text_content(), "Sample text");
    }

    #[test]
    fn unmeasurable_child_stalls_its_container() {
        let mut tree = tree();
        let description = NodeDescription::new("HorizontalLayout")
            .child(NodeDescription::new("Pin"))
            .child(NodeDescription::new("path").prop("d", "M0 0 L10 10"));
        let root = tree.mount(&description).expect("mount");
        let settlement = tree.run_until_idle(TURNS);
        assert!(settlement.idle);
        assert!(!settlement.is_settled());
        assert_eq!(tree.state(root), Some(ReflowState::PendingMeasurement));
    }

    #[test]
    fn content_change_before_settling_discards_measurement() {
        let mut tree = tree();
        let root = tree.mount(&NodeDescription::new("Pin")).expect("mount");
        tree.tick();
        tree.update(root, &NodeDescription::new("Pin").prop("radius", 12))
            .expect("update");
        tree.tick();
        assert_ne!(tree.state(root), Some(ReflowState::Settled));
        tree.run_until_idle(TURNS);
        assert_eq!(
            tree.node_ref(root).expect("root").bbox(),
            Some(BoundingBox::sized(24.0, 24.0))
        );
    }

    #[test]
    fn failed_mount_leaves_no_nodes_behind() {
        let mut tree = tree();
        let description = NodeDescription::new("VerticalLayout")
            .child(NodeDescription::new("Pin"))
            .child(NodeDescription::new("Text"));
        let err = tree.mount(&description).expect_err("text without children");
        assert!(matches!(err, DiagramError::MissingChildren { .. }));
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
    }

    #[test]
    fn image_ref_exposes_the_root_node() {
        let mut tree = tree();
        tree.mount(&NodeDescription::new("Pin")).expect("mount");
        tree.run_until_idle(TURNS);
        let image = tree.image_ref().expect("mounted");
        assert_eq!(image.type_tag(), "Pin");
        assert_eq!(image.bbox(), Some(BoundingBox::sized(10.0, 10.0)));
    }

    #[test]
    fn remounting_reuses_slots() {
        let mut tree = tree();
        tree.mount(&two_pins()).expect("mount");
        tree.mount(&NodeDescription::new("Pin")).expect("mount");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.nodes_of_type("Pin").len(), 1);
    }

    #[test]
    fn reused_slot_ignores_tasks_of_its_previous_node() {
        let mut tree = tree();
        let root = tree
            .mount(&NodeDescription::new("VerticalLayout").child(NodeDescription::new("Pin")))
            .expect("mount");
        let old_pin = tree.children(root)[0];
        // The pin's commit is now queued for the next turn.
        tree.tick();
        assert_eq!(tree.state(old_pin), Some(ReflowState::PendingMeasurement));

        tree.update(root, &NodeDescription::new("VerticalLayout"))
            .expect("update");
        tree.update(
            root,
            &NodeDescription::new("VerticalLayout").child(NodeDescription::new("Pin")),
        )
        .expect("update");
        let new_pin = tree.children(root)[0];
        assert_eq!(new_pin, old_pin);
        let generation = tree.entry(new_pin).expect("pin").reflow.generation();
        assert!(generation > 0);

        // The stale commit is dropped; the new pin measures from scratch.
        tree.tick();
        assert_eq!(tree.state(new_pin), Some(ReflowState::PendingMeasurement));
        assert!(tree.run_until_idle(TURNS).is_settled());
        assert_eq!(size_of(&tree, new_pin), Some((10.0, 10.0)));
    }

    #[test]
    fn update_of_unknown_node_fails() {
        let mut tree = tree();
        let err = tree
            .update(NodeId::from_index(9), &NodeDescription::new("Pin"))
            .expect_err("nothing mounted");
        assert!(matches!(err, DiagramError::UnknownNode(_)));
    }
}
