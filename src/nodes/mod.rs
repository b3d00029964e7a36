//! Renderers for each kind of diagram node.

mod container;
mod image;
mod markup;
mod pin;
mod text;

pub use container::{Axis, LayoutNode};
pub use image::{ImageNode, SVG_NAMESPACE};
pub use markup::{MarkupNode, TextRunNode};
pub use pin::PinNode;
pub use text::TextNode;

use std::fmt;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::error::{DiagramError, Result};
use crate::ir::NodeDescription;
use crate::layout::BoundingBox;
use crate::measure::Measurer;
use crate::primitive::{Element, Primitive};
use crate::reflow::{NodeState, ReflowState, Reflowable, StateUpdate};
use crate::theme::Theme;
use crate::tree::NodeId;

/// One kind of diagram node.
///
/// `render` is pure: it draws from committed state only. Geometry is reported
/// from `reflow`, which runs after each render commit and again whenever one
/// of the node's children settles.
pub trait NodeRenderer: fmt::Debug {
    fn type_tag(&self) -> &str;

    fn render(&self, cx: &RenderContext<'_>) -> Primitive;

    fn reflow(&self, cx: &mut ReflowContext<'_>);
}

pub struct RenderContext<'a> {
    pub children: &'a [NodeId],
    pub state: &'a NodeState,
    pub bbox: Option<&'a BoundingBox>,
    pub theme: &'a Theme,
    pub config: &'a LayoutConfig,
}

impl RenderContext<'_> {
    /// Each child slot wrapped in a group carrying its committed placement.
    pub fn placed_children(&self) -> Vec<Primitive> {
        self.children
            .iter()
            .enumerate()
            .map(|(idx, child)| {
                Element::new("g")
                    .transform(self.state.child_transforms.get(idx))
                    .child(Primitive::Child(*child))
                    .into()
            })
            .collect()
    }

    pub fn child_slots(&self) -> Vec<Primitive> {
        self.children.iter().map(|id| Primitive::Child(*id)).collect()
    }
}

/// Geometry of a child as seen by its parent during reflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildGeometry {
    pub id: NodeId,
    pub state: ReflowState,
    pub bbox: Option<BoundingBox>,
}

pub struct ReflowContext<'a> {
    node: NodeId,
    content: &'a Primitive,
    children: &'a [ChildGeometry],
    measurer: &'a dyn Measurer,
    config: &'a LayoutConfig,
    reflowable: &'a mut Reflowable,
    commit_requested: bool,
}

impl<'a> ReflowContext<'a> {
    pub(crate) fn new(
        node: NodeId,
        content: &'a Primitive,
        children: &'a [ChildGeometry],
        measurer: &'a dyn Measurer,
        config: &'a LayoutConfig,
        reflowable: &'a mut Reflowable,
    ) -> Self {
        Self {
            node,
            content,
            children,
            measurer,
            config,
            reflowable,
            commit_requested: false,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn config(&self) -> &LayoutConfig {
        self.config
    }

    /// Measure this node's rendered content, children included.
    pub fn measure(&self) -> Option<BoundingBox> {
        let measured = self.measurer.measure(self.content);
        if measured.is_none() {
            debug!(node = %self.node, "content is not measurable yet");
        }
        measured
    }

    pub fn children(&self) -> &[ChildGeometry] {
        self.children
    }

    /// Committed child boxes, or `None` while any child is still settling.
    pub fn settled_children(&self) -> Option<Vec<BoundingBox>> {
        self.children
            .iter()
            .map(|child| match child.state {
                ReflowState::Settled => child.bbox,
                _ => None,
            })
            .collect()
    }

    /// Every child has a committed box. Content measured before this holds
    /// does not include the children's final placement.
    pub fn children_settled(&self) -> bool {
        self.children
            .iter()
            .all(|child| child.state == ReflowState::Settled && child.bbox.is_some())
    }

    pub fn set_bbox(&mut self, bbox: BoundingBox) {
        self.commit_requested |= self.reflowable.set_bbox(bbox);
    }

    pub fn set_state_async(&mut self, update: StateUpdate) {
        self.commit_requested |= self.reflowable.set_state_async(update);
    }

    pub(crate) fn commit_requested(&self) -> bool {
        self.commit_requested
    }
}

/// Deserialize a description's props into a renderer's typed props.
pub(crate) fn typed_props<T: DeserializeOwned>(description: &NodeDescription) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(description.props.clone())).map_err(
        |source| DiagramError::InvalidProps {
            type_tag: description.type_tag.clone(),
            source,
        },
    )
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::measure::Measurer;

    /// Measurer returning the same box for every primitive.
    #[derive(Debug, Clone, Copy)]
    pub struct FixedMeasurer(pub Option<BoundingBox>);

    impl Measurer for FixedMeasurer {
        fn measure(&self, _primitive: &Primitive) -> Option<BoundingBox> {
            self.0
        }
    }

    pub fn render(renderer: &dyn NodeRenderer, children: &[NodeId], state: &NodeState) -> Primitive {
        let theme = Theme::classic();
        let config = LayoutConfig::default();
        renderer.render(&RenderContext {
            children,
            state,
            bbox: None,
            theme: &theme,
            config: &config,
        })
    }

    /// Run one reflow and commit it, returning the committed reflowable.
    pub fn reflow_and_commit(
        renderer: &dyn NodeRenderer,
        measurer: &dyn Measurer,
        children: &[ChildGeometry],
    ) -> Reflowable {
        let config = LayoutConfig::default();
        let content: Primitive = Element::new("g").into();
        let mut reflowable = Reflowable::new();
        reflowable.begin_reflow();
        let mut cx = ReflowContext::new(
            NodeId::from_index(0),
            &content,
            children,
            measurer,
            &config,
            &mut reflowable,
        );
        renderer.reflow(&mut cx);
        let requested = cx.commit_requested();
        if requested {
            reflowable.commit();
        }
        reflowable
    }

    pub fn settled(index: usize, bbox: BoundingBox) -> ChildGeometry {
        ChildGeometry {
            id: NodeId::from_index(index),
            state: ReflowState::Settled,
            bbox: Some(bbox),
        }
    }
}
