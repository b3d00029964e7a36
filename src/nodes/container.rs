use serde::Deserialize;

use super::{NodeRenderer, ReflowContext, RenderContext, typed_props};
use crate::error::Result;
use crate::ir::NodeDescription;
use crate::layout::{
    LayoutItem, Spaceable, SpacingOptions, normalize_bbox, space_horizontally, space_vertically,
    union_bbox,
};
use crate::primitive::{Element, Primitive};
use crate::reflow::StateUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LayoutProps {
    pub padding: Option<f32>,
}

/// Arranges its children along one axis once all of them have settled.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    axis: Axis,
    props: LayoutProps,
}

impl LayoutNode {
    pub fn horizontal(description: &NodeDescription) -> Result<Box<dyn NodeRenderer>> {
        Ok(Box::new(Self {
            axis: Axis::Horizontal,
            props: typed_props(description)?,
        }))
    }

    pub fn vertical(description: &NodeDescription) -> Result<Box<dyn NodeRenderer>> {
        Ok(Box::new(Self {
            axis: Axis::Vertical,
            props: typed_props(description)?,
        }))
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }
}

impl NodeRenderer for LayoutNode {
    fn type_tag(&self) -> &str {
        match self.axis {
            Axis::Horizontal => "HorizontalLayout",
            Axis::Vertical => "VerticalLayout",
        }
    }

    fn render(&self, cx: &RenderContext<'_>) -> Primitive {
        let class = match self.axis {
            Axis::Horizontal => "horizontal-layout",
            Axis::Vertical => "vertical-layout",
        };
        Element::new("g")
            .attr("class", class)
            .children(cx.placed_children())
            .into()
    }

    fn reflow(&self, cx: &mut ReflowContext<'_>) {
        let Some(boxes) = cx.settled_children() else {
            return;
        };
        let mut items: Vec<LayoutItem> = boxes.into_iter().map(LayoutItem::new).collect();

        let bbox = match self.axis {
            Axis::Horizontal => {
                let padding = self.props.padding.unwrap_or(cx.config().horizontal_padding);
                let center = space_horizontally(&mut items, SpacingOptions::padding(padding));
                let placed: Vec<_> = items.iter().map(|item| normalize_bbox(&item.bbox())).collect();
                let union = union_bbox(&placed);
                match (placed.first(), placed.last()) {
                    (Some(first), Some(last)) => union.with_anchors(
                        Some(first.anchor_x()),
                        Some(last.anchor_x2()),
                        Some(center),
                    ),
                    _ => union,
                }
            }
            Axis::Vertical => {
                let padding = self.props.padding.unwrap_or(cx.config().vertical_padding);
                space_vertically(&mut items, SpacingOptions::padding(padding));
                let placed: Vec<_> = items.iter().map(Spaceable::bbox).collect();
                union_bbox(&placed)
            }
        };

        cx.set_state_async(StateUpdate::child_transforms(
            items.iter().map(|item| item.transform).collect(),
        ));
        cx.set_bbox(bbox);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BoundingBox, Matrix};
    use crate::nodes::ChildGeometry;
    use crate::nodes::testing::{FixedMeasurer, reflow_and_commit, settled};
    use crate::reflow::ReflowState;
    use crate::tree::NodeId;

    fn horizontal(padding: f32) -> Box<dyn NodeRenderer> {
        LayoutNode::horizontal(&NodeDescription::new("HorizontalLayout").prop("padding", padding))
            .expect("valid layout")
    }

    #[test]
    fn horizontal_layout_spaces_and_aligns_children() {
        let node = horizontal(5.0);
        let children = [
            settled(1, BoundingBox::sized(10.0, 10.0)),
            settled(2, BoundingBox::sized(20.0, 30.0)),
        ];
        let reflowable = reflow_and_commit(node.as_ref(), &FixedMeasurer(None), &children);
        assert_eq!(
            reflowable.node_state().child_transforms,
            vec![Matrix::translate(0.0, 10.0), Matrix::translate(15.0, 0.0)]
        );
        let bbox = reflowable.bbox().expect("settled");
        assert_eq!((bbox.width, bbox.height), (35.0, 30.0));
        assert_eq!(bbox.ay, Some(15.0));
        assert_eq!(bbox.ax, Some(0.0));
        assert_eq!(bbox.ax2, Some(35.0));
    }

    #[test]
    fn vertical_layout_stacks_and_centers_children() {
        let node = LayoutNode::vertical(&NodeDescription::new("VerticalLayout"))
            .expect("valid layout");
        let children = [
            settled(1, BoundingBox::sized(10.0, 10.0)),
            settled(2, BoundingBox::sized(30.0, 4.0)),
        ];
        let reflowable = reflow_and_commit(node.as_ref(), &FixedMeasurer(None), &children);
        assert_eq!(
            reflowable.node_state().child_transforms,
            vec![Matrix::translate(10.0, 0.0), Matrix::translate(0.0, 15.0)]
        );
        let bbox = reflowable.bbox().expect("settled");
        assert_eq!((bbox.width, bbox.height), (30.0, 19.0));
    }

    #[test]
    fn empty_layout_settles_with_empty_box() {
        let node = horizontal(5.0);
        let reflowable = reflow_and_commit(node.as_ref(), &FixedMeasurer(None), &[]);
        assert_eq!(reflowable.state(), ReflowState::Settled);
        assert_eq!(reflowable.bbox(), Some(&BoundingBox::default()));
    }

    #[test]
    fn layout_waits_while_a_child_is_pending() {
        let node = horizontal(5.0);
        let children = [
            settled(1, BoundingBox::sized(10.0, 10.0)),
            ChildGeometry {
                id: NodeId::from_index(2),
                state: ReflowState::Unmeasured,
                bbox: Some(BoundingBox::sized(10.0, 10.0)),
            },
        ];
        let reflowable = reflow_and_commit(node.as_ref(), &FixedMeasurer(None), &children);
        assert_eq!(reflowable.state(), ReflowState::PendingMeasurement);
        assert!(reflowable.bbox().is_none());
    }
}
