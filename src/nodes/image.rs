use serde::Deserialize;

use super::{NodeRenderer, ReflowContext, RenderContext, typed_props};
use crate::error::Result;
use crate::ir::NodeDescription;
use crate::layout::{BoundingBox, Matrix, fmt_num, union_bbox};
use crate::primitive::{Element, Primitive};
use crate::reflow::StateUpdate;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageProps {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub padding: Option<f32>,
    /// External raster drawn behind the content.
    pub href: Option<String>,
}

/// Standalone `<svg>` frame around its children.
///
/// With both `width` and `height` set the frame has an intrinsic size;
/// otherwise it grows to fit its settled children plus padding.
///
/// Children are not arranged: they share one padded origin and are drawn on
/// top of each other. Wrap them in a layout to stack them.
#[derive(Debug, Clone)]
pub struct ImageNode {
    props: ImageProps,
}

impl ImageNode {
    pub fn create(description: &NodeDescription) -> Result<Box<dyn NodeRenderer>> {
        Ok(Box::new(Self {
            props: typed_props(description)?,
        }))
    }

    fn intrinsic_size(&self) -> Option<(f32, f32)> {
        Some((self.props.width?, self.props.height?))
    }
}

impl NodeRenderer for ImageNode {
    fn type_tag(&self) -> &str {
        "Image"
    }

    fn render(&self, cx: &RenderContext<'_>) -> Primitive {
        let (width, height) = self
            .intrinsic_size()
            .or_else(|| cx.bbox.map(|bbox| (bbox.width, bbox.height)))
            .unwrap_or((0.0, 0.0));
        let (width, height) = (fmt_num(width), fmt_num(height));

        let mut svg = Element::new("svg")
            .attr("xmlns", SVG_NAMESPACE)
            .attr("width", width.clone())
            .attr("height", height.clone())
            .attr("viewBox", format!("0 0 {width} {height}"))
            .child(
                Element::new("rect")
                    .attr("class", "background")
                    .attr("width", "100%")
                    .attr("height", "100%")
                    .attr("fill", cx.theme.background.clone()),
            );
        if let Some(href) = &self.props.href {
            svg = svg.child(
                Element::new("image")
                    .attr("href", href.clone())
                    .attr("width", width)
                    .attr("height", height),
            );
        }
        svg.children(cx.placed_children()).into()
    }

    fn reflow(&self, cx: &mut ReflowContext<'_>) {
        let padding = self.props.padding.unwrap_or(cx.config().image_padding);
        let Some(boxes) = cx.settled_children() else {
            return;
        };
        let content = union_bbox(&boxes);
        let offset = Matrix::translate(padding - content.x, padding - content.y);
        cx.set_state_async(StateUpdate::child_transforms(vec![offset; boxes.len()]));

        let size = match self.intrinsic_size() {
            Some((width, height)) => BoundingBox::sized(width, height),
            None => BoundingBox::sized(
                content.width + padding * 2.0,
                content.height + padding * 2.0,
            ),
        };
        cx.set_bbox(size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::ChildGeometry;
    use crate::nodes::testing::{FixedMeasurer, reflow_and_commit, settled};
    use crate::reflow::ReflowState;
    use crate::tree::NodeId;

    #[test]
    fn grows_to_fit_children_with_padding() {
        let image = ImageNode::create(&NodeDescription::new("Image").prop("padding", 4))
            .expect("valid image");
        let children = [settled(1, BoundingBox::new(-2.0, 0.0, 10.0, 6.0))];
        let reflowable = reflow_and_commit(image.as_ref(), &FixedMeasurer(None), &children);
        assert_eq!(reflowable.bbox(), Some(&BoundingBox::sized(18.0, 14.0)));
        assert_eq!(
            reflowable.node_state().child_transforms,
            vec![Matrix::translate(6.0, 4.0)]
        );
    }

    #[test]
    fn children_share_one_origin() {
        let image = ImageNode::create(&NodeDescription::new("Image")).expect("valid image");
        let children = [
            settled(1, BoundingBox::sized(10.0, 10.0)),
            settled(2, BoundingBox::new(4.0, -2.0, 20.0, 6.0)),
        ];
        let reflowable = reflow_and_commit(image.as_ref(), &FixedMeasurer(None), &children);
        let offset = Matrix::translate(10.0, 12.0);
        assert_eq!(reflowable.node_state().child_transforms, vec![offset, offset]);
        assert_eq!(reflowable.bbox(), Some(&BoundingBox::sized(44.0, 32.0)));
    }

    #[test]
    fn intrinsic_size_wins() {
        let image = ImageNode::create(
            &NodeDescription::new("Image")
                .prop("width", 120)
                .prop("height", 40)
                .prop("href", "logo.png"),
        )
        .expect("valid image");
        let reflowable = reflow_and_commit(image.as_ref(), &FixedMeasurer(None), &[]);
        assert_eq!(reflowable.bbox(), Some(&BoundingBox::sized(120.0, 40.0)));
    }

    #[test]
    fn waits_for_unsettled_children() {
        let image = ImageNode::create(&NodeDescription::new("Image")).expect("valid image");
        let children = [ChildGeometry {
            id: NodeId::from_index(1),
            state: ReflowState::PendingMeasurement,
            bbox: None,
        }];
        let reflowable = reflow_and_commit(image.as_ref(), &FixedMeasurer(None), &children);
        assert_eq!(reflowable.state(), ReflowState::PendingMeasurement);
    }
}
