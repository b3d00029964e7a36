use serde::Deserialize;

use super::{NodeRenderer, ReflowContext, RenderContext, typed_props};
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::ir::NodeDescription;
use crate::layout::{BoundingBox, fmt_num};
use crate::primitive::{Element, Primitive};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PinProps {
    pub radius: Option<f32>,
}

/// Round terminal marker. Its size is fixed, so nothing is measured.
#[derive(Debug, Clone)]
pub struct PinNode {
    props: PinProps,
}

impl PinNode {
    pub fn create(description: &NodeDescription) -> Result<Box<dyn NodeRenderer>> {
        Ok(Box::new(Self {
            props: typed_props(description)?,
        }))
    }

    fn radius(&self, config: &LayoutConfig) -> f32 {
        self.props.radius.unwrap_or(config.pin_radius).max(0.0)
    }
}

impl NodeRenderer for PinNode {
    fn type_tag(&self) -> &str {
        "Pin"
    }

    fn render(&self, cx: &RenderContext<'_>) -> Primitive {
        let r = fmt_num(self.radius(cx.config));
        Element::new("circle")
            .attr("class", "pin")
            .attr("cx", r.clone())
            .attr("cy", r.clone())
            .attr("r", r)
            .attr("fill", cx.theme.pin_fill.clone())
            .attr("stroke", cx.theme.pin_stroke.clone())
            .into()
    }

    fn reflow(&self, cx: &mut ReflowContext<'_>) {
        let diameter = self.radius(cx.config()) * 2.0;
        cx.set_bbox(BoundingBox::sized(diameter, diameter));
    }
}
