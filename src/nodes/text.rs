use serde::Deserialize;

use super::{NodeRenderer, ReflowContext, RenderContext, typed_props};
use crate::error::{DiagramError, Result};
use crate::ir::NodeDescription;
use crate::layout::{BoundingBox, Matrix, fmt_num};
use crate::primitive::{Element, Primitive};
use crate::reflow::StateUpdate;

const LEFT_QUOTE: &str = "\u{201c}";
const RIGHT_QUOTE: &str = "\u{201d}";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextProps {
    /// Wrap the content in typographic quotes.
    pub quoted: bool,
    /// Name of a text style variant from the theme.
    pub theme: Option<String>,
}

/// A single line of text whose top-left corner is moved to the node origin
/// once its extents are known.
#[derive(Debug, Clone)]
pub struct TextNode {
    props: TextProps,
}

impl TextNode {
    pub fn create(description: &NodeDescription) -> Result<Box<dyn NodeRenderer>> {
        if description.children.is_empty() {
            return Err(DiagramError::MissingChildren {
                type_tag: description.type_tag.clone(),
            });
        }
        Ok(Box::new(Self {
            props: typed_props(description)?,
        }))
    }

    fn content(&self, cx: &RenderContext<'_>) -> Vec<Primitive> {
        if !self.props.quoted {
            return cx.child_slots();
        }
        let quote = |glyph: &str| -> Primitive {
            Element::new("tspan")
                .attr("class", "text-quote")
                .attr("fill", cx.theme.quote_color.clone())
                .child(Primitive::text(glyph))
                .into()
        };
        vec![
            quote(LEFT_QUOTE),
            Element::new("tspan").children(cx.child_slots()).into(),
            quote(RIGHT_QUOTE),
        ]
    }
}

impl NodeRenderer for TextNode {
    fn type_tag(&self) -> &str {
        "Text"
    }

    fn render(&self, cx: &RenderContext<'_>) -> Primitive {
        let style = cx.theme.text_style(self.props.theme.as_deref());
        let mut text = Element::new("text")
            .attr("font-family", cx.theme.font_family.clone())
            .transform(cx.state.transform.as_ref());
        if let Some(size) = style.font_size {
            text = text.attr("font-size", fmt_num(size));
        }
        if let Some(fill) = style.fill {
            text = text.attr("fill", fill);
        }
        if let Some(weight) = style.font_weight {
            text = text.attr("font-weight", weight);
        }
        if let Some(font_style) = style.font_style {
            text = text.attr("font-style", font_style);
        }
        if let Some(variant) = &self.props.theme {
            text = text.attr("class", variant.clone());
        }
        text.children(self.content(cx)).into()
    }

    fn reflow(&self, cx: &mut ReflowContext<'_>) {
        if !cx.children_settled() {
            return;
        }
        let Some(measured) = cx.measure() else {
            return;
        };
        cx.set_bbox(BoundingBox::sized(measured.width, measured.height));
        cx.set_state_async(StateUpdate::transform(Matrix::translate(
            -measured.x,
            -measured.y,
        )));
    }
}
