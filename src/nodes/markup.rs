use serde_json::Value;

use super::{NodeRenderer, ReflowContext, RenderContext};
use crate::error::Result;
use crate::ir::{NodeDescription, Props};
use crate::primitive::{Element, Primitive};

/// Raw SVG element for any tag without a dedicated renderer.
///
/// Props become attributes verbatim; children are dispatched as usual.
#[derive(Debug, Clone)]
pub struct MarkupNode {
    tag: String,
    props: Props,
}

impl MarkupNode {
    pub fn create(description: &NodeDescription) -> Result<Box<dyn NodeRenderer>> {
        Ok(Box::new(Self {
            tag: description.type_tag.clone(),
            props: description.props.clone(),
        }))
    }
}

fn attribute_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

impl NodeRenderer for MarkupNode {
    fn type_tag(&self) -> &str {
        &self.tag
    }

    fn render(&self, cx: &RenderContext<'_>) -> Primitive {
        let mut element = Element::new(self.tag.clone());
        for (name, value) in &self.props {
            if let Some(value) = attribute_value(value) {
                element = element.attr(name.clone(), value);
            }
        }
        element.children(cx.child_slots()).into()
    }

    fn reflow(&self, cx: &mut ReflowContext<'_>) {
        if !cx.children_settled() {
            return;
        }
        if let Some(bbox) = cx.measure() {
            cx.set_bbox(bbox);
        }
    }
}

/// A literal string child.
#[derive(Debug, Clone)]
pub struct TextRunNode {
    text: String,
}

impl TextRunNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl NodeRenderer for TextRunNode {
    fn type_tag(&self) -> &str {
        "#text"
    }

    fn render(&self, _cx: &RenderContext<'_>) -> Primitive {
        Primitive::text(self.text.clone())
    }

    fn reflow(&self, cx: &mut ReflowContext<'_>) {
        if let Some(bbox) = cx.measure() {
            cx.set_bbox(bbox);
        }
    }
}
