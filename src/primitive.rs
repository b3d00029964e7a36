//! Drawn SVG primitives produced by node renderers.

use std::collections::BTreeMap;

use crate::layout::Matrix;
use crate::tree::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Element(Element),
    /// Character data; escaped on output.
    Text(String),
    /// Slot for a child node's output, filled in by [`crate::tree::RenderTree::resolve`].
    Child(NodeId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Primitive>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn transform(self, transform: Option<&Matrix>) -> Self {
        match transform {
            Some(matrix) if !matrix.is_identity() => self.attr("transform", matrix.to_svg()),
            _ => self,
        }
    }

    pub fn child(mut self, child: impl Into<Primitive>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Primitive>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn get_f32(&self, name: &str) -> Option<f32> {
        self.get(name)?.trim().trim_end_matches("px").parse().ok()
    }
}

impl From<Element> for Primitive {
    fn from(element: Element) -> Self {
        Primitive::Element(element)
    }
}

impl Primitive {
    pub fn text(content: impl Into<String>) -> Self {
        Primitive::Text(content.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Primitive::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated character data of this subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Primitive::Text(text) => out.push_str(text),
            Primitive::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
            Primitive::Child(_) => {}
        }
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        self.write_svg(&mut out);
        out
    }

    pub fn write_svg(&self, out: &mut String) {
        match self {
            Primitive::Text(text) => out.push_str(&escape_xml(text)),
            Primitive::Child(_) => {}
            Primitive::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attrs {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_xml(value)));
                }
                if element.children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for child in &element.children {
                    child.write_svg(out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_nested_elements() {
        let primitive: Primitive = Element::new("g")
            .attr("class", "pin")
            .child(Element::new("circle").attr("r", "5"))
            .child(Primitive::text("a < b"))
            .into();
        assert_eq!(
            primitive.to_svg(),
            "<g class=\"pin\"><circle r=\"5\"/>a &lt; b</g>"
        );
    }

    #[test]
    fn identity_transform_is_omitted() {
        let element = Element::new("g").transform(Some(&Matrix::identity()));
        assert!(element.get("transform").is_none());
        let moved = Element::new("g").transform(Some(&Matrix::translate(1.0, 2.0)));
        assert_eq!(moved.get("transform"), Some("translate(1 2)"));
    }

    #[test]
    fn text_content_skips_markup() {
        let primitive: Primitive = Element::new("text")
            .child(Element::new("tspan").child(Primitive::text("\u{201c}")))
            .child(Primitive::text("abc"))
            .into();
        assert_eq!(primitive.text_content(), "\u{201c}abc");
    }
}
