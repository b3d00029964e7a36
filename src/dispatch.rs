//! Type tag → renderer lookup.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DiagramError, Result};
use crate::ir::NodeDescription;
use crate::nodes::{ImageNode, LayoutNode, MarkupNode, NodeRenderer, PinNode, TextNode, TextRunNode};

pub type Constructor = fn(&NodeDescription) -> Result<Box<dyn NodeRenderer>>;

static TAG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.:-]*$").unwrap());

/// Maps type tags to renderer constructors.
///
/// Tags without a constructor go to the fallback, which by default renders
/// them as literal markup.
#[derive(Clone)]
pub struct Registry {
    constructors: HashMap<String, Constructor>,
    fallback: Option<Constructor>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("Text", TextNode::create)
            .register("Pin", PinNode::create)
            .register("Image", ImageNode::create)
            .register("HorizontalLayout", LayoutNode::horizontal)
            .register("VerticalLayout", LayoutNode::vertical);
        registry.fallback = Some(MarkupNode::create);
        registry
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("Registry")
            .field("tags", &tags)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl Registry {
    /// A registry with no renderers and no fallback.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
            fallback: None,
        }
    }

    pub fn register(&mut self, type_tag: impl Into<String>, constructor: Constructor) -> &mut Self {
        self.constructors.insert(type_tag.into(), constructor);
        self
    }

    pub fn set_fallback(&mut self, fallback: Option<Constructor>) -> &mut Self {
        self.fallback = fallback;
        self
    }

    /// Same renderers, but unknown tags become errors.
    pub fn without_markup_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.constructors.contains_key(type_tag)
    }

    pub fn create(&self, description: &NodeDescription) -> Result<Box<dyn NodeRenderer>> {
        if let Some(constructor) = self.constructors.get(&description.type_tag) {
            return constructor(description);
        }
        match self.fallback {
            Some(fallback) if TAG_NAME_RE.is_match(&description.type_tag) => fallback(description),
            _ => Err(DiagramError::UnknownType(description.type_tag.clone())),
        }
    }

    pub fn create_text_run(&self, text: &str) -> Box<dyn NodeRenderer> {
        Box::new(TextRunNode::new(text))
    }
}
