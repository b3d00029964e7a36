use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Props are forwarded to renderers exactly as written in the description.
pub type Props = Map<String, Value>;

/// A node of the input diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Child {
    Text(String),
    Node(NodeDescription),
}

impl NodeDescription {
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            props: Map::new(),
            children: Vec::new(),
        }
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: NodeDescription) -> Self {
        self.children.push(Child::Node(child));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    /// Total number of nodes, including text runs.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| match child {
                Child::Text(_) => 1,
                Child::Node(node) => node.node_count(),
            })
            .sum::<usize>()
    }
}

impl From<NodeDescription> for Child {
    fn from(node: NodeDescription) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}
