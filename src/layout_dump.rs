use crate::layout::{BoundingBox, Matrix};
use crate::reflow::ReflowState;
use crate::tree::{NodeId, NodeRef, RenderTree};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Settled geometry of a whole tree, for debugging layouts.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub root: Option<NodeId>,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub parent: Option<NodeId>,
    pub state: ReflowState,
    pub bbox: Option<BoundingBox>,
    pub transform: Option<String>,
    pub child_transforms: Vec<String>,
}

impl NodeDump {
    fn from_node(node: &NodeRef<'_>) -> Self {
        let state = node.node_state();
        NodeDump {
            id: node.id(),
            type_tag: node.type_tag().to_string(),
            parent: node.parent().map(|parent| parent.id()),
            state: node.state(),
            bbox: node.committed_bbox(),
            transform: state.transform.as_ref().map(Matrix::to_svg),
            child_transforms: state.child_transforms.iter().map(Matrix::to_svg).collect(),
        }
    }
}

impl LayoutDump {
    pub fn from_tree(tree: &RenderTree) -> Self {
        let root = tree.root();
        let nodes: Vec<NodeDump> = root
            .map(|root| tree.descendants(root))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| tree.node_ref(id))
            .map(|node| NodeDump::from_node(&node))
            .collect();
        let (width, height) = tree
            .image_ref()
            .and_then(|image| image.committed_bbox())
            .map(|bbox| (bbox.width, bbox.height))
            .unwrap_or((0.0, 0.0));
        LayoutDump {
            root,
            width,
            height,
            nodes,
        }
    }
}

pub fn write_layout_dump(path: &Path, tree: &RenderTree) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_tree(tree);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
