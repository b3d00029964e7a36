use thiserror::Error;

use crate::tree::NodeId;

pub type Result<T> = std::result::Result<T, DiagramError>;

/// Developer-facing failures: every variant points at malformed input or a
/// misused tree, never at something an end user can fix.
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("unknown node type `{0}`")]
    UnknownType(String),

    #[error("`{type_tag}` requires at least one child")]
    MissingChildren { type_tag: String },

    #[error("invalid props for `{type_tag}`: {source}")]
    InvalidProps {
        type_tag: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not parse diagram description: {0}")]
    Parse(String),

    #[error("no node with id {0}")]
    UnknownNode(NodeId),

    /// The root was still waiting on geometry when the turn budget ran out.
    #[error("diagram did not settle within {turns} turns")]
    Unsettled { turns: u64 },
}
