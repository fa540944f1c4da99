//! Graph-specific error types.

use crate::low_level::PortDirection;

pub type GraphResult<T> = Result<T, GraphError>;

/// Model construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two high-level blocks in one system share an id.
    DuplicateBlockId { id: String },

    /// Two low-level blocks in the aggregate structure share an id.
    DuplicateLowLevelBlockId { id: String, owners: [String; 2] },

    /// A high-level block contributed more than one fragment.
    DuplicateFragment { owner: String },

    /// A port-map entry points at a block that is not part of its fragment.
    DanglingPortMapping {
        owner: String,
        direction: PortDirection,
        port: u32,
        block_id: String,
    },

    /// An internal link references a block that is not part of its fragment.
    DanglingInternalLink {
        owner: String,
        link_id: String,
        block_id: String,
    },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateBlockId { id } => {
                write!(f, "Block id '{}' is used more than once", id)
            }
            GraphError::DuplicateLowLevelBlockId { id, owners } => {
                write!(
                    f,
                    "Low-level block id '{}' produced by both '{}' and '{}'",
                    id, owners[0], owners[1]
                )
            }
            GraphError::DuplicateFragment { owner } => {
                write!(f, "Block '{}' was compiled more than once", owner)
            }
            GraphError::DanglingPortMapping {
                owner,
                direction,
                port,
                block_id,
            } => {
                write!(
                    f,
                    "Block '{}' maps {} port {} to '{}', which is not in its fragment",
                    owner, direction, port, block_id
                )
            }
            GraphError::DanglingInternalLink {
                owner,
                link_id,
                block_id,
            } => {
                write!(
                    f,
                    "Internal link '{}' of block '{}' references unknown block '{}'",
                    link_id, owner, block_id
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}
