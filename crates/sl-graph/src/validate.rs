//! Structural validation of fragments and of the aggregate structure.

use std::collections::{HashMap, HashSet};

use crate::error::{GraphError, GraphResult};
use crate::low_level::{LowLevelBlock, LowLevelBlockStructure};

/// Validate one plugin fragment: port-map targets and internal link
/// endpoints must all be blocks of the fragment.
pub(crate) fn validate_fragment(owner: &str, fragment: &LowLevelBlockStructure) -> GraphResult<()> {
    let ids: HashSet<&str> = fragment.blocks.iter().map(|b| b.id.as_str()).collect();

    for (direction, port, address) in fragment.port_map.iter() {
        if !ids.contains(address.block_id.as_str()) {
            return Err(GraphError::DanglingPortMapping {
                owner: owner.to_string(),
                direction,
                port,
                block_id: address.block_id.clone(),
            });
        }
    }

    for link in &fragment.links {
        for endpoint in [&link.source_block_id, &link.destination_block_id] {
            if !ids.contains(endpoint.as_str()) {
                return Err(GraphError::DanglingInternalLink {
                    owner: owner.to_string(),
                    link_id: link.id.clone(),
                    block_id: endpoint.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Validate that low-level block ids are unique across all fragments.
///
/// `owners[i]` is the high-level block that produced `blocks[i]`.
pub(crate) fn validate_unique_blocks(blocks: &[LowLevelBlock], owners: &[String]) -> GraphResult<()> {
    let mut seen: HashMap<&str, &str> = HashMap::with_capacity(blocks.len());
    for (block, owner) in blocks.iter().zip(owners) {
        if let Some(first) = seen.insert(block.id.as_str(), owner.as_str()) {
            return Err(GraphError::DuplicateLowLevelBlockId {
                id: block.id.clone(),
                owners: [first.to_string(), owner.clone()],
            });
        }
    }
    Ok(())
}
