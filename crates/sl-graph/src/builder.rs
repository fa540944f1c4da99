//! Incremental assembly of the flattened low-level structure.

use indexmap::IndexMap;

use crate::error::{GraphError, GraphResult};
use crate::low_level::{LowLevelBlock, LowLevelBlockStructure, LowLevelLink, LowLevelStructure, PortMap};
use crate::validate;

/// Builder for the aggregate low-level structure.
///
/// Fragments are moved in with `add_fragment` (blocks and internal links are
/// appended in call order, the port map is retained per owning high-level
/// block), resolved links are appended with `push_link`, then `build()`
/// validates and freezes the result.
#[derive(Debug, Default)]
pub struct StructureBuilder {
    blocks: Vec<LowLevelBlock>,
    block_owners: Vec<String>,
    links: Vec<LowLevelLink>,
    port_maps: IndexMap<String, PortMap>,
}

impl StructureBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and absorb the fragment compiled for high-level block `owner`.
    pub fn add_fragment(&mut self, owner: &str, fragment: LowLevelBlockStructure) -> GraphResult<()> {
        if self.port_maps.contains_key(owner) {
            return Err(GraphError::DuplicateFragment {
                owner: owner.to_string(),
            });
        }
        fragment.validate(owner)?;

        let LowLevelBlockStructure {
            blocks,
            links,
            port_map,
        } = fragment;
        self.block_owners
            .extend(std::iter::repeat_n(owner.to_string(), blocks.len()));
        self.blocks.extend(blocks);
        self.links.extend(links);
        self.port_maps.insert(owner.to_string(), port_map);
        Ok(())
    }

    /// Port map recorded for a high-level block.
    pub fn port_map(&self, owner: &str) -> Option<&PortMap> {
        self.port_maps.get(owner)
    }

    /// Append a link after the internal links collected so far.
    pub fn push_link(&mut self, link: LowLevelLink) {
        self.links.push(link);
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Validate and freeze the structure.
    pub fn build(self) -> GraphResult<LowLevelStructure> {
        validate::validate_unique_blocks(&self.blocks, &self.block_owners)?;

        Ok(LowLevelStructure {
            blocks: self.blocks,
            links: self.links,
        })
    }
}
