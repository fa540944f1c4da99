//! High-level diagram model: what the user drew.

use indexmap::IndexMap;
use serde_json::Value;
use sl_core::ValueType;

use crate::error::{GraphError, GraphResult};

/// Routing direction of an intermediate link segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Horizontal => "Horizontal",
            Orientation::Vertical => "Vertical",
        }
    }

    /// Parse the document spelling (`"Horizontal"` | `"Vertical"`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Horizontal" => Some(Orientation::Horizontal),
            "Vertical" => Some(Orientation::Vertical),
            _ => None,
        }
    }
}

/// A bend point on a link. Rendering hint only; ignored by compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct IntermediateSegment {
    pub id: String,
    pub orientation: Orientation,
    pub x_or_y: f64,
}

/// A configuration property on a high-level block.
///
/// `declared` is the type written at the property site (`{type, value}`
/// form). Legacy flat properties carry no declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockProperty {
    pub declared: Option<ValueType>,
    pub value: Value,
}

impl BlockProperty {
    pub fn typed(declared: ValueType, value: impl Into<Value>) -> Self {
        Self {
            declared: Some(declared),
            value: value.into(),
        }
    }

    pub fn untyped(value: impl Into<Value>) -> Self {
        Self {
            declared: None,
            value: value.into(),
        }
    }
}

/// A user-authored diagram node before expansion.
///
/// The id and port counts are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct HighLevelBlock {
    id: String,
    label: String,
    input_ports: u32,
    output_ports: u32,
    block_library: String,
    block_type: String,
    properties: IndexMap<String, BlockProperty>,
}

impl HighLevelBlock {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        block_library: impl Into<String>,
        block_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            input_ports: 0,
            output_ports: 0,
            block_library: block_library.into(),
            block_type: block_type.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn with_ports(mut self, input_ports: u32, output_ports: u32) -> Self {
        self.input_ports = input_ports;
        self.output_ports = output_ports;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, property: BlockProperty) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn input_ports(&self) -> u32 {
        self.input_ports
    }

    pub fn output_ports(&self) -> u32 {
        self.output_ports
    }

    pub fn block_library(&self) -> &str {
        &self.block_library
    }

    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    /// Properties in document order.
    pub fn properties(&self) -> &IndexMap<String, BlockProperty> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&BlockProperty> {
        self.properties.get(name)
    }
}

/// A high-level link between an output port and an input port.
///
/// Port indices are checked against the blocks only when the link is
/// resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkData {
    /// Absent ids get a generated `link<N>` name at resolution time.
    pub id: Option<String>,
    pub source_id: String,
    pub source_port: u32,
    pub target_id: String,
    pub target_port: u32,
    pub intermediate_segments: Vec<IntermediateSegment>,
}

impl LinkData {
    pub fn new(
        id: Option<String>,
        source_id: impl Into<String>,
        source_port: u32,
        target_id: impl Into<String>,
        target_port: u32,
    ) -> Self {
        Self {
            id,
            source_id: source_id.into(),
            source_port,
            target_id: target_id.into(),
            target_port,
            intermediate_segments: Vec::new(),
        }
    }

    /// The explicit id, ignoring empty strings.
    pub fn explicit_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// The full diagram. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct HighLevelSystem {
    simulation_configuration: String,
    initialization_script: Option<String>,
    toolkit_configuration: String,
    blocks: Vec<HighLevelBlock>,
    links: Vec<LinkData>,
    block_index: IndexMap<String, usize>,
}

impl HighLevelSystem {
    /// Build a system, rejecting duplicate block ids.
    pub fn new(
        simulation_configuration: impl Into<String>,
        initialization_script: Option<String>,
        toolkit_configuration: impl Into<String>,
        blocks: Vec<HighLevelBlock>,
        links: Vec<LinkData>,
    ) -> GraphResult<Self> {
        let mut block_index = IndexMap::with_capacity(blocks.len());
        for (idx, block) in blocks.iter().enumerate() {
            if block_index.insert(block.id.clone(), idx).is_some() {
                return Err(GraphError::DuplicateBlockId {
                    id: block.id.clone(),
                });
            }
        }

        Ok(Self {
            simulation_configuration: simulation_configuration.into(),
            initialization_script,
            toolkit_configuration: toolkit_configuration.into(),
            blocks,
            links,
            block_index,
        })
    }

    pub fn simulation_configuration(&self) -> &str {
        &self.simulation_configuration
    }

    pub fn initialization_script(&self) -> Option<&str> {
        self.initialization_script.as_deref()
    }

    pub fn toolkit_configuration(&self) -> &str {
        &self.toolkit_configuration
    }

    /// Blocks in diagram order.
    pub fn blocks(&self) -> &[HighLevelBlock] {
        &self.blocks
    }

    /// Links in diagram order.
    pub fn links(&self) -> &[LinkData] {
        &self.links
    }

    pub fn block(&self, id: &str) -> Option<&HighLevelBlock> {
        self.block_index.get(id).map(|&idx| &self.blocks[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn orientation_parse() {
        assert_eq!(Orientation::parse("Vertical"), Some(Orientation::Vertical));
        assert_eq!(Orientation::parse("vertical"), None);
        assert_eq!(Orientation::Horizontal.as_str(), "Horizontal");
    }

    #[test]
    fn block_accessors() {
        let block = HighLevelBlock::new("b1", "Gain", "core_BasicBlocks", "Gain")
            .with_ports(1, 1)
            .with_property("Gain", BlockProperty::typed(ValueType::FLOAT, json!(2)));
        assert_eq!(block.id(), "b1");
        assert_eq!(block.input_ports(), 1);
        assert_eq!(
            block.property("Gain").unwrap().declared,
            Some(ValueType::FLOAT)
        );
    }

    #[test]
    fn system_rejects_duplicate_block_ids() {
        let blocks = vec![
            HighLevelBlock::new("a", "A", "lib", "t"),
            HighLevelBlock::new("a", "A again", "lib", "t"),
        ];
        let err = HighLevelSystem::new("sim.yaml", None, "toolkit.yaml", blocks, vec![]).unwrap_err();
        assert_eq!(err, GraphError::DuplicateBlockId { id: "a".into() });
    }

    #[test]
    fn system_block_lookup() {
        let blocks = vec![
            HighLevelBlock::new("a", "A", "lib", "t"),
            HighLevelBlock::new("b", "B", "lib", "t"),
        ];
        let system = HighLevelSystem::new("sim.yaml", None, "toolkit.yaml", blocks, vec![]).unwrap();
        assert_eq!(system.block("b").unwrap().label(), "B");
        assert!(system.block("c").is_none());
    }

    #[test]
    fn empty_link_id_is_not_explicit() {
        let link = LinkData::new(Some(String::new()), "a", 0, "b", 0);
        assert_eq!(link.explicit_id(), None);
    }
}
