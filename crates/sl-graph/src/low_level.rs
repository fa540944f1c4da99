//! Low-level execution model: what the engine runs.

use core::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use sl_core::{TypedValue, ValueType, format_for_engine};

use crate::error::GraphResult;
use crate::validate;

/// Direction of a high-level port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            PortDirection::Input => "input",
            PortDirection::Output => "output",
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete low-level port: (block id, port index).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortAddress {
    pub block_id: String,
    pub port: u32,
}

impl PortAddress {
    pub fn new(block_id: impl Into<String>, port: u32) -> Self {
        Self {
            block_id: block_id.into(),
            port,
        }
    }
}

/// Per-high-level-block lookup from (direction, port index) to a low-level port.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortMap {
    entries: IndexMap<(PortDirection, u32), PortAddress>,
}

impl PortMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-to-one mapping onto a single low-level block: high-level port `i`
    /// maps to port `i` of `block_id`, in both directions.
    pub fn mirror(block_id: &str, input_ports: u32, output_ports: u32) -> Self {
        let mut map = Self::new();
        for i in 0..input_ports {
            map.insert(PortDirection::Input, i, PortAddress::new(block_id, i));
        }
        for i in 0..output_ports {
            map.insert(PortDirection::Output, i, PortAddress::new(block_id, i));
        }
        map
    }

    pub fn insert(&mut self, direction: PortDirection, port: u32, address: PortAddress) {
        self.entries.insert((direction, port), address);
    }

    pub fn get(&self, direction: PortDirection, port: u32) -> Option<&PortAddress> {
        self.entries.get(&(direction, port))
    }

    pub fn input(&self, port: u32) -> Option<&PortAddress> {
        self.get(PortDirection::Input, port)
    }

    pub fn output(&self, port: u32) -> Option<&PortAddress> {
        self.get(PortDirection::Output, port)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PortDirection, u32, &PortAddress)> {
        self.entries.iter().map(|(&(dir, port), addr)| (dir, port, addr))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A property on a low-level block.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Coerced against a declared type; rendered with `format_for_engine`.
    Typed {
        declared: ValueType,
        value: TypedValue,
    },
    /// Forwarded without a declared type.
    Raw(Value),
}

impl PropertyValue {
    pub fn typed(declared: ValueType, value: TypedValue) -> Self {
        PropertyValue::Typed { declared, value }
    }

    /// The value as the engine receives it.
    pub fn engine_value(&self) -> Value {
        match self {
            PropertyValue::Typed { declared, value } => format_for_engine(*declared, value).to_json(),
            PropertyValue::Raw(raw) => raw.clone(),
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(raw: Value) -> Self {
        PropertyValue::Raw(raw)
    }
}

/// An engine-ready primitive node. Produced by plugins only.
#[derive(Debug, Clone, PartialEq)]
pub struct LowLevelBlock {
    pub id: String,
    pub name: String,
    /// Engine-level kind, e.g. the owning plugin's category.
    pub block_type: String,
    /// Fully-qualified engine block identifier, `"<library>/<type>"`.
    pub block_class: String,
    pub properties: IndexMap<String, PropertyValue>,
}

impl LowLevelBlock {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        block_type: impl Into<String>,
        block_class: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            block_type: block_type.into(),
            block_class: block_class.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// A connection between two low-level ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowLevelLink {
    pub id: String,
    pub name: String,
    pub source_block_id: String,
    pub source_port: u32,
    pub destination_block_id: String,
    pub destination_port: u32,
}

impl LowLevelLink {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        source_block_id: impl Into<String>,
        source_port: u32,
        destination_block_id: impl Into<String>,
        destination_port: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source_block_id: source_block_id.into(),
            source_port,
            destination_block_id: destination_block_id.into(),
            destination_port,
        }
    }

    /// Connect two resolved port addresses.
    pub fn between(id: impl Into<String>, source: &PortAddress, destination: &PortAddress) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            source_block_id: source.block_id.clone(),
            source_port: source.port,
            destination_block_id: destination.block_id.clone(),
            destination_port: destination.port,
        }
    }
}

/// What a plugin returns for one high-level block (a "fragment").
///
/// Internal links connect blocks of the same fragment and never appear in
/// the port map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LowLevelBlockStructure {
    pub blocks: Vec<LowLevelBlock>,
    pub links: Vec<LowLevelLink>,
    pub port_map: PortMap,
}

impl LowLevelBlockStructure {
    pub fn new(blocks: Vec<LowLevelBlock>, links: Vec<LowLevelLink>, port_map: PortMap) -> Self {
        Self {
            blocks,
            links,
            port_map,
        }
    }

    /// A fragment of exactly one block whose ports mirror the high-level ones.
    pub fn single(block: LowLevelBlock, input_ports: u32, output_ports: u32) -> Self {
        let port_map = PortMap::mirror(&block.id, input_ports, output_ports);
        Self::new(vec![block], Vec::new(), port_map)
    }

    /// Check that every port-map target and internal link endpoint is a block
    /// of this fragment.
    pub fn validate(&self, owner: &str) -> GraphResult<()> {
        validate::validate_fragment(owner, self)
    }
}

/// The flattened output: every low-level block and link, in construction order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LowLevelStructure {
    pub(crate) blocks: Vec<LowLevelBlock>,
    pub(crate) links: Vec<LowLevelLink>,
}

impl LowLevelStructure {
    pub fn blocks(&self) -> &[LowLevelBlock] {
        &self.blocks
    }

    pub fn links(&self) -> &[LowLevelLink] {
        &self.links
    }

    pub fn block(&self, id: &str) -> Option<&LowLevelBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn link(&self, id: &str) -> Option<&LowLevelLink> {
        self.links.iter().find(|l| l.id == id)
    }
}
