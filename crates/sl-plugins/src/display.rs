//! Sink plugin: shows one signal.

use sl_graph::{HighLevelBlock, LowLevelBlock, LowLevelBlockStructure};
use sl_project::{BlockLibraryConfig, BlockTypeConfig, PluginDescriptor};

use crate::error::PluginResult;
use crate::properties::site_property;
use crate::traits::{CompileOutcome, Plugin, RenderInfo};

pub const DISPLAY_LIBRARY: &str = "display_library";
pub const DISPLAY_TYPE: &str = "display";
const ENGINE_BLOCK_TYPE: &str = "BasicCpp";
const SHAPE: &str = "square";

#[derive(Debug, Clone)]
pub struct DisplayPlugin {
    name: String,
    block_type: String,
    libraries: Vec<BlockLibraryConfig>,
}

impl Default for DisplayPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPlugin {
    pub fn new() -> Self {
        Self {
            name: "display".to_string(),
            block_type: ENGINE_BLOCK_TYPE.to_string(),
            libraries: vec![display_library()],
        }
    }

    pub fn from_descriptor(descriptor: &PluginDescriptor) -> Self {
        Self {
            name: descriptor.plugin_name.clone(),
            block_type: descriptor
                .block_type
                .clone()
                .unwrap_or_else(|| ENGINE_BLOCK_TYPE.to_string()),
            libraries: vec![display_library()],
        }
    }

    fn sink(&self, block: &HighLevelBlock) -> PluginResult<LowLevelBlockStructure> {
        let mut sink = LowLevelBlock::new(block.id(), block.label(), &self.block_type, "BasicBlocks/Display");
        for (name, property) in block.properties() {
            sink.properties.insert(name.clone(), site_property(name, property)?);
        }
        // Only input 0 is wired, whatever the block declares.
        Ok(LowLevelBlockStructure::single(sink, 1, 0))
    }
}

fn display_library() -> BlockLibraryConfig {
    BlockLibraryConfig {
        name: DISPLAY_LIBRARY.to_string(),
        block_types: vec![BlockTypeConfig {
            name: DISPLAY_TYPE.to_string(),
            configuration_values: Vec::new(),
            block_shape: Some(SHAPE.to_string()),
            input_ports: Some(1),
            output_ports: Some(0),
        }],
    }
}

impl Plugin for DisplayPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn libraries(&self) -> &[BlockLibraryConfig] {
        &self.libraries
    }

    fn handles(&self, block: &HighLevelBlock) -> bool {
        block.block_library() == DISPLAY_LIBRARY && block.block_type() == DISPLAY_TYPE
    }

    fn compile(&self, block: &HighLevelBlock) -> CompileOutcome<LowLevelBlockStructure> {
        if !self.handles(block) {
            return CompileOutcome::Declined;
        }
        self.sink(block).into()
    }

    fn describe(&self, block: &HighLevelBlock) -> CompileOutcome<RenderInfo> {
        if !self.handles(block) {
            return CompileOutcome::Declined;
        }
        CompileOutcome::Accepted(RenderInfo {
            input_ports: 1,
            output_ports: 0,
            shape: Some(SHAPE.to_string()),
            label: block.label().to_string(),
        })
    }
}
