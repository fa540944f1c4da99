//! Fan-out plugin: a neuron is a weighted sum plus a bias.
//!
//! A neuron with `n` inputs becomes `n` gain blocks (one per input), a bias
//! constant and an adder with `n + 1` inputs:
//!
//! ```text
//! in 0 ─▶ <id>_gain0 ─┐
//!   ...               ├─▶ <id>_adder ─▶ out 0
//! in n-1 ▶ <id>_gain… ┤
//!         <id>_offset ┘
//! ```

use sl_core::{TypedValue, ValueType};
use sl_graph::{
    HighLevelBlock, LowLevelBlock, LowLevelBlockStructure, LowLevelLink, PortAddress, PortDirection,
    PortMap, PropertyValue,
};
use sl_project::{BlockLibraryConfig, BlockTypeConfig, ConfigurationValue, PluginDescriptor};

use crate::error::{PluginError, PluginResult};
use crate::properties::read_property;
use crate::traits::{CompileOutcome, Plugin, RenderInfo};

pub const NEURON_LIBRARY: &str = "neuron_library";
pub const NEURON_TYPE: &str = "neuron";
const ENGINE_BLOCK_TYPE: &str = "BasicCpp";
const SHAPE: &str = "circle";

#[derive(Debug, Clone)]
pub struct NeuronPlugin {
    name: String,
    block_type: String,
    libraries: Vec<BlockLibraryConfig>,
}

impl Default for NeuronPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl NeuronPlugin {
    pub fn new() -> Self {
        Self {
            name: "neuron".to_string(),
            block_type: ENGINE_BLOCK_TYPE.to_string(),
            libraries: vec![neuron_library()],
        }
    }

    /// Name and engine block type from a descriptor; the served library is
    /// fixed.
    pub fn from_descriptor(descriptor: &PluginDescriptor) -> Self {
        Self {
            name: descriptor.plugin_name.clone(),
            block_type: descriptor
                .block_type
                .clone()
                .unwrap_or_else(|| ENGINE_BLOCK_TYPE.to_string()),
            libraries: vec![neuron_library()],
        }
    }

    fn gains(&self, block: &HighLevelBlock) -> PluginResult<Vec<f64>> {
        let inputs = block.input_ports() as usize;
        let mut gains = match read_property(block, "gains", ValueType::FLOAT_ARRAY)? {
            Some(TypedValue::FloatArray(gains)) => gains,
            _ => Vec::new(),
        };
        if gains.len() > inputs {
            return Err(PluginError::InvalidProperty {
                property: "gains".to_string(),
                reason: format!("{} gains for {} inputs", gains.len(), inputs),
            });
        }
        gains.resize(inputs, 1.0);
        Ok(gains)
    }

    fn offset(&self, block: &HighLevelBlock) -> PluginResult<f64> {
        match read_property(block, "offset", ValueType::FLOAT)? {
            Some(TypedValue::Float(offset)) => Ok(offset),
            _ => Ok(0.0),
        }
    }

    fn expand(&self, block: &HighLevelBlock) -> PluginResult<LowLevelBlockStructure> {
        let n = block.input_ports();
        if n == 0 {
            return Err(PluginError::InvalidProperty {
                property: "inputPorts".to_string(),
                reason: "a neuron needs at least one input".to_string(),
            });
        }
        let gains = self.gains(block)?;
        let offset = self.offset(block)?;

        let id = block.id();
        let adder_id = format!("{id}_adder");
        let offset_id = format!("{id}_offset");

        let mut blocks = Vec::with_capacity(n as usize + 2);
        let mut links = Vec::with_capacity(n as usize + 1);
        let mut port_map = PortMap::new();

        for (i, gain) in (0..n).zip(gains) {
            let gain_id = format!("{id}_gain{i}");
            blocks.push(
                LowLevelBlock::new(&gain_id, format!("Gain {}", i + 1), &self.block_type, "BasicBlocks/Gain")
                    .with_property("Gain", PropertyValue::typed(ValueType::FLOAT, TypedValue::Float(gain))),
            );
            port_map.insert(PortDirection::Input, i, PortAddress::new(&gain_id, 0));

            let link_id = format!("{id}_link{i}");
            links.push(LowLevelLink::new(&link_id, &link_id, gain_id, 0, &adder_id, i));
        }

        blocks.push(
            LowLevelBlock::new(&offset_id, "Offset", &self.block_type, "BasicBlocks/Constant")
                .with_property("Value", PropertyValue::typed(ValueType::FLOAT, TypedValue::Float(offset))),
        );
        let link_id = format!("{id}_link{n}");
        links.push(LowLevelLink::new(&link_id, &link_id, &offset_id, 0, &adder_id, n));

        blocks.push(
            LowLevelBlock::new(&adder_id, "Adder", &self.block_type, "BasicBlocks/Adder").with_property(
                "Gains",
                PropertyValue::typed(
                    ValueType::FLOAT_ARRAY,
                    TypedValue::FloatArray(vec![1.0; n as usize + 1]),
                ),
            ),
        );
        port_map.insert(PortDirection::Output, 0, PortAddress::new(&adder_id, 0));

        Ok(LowLevelBlockStructure::new(blocks, links, port_map))
    }
}

fn neuron_library() -> BlockLibraryConfig {
    BlockLibraryConfig {
        name: NEURON_LIBRARY.to_string(),
        block_types: vec![BlockTypeConfig {
            name: NEURON_TYPE.to_string(),
            configuration_values: vec![
                ConfigurationValue {
                    name: "gains".to_string(),
                    value_type: ValueType::FLOAT_ARRAY,
                    default_value: None,
                },
                ConfigurationValue {
                    name: "offset".to_string(),
                    value_type: ValueType::FLOAT,
                    default_value: Some(serde_json::json!(0.0)),
                },
            ],
            block_shape: Some(SHAPE.to_string()),
            input_ports: None,
            output_ports: Some(1),
        }],
    }
}

impl Plugin for NeuronPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn libraries(&self) -> &[BlockLibraryConfig] {
        &self.libraries
    }

    fn handles(&self, block: &HighLevelBlock) -> bool {
        block.block_library() == NEURON_LIBRARY && block.block_type() == NEURON_TYPE
    }

    fn compile(&self, block: &HighLevelBlock) -> CompileOutcome<LowLevelBlockStructure> {
        if !self.handles(block) {
            return CompileOutcome::Declined;
        }
        self.expand(block).into()
    }

    fn describe(&self, block: &HighLevelBlock) -> CompileOutcome<RenderInfo> {
        if !self.handles(block) {
            return CompileOutcome::Declined;
        }
        CompileOutcome::Accepted(RenderInfo {
            input_ports: block.input_ports(),
            output_ports: 1,
            shape: Some(SHAPE.to_string()),
            label: block.label().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sl_graph::BlockProperty;

    fn neuron(inputs: u32) -> HighLevelBlock {
        HighLevelBlock::new("n1", "Neuron", NEURON_LIBRARY, NEURON_TYPE).with_ports(inputs, 1)
    }

    fn expand(block: &HighLevelBlock) -> LowLevelBlockStructure {
        match NeuronPlugin::new().compile(block) {
            CompileOutcome::Accepted(fragment) => fragment,
            other => panic!("expected accepted, got {other:?}"),
        }
    }

    #[test]
    fn three_input_neuron_layout() {
        let block = neuron(3).with_property("gains", BlockProperty::untyped(json!([0.5, "2"])));
        let fragment = expand(&block);

        let ids: Vec<&str> = fragment.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["n1_gain0", "n1_gain1", "n1_gain2", "n1_offset", "n1_adder"]);

        let gains: Vec<_> = fragment.blocks[..3].iter().map(|b| b.properties["Gain"].clone()).collect();
        assert_eq!(
            gains,
            [0.5, 2.0, 1.0].map(|g| PropertyValue::typed(ValueType::FLOAT, TypedValue::Float(g)))
        );

        assert_eq!(fragment.links.len(), 4);
        let offset_link = &fragment.links[3];
        assert_eq!(offset_link.id, "n1_link3");
        assert_eq!(offset_link.source_block_id, "n1_offset");
        assert_eq!(offset_link.destination_port, 3);

        for i in 0..3 {
            assert_eq!(
                fragment.port_map.input(i),
                Some(&PortAddress::new(format!("n1_gain{i}"), 0))
            );
        }
        assert_eq!(fragment.port_map.output(0), Some(&PortAddress::new("n1_adder", 0)));
        assert_eq!(fragment.port_map.len(), 4);
        fragment.validate("n1").unwrap();
    }

    #[test]
    fn defaults_without_properties() {
        let fragment = expand(&neuron(1));
        assert_eq!(
            fragment.blocks[1].properties["Value"],
            PropertyValue::typed(ValueType::FLOAT, TypedValue::Float(0.0))
        );
        assert_eq!(
            fragment.blocks[2].properties["Gains"],
            PropertyValue::typed(ValueType::FLOAT_ARRAY, TypedValue::FloatArray(vec![1.0, 1.0]))
        );
    }

    #[test]
    fn too_many_gains() {
        let block = neuron(1).with_property("gains", BlockProperty::untyped(json!([1, 2])));
        assert!(matches!(
            NeuronPlugin::new().compile(&block),
            CompileOutcome::Failed(PluginError::InvalidProperty { .. })
        ));
    }

    #[test]
    fn zero_inputs_rejected() {
        assert!(matches!(
            NeuronPlugin::new().compile(&neuron(0)),
            CompileOutcome::Failed(_)
        ));
    }

    #[test]
    fn declines_other_blocks() {
        let block = HighLevelBlock::new("g", "g", "core_BasicBlocks", "Gain");
        assert!(NeuronPlugin::new().compile(&block).is_declined());
    }

    #[test]
    fn describe_reports_single_output() {
        let CompileOutcome::Accepted(info) = NeuronPlugin::new().describe(&neuron(4)) else {
            panic!("expected render info");
        };
        assert_eq!((info.input_ports, info.output_ports), (4, 1));
        assert_eq!(info.shape.as_deref(), Some("circle"));
    }
}
