//! Descriptor-driven single-block plugin.
//!
//! Every block type listed in the descriptor compiles to exactly one
//! low-level block whose ports mirror the high-level ones. Properties are
//! coerced against the schema; schema defaults fill the gaps.

use indexmap::IndexMap;
use sl_graph::{HighLevelBlock, LowLevelBlock, LowLevelBlockStructure, PropertyValue};
use sl_project::{BlockLibraryConfig, BlockTypeConfig, PluginDescriptor};
use tracing::warn;

use crate::error::{PluginError, PluginResult};
use crate::properties::coerce_property;
use crate::traits::{CompileOutcome, Plugin, RenderInfo};

/// Prefix under which core libraries are advertised.
pub const CORE_LIBRARY_PREFIX: &str = "core_";

#[derive(Debug, Clone)]
pub struct CoreBlockPlugin {
    name: String,
    block_type: String,
    libraries: Vec<BlockLibraryConfig>,
    strict: bool,
}

impl CoreBlockPlugin {
    /// Build from a descriptor. `blockType` is required.
    pub fn new(descriptor: PluginDescriptor) -> PluginResult<Self> {
        let PluginDescriptor {
            plugin_name,
            block_type,
            block_libraries,
            ..
        } = descriptor;

        let block_type = block_type.ok_or_else(|| PluginError::InvalidDescriptor {
            plugin: plugin_name.clone(),
            field: "blockType",
        })?;

        let libraries = block_libraries
            .into_iter()
            .map(|mut library| {
                if !library.name.starts_with(CORE_LIBRARY_PREFIX) {
                    library.name = format!("{}{}", CORE_LIBRARY_PREFIX, library.name);
                }
                library
            })
            .collect();

        Ok(Self {
            name: plugin_name,
            block_type,
            libraries,
            strict: false,
        })
    }

    /// Reject properties with no declared type instead of forwarding them.
    pub fn with_strict_properties(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// `"<library>/<type>"` with the core prefix removed.
    pub fn block_class(library: &str, block_type: &str) -> String {
        let library = library.strip_prefix(CORE_LIBRARY_PREFIX).unwrap_or(library);
        format!("{}/{}", library, block_type)
    }

    fn library(&self, name: &str) -> Option<&BlockLibraryConfig> {
        self.libraries.iter().find(|library| {
            library.name == name
                || library
                    .name
                    .strip_prefix(CORE_LIBRARY_PREFIX)
                    .is_some_and(|bare| bare == name)
        })
    }

    fn schema(&self, block: &HighLevelBlock) -> PluginResult<&BlockTypeConfig> {
        self.library(block.block_library())
            .and_then(|library| library.block_type(block.block_type()))
            .ok_or_else(|| PluginError::SchemaLookup {
                library: block.block_library().to_string(),
                block_type: block.block_type().to_string(),
            })
    }

    /// Block properties in document order, then schema defaults for the
    /// ones the block leaves out, in schema order.
    fn properties(
        &self,
        block: &HighLevelBlock,
        schema: &BlockTypeConfig,
    ) -> PluginResult<IndexMap<String, PropertyValue>> {
        let mut properties = IndexMap::new();

        for (name, property) in block.properties() {
            let declared = schema
                .configuration_value(name)
                .map(|value| value.value_type)
                .or(property.declared);

            let value = match declared {
                Some(declared) => {
                    PropertyValue::typed(declared, coerce_property(name, declared, &property.value)?)
                }
                None if self.strict => {
                    return Err(PluginError::UndeclaredProperty {
                        property: name.clone(),
                        library: block.block_library().to_string(),
                        block_type: block.block_type().to_string(),
                    });
                }
                None => {
                    warn!(
                        block = block.id(),
                        property = name.as_str(),
                        "Forwarding property without declared type"
                    );
                    PropertyValue::Raw(property.value.clone())
                }
            };
            properties.insert(name.clone(), value);
        }

        for value in &schema.configuration_values {
            if properties.contains_key(&value.name) {
                continue;
            }
            if let Some(default) = &value.default_value {
                let typed = coerce_property(&value.name, value.value_type, default)?;
                properties.insert(
                    value.name.clone(),
                    PropertyValue::typed(value.value_type, typed),
                );
            }
        }

        Ok(properties)
    }

    fn compile_accepted(&self, block: &HighLevelBlock) -> PluginResult<LowLevelBlockStructure> {
        let schema = self.schema(block)?;

        let mut low_level = LowLevelBlock::new(
            block.id(),
            block.label(),
            self.block_type.as_str(),
            Self::block_class(block.block_library(), block.block_type()),
        );
        low_level.properties = self.properties(block, schema)?;

        Ok(LowLevelBlockStructure::single(
            low_level,
            block.input_ports(),
            block.output_ports(),
        ))
    }
}

impl Plugin for CoreBlockPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn libraries(&self) -> &[BlockLibraryConfig] {
        &self.libraries
    }

    /// Any block in one of this plugin's libraries. An unknown type inside
    /// a known library is a schema failure, not a decline.
    fn handles(&self, block: &HighLevelBlock) -> bool {
        self.library(block.block_library()).is_some()
    }

    fn compile(&self, block: &HighLevelBlock) -> CompileOutcome<LowLevelBlockStructure> {
        if !self.handles(block) {
            return CompileOutcome::Declined;
        }
        self.compile_accepted(block).into()
    }

    fn describe(&self, block: &HighLevelBlock) -> CompileOutcome<RenderInfo> {
        if !self.handles(block) {
            return CompileOutcome::Declined;
        }
        self.schema(block)
            .map(|schema| RenderInfo {
                input_ports: schema.input_ports.unwrap_or(block.input_ports()),
                output_ports: schema.output_ports.unwrap_or(block.output_ports()),
                shape: schema.block_shape.clone(),
                label: block.label().to_string(),
            })
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sl_core::{TypedValue, ValueType};
    use sl_graph::{BlockProperty, PortAddress};

    fn descriptor() -> PluginDescriptor {
        serde_json::from_value(json!({
            "pluginName": "BasicBlocks",
            "pluginType": "core",
            "blockType": "BasicCpp",
            "blockLibraries": [{
                "name": "BasicBlocks",
                "blockTypes": [
                    {"name": "Gain", "blockShape": "triangle", "inputPorts": 1, "outputPorts": 1,
                     "configurationValues": [
                        {"name": "Gain", "type": "float", "defaultValue": 1},
                        {"name": "Saturate", "type": "bool", "defaultValue": false}
                     ]},
                    {"name": "Constant",
                     "configurationValues": [{"name": "Value", "type": "float"}]}
                ]
            }]
        }))
        .unwrap()
    }

    fn plugin() -> CoreBlockPlugin {
        CoreBlockPlugin::new(descriptor()).unwrap()
    }

    fn gain(library: &str) -> HighLevelBlock {
        HighLevelBlock::new("g1", "My gain", library, "Gain")
            .with_ports(1, 1)
            .with_property("Gain", BlockProperty::untyped(json!("2.5")))
    }

    #[test]
    fn libraries_are_prefixed() {
        assert_eq!(plugin().libraries()[0].name, "core_BasicBlocks");
    }

    #[test]
    fn block_class_strips_prefix() {
        assert_eq!(CoreBlockPlugin::block_class("core_BasicBlocks", "Gain"), "BasicBlocks/Gain");
        assert_eq!(CoreBlockPlugin::block_class("BasicBlocks", "Gain"), "BasicBlocks/Gain");
    }

    #[test]
    fn compile_single_block() {
        let CompileOutcome::Accepted(fragment) = plugin().compile(&gain("core_BasicBlocks")) else {
            panic!("expected the gain block to be accepted");
        };
        assert_eq!(fragment.blocks.len(), 1);
        assert!(fragment.links.is_empty());

        let block = &fragment.blocks[0];
        assert_eq!(block.name, "My gain");
        assert_eq!(block.block_type, "BasicCpp");
        assert_eq!(block.block_class, "BasicBlocks/Gain");
        assert_eq!(
            block.properties["Gain"],
            PropertyValue::typed(ValueType::FLOAT, TypedValue::Float(2.5))
        );
        // default appended after the block's own properties
        let names: Vec<&str> = block.properties.keys().map(String::as_str).collect();
        assert_eq!(names, ["Gain", "Saturate"]);

        assert_eq!(fragment.port_map.input(0), Some(&PortAddress::new("g1", 0)));
        assert_eq!(fragment.port_map.output(0), Some(&PortAddress::new("g1", 0)));
    }

    #[test]
    fn unprefixed_library_is_accepted() {
        assert!(matches!(plugin().compile(&gain("BasicBlocks")), CompileOutcome::Accepted(_)));
    }

    #[test]
    fn other_library_is_declined() {
        let block = HighLevelBlock::new("w", "w", "widgets", "widget");
        assert!(plugin().compile(&block).is_declined());
        assert!(plugin().describe(&block).is_declined());
    }

    #[test]
    fn unknown_type_in_known_library_fails() {
        let block = HighLevelBlock::new("x", "x", "core_BasicBlocks", "Integrator");
        assert!(matches!(
            plugin().compile(&block),
            CompileOutcome::Failed(PluginError::SchemaLookup { .. })
        ));
    }

    #[test]
    fn coercion_failure_names_property() {
        let block = HighLevelBlock::new("g", "g", "core_BasicBlocks", "Gain")
            .with_property("Gain", BlockProperty::untyped(json!("fast")));
        let CompileOutcome::Failed(err) = plugin().compile(&block) else {
            panic!("expected a failure");
        };
        assert!(matches!(err, PluginError::Coercion { ref property, value_type, .. }
            if property == "Gain" && value_type == ValueType::FLOAT));
    }

    #[test]
    fn unknown_property_lenient_and_strict() {
        let block = gain("core_BasicBlocks").with_property("Color", BlockProperty::untyped(json!("red")));

        let CompileOutcome::Accepted(fragment) = plugin().compile(&block) else {
            panic!("lenient mode should accept");
        };
        assert_eq!(fragment.blocks[0].properties["Color"], PropertyValue::Raw(json!("red")));

        let strict = plugin().with_strict_properties(true);
        assert!(matches!(
            strict.compile(&block),
            CompileOutcome::Failed(PluginError::UndeclaredProperty { .. })
        ));
    }

    #[test]
    fn site_declaration_used_when_schema_is_silent() {
        let block = gain("core_BasicBlocks")
            .with_property("Taps", BlockProperty::typed(ValueType::INT_ARRAY, json!(["1", 2])));
        let strict = plugin().with_strict_properties(true);
        let CompileOutcome::Accepted(fragment) = strict.compile(&block) else {
            panic!("site-declared property should be accepted");
        };
        assert_eq!(
            fragment.blocks[0].properties["Taps"],
            PropertyValue::typed(ValueType::INT_ARRAY, TypedValue::IntArray(vec![1, 2]))
        );
    }

    #[test]
    fn describe_uses_schema() {
        let block = HighLevelBlock::new("g", "Gain", "core_BasicBlocks", "Gain");
        let CompileOutcome::Accepted(info) = plugin().describe(&block) else {
            panic!("expected render info");
        };
        assert_eq!(info.input_ports, 1);
        assert_eq!(info.output_ports, 1);
        assert_eq!(info.shape.as_deref(), Some("triangle"));

        let constant = HighLevelBlock::new("c", "C", "core_BasicBlocks", "Constant").with_ports(0, 1);
        let CompileOutcome::Accepted(info) = plugin().describe(&constant) else {
            panic!("expected render info");
        };
        assert_eq!((info.input_ports, info.output_ports), (0, 1));
        assert_eq!(info.shape, None);
    }

    #[test]
    fn descriptor_without_block_type_is_rejected() {
        let mut d = descriptor();
        d.block_type = None;
        assert!(matches!(
            CoreBlockPlugin::new(d),
            Err(PluginError::InvalidDescriptor { field: "blockType", .. })
        ));
    }
}
