//! Document schema definitions.
//!
//! Field names are camelCase on disk. The snake_case spellings written by
//! older tooling are accepted as aliases.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sl_core::ValueType;

/// A diagram document (`.pslk`, `.json` or `.yaml`).
///
/// Required fields are optional here so that validation can report every
/// missing one at once instead of failing on the first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDef {
    #[serde(default, alias = "simulation_configuration", skip_serializing_if = "Option::is_none")]
    pub simulation_configuration: Option<String>,
    #[serde(
        default,
        alias = "initialization_python_script_path",
        alias = "initializationPythonScriptPath",
        skip_serializing_if = "Option::is_none"
    )]
    pub initialization_script_path: Option<String>,
    #[serde(default, alias = "toolkit_configuration_path", skip_serializing_if = "Option::is_none")]
    pub toolkit_configuration_path: Option<String>,
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
    #[serde(default)]
    pub links: Vec<LinkDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name; falls back to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, alias = "input_ports")]
    pub input_ports: u32,
    #[serde(default, alias = "output_ports")]
    pub output_ports: u32,
    #[serde(default, alias = "block_library", skip_serializing_if = "Option::is_none")]
    pub block_library: Option<String>,
    #[serde(default, alias = "block_type", skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyDef>,
}

/// A property as written in a document: either the `{type, value}` pair or a
/// legacy flat value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PropertyDef {
    Typed {
        #[serde(rename = "type")]
        value_type: String,
        value: Value,
    },
    Flat(Value),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "source_id", skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, alias = "source_port", skip_serializing_if = "Option::is_none")]
    pub source_port: Option<u32>,
    #[serde(default, alias = "target_id", skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, alias = "target_port", skip_serializing_if = "Option::is_none")]
    pub target_port: Option<u32>,
    #[serde(default, alias = "intermediate_segments")]
    pub intermediate_segments: Vec<SegmentDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(default, alias = "x_or_y", skip_serializing_if = "Option::is_none")]
    pub x_or_y: Option<f64>,
}

/// Per-plugin descriptor (`*.pslkp.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    pub plugin_name: String,
    /// Selects the plugin implementation: `core`, `neuron` or `display`.
    pub plugin_type: String,
    /// Engine-level kind stamped on every block the plugin emits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,
    /// Implementation reference. Informational; nothing is loaded from it.
    #[serde(
        default,
        alias = "dynamicLibrary",
        alias = "pythonFilename",
        skip_serializing_if = "Option::is_none"
    )]
    pub implementation: Option<String>,
    #[serde(default)]
    pub block_libraries: Vec<BlockLibraryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockLibraryConfig {
    pub name: String,
    #[serde(default)]
    pub block_types: Vec<BlockTypeConfig>,
}

impl BlockLibraryConfig {
    pub fn block_type(&self, name: &str) -> Option<&BlockTypeConfig> {
        self.block_types.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeConfig {
    pub name: String,
    #[serde(default)]
    pub configuration_values: Vec<ConfigurationValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_ports: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_ports: Option<u32>,
}

impl BlockTypeConfig {
    pub fn configuration_value(&self, name: &str) -> Option<&ConfigurationValue> {
        self.configuration_values.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationValue {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

/// Toolkit configuration: where plugins come from and how compilation runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolkitConfig {
    /// Descriptor files, relative to the configuration file.
    #[serde(default, alias = "plugin_descriptors")]
    pub plugin_descriptors: Vec<PathBuf>,
    /// Directories searched recursively for `*.pslkp.yaml` descriptors.
    #[serde(default, alias = "plugin_paths")]
    pub plugin_paths: Vec<PathBuf>,
    #[serde(default = "default_builtin_plugins", alias = "builtin_plugins")]
    pub builtin_plugins: bool,
    #[serde(default, alias = "strict_properties")]
    pub strict_properties: bool,
    #[serde(default)]
    pub parallel: bool,
}

fn default_builtin_plugins() -> bool {
    true
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            plugin_descriptors: Vec::new(),
            plugin_paths: Vec::new(),
            builtin_plugins: default_builtin_plugins(),
            strict_properties: false,
            parallel: false,
        }
    }
}

/// Options handed to the simulation engine together with the compiled
/// structure. Nothing here is interpreted by the compiler.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOptions {
    #[serde(default, alias = "start_time", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(default, alias = "stop_time", skip_serializing_if = "Option::is_none")]
    pub stop_time: Option<f64>,
    #[serde(default, alias = "run_in_natural_time")]
    pub run_in_natural_time: bool,
    #[serde(
        default,
        alias = "natural_time_speed_multiplier",
        skip_serializing_if = "Option::is_none"
    )]
    pub natural_time_speed_multiplier: Option<f64>,
    #[serde(default, alias = "logged_signals")]
    pub logged_signals: Vec<LoggedSignal>,
    #[serde(default, alias = "solvers_configuration")]
    pub solvers_configuration: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggedSignal {
    #[serde(alias = "block_id")]
    pub block_id: String,
    pub direction: SignalDirection,
    pub port: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Input,
    Output,
}
