//! sl-compiler: flattens high-level diagrams into engine-ready structures.
//!
//! The compiler offers every block to a [`PluginRegistry`](sl_plugins::PluginRegistry),
//! absorbs the fragments the plugins return and resolves the diagram's links
//! through each block's port map. The `service` module wraps this in
//! file-level operations for front ends.
//!
//! # Example
//!
//! ```
//! use sl_compiler::compile_system;
//! use sl_graph::{HighLevelBlock, HighLevelSystem, LinkData};
//! use sl_plugins::PluginRegistry;
//!
//! let blocks = vec![
//!     HighLevelBlock::new("n1", "Neuron", "neuron_library", "neuron").with_ports(1, 1),
//!     HighLevelBlock::new("d1", "Display", "display_library", "display").with_ports(1, 0),
//! ];
//! let links = vec![LinkData::new(Some("L1".into()), "n1", 0, "d1", 0)];
//! let system = HighLevelSystem::new("sim.yaml", None, "toolkit.yaml", blocks, links).unwrap();
//!
//! let structure = compile_system(&system, &PluginRegistry::builtins()).unwrap();
//! assert_eq!(structure.links().last().unwrap().destination_block_id, "d1");
//! ```

pub mod compile;
pub mod describe;
pub mod engine;
pub mod error;
pub mod service;

pub use compile::{CompileOptions, compile_block, compile_system, compile_system_with};
pub use describe::{available_libraries, describe_block};
pub use engine::{EngineError, SimulationEngine, SimulationOutput, TimeSeries, compile_and_simulate};
pub use error::{AppError, AppResult, CompileFailure, Endpoint, LinkFailure};
pub use service::{
    DiagramSummary, OutputFormat, Toolkit, ToolkitOverrides, compile_file, compile_to_file,
    default_output_path, describe_file, load_toolkit, render_structure, validate_file, write_structure,
};
