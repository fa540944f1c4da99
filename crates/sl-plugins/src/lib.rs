//! sl-plugins: per-block compilers for the syslink toolkit.
//!
//! Provides:
//! - The `Plugin` capability (compile / describe / libraries) and its
//!   three-way `CompileOutcome`
//! - `CoreBlockPlugin`, driven by a plugin descriptor's block schema
//! - Built-in `NeuronPlugin` (fan-out) and `DisplayPlugin` (sink)
//! - `PluginRegistry`, the ordered list the compiler dispatches over
//!
//! # Example
//!
//! ```
//! use sl_graph::HighLevelBlock;
//! use sl_plugins::{CompileOutcome, Plugin, PluginRegistry};
//!
//! let registry = PluginRegistry::builtins();
//! let block = HighLevelBlock::new("n1", "Neuron", "neuron_library", "neuron").with_ports(2, 1);
//!
//! let outcome = registry.all_plugins()[0].compile(&block);
//! let CompileOutcome::Accepted(fragment) = outcome else { panic!() };
//! assert_eq!(fragment.blocks.len(), 4);
//! ```

pub mod core_block;
pub mod display;
pub mod error;
pub mod neuron;
pub mod properties;
pub mod registry;
pub mod traits;

pub use core_block::{CORE_LIBRARY_PREFIX, CoreBlockPlugin};
pub use display::DisplayPlugin;
pub use error::{PluginError, PluginResult};
pub use neuron::NeuronPlugin;
pub use registry::{PluginRegistry, plugin_from_descriptor};
pub use traits::{CompileOutcome, Plugin, RenderInfo};
