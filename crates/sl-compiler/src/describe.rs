//! Block rendering metadata and library listing for editors.

use sl_graph::HighLevelBlock;
use sl_plugins::{PluginRegistry, RenderInfo};
use sl_project::BlockLibraryConfig;
use tracing::debug;

use crate::compile::dispatch;
use crate::error::CompileFailure;

/// Render info from the first plugin that does not decline the block.
pub fn describe_block(block: &HighLevelBlock, registry: &PluginRegistry) -> Result<RenderInfo, CompileFailure> {
    let (info, plugin) = dispatch(block, registry, |plugin, block| plugin.describe(block))?;
    debug!(block = block.id(), plugin, "Described block");
    Ok(info)
}

/// Every plugin's advertised libraries, in registration order.
pub fn available_libraries(registry: &PluginRegistry) -> Vec<&BlockLibraryConfig> {
    registry
        .all_plugins()
        .iter()
        .flat_map(|plugin| plugin.libraries())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_libraries_in_order() {
        let registry = PluginRegistry::builtins();
        let names: Vec<&str> = available_libraries(&registry)
            .iter()
            .map(|library| library.name.as_str())
            .collect();
        assert_eq!(names, ["neuron_library", "display_library"]);
    }

    #[test]
    fn describe_unknown_block() {
        let block = HighLevelBlock::new("w", "w", "widgets", "widget");
        assert!(matches!(
            describe_block(&block, &PluginRegistry::builtins()),
            Err(CompileFailure::UnresolvedBlock { .. })
        ));
    }

    #[test]
    fn describe_display() {
        let block = HighLevelBlock::new("d", "Scope", "display_library", "display");
        let info = describe_block(&block, &PluginRegistry::builtins()).unwrap();
        assert_eq!((info.input_ports, info.output_ports), (1, 0));
        assert_eq!(info.label, "Scope");
    }
}
