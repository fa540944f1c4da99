//! The plugin capability.

use sl_graph::{HighLevelBlock, LowLevelBlockStructure};
use sl_project::BlockLibraryConfig;

use crate::error::PluginError;

/// Result of offering a block to a plugin.
///
/// `Declined` means the plugin does not handle the block's library/type pair
/// and the next plugin should be tried. It is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileOutcome<T> {
    Accepted(T),
    Declined,
    Failed(PluginError),
}

impl<T> CompileOutcome<T> {
    pub fn is_declined(&self) -> bool {
        matches!(self, CompileOutcome::Declined)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CompileOutcome<U> {
        match self {
            CompileOutcome::Accepted(value) => CompileOutcome::Accepted(f(value)),
            CompileOutcome::Declined => CompileOutcome::Declined,
            CompileOutcome::Failed(err) => CompileOutcome::Failed(err),
        }
    }

    /// `None` when declined.
    pub fn into_result(self) -> Option<Result<T, PluginError>> {
        match self {
            CompileOutcome::Accepted(value) => Some(Ok(value)),
            CompileOutcome::Declined => None,
            CompileOutcome::Failed(err) => Some(Err(err)),
        }
    }
}

/// An accepted block whose work failed is `Failed`, never `Declined`.
impl<T> From<Result<T, PluginError>> for CompileOutcome<T> {
    fn from(result: Result<T, PluginError>) -> Self {
        match result {
            Ok(value) => CompileOutcome::Accepted(value),
            Err(err) => CompileOutcome::Failed(err),
        }
    }
}

/// What an editor needs to draw a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderInfo {
    pub input_ports: u32,
    pub output_ports: u32,
    pub shape: Option<String>,
    pub label: String,
}

impl RenderInfo {
    /// Port counts and label taken from the block itself.
    pub fn from_block(block: &HighLevelBlock) -> Self {
        Self {
            input_ports: block.input_ports(),
            output_ports: block.output_ports(),
            shape: None,
            label: block.label().to_string(),
        }
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }
}

/// Trait for per-block compilers.
///
/// Plugins are consulted in registration order and the first one that does
/// not decline wins. Implementations must tolerate concurrent `compile`
/// calls: blocks may be compiled in parallel.
pub trait Plugin: Send + Sync {
    /// Plugin name for logging and identification.
    fn name(&self) -> &str;

    /// Static advertisement of the block libraries this plugin serves.
    fn libraries(&self) -> &[BlockLibraryConfig];

    /// Whether this plugin serves the block's library/type pair.
    fn handles(&self, block: &HighLevelBlock) -> bool;

    /// Expand one high-level block into a low-level fragment.
    fn compile(&self, block: &HighLevelBlock) -> CompileOutcome<LowLevelBlockStructure>;

    /// Render metadata for one block.
    ///
    /// Default: the block's own port counts and label, no shape.
    fn describe(&self, block: &HighLevelBlock) -> CompileOutcome<RenderInfo> {
        if self.handles(block) {
            CompileOutcome::Accepted(RenderInfo::from_block(block))
        } else {
            CompileOutcome::Declined
        }
    }
}
