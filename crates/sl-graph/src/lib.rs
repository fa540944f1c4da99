//! sl-graph: graph/model layer for the syslink toolkit.
//!
//! Provides:
//! - High-level diagram model (blocks, links, routing segments, system)
//! - Low-level execution model (blocks, links, port maps, fragments)
//! - Incremental structure builder with fragment validation
//! - Engine-facing output document and fingerprinting
//!
//! # Example
//!
//! ```
//! use sl_graph::{LowLevelBlock, LowLevelBlockStructure, LowLevelLink, StructureBuilder};
//!
//! let mut builder = StructureBuilder::new();
//! builder
//!     .add_fragment("src", LowLevelBlockStructure::single(
//!         LowLevelBlock::new("src", "Source", "BasicCpp", "BasicBlocks/Constant"), 0, 1))
//!     .unwrap();
//! builder
//!     .add_fragment("dst", LowLevelBlockStructure::single(
//!         LowLevelBlock::new("dst", "Sink", "BasicCpp", "BasicBlocks/Display"), 1, 0))
//!     .unwrap();
//! builder.push_link(LowLevelLink::new("L1", "L1", "src", 0, "dst", 0));
//! let structure = builder.build().unwrap();
//!
//! assert_eq!(structure.blocks().len(), 2);
//! assert_eq!(structure.links().len(), 1);
//! ```

pub mod builder;
pub mod document;
pub mod error;
pub mod high_level;
pub mod low_level;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::StructureBuilder;
pub use error::{GraphError, GraphResult};
pub use high_level::{
    BlockProperty, HighLevelBlock, HighLevelSystem, IntermediateSegment, LinkData, Orientation,
};
pub use low_level::{
    LowLevelBlock, LowLevelBlockStructure, LowLevelLink, LowLevelStructure, PortAddress,
    PortDirection, PortMap, PropertyValue,
};
