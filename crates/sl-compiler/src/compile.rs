//! Flattening of a high-level system into a low-level structure.
//!
//! 1. Every high-level block is offered to the registry's plugins in order;
//!    the first one that does not decline produces its fragment.
//! 2. Fragments are absorbed in diagram order; port maps are kept per block.
//! 3. Every high-level link is resolved through the port maps of its two
//!    endpoint blocks and appended after the internal links.
//! 4. The structure is validated and returned. Property formatting for the
//!    engine happens when the structure is rendered as a document.

use std::collections::HashSet;

use rayon::prelude::*;
use sl_graph::{
    HighLevelBlock, HighLevelSystem, LinkData, LowLevelBlockStructure, LowLevelLink, LowLevelStructure,
    PortAddress, PortDirection, StructureBuilder,
};
use sl_plugins::{CompileOutcome, Plugin, PluginRegistry};
use sl_project::ToolkitConfig;
use tracing::{debug, info};

use crate::error::{CompileFailure, Endpoint, LinkFailure};

/// Knobs for a compilation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Compile blocks on the rayon pool. Output order is unaffected.
    pub parallel: bool,
}

impl CompileOptions {
    pub fn from_config(config: &ToolkitConfig) -> Self {
        Self {
            parallel: config.parallel,
        }
    }
}

/// Offer `block` to each plugin in registration order and return the first
/// non-declined outcome.
pub(crate) fn dispatch<'r, T>(
    block: &HighLevelBlock,
    registry: &'r PluginRegistry,
    offer: impl Fn(&dyn Plugin, &HighLevelBlock) -> CompileOutcome<T>,
) -> Result<(T, &'r str), CompileFailure> {
    for plugin in registry.all_plugins() {
        match offer(plugin.as_ref(), block) {
            CompileOutcome::Accepted(value) => return Ok((value, plugin.name())),
            CompileOutcome::Declined => continue,
            CompileOutcome::Failed(err) => return Err(CompileFailure::from_plugin(block.id(), err)),
        }
    }
    Err(CompileFailure::UnresolvedBlock {
        block_id: block.id().to_string(),
        block_library: block.block_library().to_string(),
        block_type: block.block_type().to_string(),
    })
}

/// Compile one high-level block with the first willing plugin.
pub fn compile_block(
    block: &HighLevelBlock,
    registry: &PluginRegistry,
) -> Result<LowLevelBlockStructure, CompileFailure> {
    let (fragment, plugin) = dispatch(block, registry, |plugin, block| plugin.compile(block))?;
    debug!(
        block = block.id(),
        plugin,
        blocks = fragment.blocks.len(),
        links = fragment.links.len(),
        "Compiled block"
    );
    Ok(fragment)
}

/// Compile a system with default options.
pub fn compile_system(
    system: &HighLevelSystem,
    registry: &PluginRegistry,
) -> Result<LowLevelStructure, CompileFailure> {
    compile_system_with(system, registry, CompileOptions::default())
}

pub fn compile_system_with(
    system: &HighLevelSystem,
    registry: &PluginRegistry,
    options: CompileOptions,
) -> Result<LowLevelStructure, CompileFailure> {
    let fragments = compile_blocks(system.blocks(), registry, options.parallel)?;

    let mut builder = StructureBuilder::new();
    for (block, fragment) in system.blocks().iter().zip(fragments) {
        builder.add_fragment(block.id(), fragment)?;
    }

    let mut namer = LinkNamer::new(system.links());
    for link in system.links() {
        let id = namer.id_for(link);
        let resolved = {
            let source = resolve_endpoint(
                system,
                &builder,
                &id,
                Endpoint::Source,
                &link.source_id,
                link.source_port,
            )?;
            let target = resolve_endpoint(
                system,
                &builder,
                &id,
                Endpoint::Target,
                &link.target_id,
                link.target_port,
            )?;
            LowLevelLink::between(id, source, target)
        };
        debug!(
            link = resolved.id.as_str(),
            source = resolved.source_block_id.as_str(),
            source_port = resolved.source_port,
            target = resolved.destination_block_id.as_str(),
            target_port = resolved.destination_port,
            "Resolved link"
        );
        builder.push_link(resolved);
    }

    let structure = builder.build()?;
    info!(
        high_level_blocks = system.blocks().len(),
        blocks = structure.blocks().len(),
        links = structure.links().len(),
        "Compiled system"
    );
    Ok(structure)
}

/// Fragments in diagram order. With `parallel`, the first failure in diagram
/// order is reported, as in a sequential run.
fn compile_blocks(
    blocks: &[HighLevelBlock],
    registry: &PluginRegistry,
    parallel: bool,
) -> Result<Vec<LowLevelBlockStructure>, CompileFailure> {
    if parallel {
        let results: Vec<_> = blocks
            .par_iter()
            .map(|block| compile_block(block, registry))
            .collect();
        results.into_iter().collect()
    } else {
        blocks.iter().map(|block| compile_block(block, registry)).collect()
    }
}

fn resolve_endpoint<'b>(
    system: &HighLevelSystem,
    builder: &'b StructureBuilder,
    link_id: &str,
    endpoint: Endpoint,
    block_id: &str,
    port: u32,
) -> Result<&'b PortAddress, CompileFailure> {
    let fail = |reason| CompileFailure::UnresolvedLink {
        link_id: link_id.to_string(),
        endpoint,
        reason,
    };

    let block = system.block(block_id).ok_or_else(|| {
        fail(LinkFailure::UnknownBlock {
            block_id: block_id.to_string(),
        })
    })?;

    let (direction, available) = match endpoint {
        Endpoint::Source => (PortDirection::Output, block.output_ports()),
        Endpoint::Target => (PortDirection::Input, block.input_ports()),
    };
    if port >= available {
        return Err(fail(LinkFailure::PortOutOfRange {
            block_id: block_id.to_string(),
            port,
            available,
        }));
    }

    builder
        .port_map(block_id)
        .and_then(|map| map.get(direction, port))
        .ok_or_else(|| {
            fail(LinkFailure::NotMapped {
                block_id: block_id.to_string(),
                port,
            })
        })
}

/// Ids for resolved links: the explicit id, or `link<N>` with `N` counting
/// id-less links from 1 and skipping names that explicit ids already use.
struct LinkNamer<'a> {
    taken: HashSet<&'a str>,
    counter: usize,
}

impl<'a> LinkNamer<'a> {
    fn new(links: &'a [LinkData]) -> Self {
        Self {
            taken: links.iter().filter_map(LinkData::explicit_id).collect(),
            counter: 0,
        }
    }

    fn id_for(&mut self, link: &LinkData) -> String {
        if let Some(id) = link.explicit_id() {
            return id.to_string();
        }
        loop {
            self.counter += 1;
            let candidate = format!("link{}", self.counter);
            if !self.taken.contains(candidate.as_str()) {
                return candidate;
            }
        }
    }
}
