//! Conversion from decoded documents to the high-level model.

use sl_graph::{HighLevelBlock, HighLevelSystem, IntermediateSegment, LinkData, Orientation};

use crate::ProjectResult;
use crate::migrate::normalize_properties;
use crate::namespace::ParameterNamespace;
use crate::schema::{BlockDef, DiagramDef, LinkDef, SegmentDef};
use crate::validate::{ValidationError, validate_block, validate_diagram};

/// Validate `diagram` and build the immutable `HighLevelSystem`, substituting
/// namespace parameters into property values.
pub fn build_system(diagram: &DiagramDef, namespace: &ParameterNamespace) -> ProjectResult<HighLevelSystem> {
    validate_diagram(diagram)?;

    let blocks = diagram
        .blocks
        .iter()
        .map(|block| convert_block(block, namespace))
        .collect::<Result<Vec<_>, _>>()?;
    let links = diagram.links.iter().map(convert_link).collect();

    let system = HighLevelSystem::new(
        diagram.simulation_configuration.clone().unwrap_or_default(),
        diagram.initialization_script_path.clone(),
        diagram.toolkit_configuration_path.clone().unwrap_or_default(),
        blocks,
        links,
    )?;
    Ok(system)
}

/// Build a single block outside of any diagram (used by `describe`).
pub fn build_block(block: &BlockDef, namespace: &ParameterNamespace) -> ProjectResult<HighLevelBlock> {
    validate_block(0, block)?;
    Ok(convert_block(block, namespace)?)
}

// Required fields below were checked by validation.

fn convert_block(block: &BlockDef, namespace: &ParameterNamespace) -> Result<HighLevelBlock, ValidationError> {
    let id = block.id.clone().unwrap_or_default();
    let label = block.label.clone().unwrap_or_else(|| id.clone());

    let mut converted = HighLevelBlock::new(
        id,
        label,
        block.block_library.clone().unwrap_or_default(),
        block.block_type.clone().unwrap_or_default(),
    )
    .with_ports(block.input_ports, block.output_ports);

    for (name, mut property) in normalize_properties(&block.properties)? {
        property.value = namespace.substitute(&property.value);
        converted = converted.with_property(name, property);
    }
    Ok(converted)
}

fn convert_link(link: &LinkDef) -> LinkData {
    let mut converted = LinkData::new(
        link.id.clone(),
        link.source_id.clone().unwrap_or_default(),
        link.source_port.unwrap_or_default(),
        link.target_id.clone().unwrap_or_default(),
        link.target_port.unwrap_or_default(),
    );
    converted.intermediate_segments = link.intermediate_segments.iter().map(convert_segment).collect();
    converted
}

fn convert_segment(segment: &SegmentDef) -> IntermediateSegment {
    IntermediateSegment {
        id: segment.id.clone().unwrap_or_default(),
        orientation: segment
            .orientation
            .as_deref()
            .and_then(Orientation::parse)
            .unwrap_or(Orientation::Horizontal),
        x_or_y: segment.x_or_y.unwrap_or_default(),
    }
}
