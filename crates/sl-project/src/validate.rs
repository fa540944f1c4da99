//! Diagram validation logic.

use std::collections::HashSet;

use sl_core::ValueType;
use sl_graph::Orientation;

use crate::schema::{BlockDef, DiagramDef, LinkDef, PropertyDef, SegmentDef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing fields in {entity}: {}", fields.join(", "))]
    MissingFields {
        entity: String,
        fields: Vec<&'static str>,
    },

    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl ValidationError {
    /// The missing field names, for `MissingFields`.
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            ValidationError::MissingFields { fields, .. } => fields,
            _ => &[],
        }
    }
}

/// Check that a decoded diagram can become a `HighLevelSystem`.
///
/// Stops at the first invalid entity; for that entity every missing field is
/// reported.
pub fn validate_diagram(diagram: &DiagramDef) -> Result<(), ValidationError> {
    let mut missing = Vec::new();
    if diagram.simulation_configuration.is_none() {
        missing.push("simulationConfiguration");
    }
    if diagram.toolkit_configuration_path.is_none() {
        missing.push("toolkitConfigurationPath");
    }
    check_missing("system", missing)?;

    let mut block_ids = HashSet::new();
    for (idx, block) in diagram.blocks.iter().enumerate() {
        validate_block(idx, block)?;
        if let Some(id) = &block.id
            && !block_ids.insert(id.as_str())
        {
            return Err(ValidationError::DuplicateId {
                id: id.clone(),
                context: "blocks".to_string(),
            });
        }
    }

    for (idx, link) in diagram.links.iter().enumerate() {
        validate_link(idx, link)?;
    }

    Ok(())
}

pub(crate) fn validate_block(idx: usize, block: &BlockDef) -> Result<(), ValidationError> {
    let entity = match &block.id {
        Some(id) => format!("block '{}'", id),
        None => format!("block #{}", idx),
    };

    let mut missing = Vec::new();
    if block.id.is_none() {
        missing.push("id");
    }
    if block.block_library.is_none() {
        missing.push("blockLibrary");
    }
    if block.block_type.is_none() {
        missing.push("blockType");
    }
    check_missing(&entity, missing)?;

    for (name, property) in &block.properties {
        if let PropertyDef::Typed { value_type, .. } = property
            && let Err(err) = value_type.parse::<ValueType>()
        {
            return Err(ValidationError::InvalidValue {
                field: format!("{} property '{}' type", entity, name),
                value: value_type.clone(),
                reason: err.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_link(idx: usize, link: &LinkDef) -> Result<(), ValidationError> {
    let entity = match link.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => format!("link '{}'", id),
        None => format!("link #{}", idx),
    };

    let mut missing = Vec::new();
    if link.source_id.is_none() {
        missing.push("sourceId");
    }
    if link.source_port.is_none() {
        missing.push("sourcePort");
    }
    if link.target_id.is_none() {
        missing.push("targetId");
    }
    if link.target_port.is_none() {
        missing.push("targetPort");
    }
    check_missing(&entity, missing)?;

    for (seg_idx, segment) in link.intermediate_segments.iter().enumerate() {
        validate_segment(&entity, seg_idx, segment)?;
    }

    Ok(())
}

fn validate_segment(link: &str, idx: usize, segment: &SegmentDef) -> Result<(), ValidationError> {
    let entity = format!("segment #{} of {}", idx, link);

    let mut missing = Vec::new();
    if segment.id.is_none() {
        missing.push("id");
    }
    if segment.orientation.is_none() {
        missing.push("orientation");
    }
    if segment.x_or_y.is_none() {
        missing.push("xOrY");
    }
    check_missing(&entity, missing)?;

    if let Some(orientation) = &segment.orientation
        && Orientation::parse(orientation).is_none()
    {
        return Err(ValidationError::InvalidValue {
            field: format!("{} orientation", entity),
            value: orientation.clone(),
            reason: "expected Horizontal or Vertical".to_string(),
        });
    }

    Ok(())
}

fn check_missing(entity: &str, fields: Vec<&'static str>) -> Result<(), ValidationError> {
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields {
            entity: entity.to_string(),
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diagram() -> DiagramDef {
        serde_json::from_value(json!({
            "simulationConfiguration": "sim.yaml",
            "toolkitConfigurationPath": "toolkit.yaml",
            "blocks": [
                {"id": "a", "label": "A", "outputPorts": 1, "blockLibrary": "core_BasicBlocks", "blockType": "Constant"},
                {"id": "b", "label": "B", "inputPorts": 1, "blockLibrary": "core_BasicBlocks", "blockType": "Display"}
            ],
            "links": [
                {"id": "L1", "sourceId": "a", "sourcePort": 0, "targetId": "b", "targetPort": 0,
                 "intermediateSegments": [{"id": "s0", "orientation": "Horizontal", "xOrY": 3.0}]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn valid_diagram_passes() {
        validate_diagram(&diagram()).unwrap();
    }

    #[test]
    fn system_fields_reported_together() {
        let mut d = diagram();
        d.simulation_configuration = None;
        d.toolkit_configuration_path = None;
        let err = validate_diagram(&d).unwrap_err();
        assert_eq!(
            err.missing_fields(),
            ["simulationConfiguration", "toolkitConfigurationPath"]
        );
    }

    #[test]
    fn block_missing_fields_reported_together() {
        let mut d = diagram();
        d.blocks[1].block_library = None;
        d.blocks[1].block_type = None;
        let err = validate_diagram(&d).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                entity: "block 'b'".into(),
                fields: vec!["blockLibrary", "blockType"],
            }
        );
    }

    #[test]
    fn link_without_source_reported() {
        let mut d = diagram();
        d.links[0].source_id = None;
        d.links[0].id = None;
        let err = validate_diagram(&d).unwrap_err();
        assert_eq!(err.missing_fields(), ["sourceId"]);
        assert!(err.to_string().contains("link #0"));
    }

    #[test]
    fn link_id_is_optional() {
        let mut d = diagram();
        d.links[0].id = None;
        validate_diagram(&d).unwrap();
    }

    #[test]
    fn duplicate_block_id_rejected() {
        let mut d = diagram();
        d.blocks[1].id = Some("a".into());
        assert!(matches!(
            validate_diagram(&d),
            Err(ValidationError::DuplicateId { ref id, .. }) if id == "a"
        ));
    }

    #[test]
    fn bad_orientation_rejected() {
        let mut d = diagram();
        d.links[0].intermediate_segments[0].orientation = Some("Diagonal".into());
        assert!(matches!(
            validate_diagram(&d),
            Err(ValidationError::InvalidValue { ref value, .. }) if value == "Diagonal"
        ));
    }

    #[test]
    fn unknown_property_type_rejected() {
        let mut d = diagram();
        d.blocks[0].properties.insert(
            "Value".into(),
            PropertyDef::Typed {
                value_type: "quaternion".into(),
                value: json!(1),
            },
        );
        let err = validate_diagram(&d).unwrap_err();
        assert!(err.to_string().contains("quaternion"));
    }
}
