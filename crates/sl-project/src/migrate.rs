//! Legacy property normalization.
//!
//! Older diagrams store properties as a flat `{name: value}` mapping; current
//! ones use `{name: {type, value}}`. Both shapes may appear in one block and
//! are normalized here, at the parse boundary, into `BlockProperty`.

use indexmap::IndexMap;
use sl_core::ValueType;
use sl_graph::BlockProperty;

use crate::schema::PropertyDef;
use crate::validate::ValidationError;

impl PropertyDef {
    pub fn is_legacy(&self) -> bool {
        matches!(self, PropertyDef::Flat(_))
    }
}

/// Normalize one property. Flat values carry no declared type.
pub fn normalize_property(name: &str, property: &PropertyDef) -> Result<BlockProperty, ValidationError> {
    match property {
        PropertyDef::Typed { value_type, value } => {
            let declared: ValueType = value_type.parse().map_err(|err: sl_core::ValueError| {
                ValidationError::InvalidValue {
                    field: format!("property '{}' type", name),
                    value: value_type.clone(),
                    reason: err.to_string(),
                }
            })?;
            Ok(BlockProperty::typed(declared, value.clone()))
        }
        PropertyDef::Flat(value) => Ok(BlockProperty::untyped(value.clone())),
    }
}

/// Normalize every property of a block, keeping document order.
pub fn normalize_properties(
    properties: &IndexMap<String, PropertyDef>,
) -> Result<IndexMap<String, BlockProperty>, ValidationError> {
    properties
        .iter()
        .map(|(name, property)| Ok((name.clone(), normalize_property(name, property)?)))
        .collect()
}
