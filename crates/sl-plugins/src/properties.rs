//! Shared property handling for plugins.

use sl_core::{TypedValue, ValueType, coerce};
use sl_graph::{BlockProperty, HighLevelBlock, PropertyValue};

use crate::error::{PluginError, PluginResult};

/// Coerce `raw` against `declared`, naming the property on failure.
pub fn coerce_property(name: &str, declared: ValueType, raw: &serde_json::Value) -> PluginResult<TypedValue> {
    coerce(declared, raw).map_err(|source| PluginError::Coercion {
        property: name.to_string(),
        value_type: declared,
        source,
    })
}

/// Convert a property using only its site declaration; undeclared values are
/// forwarded as they are.
pub fn site_property(name: &str, property: &BlockProperty) -> PluginResult<PropertyValue> {
    match property.declared {
        Some(declared) => Ok(PropertyValue::typed(
            declared,
            coerce_property(name, declared, &property.value)?,
        )),
        None => Ok(PropertyValue::Raw(property.value.clone())),
    }
}

/// Read an optional property as `declared`, ignoring the site declaration.
pub fn read_property(block: &HighLevelBlock, name: &str, declared: ValueType) -> PluginResult<Option<TypedValue>> {
    block
        .property(name)
        .map(|property| coerce_property(name, declared, &property.value))
        .transpose()
}
