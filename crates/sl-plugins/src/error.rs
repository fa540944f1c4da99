//! Error types for plugin operations.

use sl_core::{ValueError, ValueType};
use thiserror::Error;

/// Hard failures while a plugin compiles or describes a block it accepted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginError {
    #[error("No schema for block type '{block_type}' in library '{library}'")]
    SchemaLookup { library: String, block_type: String },

    #[error("Property '{property}' has no declared type in {library}/{block_type}")]
    UndeclaredProperty {
        property: String,
        library: String,
        block_type: String,
    },

    #[error("Property '{property}' ({value_type}): {source}")]
    Coercion {
        property: String,
        value_type: ValueType,
        #[source]
        source: ValueError,
    },

    #[error("Invalid property '{property}': {reason}")]
    InvalidProperty { property: String, reason: String },

    #[error("Plugin '{plugin}' has unknown plugin type '{plugin_type}'")]
    UnknownPluginType { plugin: String, plugin_type: String },

    #[error("Plugin '{plugin}' descriptor is missing '{field}'")]
    InvalidDescriptor { plugin: String, field: &'static str },
}

pub type PluginResult<T> = Result<T, PluginError>;

impl PluginError {
    /// Schema-related failures: the block's type or one of its properties is
    /// not described by the plugin's schema.
    pub fn is_schema_lookup(&self) -> bool {
        matches!(
            self,
            PluginError::SchemaLookup { .. } | PluginError::UndeclaredProperty { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PluginError::Coercion {
            property: "Gain".into(),
            value_type: ValueType::FLOAT,
            source: ValueError::Scalar {
                expected: ValueType::FLOAT,
                value: "\"abc\"".into(),
                reason: "not a number",
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("Gain"));
        assert!(msg.contains("float"));
    }

    #[test]
    fn schema_lookup_kinds() {
        let err = PluginError::UndeclaredProperty {
            property: "x".into(),
            library: "L".into(),
            block_type: "T".into(),
        };
        assert!(err.is_schema_lookup());
        assert!(
            !PluginError::InvalidProperty {
                property: "x".into(),
                reason: "r".into()
            }
            .is_schema_lookup()
        );
    }
}
