use thiserror::Error;

use crate::types::{ScalarType, ValueType};

pub type ValueResult<T> = Result<T, ValueError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("Unknown value type: '{name}'")]
    UnknownType { name: String },

    #[error("Cannot convert {value} to {expected}: {reason}")]
    Scalar {
        expected: ValueType,
        value: String,
        reason: &'static str,
    },

    #[error("Cannot convert element {index} ({value}) of {expected}: {reason}")]
    Element {
        expected: ValueType,
        element: ScalarType,
        index: usize,
        value: String,
        reason: &'static str,
    },

    #[error("Expected an array for {expected}, got {value}")]
    NotAnArray { expected: ValueType, value: String },
}

impl ValueError {
    /// Index of the offending array element, if the failure was element-wise.
    pub fn index(&self) -> Option<usize> {
        match self {
            ValueError::Element { index, .. } => Some(*index),
            _ => None,
        }
    }
}
