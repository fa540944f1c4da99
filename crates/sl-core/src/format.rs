//! Rendering of typed values into the engine's textual encoding.
//!
//! The engine reads numeric configuration as text: floating types as
//! fixed-point with one decimal place, integer types as decimal integers.
//! Every other declared type is handed over unchanged.

use serde_json::Value;

use crate::types::{ScalarType, TypedValue, ValueType};

/// A configuration value as handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineValue {
    Text(String),
    TextList(Vec<String>),
    Unchanged(TypedValue),
}

impl EngineValue {
    pub fn to_json(&self) -> Value {
        match self {
            EngineValue::Text(s) => Value::String(s.clone()),
            EngineValue::TextList(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            EngineValue::Unchanged(value) => value.to_json(),
        }
    }
}

/// Render `value` for the engine according to its declared type.
///
/// Numeric values whose in-memory variant differs from the declared numeric
/// type (e.g. an integer under `float`) are converted; anything else that
/// does not fit the declaration passes through unchanged.
pub fn format_for_engine(declared: ValueType, value: &TypedValue) -> EngineValue {
    match (declared, value) {
        (ValueType::Scalar(s), TypedValue::Float(v)) if s.is_floating() => {
            EngineValue::Text(fixed_point(*v))
        }
        (ValueType::Scalar(s), TypedValue::Int(v)) if s.is_floating() => {
            EngineValue::Text(fixed_point(*v as f64))
        }
        (ValueType::Scalar(ScalarType::Int), TypedValue::Int(v)) => EngineValue::Text(v.to_string()),
        (ValueType::Scalar(ScalarType::Int), TypedValue::Float(v)) => {
            EngineValue::Text(truncated(*v))
        }
        (ValueType::Array(s), TypedValue::FloatArray(vs)) if s.is_floating() => {
            EngineValue::TextList(vs.iter().map(|v| fixed_point(*v)).collect())
        }
        (ValueType::Array(s), TypedValue::IntArray(vs)) if s.is_floating() => {
            EngineValue::TextList(vs.iter().map(|v| fixed_point(*v as f64)).collect())
        }
        (ValueType::Array(ScalarType::Int), TypedValue::IntArray(vs)) => {
            EngineValue::TextList(vs.iter().map(|v| v.to_string()).collect())
        }
        (ValueType::Array(ScalarType::Int), TypedValue::FloatArray(vs)) => {
            EngineValue::TextList(vs.iter().map(|v| truncated(*v)).collect())
        }
        _ => EngineValue::Unchanged(value.clone()),
    }
}

fn fixed_point(v: f64) -> String {
    format!("{:.1}", v)
}

fn truncated(v: f64) -> String {
    format!("{}", v.trunc() as i64)
}
