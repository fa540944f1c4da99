//! Declared configuration value types and strongly-typed values.

use core::fmt;
use core::str::FromStr;

use crate::error::ValueError;

/// Element type of a configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Float,
    /// Same in-memory representation as `Float`; kept distinct so the
    /// declared name survives a round trip through the schema.
    Double,
    Int,
    Bool,
    String,
}

impl ScalarType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::Int => "int",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
        }
    }

    /// True for `float` and `double`.
    pub fn is_floating(self) -> bool {
        matches!(self, ScalarType::Float | ScalarType::Double)
    }
}

impl FromStr for ScalarType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "float" => Ok(ScalarType::Float),
            "double" => Ok(ScalarType::Double),
            "int" => Ok(ScalarType::Int),
            "bool" => Ok(ScalarType::Bool),
            "string" => Ok(ScalarType::String),
            other => Err(ValueError::UnknownType {
                name: other.to_string(),
            }),
        }
    }
}

/// Declared type of a configuration value: a scalar, or an array of scalars
/// (written with a `[]` suffix, e.g. `float[]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum ValueType {
    Scalar(ScalarType),
    Array(ScalarType),
}

impl ValueType {
    pub const FLOAT: ValueType = ValueType::Scalar(ScalarType::Float);
    pub const INT: ValueType = ValueType::Scalar(ScalarType::Int);
    pub const BOOL: ValueType = ValueType::Scalar(ScalarType::Bool);
    pub const STRING: ValueType = ValueType::Scalar(ScalarType::String);
    pub const FLOAT_ARRAY: ValueType = ValueType::Array(ScalarType::Float);
    pub const INT_ARRAY: ValueType = ValueType::Array(ScalarType::Int);
    pub const STRING_ARRAY: ValueType = ValueType::Array(ScalarType::String);

    /// Element type (the scalar itself for scalar types).
    pub fn element(self) -> ScalarType {
        match self {
            ValueType::Scalar(s) | ValueType::Array(s) => s,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(self, ValueType::Array(_))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Scalar(s) => write!(f, "{}", s.as_str()),
            ValueType::Array(s) => write!(f, "{}[]", s.as_str()),
        }
    }
}

impl FromStr for ValueType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed.strip_suffix("[]") {
            Some(element) => element.parse().map(ValueType::Array),
            None => trimmed.parse().map(ValueType::Scalar),
        };
        parsed.map_err(|_| ValueError::UnknownType {
            name: trimmed.to_string(),
        })
    }
}

impl TryFrom<String> for ValueType {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ValueType> for String {
    fn from(value: ValueType) -> Self {
        value.to_string()
    }
}

/// A configuration value after coercion to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    String(String),
    FloatArray(Vec<f64>),
    IntArray(Vec<i64>),
    BoolArray(Vec<bool>),
    StringArray(Vec<String>),
}

impl TypedValue {
    /// Convert back into a generic document value.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            TypedValue::Float(v) => float_json(*v),
            TypedValue::Int(v) => Value::from(*v),
            TypedValue::Bool(v) => Value::Bool(*v),
            TypedValue::String(v) => Value::String(v.clone()),
            TypedValue::FloatArray(vs) => Value::Array(vs.iter().map(|v| float_json(*v)).collect()),
            TypedValue::IntArray(vs) => Value::Array(vs.iter().map(|v| Value::from(*v)).collect()),
            TypedValue::BoolArray(vs) => Value::Array(vs.iter().map(|v| Value::Bool(*v)).collect()),
            TypedValue::StringArray(vs) => {
                Value::Array(vs.iter().map(|v| Value::String(v.clone())).collect())
            }
        }
    }
}

// Non-finite floats have no JSON number form.
fn float_json(v: f64) -> serde_json::Value {
    serde_json::Number::from_f64(v)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scalar_and_array_types() {
        assert_eq!("float".parse::<ValueType>().unwrap(), ValueType::FLOAT);
        assert_eq!("int[]".parse::<ValueType>().unwrap(), ValueType::INT_ARRAY);
        assert_eq!(
            " double[] ".parse::<ValueType>().unwrap(),
            ValueType::Array(ScalarType::Double)
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = "complex".parse::<ValueType>().unwrap_err();
        assert_eq!(
            err,
            ValueError::UnknownType {
                name: "complex".to_string()
            }
        );
        assert!("float[][]".parse::<ValueType>().is_err());
    }

    #[test]
    fn display_matches_declared_spelling() {
        for name in ["float", "double", "int", "bool", "string", "float[]", "string[]"] {
            let ty: ValueType = name.parse().unwrap();
            assert_eq!(ty.to_string(), name);
        }
    }
}
