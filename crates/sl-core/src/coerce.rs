//! Coercion of raw document values into declared configuration types.

use serde_json::Value;

use crate::error::{ValueError, ValueResult};
use crate::types::{ScalarType, TypedValue, ValueType};

/// Coerce a raw document value to `declared`.
///
/// Array types coerce every element independently, preserving order and
/// length; the first failing element is reported by index.
pub fn coerce(declared: ValueType, raw: &Value) -> ValueResult<TypedValue> {
    match declared {
        ValueType::Scalar(scalar) => {
            coerce_scalar(scalar, raw).map_err(|reason| ValueError::Scalar {
                expected: declared,
                value: raw.to_string(),
                reason,
            })
        }
        ValueType::Array(element) => {
            let items = raw.as_array().ok_or_else(|| ValueError::NotAnArray {
                expected: declared,
                value: raw.to_string(),
            })?;
            coerce_array(declared, element, items)
        }
    }
}

fn coerce_array(declared: ValueType, element: ScalarType, items: &[Value]) -> ValueResult<TypedValue> {
    let typed = match element {
        ScalarType::Float | ScalarType::Double => {
            TypedValue::FloatArray(collect_elements(declared, element, items, to_float)?)
        }
        ScalarType::Int => TypedValue::IntArray(collect_elements(declared, element, items, to_int)?),
        ScalarType::Bool => TypedValue::BoolArray(collect_elements(declared, element, items, to_bool)?),
        ScalarType::String => {
            TypedValue::StringArray(collect_elements(declared, element, items, to_string)?)
        }
    };
    Ok(typed)
}

fn collect_elements<T>(
    declared: ValueType,
    element: ScalarType,
    items: &[Value],
    convert: fn(&Value) -> Result<T, &'static str>,
) -> ValueResult<Vec<T>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            convert(item).map_err(|reason| ValueError::Element {
                expected: declared,
                element,
                index,
                value: item.to_string(),
                reason,
            })
        })
        .collect()
}

fn coerce_scalar(scalar: ScalarType, raw: &Value) -> Result<TypedValue, &'static str> {
    match scalar {
        ScalarType::Float | ScalarType::Double => to_float(raw).map(TypedValue::Float),
        ScalarType::Int => to_int(raw).map(TypedValue::Int),
        ScalarType::Bool => to_bool(raw).map(TypedValue::Bool),
        ScalarType::String => to_string(raw).map(TypedValue::String),
    }
}

fn to_float(raw: &Value) -> Result<f64, &'static str> {
    let v = match raw {
        Value::Number(n) => n.as_f64().ok_or("number out of range")?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| "not a number")?,
        _ => return Err("not a number"),
    };
    if v.is_finite() {
        Ok(v)
    } else {
        Err("not finite")
    }
}

fn to_int(raw: &Value) -> Result<i64, &'static str> {
    match raw {
        Value::Number(n) => match n.as_i64() {
            Some(v) => Ok(v),
            None => n.as_f64().ok_or("number out of range").and_then(integral),
        },
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(v) => Ok(v),
                Err(_) => s.parse::<f64>().map_err(|_| "not an integer").and_then(integral),
            }
        }
        _ => Err("not an integer"),
    }
}

// Accepts floats with no fractional part (e.g. `3.0`), rejects `3.5`.
fn integral(v: f64) -> Result<i64, &'static str> {
    if !v.is_finite() || v.fract() != 0.0 {
        return Err("not an integer");
    }
    if v < i64::MIN as f64 || v >= i64::MAX as f64 {
        return Err("integer out of range");
    }
    Ok(v as i64)
}

fn to_bool(raw: &Value) -> Result<bool, &'static str> {
    match raw {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err("not a boolean"),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err("not a boolean"),
        },
        _ => Err("not a boolean"),
    }
}

fn to_string(raw: &Value) -> Result<String, &'static str> {
    match raw {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err("not a string"),
    }
}
