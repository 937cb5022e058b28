//! Typed access to configuration values
//!
//! Configuration documents are loosely typed YAML. Callers that need a
//! concrete type ask for one of the [`ValueKind`]s and get either a
//! [`TypedValue`] or a [`ConfigError::TypeConversion`] naming the key, the
//! requested kind and the raw value.

use crate::{ConfigError, ConfigResult};
use serde_yaml::Value;
use std::fmt;

/// Kinds a configuration value can be coerced to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Integer,
    Float,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::List => "list",
        };
        f.write_str(name)
    }
}

/// Result of a successful coercion
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    List(Vec<Value>),
}

impl TypedValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            TypedValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Coerce a raw (possibly absent) value to the requested kind
pub fn coerce(key: &str, value: Option<&Value>, kind: ValueKind) -> ConfigResult<TypedValue> {
    match kind {
        ValueKind::Boolean => coerce_bool(key, value).map(TypedValue::Boolean),
        ValueKind::Integer => coerce_i64(key, value).map(TypedValue::Integer),
        ValueKind::Float => coerce_f64(key, value).map(TypedValue::Float),
        ValueKind::List => Ok(TypedValue::List(to_list(value))),
    }
}

pub fn coerce_bool(key: &str, value: Option<&Value>) -> ConfigResult<bool> {
    to_bool(value).ok_or_else(|| conversion_error(key, value, ValueKind::Boolean))
}

pub fn coerce_i64(key: &str, value: Option<&Value>) -> ConfigResult<i64> {
    to_i64(value).ok_or_else(|| conversion_error(key, value, ValueKind::Integer))
}

pub fn coerce_f64(key: &str, value: Option<&Value>) -> ConfigResult<f64> {
    to_f64(value).ok_or_else(|| conversion_error(key, value, ValueKind::Float))
}

pub fn coerce_list(value: Option<&Value>) -> Vec<Value> {
    to_list(value)
}

fn conversion_error(key: &str, value: Option<&Value>, kind: ValueKind) -> ConfigError {
    ConfigError::TypeConversion {
        key: key.to_string(),
        kind,
        value: describe(value),
    }
}

// Matching is case-sensitive: "True" and "YES" are rejected.
fn to_bool(value: Option<&Value>) -> Option<bool> {
    match value {
        None | Some(Value::Null) => Some(false),
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) => match s.as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Some(_) => None,
    }
}

fn to_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_f64_to_i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
fn whole_f64_to_i64(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}

// Non-finite results ("nan", "inf", ".inf") are rejected.
fn to_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

fn to_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}

/// Human-readable rendering of a raw value for error messages
fn describe(value: Option<&Value>) -> String {
    match value {
        None => "(absent)".to_string(),
        Some(Value::String(s)) => format!("{:?}", s),
        Some(other) => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{:?}", other)),
    }
}
