use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Runtime value types flowing through element resolution and expression
/// evaluation. Serializes to/from plain JSON (`Object` keys stay sorted so
/// manifests and descriptors are stable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Lossless bridge to `serde_json::Value` for descriptor assembly.
    pub fn to_json(&self) -> serde_json::Value {
        // The untagged representation is exactly JSON, so this cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Object(map) => write!(
                f,
                "{{{}}}",
                map.iter().map(|(k, v)| format!("{}: {}", k, v)).join(", ")
            ),
            Value::Null => write!(f, "null"),
        }
    }
}

/// The declared value type of an element, checked structurally against
/// resolved values at execute time. A union accepts any of its members.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    Number,
    Bool,
    Text,
    List(Box<ValueType>),
    Object,
    Union(Vec<ValueType>),
    Any,
}

impl ValueType {
    /// Structural assignability check. `Null` only matches `Any`; presence
    /// is enforced separately through the `optional` contract.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueType::Number => matches!(value, Value::Number(_)),
            ValueType::Bool => matches!(value, Value::Bool(_)),
            ValueType::Text => matches!(value, Value::Text(_)),
            ValueType::Object => matches!(value, Value::Object(_)),
            ValueType::List(inner) => match value {
                Value::List(items) => items.iter().all(|v| inner.matches(v)),
                _ => false,
            },
            ValueType::Union(members) => members.iter().any(|t| t.matches(value)),
            ValueType::Any => true,
        }
    }

    /// Shorthand for the common "text or number" choice-value type.
    pub fn text_or_number() -> ValueType {
        ValueType::Union(vec![ValueType::Text, ValueType::Number])
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Number => write!(f, "number"),
            ValueType::Bool => write!(f, "bool"),
            ValueType::Text => write!(f, "text"),
            ValueType::Object => write!(f, "object"),
            ValueType::List(inner) => write!(f, "list[{}]", inner),
            ValueType::Union(members) => write!(f, "{}", members.iter().join("|")),
            ValueType::Any => write!(f, "any"),
        }
    }
}
