use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whole numbers below this magnitude are printed without a fraction.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Parameter map of an operator node, keyed by parameter name.
pub type ParamMap = AHashMap<String, ParamValue>;

/// A single operator parameter value.
///
/// Serialized untagged, so a parameter map reads as a plain JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum ParamValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<ParamValue>),
}

/// The shape a parameter value is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    Bool,
    Number,
    Text,
    List,
    Any,
}

impl ParamValue {
    pub fn kind(&self) -> Option<ParamKind> {
        match self {
            ParamValue::Null => None,
            ParamValue::Bool(_) => Some(ParamKind::Bool),
            ParamValue::Number(_) => Some(ParamKind::Number),
            ParamValue::Text(_) => Some(ParamKind::Text),
            ParamValue::List(_) => Some(ParamKind::List),
        }
    }

    /// `true` for `Null`, the empty string and the empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Null => true,
            ParamValue::Text(s) => s.trim().is_empty(),
            ParamValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn matches(&self, kind: ParamKind) -> bool {
        match (self.kind(), kind) {
            (None, _) | (_, ParamKind::Any) => true,
            (Some(actual), expected) => actual == expected,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Finds the first non-finite number, which JSON cannot represent.
    pub(crate) fn find_non_finite(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) if !n.is_finite() => Some(*n),
            ParamValue::List(items) => items.iter().find_map(ParamValue::find_non_finite),
            _ => None,
        }
    }
}

impl From<&serde_json::Value> for ParamValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ParamValue::Null,
            serde_json::Value::Bool(b) => ParamValue::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(ParamValue::Null, ParamValue::Number),
            serde_json::Value::String(s) => ParamValue::Text(s.clone()),
            serde_json::Value::Array(items) => {
                ParamValue::List(items.iter().map(ParamValue::from).collect())
            }
            // Nested objects have no parameter representation; keep their JSON text.
            serde_json::Value::Object(_) => ParamValue::Text(value.to_string()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => write!(f, "null"),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            ParamValue::Text(s) => write!(f, "{}", s),
            ParamValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
