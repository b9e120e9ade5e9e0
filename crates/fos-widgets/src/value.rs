//! Config and event payload values
//!
//! Attribute strings are untyped; `normalize_data` turns them into the
//! loose value model options are type-checked against.

use std::collections::BTreeMap;

use fos_dom::NodeId;
use serde::{Serialize, Serializer};

/// Dynamically typed option or event field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Element(#[serde(serialize_with = "serialize_node")] NodeId),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

fn serialize_node<S: Serializer>(node: &NodeId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&node.to_string())
}

impl Value {
    /// Type name used by option type patterns
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Element(_) => "element",
            Self::List(_) => "array",
            Self::Object(_) => "object",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<NodeId> {
        match self {
            Self::Element(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// JS-style truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Element(n) => n.is_valid(),
            Self::List(_) | Self::Object(_) => true,
        }
    }

    /// Compact JSON rendering for logs
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("null"))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<NodeId> for Value {
    fn from(n: NodeId) -> Self {
        Self::Element(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Into::into).collect()),
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Normalize a `data-*` attribute string.
///
/// `"true"`/`"false"` become booleans, canonical numbers become numbers,
/// `""`/`"null"` become null, JSON documents are parsed, anything else
/// stays a string.
pub fn normalize_data(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "" | "null" => return Value::Null,
        _ => {}
    }

    if let Ok(n) = raw.parse::<f64>() {
        if n.is_finite() && format!("{n}") == raw {
            return Value::Number(n);
        }
    }

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => json.into(),
        Err(_) => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_scalars() {
        assert_eq!(normalize_data("true"), Value::Bool(true));
        assert_eq!(normalize_data("false"), Value::Bool(false));
        assert_eq!(normalize_data(""), Value::Null);
        assert_eq!(normalize_data("null"), Value::Null);
        assert_eq!(normalize_data("500"), Value::Number(500.0));
        assert_eq!(normalize_data("0.5"), Value::Number(0.5));
    }

    #[test]
    fn test_non_canonical_numbers_stay_strings() {
        assert_eq!(normalize_data("01"), Value::String("01".into()));
        assert_eq!(normalize_data("1.0"), Value::String("1.0".into()));
        assert_eq!(normalize_data("17px"), Value::String("17px".into()));
        assert_eq!(normalize_data("#target"), Value::String("#target".into()));
    }

    #[test]
    fn test_json_documents() {
        let value = normalize_data(r#"{"show": 100, "hide": 50}"#);
        let map = value.as_object().unwrap();
        assert_eq!(map["show"], Value::Number(100.0));
        assert_eq!(normalize_data("[1,2]"), Value::List(vec![1.0.into(), 2.0.into()]));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::from(NodeId::ROOT).type_name(), "element");
        assert_eq!(Value::from(Option::<bool>::None).type_name(), "null");
        assert_eq!(Value::from("x").type_name(), "string");
    }

    #[test]
    fn test_to_json() {
        assert_eq!(Value::from(true).to_json(), "true");
        assert_eq!(Value::from("a").to_json(), "\"a\"");
    }
}
