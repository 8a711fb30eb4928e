//! Attribute value type for open-ended telemetry attribute bags.
//!
//! OpenTelemetry records carry `attributes` and `resource_attributes` maps
//! whose values are heterogeneous (strings, numbers, booleans, nested
//! structures). `AttributeValue` models them as an explicit tagged union so
//! the rest of the engine never has to branch on raw JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ordered attribute bag: attribute key to value.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// A single attribute value.
///
/// Deserializes from arbitrary JSON via `#[serde(untagged)]`, so any
/// attribute payload produced by an OpenTelemetry exporter round-trips.
///
/// # Example
///
/// ```
/// use shared::models::AttributeValue;
///
/// let value: AttributeValue = serde_json::from_str("\"GET\"").unwrap();
/// assert_eq!(value.as_str(), Some("GET"));
///
/// let value: AttributeValue = serde_json::from_str("200").unwrap();
/// assert_eq!(value.as_f64(), Some(200.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// An absent or null value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Double(f64),
    /// A string value.
    Str(String),
    /// A nested array of values.
    Array(Vec<AttributeValue>),
    /// A nested map of values.
    Map(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Returns the string value if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value if this is an integer or double.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => {
                #[allow(clippy::cast_precision_loss)]
                Some(*i as f64)
            }
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the boolean value if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns true if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value as display text.
    ///
    /// Strings render without quotes; everything else renders as compact
    /// JSON. Used when a free-form value (such as a log body) needs to be
    /// searched or grouped as text.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_scalars() {
        let s: AttributeValue = serde_json::from_str("\"api\"").unwrap();
        assert_eq!(s, AttributeValue::Str("api".to_string()));

        let i: AttributeValue = serde_json::from_str("42").unwrap();
        assert_eq!(i, AttributeValue::Int(42));

        let d: AttributeValue = serde_json::from_str("0.25").unwrap();
        assert_eq!(d, AttributeValue::Double(0.25));

        let b: AttributeValue = serde_json::from_str("true").unwrap();
        assert_eq!(b, AttributeValue::Bool(true));

        let n: AttributeValue = serde_json::from_str("null").unwrap();
        assert!(n.is_null());
    }

    #[test]
    fn test_deserialize_nested() {
        let json = r#"{"service": {"name": "checkout", "replicas": 3}, "tags": ["a", "b"]}"#;
        let value: AttributeValue = serde_json::from_str(json).unwrap();

        let AttributeValue::Map(map) = value else {
            panic!("expected map");
        };
        assert!(matches!(map.get("service"), Some(AttributeValue::Map(_))));
        assert!(matches!(map.get("tags"), Some(AttributeValue::Array(a)) if a.len() == 2));
    }

    #[test]
    fn test_display_text() {
        assert_eq!(
            AttributeValue::Str("timeout".to_string()).display_text(),
            "timeout"
        );
        assert_eq!(AttributeValue::Int(7).display_text(), "7");
        assert_eq!(AttributeValue::Bool(false).display_text(), "false");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let original = AttributeValue::Map(BTreeMap::from([
            ("method".to_string(), AttributeValue::from("GET")),
            ("status".to_string(), AttributeValue::from(200_i64)),
        ]));

        let json = serde_json::to_string(&original).unwrap();
        let back: AttributeValue = serde_json::from_str(&json).unwrap();

        assert_eq!(original, back);
    }
}
