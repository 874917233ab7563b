//! The scalar value type carried by style declarations.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Key marking a value that is only known at render time.
pub(crate) const DYNAMIC_KEY: &str = "$dynamic";

/// A single style value.
///
/// Values arrive either from the builder API or from JSON. Strings that
/// start with `$` (or are already `var(...)` references) are theme tokens;
/// objects of the form `{"$dynamic": "<expr>"}` mark values that depend on
/// runtime props or state. Anything else that is not a scalar is kept as
/// [`StyleValue::Raw`] and passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// A bare number, e.g. `10` or `0.5`.
    Number(f64),
    /// A literal string, e.g. `"red"` or `"10px"`.
    Str(String),
    /// A theme token reference, kept as written (`$color` or `var(--color)`).
    Token(String),
    /// An expression only available at render time.
    Dynamic(String),
    /// A malformed, non-scalar value.
    Raw(Value),
}

impl StyleValue {
    /// Classifies a JSON value.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(n) => StyleValue::Number(n),
                None => StyleValue::Raw(value.clone()),
            },
            Value::String(s) => StyleValue::from(s.as_str()),
            Value::Object(map) => match map.get(DYNAMIC_KEY) {
                Some(Value::String(expr)) if map.len() == 1 => StyleValue::Dynamic(expr.clone()),
                _ => StyleValue::Raw(value.clone()),
            },
            _ => StyleValue::Raw(value.clone()),
        }
    }

    /// Creates a dynamic value from a runtime expression.
    pub fn dynamic(expr: impl Into<String>) -> Self {
        StyleValue::Dynamic(expr.into())
    }

    /// Returns `true` if this value is only known at render time.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, StyleValue::Dynamic(_))
    }

    /// Returns `true` for theme token references.
    pub fn is_token(&self) -> bool {
        matches!(self, StyleValue::Token(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value as CSS text.
    ///
    /// `$space.4` becomes `var(--space-4)`; `var(...)` references are kept
    /// verbatim.
    pub fn to_css(&self) -> String {
        match self {
            StyleValue::Number(n) => format_number(*n),
            StyleValue::Str(s) => s.clone(),
            StyleValue::Token(t) => token_to_var(t),
            StyleValue::Dynamic(expr) => expr.clone(),
            StyleValue::Raw(v) => v.to_string(),
        }
    }

    /// Stable text identifying the raw value, used as a cache key.
    ///
    /// The variant tag keeps `10` and `"10"` apart.
    pub(crate) fn cache_key(&self) -> String {
        match self {
            StyleValue::Number(n) => format!("n:{}", format_number(*n)),
            StyleValue::Str(s) => format!("s:{}", s),
            StyleValue::Token(t) => format!("t:{}", t),
            StyleValue::Dynamic(expr) => format!("d:{}", expr),
            StyleValue::Raw(v) => format!("r:{}", v),
        }
    }
}

/// Formats a number the way it appears in CSS: `10`, `0.5`, `-2.25`.
pub(crate) fn format_number(n: f64) -> String {
    if n == 0.0 {
        // avoids "-0"
        return "0".to_string();
    }
    format!("{}", n)
}

fn token_to_var(token: &str) -> String {
    if token.starts_with("var(") {
        return token.to_string();
    }
    let name = token.trim_start_matches('$').replace('.', "-");
    format!("var(--{})", name)
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        if s.starts_with('$') || s.starts_with("var(") {
            StyleValue::Token(s.to_string())
        } else {
            StyleValue::Str(s.to_string())
        }
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::from(s.as_str())
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Number(n)
    }
}

impl From<i32> for StyleValue {
    fn from(n: i32) -> Self {
        StyleValue::Number(f64::from(n))
    }
}

impl From<u32> for StyleValue {
    fn from(n: u32) -> Self {
        StyleValue::Number(f64::from(n))
    }
}

impl Serialize for StyleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StyleValue::Number(n) => serializer.serialize_f64(*n),
            StyleValue::Str(s) | StyleValue::Token(s) => serializer.serialize_str(s),
            StyleValue::Dynamic(expr) => {
                let mut map = Map::new();
                map.insert(DYNAMIC_KEY.to_string(), Value::String(expr.clone()));
                Value::Object(map).serialize(serializer)
            }
            StyleValue::Raw(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for StyleValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(StyleValue::from_json(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(StyleValue::from_json(&json!(10)), StyleValue::Number(10.0));
        assert_eq!(
            StyleValue::from_json(&json!("red")),
            StyleValue::Str("red".into())
        );
        assert_eq!(
            StyleValue::from_json(&json!("$color")),
            StyleValue::Token("$color".into())
        );
        assert_eq!(
            StyleValue::from_json(&json!("var(--x)")),
            StyleValue::Token("var(--x)".into())
        );
    }

    #[test]
    fn test_from_json_dynamic() {
        let value = StyleValue::from_json(&json!({ "$dynamic": "props.color" }));
        assert_eq!(value, StyleValue::Dynamic("props.color".into()));
        assert!(value.is_dynamic());
    }

    #[test]
    fn test_from_json_malformed_is_raw() {
        let value = StyleValue::from_json(&json!([1, 2]));
        assert_eq!(value, StyleValue::Raw(json!([1, 2])));
        let value = StyleValue::from_json(&json!({ "nested": true }));
        assert!(matches!(value, StyleValue::Raw(_)));
    }

    #[test]
    fn test_to_css() {
        assert_eq!(StyleValue::Number(10.0).to_css(), "10");
        assert_eq!(StyleValue::Number(0.5).to_css(), "0.5");
        assert_eq!(StyleValue::Number(-0.0).to_css(), "0");
        assert_eq!(StyleValue::from("$space.4").to_css(), "var(--space-4)");
        assert_eq!(StyleValue::from("var(--x)").to_css(), "var(--x)");
    }

    #[test]
    fn test_cache_key_distinguishes_types() {
        assert_ne!(
            StyleValue::Number(10.0).cache_key(),
            StyleValue::Str("10".into()).cache_key()
        );
    }

    #[test]
    fn test_serde_roundtrip_dynamic() {
        let value = StyleValue::dynamic("state.width");
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, json!({ "$dynamic": "state.width" }));
        let back: StyleValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }
}
