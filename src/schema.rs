//! Canonical key model shared by both schema front-ends

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::source::SchemaSource;

/// Lower bound every `port` key is held to
pub const PORT_MIN: f64 = 1.0;
/// Upper bound every `port` key is held to
pub const PORT_MAX: f64 = 65535.0;

/// Declared type of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    #[default]
    String,
    Number,
    #[serde(alias = "integer")]
    Int,
    Boolean,
    Url,
    Email,
    Enum,
    Port,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::String => "string",
            KeyType::Number => "number",
            KeyType::Int => "int",
            KeyType::Boolean => "boolean",
            KeyType::Url => "url",
            KeyType::Email => "email",
            KeyType::Enum => "enum",
            KeyType::Port => "port",
        }
    }

    /// Whether `min`/`max` bounds apply to values of this type
    pub fn is_numeric(&self) -> bool {
        matches!(self, KeyType::Number | KeyType::Int | KeyType::Port)
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar `default` or `example` value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl Scalar {
    /// Convert a JSON value, rejecting null, arrays and objects
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => Some(Scalar::Number(n.clone())),
            serde_json::Value::String(s) => Some(Scalar::String(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Number(n) => serde_json::Value::Number(n.clone()),
            Scalar::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

/// One schema entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Scalar>,
    /// Allowed literals, non-empty iff `key_type` is [`KeyType::Enum`]
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub required: bool,
    pub secret: bool,
    pub deprecated: bool,
    /// Advisory only; not checked against the schema's key set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl KeyDefinition {
    /// A required, non-secret, non-deprecated key of the given type
    pub fn new(name: impl Into<String>, key_type: KeyType) -> Self {
        let mut def = Self {
            name: name.into(),
            key_type,
            description: None,
            default: None,
            example: None,
            allowed: Vec::new(),
            pattern: None,
            required: true,
            secret: false,
            deprecated: false,
            replaced_by: None,
            min: None,
            max: None,
        };
        if key_type == KeyType::Port {
            def.min = Some(PORT_MIN);
            def.max = Some(PORT_MAX);
        }
        def
    }

    /// An enum key over the given literals
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut def = Self::new(name, KeyType::Enum);
        def.allowed = values.into_iter().map(Into::into).collect();
        def
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_default(mut self, value: impl Into<Scalar>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_example(mut self, value: impl Into<Scalar>) -> Self {
        self.example = Some(value.into());
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn deprecated(mut self, replaced_by: Option<&str>) -> Self {
        self.deprecated = true;
        self.replaced_by = replaced_by.map(String::from);
        self
    }

    /// Effective numeric bounds. Ports are always 1..=65535 whatever was declared.
    pub fn bounds(&self) -> (Option<f64>, Option<f64>) {
        match self.key_type {
            KeyType::Port => (Some(PORT_MIN), Some(PORT_MAX)),
            t if t.is_numeric() => (self.min, self.max),
            _ => (None, None),
        }
    }
}

/// A normalized schema: key definitions in declaration order plus provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    keys: IndexMap<String, KeyDefinition>,
    /// Front-end that produced this schema
    pub source: SchemaSource,
    /// Where the schema was read from, if anywhere
    pub path: Option<PathBuf>,
}

impl Schema {
    /// Build a schema from definitions. A later definition with the same
    /// name replaces the earlier one in place.
    pub fn new(source: SchemaSource, definitions: impl IntoIterator<Item = KeyDefinition>) -> Self {
        let keys = definitions
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect();
        Self {
            keys,
            source,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn get(&self, name: &str) -> Option<&KeyDefinition> {
        self.keys.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    /// Definitions in declaration order
    pub fn definitions(&self) -> impl Iterator<Item = &KeyDefinition> {
        self.keys.values()
    }

    /// Key names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Human-readable origin for messages
    pub fn origin(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<inline>".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_bounds_are_fixed() {
        let def = KeyDefinition::new("PORT", KeyType::Port).with_bounds(Some(1000.0), Some(2000.0));
        assert_eq!(def.bounds(), (Some(PORT_MIN), Some(PORT_MAX)));
    }

    #[test]
    fn test_bounds_ignored_for_non_numeric() {
        let def = KeyDefinition::new("NAME", KeyType::String).with_bounds(Some(1.0), None);
        assert_eq!(def.bounds(), (None, None));
    }

    #[test]
    fn test_schema_keeps_declaration_order() {
        let schema = Schema::new(
            SchemaSource::Declarative,
            vec![
                KeyDefinition::new("ZETA", KeyType::String),
                KeyDefinition::new("ALPHA", KeyType::Int),
            ],
        );
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["ZETA", "ALPHA"]);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::from(3000).to_string(), "3000");
        assert_eq!(Scalar::from(true).to_string(), "true");
        assert_eq!(Scalar::from("x y").to_string(), "x y");
        assert_eq!(Scalar::from_json(&serde_json::Value::Null), None);
    }

    #[test]
    fn test_key_definition_serializes_camel_case() {
        let def = KeyDefinition::new("OLD", KeyType::String).deprecated(Some("NEW"));
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "string");
        assert_eq!(json["replacedBy"], "NEW");
        assert!(json.get("enum").is_none());
    }
}
