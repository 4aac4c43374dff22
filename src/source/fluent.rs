//! Fluent-validator schema front-end
//!
//! A fluent schema is a tree of validator nodes. The root is an
//! object-of-fields node; each field is a primitive node (string, number,
//! boolean, enum) optionally wrapped in `optional` / `default` nodes and
//! refined by checks:
//!
//! ```json
//! {"kind": "object", "shape": {
//!   "PORT": {"kind": "default", "value": 3000,
//!            "inner": {"kind": "number", "checks": [{"kind": "int"}]}},
//!   "DATABASE_URL": {"kind": "string", "checks": [{"kind": "url"}],
//!                    "description": "Primary database", "meta": {"secret": true}}
//! }}
//! ```
//!
//! The same tree can be built in Rust with the builder functions in this
//! module (`string().url().describe("...").optional()`).
//!
//! Classification walks each field explicitly: wrappers are peeled first,
//! then the primitive node decides the key type.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EnvSchemaError, Result};
use crate::schema::{KeyDefinition, KeyType, Scalar, PORT_MAX, PORT_MIN};

// =============================================================================
// Node Model
// =============================================================================

/// A validator node plus the annotations every node may carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Human description attached with `describe`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Side-channel metadata (secret marker and friends)
    #[serde(default, skip_serializing_if = "NodeMeta::is_empty")]
    pub meta: NodeMeta,
}

/// Closed set of node kinds. Anything else deserializes as `Unsupported`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    Object {
        shape: IndexMap<String, Node>,
    },
    String {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        checks: Vec<Check>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        checks: Vec<Check>,
    },
    Boolean,
    Enum {
        values: Vec<String>,
    },
    Optional {
        inner: Box<Node>,
    },
    Default {
        inner: Box<Node>,
        value: Value,
    },
    #[serde(other)]
    Unsupported,
}

impl NodeKind {
    fn name(&self) -> &'static str {
        match self {
            NodeKind::Object { .. } => "object",
            NodeKind::String { .. } => "string",
            NodeKind::Number { .. } => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Enum { .. } => "enum",
            NodeKind::Optional { .. } => "optional",
            NodeKind::Default { .. } => "default",
            NodeKind::Unsupported => "unsupported",
        }
    }
}

/// Refinement check attached to a string or number node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Check {
    Url,
    Email,
    Regex { pattern: String },
    Int,
    Min { value: f64 },
    Max { value: f64 },
    #[serde(other)]
    Other,
}

/// Node metadata; unknown entries are ignored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeMeta {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub secret: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Scalar>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
}

impl NodeMeta {
    pub fn is_empty(&self) -> bool {
        *self == NodeMeta::default()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Object-of-fields root node
pub fn object<I, K>(fields: I) -> Node
where
    I: IntoIterator<Item = (K, Node)>,
    K: Into<String>,
{
    Node::bare(NodeKind::Object {
        shape: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
    })
}

pub fn string() -> Node {
    Node::bare(NodeKind::String { checks: Vec::new() })
}

pub fn number() -> Node {
    Node::bare(NodeKind::Number { checks: Vec::new() })
}

pub fn boolean() -> Node {
    Node::bare(NodeKind::Boolean)
}

/// Enum-of-literals node; literal order is kept
pub fn enumeration<I, S>(values: I) -> Node
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Node::bare(NodeKind::Enum {
        values: values.into_iter().map(Into::into).collect(),
    })
}

impl Node {
    fn bare(kind: NodeKind) -> Self {
        Self {
            kind,
            description: None,
            meta: NodeMeta::default(),
        }
    }

    /// Checks only attach to string and number nodes; elsewhere this is a no-op.
    fn with_check(mut self, check: Check) -> Self {
        match &mut self.kind {
            NodeKind::String { checks } | NodeKind::Number { checks } => checks.push(check),
            _ => {}
        }
        self
    }

    pub fn url(self) -> Self {
        self.with_check(Check::Url)
    }

    pub fn email(self) -> Self {
        self.with_check(Check::Email)
    }

    pub fn regex(self, pattern: &str) -> Self {
        self.with_check(Check::Regex {
            pattern: pattern.to_string(),
        })
    }

    pub fn int(self) -> Self {
        self.with_check(Check::Int)
    }

    pub fn min(self, value: f64) -> Self {
        self.with_check(Check::Min { value })
    }

    pub fn max(self, value: f64) -> Self {
        self.with_check(Check::Max { value })
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn secret(mut self) -> Self {
        self.meta.secret = true;
        self
    }

    pub fn example(mut self, value: impl Into<Scalar>) -> Self {
        self.meta.example = Some(value.into());
        self
    }

    pub fn deprecated(mut self, replaced_by: Option<&str>) -> Self {
        self.meta.deprecated = true;
        self.meta.replaced_by = replaced_by.map(String::from);
        self
    }

    pub fn optional(self) -> Self {
        Node::bare(NodeKind::Optional {
            inner: Box::new(self),
        })
    }

    pub fn default(self, value: impl Into<Scalar>) -> Self {
        Node::bare(NodeKind::Default {
            inner: Box::new(self),
            value: value.into().to_json(),
        })
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Parse a raw fluent document and classify every field
pub fn normalize(raw: &Value, origin: &str) -> Result<Vec<KeyDefinition>> {
    match raw.get("kind").and_then(Value::as_str) {
        Some("object") => {}
        Some(other) => {
            return Err(EnvSchemaError::schema_load(
                origin,
                format!("fluent root must be an `object` node, found `{}`", other),
            ))
        }
        None => {
            return Err(EnvSchemaError::schema_load(
                origin,
                "fluent root has no `kind`; expected an `object` node",
            ))
        }
    }
    if !raw.get("shape").map_or(false, Value::is_object) {
        return Err(EnvSchemaError::schema_load(
            origin,
            "missing root `shape` container",
        ));
    }

    let root: Node = serde_json::from_value(raw.clone())
        .map_err(|e| EnvSchemaError::schema_load(origin, format!("malformed fluent node: {}", e)))?;
    classify_root(&root, origin)
}

/// Classify every field of an object-of-fields root
pub fn classify_root(root: &Node, origin: &str) -> Result<Vec<KeyDefinition>> {
    match &root.kind {
        NodeKind::Object { shape } => shape
            .iter()
            .map(|(name, node)| {
                if let NodeKind::Enum { values } = &innermost(node).kind {
                    if values.is_empty() {
                        return Err(EnvSchemaError::schema_load(
                            origin,
                            format!("key `{}`: enum node requires a non-empty `values` list", name),
                        ));
                    }
                }
                Ok(classify(name, node))
            })
            .collect(),
        other => Err(EnvSchemaError::schema_load(
            origin,
            format!("fluent root must be an `object` node, found `{}`", other.name()),
        )),
    }
}

/// Classify one field node into a key definition.
///
/// Wrappers are peeled first (each one making the key optional), then the
/// innermost node picks the type. Nodes that fit no bucket become plain
/// strings.
pub fn classify(name: &str, node: &Node) -> KeyDefinition {
    let mut def = KeyDefinition::new(name, KeyType::String);
    let inner = unwrap_wrappers(node, &mut def);

    match &inner.kind {
        NodeKind::String { checks } => classify_string(&mut def, checks),
        NodeKind::Number { checks } => classify_number(&mut def, checks),
        NodeKind::Boolean => def.key_type = KeyType::Boolean,
        NodeKind::Enum { values } if !values.is_empty() => {
            def.key_type = KeyType::Enum;
            def.allowed = values.clone();
        }
        NodeKind::Enum { .. } => {
            tracing::warn!(key = name, "enum node has no values, treating as string");
        }
        other => {
            tracing::debug!(key = name, kind = other.name(), "unclassifiable node, treating as string");
        }
    }

    def
}

/// Innermost node below any optional/default wrappers
fn innermost(node: &Node) -> &Node {
    match &node.kind {
        NodeKind::Optional { inner } | NodeKind::Default { inner, .. } => innermost(inner),
        _ => node,
    }
}

fn unwrap_wrappers<'a>(node: &'a Node, def: &mut KeyDefinition) -> &'a Node {
    absorb_annotations(node, def);
    match &node.kind {
        NodeKind::Optional { inner } => {
            def.required = false;
            unwrap_wrappers(inner, def)
        }
        NodeKind::Default { inner, value } => {
            def.required = false;
            if def.default.is_none() {
                def.default = Scalar::from_json(value);
            }
            unwrap_wrappers(inner, def)
        }
        _ => node,
    }
}

/// Outer annotations win over inner ones
fn absorb_annotations(node: &Node, def: &mut KeyDefinition) {
    if def.description.is_none() {
        def.description = node.description.clone();
    }
    def.secret |= node.meta.secret;
    def.deprecated |= node.meta.deprecated;
    if def.example.is_none() {
        def.example = node.meta.example.clone();
    }
    if def.replaced_by.is_none() {
        def.replaced_by = node.meta.replaced_by.clone();
    }
}

fn classify_string(def: &mut KeyDefinition, checks: &[Check]) {
    for check in checks {
        match check {
            Check::Url => def.key_type = KeyType::Url,
            Check::Email => def.key_type = KeyType::Email,
            Check::Regex { pattern } => def.pattern = Some(pattern.clone()),
            _ => {}
        }
    }
}

fn classify_number(def: &mut KeyDefinition, checks: &[Check]) {
    let mut integer = false;
    for check in checks {
        match check {
            Check::Int => integer = true,
            Check::Min { value } => def.min = Some(*value),
            Check::Max { value } => def.max = Some(*value),
            _ => {}
        }
    }

    def.key_type = if def.min == Some(PORT_MIN) && def.max == Some(PORT_MAX) {
        KeyType::Port
    } else if integer {
        KeyType::Int
    } else {
        KeyType::Number
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrappers_are_unwrapped_recursively() {
        let node = string().url().optional().default("https://example.com");
        let def = classify("API_URL", &node);
        assert_eq!(def.key_type, KeyType::Url);
        assert!(!def.required);
        assert_eq!(def.default, Some(Scalar::from("https://example.com")));
    }

    #[test]
    fn test_url_and_regex_are_orthogonal() {
        let def = classify("HOOK", &string().url().regex("^https://"));
        assert_eq!(def.key_type, KeyType::Url);
        assert_eq!(def.pattern.as_deref(), Some("^https://"));
    }

    #[test]
    fn test_email_promotion() {
        assert_eq!(classify("ADMIN", &string().email()).key_type, KeyType::Email);
    }

    #[test]
    fn test_number_buckets() {
        assert_eq!(classify("RATE", &number()).key_type, KeyType::Number);
        assert_eq!(classify("WORKERS", &number().int()).key_type, KeyType::Int);

        let port = classify("PORT", &number().int().min(1.0).max(65535.0));
        assert_eq!(port.key_type, KeyType::Port);

        let bounded = classify("PORT_ISH", &number().int().min(1.0).max(65534.0));
        assert_eq!(bounded.key_type, KeyType::Int);
        assert_eq!(bounded.min, Some(1.0));
        assert_eq!(bounded.max, Some(65534.0));
    }

    #[test]
    fn test_enum_keeps_declaration_order() {
        let def = classify("NODE_ENV", &enumeration(["development", "test", "production"]));
        assert_eq!(def.key_type, KeyType::Enum);
        assert_eq!(def.allowed, vec!["development", "test", "production"]);
    }

    #[test]
    fn test_annotations() {
        let node = string().describe("Signing secret").secret().optional();
        let def = classify("JWT_SECRET", &node);
        assert_eq!(def.description.as_deref(), Some("Signing secret"));
        assert!(def.secret);
        assert!(!def.required);
    }

    #[test]
    fn test_unsupported_defaults_to_required_string() {
        let raw = json!({"kind": "object", "shape": {"TAGS": {"kind": "array", "element": {"kind": "string"}}}});
        let def = normalize(&raw, "test").unwrap().remove(0);
        assert_eq!(def.key_type, KeyType::String);
        assert!(def.required);
    }

    #[test]
    fn test_empty_enum_is_rejected() {
        let raw = json!({"kind": "object", "shape": {
            "MODE": {"kind": "optional", "inner": {"kind": "enum", "values": []}}
        }});
        let err = normalize(&raw, "test").unwrap_err();
        assert!(err.to_string().contains("key `MODE`"));
    }

    #[test]
    fn test_parses_serialized_tree() {
        let raw = json!({
            "kind": "object",
            "shape": {
                "PORT": {
                    "kind": "default",
                    "value": 3000,
                    "inner": {"kind": "number", "checks": [
                        {"kind": "int"}, {"kind": "min", "value": 1}, {"kind": "max", "value": 65535}
                    ]}
                },
                "DEBUG": {"kind": "optional", "inner": {"kind": "boolean"}, "x-note": "ignored"},
                "TOKEN": {"kind": "string", "checks": [{"kind": "length", "value": 32}], "meta": {"secret": true, "owner": "ops"}}
            }
        });
        let defs = normalize(&raw, "test").unwrap();
        assert_eq!(defs.len(), 3);
        assert_eq!(defs[0].key_type, KeyType::Port);
        assert_eq!(defs[0].default, Some(Scalar::from(3000)));
        assert!(!defs[0].required);
        assert_eq!(defs[1].key_type, KeyType::Boolean);
        assert!(!defs[1].required);
        assert_eq!(defs[2].key_type, KeyType::String);
        assert!(defs[2].secret);
    }

    #[test]
    fn test_builder_round_trips_through_json() {
        let root = object([
            ("PORT", number().int().min(1.0).max(65535.0).default(8080)),
            ("NODE_ENV", enumeration(["development", "production"]).describe("Runtime mode")),
        ]);
        let raw = serde_json::to_value(&root).unwrap();
        assert_eq!(raw["kind"], "object");
        let parsed: Node = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed, root);
    }

    #[test]
    fn test_root_must_be_object() {
        let err = normalize(&json!({"kind": "string"}), "test").unwrap_err();
        assert!(err.to_string().contains("`object`"));

        let err = normalize(&json!({"kind": "object"}), "test").unwrap_err();
        assert!(err.to_string().contains("`shape`"));
    }
}
