//! Declarative schema front-end
//!
//! Reads `{"properties": {KEY: {type, description, required, optional, ...}}}`
//! near-verbatim. Unknown entry attributes are ignored.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{EnvSchemaError, Result};
use crate::schema::{KeyDefinition, KeyType, Scalar};

/// Name of the root container this form requires
pub const ROOT_CONTAINER: &str = "properties";

/// One entry under `properties`, as written
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyEntry {
    #[serde(rename = "type")]
    key_type: Option<KeyType>,
    description: Option<String>,
    required: Option<bool>,
    optional: Option<bool>,
    default: Option<Scalar>,
    example: Option<Scalar>,
    #[serde(rename = "enum")]
    allowed: Option<Vec<String>>,
    pattern: Option<String>,
    deprecated: Option<bool>,
    replaced_by: Option<String>,
    secret: Option<bool>,
    min: Option<f64>,
    max: Option<f64>,
}

impl PropertyEntry {
    /// An explicit `required` wins over `optional`; with neither the key is required.
    fn is_required(&self) -> bool {
        match (self.required, self.optional) {
            (Some(required), _) => required,
            (None, Some(optional)) => !optional,
            (None, None) => true,
        }
    }
}

/// Normalize a declarative document into key definitions in declaration order
pub fn normalize(raw: &Value, origin: &str) -> Result<Vec<KeyDefinition>> {
    let properties = match raw.get(ROOT_CONTAINER) {
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(EnvSchemaError::schema_load(
                origin,
                format!("root `{}` container must be an object", ROOT_CONTAINER),
            ))
        }
        None => {
            return Err(EnvSchemaError::schema_load(
                origin,
                format!("missing root `{}` container", ROOT_CONTAINER),
            ))
        }
    };

    properties
        .iter()
        .map(|(name, entry)| normalize_entry(name, entry, origin))
        .collect()
}

fn normalize_entry(name: &str, entry: &Value, origin: &str) -> Result<KeyDefinition> {
    if !entry.is_object() {
        return Err(EnvSchemaError::schema_load(
            origin,
            format!("key `{}`: entry must be an object", name),
        ));
    }
    let entry: PropertyEntry = serde_json::from_value(entry.clone())
        .map_err(|e| EnvSchemaError::schema_load(origin, format!("key `{}`: {}", name, e)))?;

    let key_type = entry.key_type.unwrap_or_default();
    let mut def = KeyDefinition::new(name, key_type);
    def.required = entry.is_required();
    def.description = entry.description.clone();
    def.default = entry.default.clone();
    def.example = entry.example.clone();
    def.pattern = entry.pattern.clone();
    def.deprecated = entry.deprecated.unwrap_or(false);
    def.replaced_by = entry.replaced_by.clone();
    def.secret = entry.secret.unwrap_or(false);

    if key_type != KeyType::Port {
        def.min = entry.min;
        def.max = entry.max;
    }

    match (key_type, entry.allowed) {
        (KeyType::Enum, Some(values)) if !values.is_empty() => def.allowed = values,
        (KeyType::Enum, _) => {
            return Err(EnvSchemaError::schema_load(
                origin,
                format!("key `{}`: enum type requires a non-empty `enum` list", name),
            ))
        }
        (_, Some(_)) => {
            tracing::debug!(key = name, %key_type, "ignoring `enum` list on non-enum key");
        }
        (_, None) => {}
    }

    Ok(def)
}
