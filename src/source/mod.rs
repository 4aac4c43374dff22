//! Schema Normalization
//!
//! Two front-ends turn an external schema document into the canonical
//! [`Schema`] model:
//!
//! - [`fluent`]: a composable validator tree (object-of-fields root with
//!   optional/default wrappers and refinement checks)
//! - [`declarative`]: a plain `{"properties": {...}}` document read
//!   near-verbatim
//!
//! Both are reached through [`SchemaSource::normalize`]; callers never
//! branch on the format themselves.

pub mod declarative;
pub mod fluent;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

use crate::error::{EnvSchemaError, Result};
use crate::schema::Schema;

/// Which front-end produced a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSource {
    /// Composable validator tree
    Fluent,
    /// Plain `properties` document
    Declarative,
}

impl SchemaSource {
    /// Pick the front-end for a raw document: a root carrying a `kind` tag
    /// is a fluent tree, anything else is treated as declarative.
    pub fn detect(raw: &Value) -> Self {
        match raw.get("kind") {
            Some(Value::String(_)) => SchemaSource::Fluent,
            _ => SchemaSource::Declarative,
        }
    }

    /// Normalize a raw document into a schema. `origin` names the document
    /// in load errors.
    pub fn normalize(&self, raw: &Value, origin: &str) -> Result<Schema> {
        let definitions = match self {
            SchemaSource::Fluent => fluent::normalize(raw, origin)?,
            SchemaSource::Declarative => declarative::normalize(raw, origin)?,
        };
        Ok(Schema::new(*self, definitions))
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Fluent => f.write_str("fluent"),
            SchemaSource::Declarative => f.write_str("declarative"),
        }
    }
}

/// Read and normalize a schema file, auto-detecting its form
pub fn load_schema(path: &Path) -> Result<Schema> {
    let origin = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| {
        let message = if e.kind() == std::io::ErrorKind::NotFound {
            "schema file not found".to_string()
        } else {
            e.to_string()
        };
        EnvSchemaError::schema_load(&origin, message)
    })?;

    let raw: Value = serde_json::from_str(&content)
        .map_err(|e| EnvSchemaError::schema_load(&origin, format!("invalid JSON: {}", e)))?;

    let source = SchemaSource::detect(&raw);
    let schema = source.normalize(&raw, &origin)?.with_path(path);
    tracing::debug!(path = %origin, %source, keys = schema.len(), "loaded schema");
    Ok(schema)
}
