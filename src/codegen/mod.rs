//! Artifact Generation
//!
//! Deterministic projections of a [`Schema`] into text:
//! - [`example`]: a commented `.env.example`
//! - [`typescript`]: a `NodeJS.ProcessEnv` declaration
//! - [`rust`]: a typed `Env` struct
//!
//! Generators are pure functions of the schema. Writing the result is the
//! caller's job.

pub mod example;
pub mod rust;
pub mod typescript;

use serde::{Deserialize, Serialize};

use crate::schema::Schema;

pub use example::render_example;
pub use rust::render_rust;
pub use typescript::render_typescript;

/// Target language for type declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypesLang {
    #[default]
    Ts,
    Rust,
}

/// Render type declarations in the requested language
pub fn render_types(schema: &Schema, lang: TypesLang) -> String {
    match lang {
        TypesLang::Ts => render_typescript(schema),
        TypesLang::Rust => render_rust(schema),
    }
}

/// "Generated" banner line. Only the schema's file name is used so output
/// does not depend on where the schema was loaded from.
pub(crate) fn generated_banner(schema: &Schema) -> String {
    let file_name = schema
        .path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string());
    match file_name {
        Some(name) => format!("Generated by envschema from {}. Do not edit by hand.", name),
        None => "Generated by envschema. Do not edit by hand.".to_string(),
    }
}
