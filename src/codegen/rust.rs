//! Rust Code Emitter
//!
//! Generates an `Env` struct with one field per key, plus a unit-variant
//! enum for every enum-typed key.
//!
//! Key constraints:
//! - Field order follows schema declaration order
//! - Optional keys without a default become `Option<T>`
//! - Ports are `u16`, integers `i64`, numbers `f64`, everything else `String`

use std::collections::{HashMap, HashSet};

use crate::schema::{KeyDefinition, KeyType, Schema};

/// Strict and reserved keywords usable as raw identifiers
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn",
    "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers
const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "Self", "super", "_"];

const STRUCT_NAME: &str = "Env";

// =============================================================================
// Public API
// =============================================================================

/// Emit the `Env` struct and its enums
pub fn render_rust(schema: &Schema) -> String {
    let mut output = String::new();
    output.push_str(&format!("// {}\n\n", super::generated_banner(schema)));

    let mut type_names = UniqueNames::new("");
    type_names.claim(STRUCT_NAME.to_string());
    let enum_types: HashMap<&str, String> = schema
        .definitions()
        .filter(|d| d.key_type == KeyType::Enum)
        .map(|d| (d.name.as_str(), type_names.claim(escape_keyword(&to_pascal_case(&d.name)))))
        .collect();

    emit_struct(&mut output, schema, &enum_types);

    for def in schema.definitions().filter(|d| d.key_type == KeyType::Enum) {
        output.push('\n');
        emit_enum(&mut output, def, &enum_types[def.name.as_str()]);
    }

    output
}

// =============================================================================
// Struct Emission
// =============================================================================

fn emit_struct(output: &mut String, schema: &Schema, enum_types: &HashMap<&str, String>) {
    output.push_str("/// Typed view of the process environment\n");
    output.push_str("#[derive(Debug, Clone, PartialEq)]\n");
    output.push_str(&format!("pub struct {} {{\n", STRUCT_NAME));

    let mut fields = UniqueNames::new("_");
    for def in schema.definitions() {
        let field = fields.claim(escape_keyword(&to_snake_case(&def.name)));
        emit_field(output, def, &field, enum_types);
    }

    output.push_str("}\n");
}

fn emit_field(output: &mut String, def: &KeyDefinition, field: &str, enum_types: &HashMap<&str, String>) {
    if let Some(description) = &def.description {
        for line in description.lines() {
            output.push_str(&format!("    /// {}\n", line.trim()));
        }
    }
    if def.deprecated {
        match &def.replaced_by {
            Some(replacement) => output.push_str(&format!(
                "    #[deprecated(note = \"use {} instead\")]\n",
                to_snake_case(replacement)
            )),
            None => output.push_str("    #[deprecated]\n"),
        }
    }

    let rust_type = field_type(def, enum_types);
    let full_type = if !def.required && def.default.is_none() {
        format!("Option<{}>", rust_type)
    } else {
        rust_type
    };

    output.push_str(&format!("    pub {}: {},\n", field, full_type));
}

fn field_type(def: &KeyDefinition, enum_types: &HashMap<&str, String>) -> String {
    match def.key_type {
        KeyType::Number => "f64".to_string(),
        KeyType::Int => "i64".to_string(),
        KeyType::Boolean => "bool".to_string(),
        KeyType::Port => "u16".to_string(),
        KeyType::Enum => enum_types
            .get(def.name.as_str())
            .cloned()
            .unwrap_or_else(|| to_pascal_case(&def.name)),
        KeyType::String | KeyType::Url | KeyType::Email => "String".to_string(),
    }
}

// =============================================================================
// Enum Emission
// =============================================================================

fn emit_enum(output: &mut String, def: &KeyDefinition, name: &str) {
    let mut used = UniqueNames::new("");
    let variants: Vec<String> = def
        .allowed
        .iter()
        .map(|v| used.claim(escape_keyword(&variant_name(v))))
        .collect();

    output.push_str(&format!("/// Allowed values of `{}`\n", def.name));
    output.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq)]\n");
    output.push_str(&format!("pub enum {} {{\n", name));
    for variant in &variants {
        output.push_str(&format!("    {},\n", variant));
    }
    output.push_str("}\n\n");

    output.push_str(&format!("impl {} {{\n", name));
    output.push_str("    pub fn as_str(&self) -> &'static str {\n");
    output.push_str("        match self {\n");
    for (variant, literal) in variants.iter().zip(&def.allowed) {
        output.push_str(&format!("            {}::{} => {:?},\n", name, variant, literal));
    }
    output.push_str("        }\n");
    output.push_str("    }\n");
    output.push_str("}\n");
}

// =============================================================================
// Helper Utilities
// =============================================================================

/// Identifiers handed out within one scope. A name already taken gets the
/// first free numeric suffix, starting at 2.
struct UniqueNames {
    separator: &'static str,
    used: HashSet<String>,
}

impl UniqueNames {
    fn new(separator: &'static str) -> Self {
        Self {
            separator,
            used: HashSet::new(),
        }
    }

    fn claim(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}{}{}", base, self.separator, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Literal to a valid variant identifier
fn variant_name(literal: &str) -> String {
    let cleaned: String = literal
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let pascal = to_pascal_case(&cleaned.to_ascii_lowercase());
    match pascal.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => pascal,
        _ => format!("V{}", pascal),
    }
}

/// Make `name` usable as an identifier: raw form for ordinary keywords, a
/// trailing underscore for those that cannot be raw
fn escape_keyword(name: &str) -> String {
    if NON_RAW_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else if RUST_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

/// Convert to PascalCase. Env keys are SCREAMING_SNAKE so the input is
/// lowercased before splitting.
fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;

    for c in s.chars() {
        if c == '_' || c == '-' || c == '.' || c == ' ' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c.to_ascii_lowercase());
        }
    }

    result
}

/// Convert to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;

    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c == '-' || c == '.' || c == ' ' {
            result.push('_');
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_ascii_lowercase();
        }
    }

    match result.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{}", result),
        _ => result,
    }
}
