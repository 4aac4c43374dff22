//! TypeScript declaration emitter
//!
//! Augments `NodeJS.ProcessEnv` so `process.env.KEY` is typed. Every value
//! is a string at runtime; enum keys narrow to a union of their literals.

use crate::schema::{KeyDefinition, KeyType, Schema};

/// Emit a global `ProcessEnv` augmentation
pub fn render_typescript(schema: &Schema) -> String {
    let mut output = String::new();
    output.push_str(&format!("// {}\n\n", super::generated_banner(schema)));
    output.push_str("declare global {\n");
    output.push_str("  namespace NodeJS {\n");
    output.push_str("    interface ProcessEnv {\n");

    for def in schema.definitions() {
        emit_property(&mut output, def);
    }

    output.push_str("    }\n");
    output.push_str("  }\n");
    output.push_str("}\n\n");
    output.push_str("export {};\n");
    output
}

fn emit_property(output: &mut String, def: &KeyDefinition) {
    let mut doc: Vec<String> = def
        .description
        .iter()
        .flat_map(|d| d.lines().map(|l| l.trim().to_string()))
        .collect();
    if def.deprecated {
        doc.push(match &def.replaced_by {
            Some(replacement) => format!("@deprecated Use {} instead", replacement),
            None => "@deprecated".to_string(),
        });
    }

    match doc.len() {
        0 => {}
        1 => output.push_str(&format!("      /** {} */\n", doc[0])),
        _ => {
            output.push_str("      /**\n");
            for line in &doc {
                output.push_str(&format!("       * {}\n", line));
            }
            output.push_str("       */\n");
        }
    }

    let optional = if def.required { "" } else { "?" };
    output.push_str(&format!(
        "      {}{}: {};\n",
        property_name(&def.name),
        optional,
        value_type(def)
    ));
}

fn value_type(def: &KeyDefinition) -> String {
    match def.key_type {
        KeyType::Enum => def
            .allowed
            .iter()
            .map(|v| string_literal(v))
            .collect::<Vec<_>>()
            .join(" | "),
        _ => "string".to_string(),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn property_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}

fn string_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped.push('"');
    escaped
}
