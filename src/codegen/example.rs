//! `.env.example` generation

use serde::Serialize;
use similar::TextDiff;

use crate::envfile::{parse_line, parse_str};
use crate::schema::{KeyDefinition, KeyType, Schema};

/// Keys in example order: required first, then non-deprecated before
/// deprecated, then by name
pub fn example_order(schema: &Schema) -> Vec<&KeyDefinition> {
    let mut defs: Vec<&KeyDefinition> = schema.definitions().collect();
    defs.sort_by(|a, b| {
        (!a.required, a.deprecated, a.name.as_str()).cmp(&(!b.required, b.deprecated, b.name.as_str()))
    });
    defs
}

/// Value written for a key: `example`, else `default`, else a placeholder.
/// A secret's default is never written.
pub fn example_value(def: &KeyDefinition) -> String {
    if let Some(example) = &def.example {
        return example.to_string();
    }
    if let Some(default) = &def.default {
        if !def.secret {
            return default.to_string();
        }
    }
    placeholder(def)
}

/// Type-specific stand-in value
pub fn placeholder(def: &KeyDefinition) -> String {
    match def.key_type {
        KeyType::String => String::new(),
        KeyType::Number | KeyType::Int => def
            .min
            .map(|min| min.to_string())
            .unwrap_or_else(|| "0".to_string()),
        KeyType::Boolean => "false".to_string(),
        KeyType::Url => "https://example.com".to_string(),
        KeyType::Email => "user@example.com".to_string(),
        KeyType::Enum => def.allowed.first().cloned().unwrap_or_default(),
        KeyType::Port => "3000".to_string(),
    }
}

/// Quote values the env parser would otherwise misread. Line breaks are
/// written as `\n` escapes since every assignment must fit on one line.
fn quote_value(value: &str) -> String {
    let value = value.replace('\r', "\\r").replace('\n', "\\n");
    let needs_quotes = value.chars().any(|c| c.is_whitespace() || c == '#')
        || value.starts_with('"')
        || value.starts_with('\'');
    if !needs_quotes {
        value
    } else if value.contains('"') {
        format!("'{}'", value)
    } else {
        format!("\"{}\"", value)
    }
}

fn describe_key(def: &KeyDefinition) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(description) = &def.description {
        lines.extend(description.lines().map(|l| l.trim().to_string()));
    }

    let mut flags = vec![if def.required { "required" } else { "optional" }];
    if def.secret {
        flags.push("secret");
    }
    lines.push(format!("type: {} ({})", def.key_type, flags.join(", ")));

    if !def.allowed.is_empty() {
        lines.push(format!("one of: {}", def.allowed.join(", ")));
    }
    if let Some(pattern) = &def.pattern {
        lines.push(format!("pattern: {}", pattern));
    }
    if matches!(def.key_type, KeyType::Number | KeyType::Int) && (def.min.is_some() || def.max.is_some()) {
        let min = def.min.map(|v| v.to_string()).unwrap_or_default();
        let max = def.max.map(|v| v.to_string()).unwrap_or_default();
        lines.push(format!("range: {}..{}", min, max));
    }
    if def.deprecated {
        match &def.replaced_by {
            Some(replacement) => lines.push(format!("DEPRECATED: use {} instead", replacement)),
            None => lines.push("DEPRECATED".to_string()),
        }
    }
    lines
}

/// Render the full example file
pub fn render_example(schema: &Schema) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n", super::generated_banner(schema)));
    output.push_str("# Copy to .env and fill in real values.\n");

    for def in example_order(schema) {
        output.push('\n');
        for line in describe_key(def) {
            output.push_str(&format!("# {}\n", line));
        }
        output.push_str(&format!("{}={}\n", def.name, quote_value(&example_value(def))));
    }

    output
}

// =============================================================================
// Sync
// =============================================================================

/// Key-level disagreement between a schema and an existing example file
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExampleDrift {
    /// Declared but absent from the example, in declaration order
    pub missing: Vec<String>,
    /// In the example but undeclared, in file order
    pub extra: Vec<String>,
}

impl ExampleDrift {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

pub fn example_drift(schema: &Schema, existing: &str) -> ExampleDrift {
    let present = parse_str(existing);
    ExampleDrift {
        missing: schema
            .names()
            .filter(|name| !present.contains_key(*name))
            .map(String::from)
            .collect(),
        extra: present
            .keys()
            .filter(|key| !schema.contains(key))
            .cloned()
            .collect(),
    }
}

/// Drop the assignment lines of undeclared keys. Comments, blank lines and
/// everything else survive byte for byte. Returns the new text and the
/// removed keys.
pub fn prune_example(schema: &Schema, existing: &str) -> (String, Vec<String>) {
    let mut kept = String::with_capacity(existing.len());
    let mut removed = Vec::new();

    for line in existing.split_inclusive('\n') {
        match parse_line(line) {
            Some((key, _)) if !schema.contains(key) => removed.push(key.to_string()),
            _ => kept.push_str(line),
        }
    }

    (kept, removed)
}

/// Unified line diff of `current` against `generated`
pub fn diff_example(current: &str, generated: &str) -> String {
    TextDiff::from_lines(current, generated)
        .unified_diff()
        .context_radius(3)
        .header("current", "generated")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SchemaSource;

    fn sample() -> Schema {
        Schema::new(
            SchemaSource::Declarative,
            vec![
                KeyDefinition::new("ZED_OLD", KeyType::String).deprecated(Some("ZED")),
                KeyDefinition::new("DEBUG", KeyType::Boolean).optional(),
                KeyDefinition::new("API_KEY", KeyType::String)
                    .secret()
                    .with_default("sk_dev_default"),
                KeyDefinition::new("PORT", KeyType::Port).with_default(3000),
                KeyDefinition::new("GREETING", KeyType::String).with_example("Hello World"),
                KeyDefinition::new("LEGACY", KeyType::Int).optional().deprecated(None),
            ],
        )
    }

    #[test]
    fn test_example_order() {
        let schema = sample();
        let names: Vec<&str> = example_order(&schema).iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["API_KEY", "GREETING", "PORT", "ZED_OLD", "DEBUG", "LEGACY"]);
    }

    #[test]
    fn test_example_values() {
        let schema = sample();
        assert_eq!(example_value(schema.get("PORT").unwrap()), "3000");
        assert_eq!(example_value(schema.get("API_KEY").unwrap()), "");
        assert_eq!(example_value(schema.get("DEBUG").unwrap()), "false");
        assert_eq!(example_value(schema.get("GREETING").unwrap()), "Hello World");
    }

    #[test]
    fn test_render_is_parseable_and_deterministic() {
        let schema = sample();
        let first = render_example(&schema);
        let second = render_example(&schema);
        assert_eq!(first, second);

        let parsed = parse_str(&first);
        assert_eq!(parsed.len(), schema.len());
        assert_eq!(parsed["GREETING"], "Hello World");
        assert!(first.contains("# DEPRECATED: use ZED instead\n"));
        assert!(first.contains("# type: string (required, secret)\nAPI_KEY=\n"));
    }

    #[test]
    fn test_quote_value() {
        assert_eq!(quote_value("plain"), "plain");
        assert_eq!(quote_value("two words"), "\"two words\"");
        assert_eq!(quote_value("say \"hi\" now"), "'say \"hi\" now'");
        assert_eq!(quote_value("a#b"), "\"a#b\"");
        assert_eq!(quote_value("line1\nline2"), "line1\\nline2");
    }

    #[test]
    fn test_multiline_value_stays_on_one_line() {
        let schema = Schema::new(
            SchemaSource::Declarative,
            vec![
                KeyDefinition::new("CERT", KeyType::String).with_example("line1\nline2"),
                KeyDefinition::new("HOST", KeyType::String).with_example("localhost"),
            ],
        );
        let parsed = parse_str(&render_example(&schema));
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["CERT"], "line1\\nline2");
        assert_eq!(parsed["HOST"], "localhost");
    }

    #[test]
    fn test_drift_and_prune() {
        let schema = Schema::new(
            SchemaSource::Declarative,
            vec![
                KeyDefinition::new("PORT", KeyType::Port),
                KeyDefinition::new("HOST", KeyType::String),
            ],
        );
        let existing = "# Service\nPORT=3000\n\n# gone\nLEGACY=1\nexport OTHER=2\n";

        let drift = example_drift(&schema, existing);
        assert_eq!(drift.missing, vec!["HOST"]);
        assert_eq!(drift.extra, vec!["LEGACY", "OTHER"]);
        assert!(!drift.is_empty());

        let (pruned, removed) = prune_example(&schema, existing);
        assert_eq!(removed, vec!["LEGACY", "OTHER"]);
        assert_eq!(pruned, "# Service\nPORT=3000\n\n# gone\n");
        assert!(example_drift(&schema, &pruned).extra.is_empty());
    }

    #[test]
    fn test_diff_example() {
        assert!(diff_example("A=1\n", "A=1\n").is_empty());
        let diff = diff_example("A=1\n", "A=2\n");
        assert!(diff.contains("-A=1"));
        assert!(diff.contains("+A=2"));
    }
}
