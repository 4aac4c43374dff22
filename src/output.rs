//! Terminal rendering
//!
//! Renderers are pure `fn(..) -> String`. Color is decided once, up front,
//! and carried in an [`OutputContext`] rather than probed per call.

use indexmap::IndexMap;
use nu_ansi_term::{Color, Style};
use std::io::IsTerminal;

use crate::check::{ValidationIssue, ValidationResult};
use crate::config::ColorMode;
use crate::envfile::EnvMap;
use crate::schema::Schema;

/// Placeholder for secret values in JSON views of an environment
pub const REDACTED: &str = "<redacted>";

/// Placeholder for secret values in human-readable tables
pub const SECRET_MARKER: &str = "(secret)";

/// Resolved terminal capabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputContext {
    pub color: bool,
}

impl OutputContext {
    /// Resolve a color mode. `NO_COLOR` always wins; `auto` follows whether
    /// stdout is a terminal.
    pub fn detect(mode: ColorMode) -> Self {
        let color = if std::env::var_os("NO_COLOR").is_some() {
            false
        } else {
            match mode {
                ColorMode::Always => true,
                ColorMode::Never => false,
                ColorMode::Auto => std::io::stdout().is_terminal(),
            }
        };
        Self { color }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.color {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }
}

// =============================================================================
// Validation results
// =============================================================================

fn render_issue(ctx: &OutputContext, label: &str, style: Style, issue: &ValidationIssue) -> String {
    format!(
        "  {} {} {}: {}",
        ctx.paint(style, label),
        ctx.paint(Style::new().dimmed(), &format!("[{}]", issue.kind)),
        ctx.paint(Style::new().bold(), &issue.key),
        issue.message
    )
}

/// Issues followed by a one-line summary
pub fn render_result(ctx: &OutputContext, result: &ValidationResult) -> String {
    let mut lines = Vec::new();

    for issue in &result.errors {
        lines.push(render_issue(ctx, "error", Color::Red.bold(), issue));
    }
    for issue in &result.warnings {
        lines.push(render_issue(ctx, "warning", Color::Yellow.bold(), issue));
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }

    let counts = format!(
        "{} checked, {} error(s), {} warning(s)",
        result.stats.checked,
        result.errors.len(),
        result.warnings.len()
    );
    if result.ok {
        lines.push(format!("{} {}", ctx.paint(Color::Green.bold(), "Environment is valid:"), counts));
    } else {
        lines.push(format!("{} {}", ctx.paint(Color::Red.bold(), "Environment is invalid:"), counts));
    }

    lines.join("\n")
}

// =============================================================================
// Values
// =============================================================================

fn is_secret(schema: &Schema, key: &str) -> bool {
    schema.get(key).is_some_and(|def| def.secret)
}

/// Key/value table. Secret values are never printed.
pub fn render_values(ctx: &OutputContext, schema: &Schema, env: &EnvMap) -> String {
    let width = env.keys().map(|k| k.len()).max().unwrap_or(0);
    env.iter()
        .map(|(key, value)| {
            let shown = if is_secret(schema, key) {
                ctx.paint(Style::new().dimmed(), SECRET_MARKER)
            } else {
                value.clone()
            };
            format!("  {:<width$}  {}", key, shown, width = width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Copy of the environment with every secret value replaced by [`REDACTED`]
pub fn redact_environment(schema: &Schema, env: &EnvMap) -> IndexMap<String, String> {
    env.iter()
        .map(|(key, value)| {
            let value = if is_secret(schema, key) {
                REDACTED.to_string()
            } else {
                value.clone()
            };
            (key.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{check, CheckOptions};
    use crate::schema::{KeyDefinition, KeyType};
    use crate::source::SchemaSource;

    fn fixture() -> (Schema, EnvMap) {
        let schema = Schema::new(
            SchemaSource::Declarative,
            vec![
                KeyDefinition::new("API_KEY", KeyType::String).secret(),
                KeyDefinition::new("PORT", KeyType::Port),
            ],
        );
        let env: EnvMap = [("API_KEY", "sk_live_123"), ("PORT", "0")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        (schema, env)
    }

    #[test]
    fn test_redact_environment() {
        let (schema, env) = fixture();
        let redacted = redact_environment(&schema, &env);
        assert_eq!(redacted["API_KEY"], REDACTED);
        assert_eq!(redacted["PORT"], "0");
    }

    #[test]
    fn test_values_table_hides_secrets() {
        let (schema, env) = fixture();
        let table = render_values(&OutputContext::plain(), &schema, &env);
        assert!(!table.contains("sk_live_123"));
        assert!(table.contains("API_KEY  (secret)"));
        assert!(table.contains("PORT     0"));
    }

    #[test]
    fn test_render_result_plain() {
        let (schema, env) = fixture();
        let result = check(&env, &schema, CheckOptions::default());
        let text = render_result(&OutputContext::plain(), &result);
        assert!(text.contains("  error [type] PORT: Expected a port number"));
        assert!(text.ends_with("Environment is invalid: 2 checked, 1 error(s), 0 warning(s)"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_render_result_colored() {
        let (schema, env) = fixture();
        let result = check(&env, &schema, CheckOptions::default());
        let text = render_result(&OutputContext { color: true }, &result);
        assert!(text.contains('\u{1b}'));
    }
}
