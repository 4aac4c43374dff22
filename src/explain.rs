//! Single-key inspection
//!
//! Looks one key up in a schema and, when an environment is supplied,
//! reports its current value and verdict. Secret values leave this module
//! only as [`REDACTED`].

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Serialize;
use thiserror::Error;

use crate::check::{check, CheckOptions, ValidationIssue};
use crate::envfile::EnvMap;
use crate::output::{REDACTED, SECRET_MARKER};
use crate::schema::{KeyDefinition, Scalar, Schema};

const MAX_SUGGESTIONS: usize = 3;

/// The requested key is not declared
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Key `{key}` is not declared in the schema")]
pub struct UnknownKey {
    pub key: String,
    /// Closest declared names, best first
    pub suggestions: Vec<String>,
}

/// Verdict for the key's current value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    Valid,
    Invalid,
    /// Absent and optional
    Unset,
}

/// Current state of the key in a merged environment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentValue {
    /// Raw value, or [`REDACTED`] for secrets
    pub value: Option<String>,
    pub status: KeyStatus,
    pub issues: Vec<ValidationIssue>,
}

/// Everything known about one key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub definition: KeyDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentValue>,
}

/// Explain `key`. `env` is the merged environment, if any was loaded.
pub fn explain(schema: &Schema, key: &str, env: Option<&EnvMap>) -> Result<Explanation, UnknownKey> {
    let Some(def) = schema.get(key) else {
        return Err(UnknownKey {
            key: key.to_string(),
            suggestions: suggest(schema, key),
        });
    };

    let mut definition = def.clone();
    if definition.secret && definition.default.is_some() {
        definition.default = Some(Scalar::from(REDACTED));
    }

    let current = env.map(|env| evaluate(schema, def, env));
    Ok(Explanation { definition, current })
}

/// Validate just this key by checking a one-key schema against a one-key
/// environment, so the verdict matches what `check` would say.
fn evaluate(schema: &Schema, def: &KeyDefinition, env: &EnvMap) -> CurrentValue {
    let value = env.get(&def.name);
    let single_schema = Schema::new(schema.source, [def.clone()]);
    let single_env: EnvMap = value
        .map(|v| (def.name.clone(), v.clone()))
        .into_iter()
        .collect();

    let result = check(&single_env, &single_schema, CheckOptions::default());
    let issues: Vec<ValidationIssue> = result.issues().cloned().collect();

    let status = if !result.errors.is_empty() {
        KeyStatus::Invalid
    } else if value.is_none() {
        KeyStatus::Unset
    } else {
        KeyStatus::Valid
    };

    CurrentValue {
        value: value.map(|v| if def.secret { REDACTED.to_string() } else { v.clone() }),
        status,
        issues,
    }
}

/// Declared names resembling `query`, best first
pub fn suggest(schema: &Schema, query: &str) -> Vec<String> {
    let matcher = SkimMatcherV2::default().ignore_case();
    let mut scored: Vec<(i64, &str)> = schema
        .names()
        .filter_map(|name| matcher.fuzzy_match(name, query).map(|score| (score, name)))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.to_string())
        .collect()
}

impl Explanation {
    /// Human-readable form. Secret values are not printed at all.
    pub fn render(&self) -> String {
        let def = &self.definition;
        let mut lines = vec![def.name.clone()];

        if let Some(description) = &def.description {
            lines.push(format!("  {}", description));
        }
        lines.push(format!("  type:      {}", def.key_type));
        lines.push(format!("  required:  {}", if def.required { "yes" } else { "no" }));
        if def.secret {
            lines.push("  secret:    yes".to_string());
        }
        if !def.allowed.is_empty() {
            lines.push(format!("  one of:    {}", def.allowed.join(", ")));
        }
        if let Some(pattern) = &def.pattern {
            lines.push(format!("  pattern:   {}", pattern));
        }
        let (min, max) = def.bounds();
        if min.is_some() || max.is_some() {
            let min = min.map(|v| v.to_string()).unwrap_or_default();
            let max = max.map(|v| v.to_string()).unwrap_or_default();
            lines.push(format!("  range:     {}..{}", min, max));
        }
        if let Some(default) = &def.default {
            if !def.secret {
                lines.push(format!("  default:   {}", default));
            }
        }
        if let Some(example) = &def.example {
            lines.push(format!("  example:   {}", example));
        }
        if def.deprecated {
            match &def.replaced_by {
                Some(replacement) => lines.push(format!("  deprecated: use {} instead", replacement)),
                None => lines.push("  deprecated: yes".to_string()),
            }
        }

        if let Some(current) = &self.current {
            let shown = match &current.value {
                None => "(not set)".to_string(),
                Some(_) if def.secret => SECRET_MARKER.to_string(),
                Some(value) => value.clone(),
            };
            lines.push(format!("  value:     {}", shown));
            let status = match current.status {
                KeyStatus::Valid => "valid",
                KeyStatus::Invalid => "invalid",
                KeyStatus::Unset => "unset",
            };
            lines.push(format!("  status:    {}", status));
            for issue in &current.issues {
                lines.push(format!("    [{}] {}", issue.kind, issue.message));
            }
        }

        lines.join("\n")
    }
}
