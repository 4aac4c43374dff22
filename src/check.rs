//! Validation orchestration
//!
//! Combines a merged environment with a schema into a complete
//! [`ValidationResult`]. Every issue is collected; nothing short-circuits.
//!
//! Issue order is part of the contract: missing-key errors first in schema
//! declaration order, then per-key issues in the environment's order.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::envfile::EnvMap;
use crate::schema::Schema;
use crate::validate::{check_pattern, validate_value};

/// Classification of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Missing,
    Type,
    Unknown,
    Deprecated,
    Pattern,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueKind::Missing => "missing",
            IssueKind::Type => "type",
            IssueKind::Unknown => "unknown",
            IssueKind::Deprecated => "deprecated",
            IssueKind::Pattern => "pattern",
        };
        f.write_str(name)
    }
}

/// One finding for one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
    #[serde(rename = "replacedBy", default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
}

impl ValidationIssue {
    pub fn new(key: impl Into<String>, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            message: message.into(),
            replaced_by: None,
        }
    }
}

/// Issue counts for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStats {
    pub checked: usize,
    pub missing: usize,
    pub deprecated: usize,
    pub unknown: usize,
}

/// Outcome of one `check` run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    /// Key names present in the merged environment
    pub files: Vec<String>,
    pub stats: CheckStats,
}

impl ValidationResult {
    /// Every issue, errors first
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }
}

/// Run modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Undeclared keys are errors instead of warnings
    pub strict: bool,
    /// Any warning fails the run (CI mode)
    pub fail_on_warnings: bool,
}

/// Classify a merged environment against a schema
pub fn check(env: &EnvMap, schema: &Schema, options: CheckOptions) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut stats = CheckStats {
        checked: env.len(),
        ..CheckStats::default()
    };

    for def in schema.definitions() {
        if def.required && !env.contains_key(&def.name) {
            errors.push(ValidationIssue::new(&def.name, IssueKind::Missing, "Required key missing"));
            stats.missing += 1;
        }
    }

    for (key, value) in env {
        let Some(def) = schema.get(key) else {
            let issue = ValidationIssue::new(key, IssueKind::Unknown, "Key is not declared in the schema");
            stats.unknown += 1;
            if options.strict {
                errors.push(issue);
            } else {
                warnings.push(issue);
            }
            continue;
        };

        if let Err(reason) = validate_value(Some(value), def) {
            errors.push(ValidationIssue::new(key, IssueKind::Type, reason.to_string()));
        }

        if let Some(pattern) = def.pattern.as_deref() {
            if !value.is_empty() {
                if let Err(failure) = check_pattern(value, pattern) {
                    errors.push(ValidationIssue::new(key, IssueKind::Pattern, failure.to_string()));
                }
            }
        }

        if def.deprecated {
            let message = match &def.replaced_by {
                Some(replacement) => format!("Key is deprecated; use {} instead", replacement),
                None => "Key is deprecated".to_string(),
            };
            let mut issue = ValidationIssue::new(key, IssueKind::Deprecated, message);
            issue.replaced_by = def.replaced_by.clone();
            warnings.push(issue);
            stats.deprecated += 1;
        }
    }

    let ok = errors.is_empty() && (warnings.is_empty() || !options.fail_on_warnings);
    tracing::debug!(
        ok,
        errors = errors.len(),
        warnings = warnings.len(),
        checked = stats.checked,
        "validation finished"
    );

    ValidationResult {
        ok,
        errors,
        warnings,
        files: env.keys().cloned().collect(),
        stats,
    }
}
