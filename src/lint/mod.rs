//! Schema Linting
//!
//! Static checks over a normalized schema. Nothing here looks at an
//! environment; these are mistakes in the schema itself.
//!
//! ## Lints
//! 1. **Broken constraints**: unparsable patterns, `min` above `max`
//! 2. **Self-inconsistency**: a `default` or `example` its own key would reject
//! 3. **Smells**: secrets with defaults, required keys with defaults,
//!    `replacedBy` pointing at an undeclared key

use regex::Regex;
use serde::Serialize;

use crate::schema::{KeyDefinition, Scalar, Schema};
use crate::validate::{regex_error_summary, validate_value};

/// Result of linting a schema
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    pub schema: String,
    pub errors: Vec<LintError>,
    pub warnings: Vec<LintWarning>,
}

impl LintResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct LintError {
    pub code: &'static str,
    pub message: String,
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct LintWarning {
    pub code: &'static str,
    pub message: String,
    pub key: String,
}

/// The schema linter
#[derive(Debug, Default)]
pub struct SchemaLinter;

impl SchemaLinter {
    pub fn new() -> Self {
        Self
    }

    /// Lint every key in declaration order
    pub fn lint(&self, schema: &Schema) -> LintResult {
        let mut result = LintResult {
            schema: schema.origin(),
            ..LintResult::default()
        };

        for def in schema.definitions() {
            self.lint_pattern(def, &mut result);
            self.lint_bounds(def, &mut result);
            self.lint_samples(def, &mut result);
            self.lint_replacement(schema, def, &mut result);
            self.lint_defaults(def, &mut result);
        }

        tracing::debug!(
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "lint finished"
        );
        result
    }

    fn lint_pattern(&self, def: &KeyDefinition, result: &mut LintResult) {
        let Some(pattern) = &def.pattern else { return };
        if let Err(e) = Regex::new(pattern) {
            result.errors.push(LintError {
                code: "INVALID_PATTERN",
                message: format!("Pattern {} does not compile: {}", pattern, regex_error_summary(&e)),
                key: def.name.clone(),
            });
        }
    }

    fn lint_bounds(&self, def: &KeyDefinition, result: &mut LintResult) {
        if let (Some(min), Some(max)) = def.bounds() {
            if min > max {
                result.errors.push(LintError {
                    code: "INVALID_BOUNDS",
                    message: format!("min {} is greater than max {}", min, max),
                    key: def.name.clone(),
                });
            }
        }
    }

    /// A sample value is judged as if the key were optional, so an empty
    /// default is not reported as missing.
    fn sample_problem(def: &KeyDefinition, sample: &Scalar) -> Option<String> {
        let mut relaxed = def.clone();
        relaxed.required = false;
        validate_value(Some(&sample.to_string()), &relaxed)
            .err()
            .map(|reason| reason.to_string())
    }

    fn lint_samples(&self, def: &KeyDefinition, result: &mut LintResult) {
        if let Some(default) = &def.default {
            if let Some(reason) = Self::sample_problem(def, default) {
                result.errors.push(LintError {
                    code: "DEFAULT_TYPE_MISMATCH",
                    message: format!("Default does not satisfy type {}: {}", def.key_type, reason),
                    key: def.name.clone(),
                });
            }
        }
        if let Some(example) = &def.example {
            if let Some(reason) = Self::sample_problem(def, example) {
                result.warnings.push(LintWarning {
                    code: "EXAMPLE_TYPE_MISMATCH",
                    message: format!("Example does not satisfy type {}: {}", def.key_type, reason),
                    key: def.name.clone(),
                });
            }
        }
    }

    fn lint_replacement(&self, schema: &Schema, def: &KeyDefinition, result: &mut LintResult) {
        let Some(replacement) = &def.replaced_by else { return };
        if !schema.contains(replacement) {
            result.warnings.push(LintWarning {
                code: "DANGLING_REPLACEMENT",
                message: format!("replacedBy names undeclared key {}", replacement),
                key: def.name.clone(),
            });
        }
    }

    fn lint_defaults(&self, def: &KeyDefinition, result: &mut LintResult) {
        if def.default.is_none() {
            return;
        }
        if def.secret {
            result.warnings.push(LintWarning {
                code: "SECRET_DEFAULT",
                message: "Secret key carries a default value".to_string(),
                key: def.name.clone(),
            });
        }
        if def.required {
            result.warnings.push(LintWarning {
                code: "REQUIRED_WITH_DEFAULT",
                message: "Required key carries a default that is never used".to_string(),
                key: def.name.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::KeyType;
    use crate::source::SchemaSource;

    fn lint(defs: Vec<KeyDefinition>) -> LintResult {
        SchemaLinter::new().lint(&Schema::new(SchemaSource::Declarative, defs))
    }

    fn error_codes(result: &LintResult) -> Vec<&'static str> {
        result.errors.iter().map(|e| e.code).collect()
    }

    fn warning_codes(result: &LintResult) -> Vec<&'static str> {
        result.warnings.iter().map(|w| w.code).collect()
    }

    #[test]
    fn test_invalid_pattern() {
        let result = lint(vec![KeyDefinition::new("TOKEN", KeyType::String).with_pattern("([")]);
        assert_eq!(error_codes(&result), vec!["INVALID_PATTERN"]);
        assert_eq!(result.errors[0].key, "TOKEN");
    }

    #[test]
    fn test_invalid_bounds() {
        let result = lint(vec![
            KeyDefinition::new("RATIO", KeyType::Number).with_bounds(Some(5.0), Some(1.0)),
            KeyDefinition::new("NAME", KeyType::String).with_bounds(Some(5.0), Some(1.0)),
        ]);
        assert_eq!(error_codes(&result), vec!["INVALID_BOUNDS"]);
        assert_eq!(result.errors[0].key, "RATIO");
    }

    #[test]
    fn test_sample_mismatches() {
        let result = lint(vec![
            KeyDefinition::new("PORT", KeyType::Port).optional().with_default(70000),
            KeyDefinition::new("MODE", KeyType::Enum).with_example("fast"),
        ]);
        assert_eq!(error_codes(&result), vec!["DEFAULT_TYPE_MISMATCH"]);
        assert_eq!(warning_codes(&result), vec!["EXAMPLE_TYPE_MISMATCH"]);
    }

    #[test]
    fn test_smells() {
        let result = lint(vec![
            KeyDefinition::new("OLD", KeyType::String).optional().deprecated(Some("NEW")),
            KeyDefinition::new("API_KEY", KeyType::String).secret().with_default("dev"),
        ]);
        assert!(result.is_clean());
        assert_eq!(
            warning_codes(&result),
            vec!["DANGLING_REPLACEMENT", "SECRET_DEFAULT", "REQUIRED_WITH_DEFAULT"]
        );
    }

    #[test]
    fn test_clean_schema() {
        let result = lint(vec![
            KeyDefinition::new("PORT", KeyType::Port).optional().with_default(3000),
            KeyDefinition::new("OLD", KeyType::String).optional().deprecated(Some("NEW")),
            KeyDefinition::new("NEW", KeyType::String).with_example("value"),
        ]);
        assert!(result.is_clean());
        assert!(!result.has_warnings());
    }
}
