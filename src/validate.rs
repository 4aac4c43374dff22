//! Per-value type validation
//!
//! [`validate_value`] decides whether one raw string satisfies one key
//! definition. [`check_pattern`] applies a key's regular expression
//! independently of the type. Failure messages never echo the value.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::schema::{KeyDefinition, KeyType, PORT_MAX, PORT_MIN};

const BOOLEAN_LITERALS: [&str; 8] = ["true", "false", "1", "0", "yes", "no", "on", "off"];

/// Why a value failed its declared type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidValue {
    #[error("Required key missing")]
    Missing,

    #[error("Expected a number")]
    NotANumber,

    #[error("Expected an integer")]
    NotAnInteger,

    #[error("Value is below the minimum of {0}")]
    BelowMinimum(f64),

    #[error("Value is above the maximum of {0}")]
    AboveMaximum(f64),

    #[error("Expected a boolean (true/false, 1/0, yes/no, on/off)")]
    NotABoolean,

    #[error("Expected an absolute URL")]
    InvalidUrl,

    #[error("Expected an email address")]
    InvalidEmail,

    #[error("Expected one of: {}", .0.join(", "))]
    NotInEnum(Vec<String>),

    #[error("Expected a port number between 1 and 65535")]
    InvalidPort,
}

/// Why a value failed its key's pattern
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatternFailure {
    #[error("Value does not match pattern {0}")]
    Mismatch(String),

    #[error("Invalid pattern {pattern} in schema: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Validate one raw value against its definition.
///
/// Empty and absent values are the same thing here: they fail required
/// keys and pass optional ones without further checks.
pub fn validate_value(raw: Option<&str>, def: &KeyDefinition) -> Result<(), InvalidValue> {
    let value = match raw {
        Some(v) if !v.is_empty() => v,
        _ if def.required => return Err(InvalidValue::Missing),
        _ => return Ok(()),
    };

    match def.key_type {
        KeyType::String => Ok(()),
        KeyType::Number => validate_number(value, false, def),
        KeyType::Int => validate_number(value, true, def),
        KeyType::Boolean => {
            let lowered = value.to_ascii_lowercase();
            if BOOLEAN_LITERALS.contains(&lowered.as_str()) {
                Ok(())
            } else {
                Err(InvalidValue::NotABoolean)
            }
        }
        KeyType::Url => url::Url::parse(value)
            .map(|_| ())
            .map_err(|_| InvalidValue::InvalidUrl),
        KeyType::Email => {
            if email_regex().is_match(value) {
                Ok(())
            } else {
                Err(InvalidValue::InvalidEmail)
            }
        }
        KeyType::Enum => {
            if def.allowed.iter().any(|allowed| allowed == value) {
                Ok(())
            } else {
                Err(InvalidValue::NotInEnum(def.allowed.clone()))
            }
        }
        KeyType::Port => match value.trim().parse::<u32>() {
            Ok(port) if (PORT_MIN..=PORT_MAX).contains(&f64::from(port)) => Ok(()),
            _ => Err(InvalidValue::InvalidPort),
        },
    }
}

fn validate_number(value: &str, integer: bool, def: &KeyDefinition) -> Result<(), InvalidValue> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| InvalidValue::NotANumber)?;
    if !parsed.is_finite() {
        return Err(InvalidValue::NotANumber);
    }
    if integer && parsed.fract() != 0.0 {
        return Err(InvalidValue::NotAnInteger);
    }

    let (min, max) = def.bounds();
    if let Some(min) = min {
        if parsed < min {
            return Err(InvalidValue::BelowMinimum(min));
        }
    }
    if let Some(max) = max {
        if parsed > max {
            return Err(InvalidValue::AboveMaximum(max));
        }
    }
    Ok(())
}

/// Match a value against a regular expression source (unanchored search)
pub fn check_pattern(value: &str, pattern: &str) -> Result<(), PatternFailure> {
    let re = Regex::new(pattern).map_err(|e| PatternFailure::InvalidPattern {
        pattern: pattern.to_string(),
        reason: regex_error_summary(&e),
    })?;
    if re.is_match(value) {
        Ok(())
    } else {
        Err(PatternFailure::Mismatch(pattern.to_string()))
    }
}

/// Regex syntax errors render over several lines; keep the last one.
pub(crate) fn regex_error_summary(err: &regex::Error) -> String {
    let text = err.to_string();
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("invalid regular expression")
        .trim()
        .to_string()
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"))
}
