//! envschema
//!
//! Validates `.env` files against a schema, reports every problem at once,
//! and derives artifacts (an example env file, type declarations) from the
//! same schema.
//!
//! ## Features
//!
//! - **Two schema forms**: a fluent validator tree and a plain declarative
//!   document, both normalized into one [`Schema`]
//! - **Overlay loading**: several env files merged left to right
//! - **Complete results**: missing, type, pattern, unknown and deprecated
//!   issues are all collected into a [`ValidationResult`]
//! - **Derived artifacts**: `.env.example`, TypeScript and Rust declarations
//! - **Schema lint**: static checks on the schema itself
//!
//! ## Pipeline
//!
//! ```text
//! env.schema.json ──▶ SchemaSource::normalize ──▶ Schema ─┬─▶ check ──▶ ValidationResult
//!                                                          │      ▲
//! .env, .env.local ──▶ load_env_files ──▶ merged EnvMap ───┼──────┘
//!                                                          └─▶ codegen ──▶ .env.example / env.d.ts
//! ```

pub mod check;
pub mod codegen;
pub mod config;
pub mod envfile;
pub mod error;
pub mod explain;
pub mod gitignore;
pub mod init;
pub mod lint;
pub mod output;
pub mod schema;
pub mod source;
pub mod validate;

pub use check::{check, CheckOptions, CheckStats, IssueKind, ValidationIssue, ValidationResult};
pub use config::{ColorMode, ToolConfig};
pub use envfile::{load_env_files, EnvMap, LoadedEnv};
pub use error::{EnvSchemaError, Result};
pub use explain::{explain, Explanation, UnknownKey};
pub use lint::{LintResult, SchemaLinter};
pub use output::OutputContext;
pub use schema::{KeyDefinition, KeyType, Scalar, Schema};
pub use source::{load_schema, SchemaSource};
pub use validate::{validate_value, InvalidValue};
