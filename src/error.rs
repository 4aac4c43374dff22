//! Error types for schema loading and env file I/O

use std::path::PathBuf;

use thiserror::Error;

/// Result type for envschema operations
pub type Result<T> = std::result::Result<T, EnvSchemaError>;

/// Fatal errors. Validation issues are never reported through this type;
/// they are collected into a [`ValidationResult`](crate::ValidationResult).
#[derive(Error, Debug)]
pub enum EnvSchemaError {
    #[error("Failed to load schema {path}: {message}")]
    SchemaLoad { path: String, message: String },

    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnvSchemaError {
    pub(crate) fn schema_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}
