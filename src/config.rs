//! Configuration management for envschema
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (envschema.toml)
//! - Environment variables (ENVSCHEMA__*)
//!
//! ## Example config file (envschema.toml):
//! ```toml
//! [paths]
//! schema = "env.schema.json"
//! env_files = [".env", ".env.local"]
//! example = ".env.example"
//! types = "env.d.ts"
//!
//! [check]
//! strict = false
//! fail_on_warnings = false
//! gitignore = true
//!
//! [output]
//! color = "auto"
//! ```
//!
//! Command-line flags override every value loaded here.

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EnvSchemaError, Result};

/// File name searched for in the working directory
pub const CONFIG_FILE_NAME: &str = "envschema.toml";

/// Main configuration for the tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Default file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// `check` behavior
    #[serde(default)]
    pub check: CheckConfig,

    /// Terminal output
    #[serde(default)]
    pub output: OutputConfig,
}

/// Default file locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Schema file
    #[serde(default = "default_schema_path")]
    pub schema: PathBuf,

    /// Env files, later overriding earlier
    #[serde(default = "default_env_files")]
    pub env_files: Vec<PathBuf>,

    /// Generated example file
    #[serde(default = "default_example_path")]
    pub example: PathBuf,

    /// Generated type declarations
    #[serde(default = "default_types_path")]
    pub types: PathBuf,
}

/// `check` behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Undeclared keys are errors
    #[serde(default)]
    pub strict: bool,

    /// Warnings fail the run
    #[serde(default)]
    pub fail_on_warnings: bool,

    /// Warn about env files git would commit
    #[serde(default = "default_true")]
    pub gitignore: bool,
}

/// Terminal output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub color: ColorMode,
}

/// When to emit ANSI colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

// Default value functions
fn default_schema_path() -> PathBuf {
    PathBuf::from("env.schema.json")
}

fn default_env_files() -> Vec<PathBuf> {
    vec![PathBuf::from(".env")]
}

fn default_example_path() -> PathBuf {
    PathBuf::from(".env.example")
}

fn default_types_path() -> PathBuf {
    PathBuf::from("env.d.ts")
}

fn default_true() -> bool {
    true
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            schema: default_schema_path(),
            env_files: default_env_files(),
            example: default_example_path(),
            types: default_types_path(),
        }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            strict: false,
            fail_on_warnings: false,
            gitignore: true,
        }
    }
}

impl ToolConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding an explicit file that must exist
    pub fn load_from(config_path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["envschema.toml", ".envschema.toml", "config/envschema.toml"];
        for location in config_locations {
            builder = builder.add_source(File::from(Path::new(location)).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "envschema", "envschema") {
            let xdg_config = config_dir.config_dir().join(CONFIG_FILE_NAME);
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("ENVSCHEMA")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let loaded: Self = config.try_deserialize()?;
        tracing::debug!(schema = %loaded.paths.schema.display(), "configuration loaded");
        Ok(loaded)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| EnvSchemaError::FileWrite {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        std::fs::write(path, content).map_err(|source| EnvSchemaError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}
