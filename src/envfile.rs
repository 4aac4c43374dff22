//! Env file parsing and overlay merge
//!
//! Files are line-oriented `KEY=VALUE`. Blank lines and `#` comments are
//! skipped, a leading `export ` is allowed, and one layer of matching
//! surrounding quotes is stripped from the value. Nothing else is
//! interpreted: escapes and interior whitespace are kept as written.

use indexmap::IndexMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{EnvSchemaError, Result};

/// Key to raw string value, in first-seen order
pub type EnvMap = IndexMap<String, String>;

/// One physical env file
#[derive(Debug, Clone, PartialEq)]
pub struct EnvFile {
    pub path: PathBuf,
    pub exists: bool,
    /// Raw values as found in this file
    pub content: EnvMap,
}

/// Per-file records plus their overlay
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedEnv {
    pub files: Vec<EnvFile>,
    pub merged: EnvMap,
}

/// Split one line into key and dequoted value. Comments, blank lines and
/// lines without an assignment yield `None`.
pub fn parse_line(line: &str) -> Option<(&str, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let assignment = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, value) = assignment.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some((key, dequote(value.trim()).to_string()))
}

/// Strip one layer of matching single or double quotes
fn dequote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Parse env file text. A key assigned twice keeps its last value.
pub fn parse_str(content: &str) -> EnvMap {
    let mut map = EnvMap::new();
    for (number, line) in content.lines().enumerate() {
        match parse_line(line) {
            Some((key, value)) => {
                map.insert(key.to_string(), value);
            }
            None => {
                let trimmed = line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    tracing::warn!(line = number + 1, "skipping line without a KEY=VALUE assignment");
                }
            }
        }
    }
    map
}

/// Read one env file. A missing file is recorded with `exists = false`;
/// any other I/O failure or non-UTF-8 content is an error.
pub fn read_env_file(path: &Path) -> Result<EnvFile> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "env file not found, skipping");
            return Ok(EnvFile {
                path: path.to_path_buf(),
                exists: false,
                content: EnvMap::new(),
            });
        }
        Err(source) => {
            return Err(EnvSchemaError::FileRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let text = String::from_utf8(bytes).map_err(|e| EnvSchemaError::FileRead {
        path: path.to_path_buf(),
        source: std::io::Error::new(ErrorKind::InvalidData, e),
    })?;

    let content = parse_str(&text);
    tracing::debug!(path = %path.display(), keys = content.len(), "parsed env file");
    Ok(EnvFile {
        path: path.to_path_buf(),
        exists: true,
        content,
    })
}

/// Overlay files left to right: a later file replaces an earlier value key
/// by key, and keys only present earlier survive.
pub fn merge<'a>(files: impl IntoIterator<Item = &'a EnvFile>) -> EnvMap {
    let mut merged = EnvMap::new();
    for file in files {
        for (key, value) in &file.content {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Read every path in order and merge them. The first unreadable file
/// aborts the whole load.
pub fn load_env_files<P: AsRef<Path>>(paths: &[P]) -> Result<LoadedEnv> {
    let files = paths
        .iter()
        .map(|p| read_env_file(p.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let merged = merge(&files);
    Ok(LoadedEnv { files, merged })
}
