//! `.env` file loading
//!
//! Parses `KEY=VALUE` lines. Blank lines and `#` lines are skipped, and
//! anything after a `#` inside a value is dropped. Quotes are not
//! interpreted, so a quoted `#` still truncates the value.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Parsed key/value pairs from an env file
pub type EnvMap = BTreeMap<String, String>;

/// Error type for env file loading
#[derive(Debug)]
pub enum EnvFileError {
    /// The env file does not exist
    NotFound(PathBuf),
    /// The env file exists but could not be read
    Io(PathBuf, io::Error),
}

impl std::fmt::Display for EnvFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvFileError::NotFound(path) => write!(f, "{} file not found", path.display()),
            EnvFileError::Io(path, e) => write!(f, "Failed to read {}: {}", path.display(), e),
        }
    }
}

impl std::error::Error for EnvFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnvFileError::NotFound(_) => None,
            EnvFileError::Io(_, e) => Some(e),
        }
    }
}

/// Parse env file content into a map
///
/// Later duplicate keys overwrite earlier ones.
pub fn parse_env(content: &str) -> EnvMap {
    let mut vars = EnvMap::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            tracing::debug!(line = index + 1, "Skipping env line without '='");
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            tracing::debug!(line = index + 1, "Skipping env line with empty key");
            continue;
        }

        let value = match value.split_once('#') {
            Some((before, _comment)) => before,
            None => value,
        };

        vars.insert(key.to_string(), value.trim().to_string());
    }

    vars
}

/// Read and parse an env file
///
/// Returns `EnvFileError::NotFound` when the file is absent.
pub fn load_env_file<P: AsRef<Path>>(path: P) -> Result<EnvMap, EnvFileError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => EnvFileError::NotFound(path.to_path_buf()),
        _ => EnvFileError::Io(path.to_path_buf(), e),
    })?;

    let vars = parse_env(&content);
    tracing::debug!(path = %path.display(), keys = vars.len(), "Loaded env file");
    Ok(vars)
}
