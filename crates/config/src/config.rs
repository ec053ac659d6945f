//! Loader settings and their loading logic

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default settings file looked up by the CLI
pub const DEFAULT_SETTINGS_FILE: &str = "load-env.toml";

/// Error type for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    Io(std::io::Error),
    /// TOML parsing error
    Parse(toml::de::Error),
    /// Semantically invalid settings
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// How build flags are written to the output
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlagFormat {
    /// `-D` flags escaped for PlatformIO's `build_flags`
    #[default]
    Platformio,
    /// `NAME=VALUE` lines
    Plain,
    /// A single JSON object of name to value
    Json,
}

impl FromStr for FlagFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "platformio" | "pio" => Ok(FlagFormat::Platformio),
            "plain" => Ok(FlagFormat::Plain),
            "json" => Ok(FlagFormat::Json),
            other => Err(format!(
                "unknown flag format '{}' (expected platformio, plain or json)",
                other
            )),
        }
    }
}

impl fmt::Display for FlagFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlagFormat::Platformio => "platformio",
            FlagFormat::Plain => "plain",
            FlagFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Env file location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvConfig {
    /// Env file holding the MAC addresses (default `.env`)
    #[serde(default = "default_env_path")]
    pub path: PathBuf,
    /// Template suggested in remediation messages; never read
    #[serde(default = "default_template_path")]
    pub template: PathBuf,
}

fn default_env_path() -> PathBuf {
    PathBuf::from(".env")
}

fn default_template_path() -> PathBuf {
    PathBuf::from(".env.template")
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            path: default_env_path(),
            template: default_template_path(),
        }
    }
}

/// Keys that must hold a valid MAC address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DevicesConfig {
    #[serde(default = "default_required_keys")]
    pub required_keys: Vec<String>,
}

fn default_required_keys() -> Vec<String> {
    vec![
        "HANDHELD_MAC_ADDRESS".to_string(),
        "BASE_STATION_MAC_ADDRESS".to_string(),
    ]
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            required_keys: default_required_keys(),
        }
    }
}

/// Suffix stripped from a required key to derive its flag prefix
const MAC_KEY_SUFFIX: &str = "_MAC_ADDRESS";

/// Flag name prefix for a required key, e.g. `HANDHELD` for `HANDHELD_MAC_ADDRESS`
pub fn flag_prefix(key: &str) -> &str {
    key.strip_suffix(MAC_KEY_SUFFIX).unwrap_or(key)
}

impl DevicesConfig {
    /// Check that the keys are non-empty and map to distinct flag names
    pub fn check(&self) -> Result<(), ConfigError> {
        check_required_keys(&self.required_keys)
    }
}

fn check_required_keys(keys: &[String]) -> Result<(), ConfigError> {
    if keys.is_empty() {
        return Err(ConfigError::Invalid(
            "devices.required_keys must name at least one key".to_string(),
        ));
    }

    let mut seen: Vec<&str> = Vec::with_capacity(keys.len());
    for key in keys {
        if key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "devices.required_keys contains an empty key".to_string(),
            ));
        }
        let prefix = flag_prefix(key);
        if seen.contains(&prefix) {
            return Err(ConfigError::Invalid(format!(
                "required key '{}' duplicates flag prefix '{}'",
                key, prefix
            )));
        }
        seen.push(prefix);
    }

    Ok(())
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: FlagFormat,
    /// Write flags to this file instead of stdout
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LoaderConfig {
    #[serde(default)]
    pub env: EnvConfig,
    #[serde(default)]
    pub devices: DevicesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl LoaderConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: LoaderConfig = toml::from_str(content)?;
        config.devices.check()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Overrides the following values if environment variables are set:
    /// - LOAD_ENV_FILE -> env.path
    /// - LOAD_ENV_TEMPLATE -> env.template
    /// - LOAD_ENV_REQUIRED_KEYS -> devices.required_keys (comma-separated)
    /// - LOAD_ENV_FORMAT -> output.format
    /// - LOAD_ENV_OUTPUT -> output.path
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("LOAD_ENV_FILE") {
            if !val.is_empty() {
                self.env.path = PathBuf::from(val);
            }
        }

        if let Ok(val) = env::var("LOAD_ENV_TEMPLATE") {
            if !val.is_empty() {
                self.env.template = PathBuf::from(val);
            }
        }

        if let Ok(val) = env::var("LOAD_ENV_REQUIRED_KEYS") {
            let keys: Vec<String> = val
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
            match check_required_keys(&keys) {
                Ok(()) => self.devices.required_keys = keys,
                Err(e) => tracing::warn!("Ignoring LOAD_ENV_REQUIRED_KEYS: {}", e),
            }
        }

        if let Ok(val) = env::var("LOAD_ENV_FORMAT") {
            match val.parse::<FlagFormat>() {
                Ok(format) => self.output.format = format,
                Err(e) => tracing::warn!("Ignoring LOAD_ENV_FORMAT: {}", e),
            }
        }

        if let Ok(val) = env::var("LOAD_ENV_OUTPUT") {
            if !val.is_empty() {
                self.output.path = Some(PathBuf::from(val));
            }
        }
    }

    /// Load configuration from file and apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Like [`LoaderConfig::load`], but an absent file yields the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }
}
