//! Env file loading, validation and flag emission
//!
//! [`run`] is the single entry point: it either emits every flag once or
//! returns an error without touching the sink.

use crate::config::{load_env_file, ConfigError, EnvFileError, LoaderConfig};
use crate::flags::{derive_flags, BuildFlag};
use crate::sink::{BuildFlagSink, SinkError};
use crate::validate::{validate_required, DeviceMac, ValidationReport};
use std::path::PathBuf;
use thiserror::Error;

/// Error type for a loader run
#[derive(Debug, Error)]
pub enum LoadError {
    /// The env file does not exist
    #[error("{} file not found", .path.display())]
    ConfigMissing {
        path: PathBuf,
        template: PathBuf,
        required_keys: Vec<String>,
    },

    /// Required keys are missing or hold malformed MAC addresses
    #[error("Invalid {} configuration: {report}", .path.display())]
    ConfigInvalid {
        path: PathBuf,
        report: ValidationReport,
    },

    /// The env file exists but could not be read
    #[error(transparent)]
    Io(EnvFileError),

    /// The required key list cannot produce a distinct set of flags
    #[error(transparent)]
    Settings(#[from] ConfigError),

    /// The sink rejected the flags
    #[error("Failed to emit build flags: {0}")]
    Sink(#[from] SinkError),
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub env_path: PathBuf,
    pub devices: Vec<DeviceMac>,
    pub flags: Vec<BuildFlag>,
}

/// Load the env file and validate every required key
///
/// Does not emit anything; [`run`] builds on this.
pub fn load_devices(config: &LoaderConfig) -> Result<Vec<DeviceMac>, LoadError> {
    config.devices.check()?;

    let vars = load_env_file(&config.env.path).map_err(|e| match e {
        EnvFileError::NotFound(path) => LoadError::ConfigMissing {
            path,
            template: config.env.template.clone(),
            required_keys: config.devices.required_keys.clone(),
        },
        other => LoadError::Io(other),
    })?;

    validate_required(&vars, &config.devices.required_keys).map_err(|report| {
        LoadError::ConfigInvalid {
            path: config.env.path.clone(),
            report,
        }
    })
}

/// Load, validate and emit build flags to `sink`
pub fn run(config: &LoaderConfig, sink: &mut dyn BuildFlagSink) -> Result<LoadSummary, LoadError> {
    let devices = load_devices(config)?;
    let flags = derive_flags(&devices);

    sink.append_build_flags(&flags)?;
    for flag in &flags {
        tracing::info!(flag = %flag, "Emitted build flag");
    }

    Ok(LoadSummary {
        env_path: config.env.path.clone(),
        devices,
        flags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir) -> LoaderConfig {
        let mut config = LoaderConfig::default();
        config.env.path = dir.path().join(".env");
        config.env.template = dir.path().join(".env.template");
        config
    }

    struct FailingSink;

    impl BuildFlagSink for FailingSink {
        fn append_build_flags(&mut self, _flags: &[BuildFlag]) -> Result<(), SinkError> {
            Err(SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "closed",
            )))
        }
    }

    #[test]
    fn test_run_emits_four_flags() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(&temp_dir);
        fs::write(
            &config.env.path,
            "# Device MAC addresses\n\
             HANDHELD_MAC_ADDRESS=30:ED:A0:A8:B5:70  # handheld\n\
             BASE_STATION_MAC_ADDRESS=24:6F:28:01:02:03\n",
        )
        .unwrap();

        let mut sink: Vec<BuildFlag> = Vec::new();
        let summary = run(&config, &mut sink).unwrap();

        let names: Vec<&str> = sink.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "HANDHELD_MAC_STRING",
                "BASE_STATION_MAC_STRING",
                "HANDHELD_MAC_ARRAY",
                "BASE_STATION_MAC_ARRAY",
            ]
        );
        assert_eq!(sink[0].value, "\"30:ED:A0:A8:B5:70\"");
        assert_eq!(sink[2].value, "{0x30, 0xED, 0xA0, 0xA8, 0xB5, 0x70}");
        assert_eq!(summary.flags, sink);
        assert_eq!(summary.devices.len(), 2);
    }

    #[test]
    fn test_missing_env_file_emits_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(&temp_dir);

        let mut sink: Vec<BuildFlag> = Vec::new();
        let err = run(&config, &mut sink).unwrap_err();

        match err {
            LoadError::ConfigMissing {
                path,
                template,
                required_keys,
            } => {
                assert_eq!(path, config.env.path);
                assert_eq!(template, config.env.template);
                assert_eq!(required_keys, config.devices.required_keys);
            }
            other => panic!("expected ConfigMissing, got {:?}", other),
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_invalid_and_missing_reported_together() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(&temp_dir);
        fs::write(&config.env.path, "HANDHELD_MAC_ADDRESS=30-ED-A0-A8-B5-70\n").unwrap();

        let mut sink: Vec<BuildFlag> = Vec::new();
        let err = run(&config, &mut sink).unwrap_err();

        match err {
            LoadError::ConfigInvalid { report, .. } => {
                assert_eq!(report.missing, vec!["BASE_STATION_MAC_ADDRESS"]);
                assert_eq!(report.invalid.len(), 1);
                assert_eq!(report.invalid[0].key, "HANDHELD_MAC_ADDRESS");
                assert_eq!(report.invalid[0].value, "30-ED-A0-A8-B5-70");
            }
            other => panic!("expected ConfigInvalid, got {:?}", other),
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_custom_required_keys() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_for(&temp_dir);
        config.devices.required_keys = vec!["DRONE_MAC_ADDRESS".to_string()];
        fs::write(&config.env.path, "DRONE_MAC_ADDRESS=aa:bb:cc:dd:ee:ff\n").unwrap();

        let mut sink: Vec<BuildFlag> = Vec::new();
        run(&config, &mut sink).unwrap();

        assert_eq!(
            sink,
            vec![
                BuildFlag::new("DRONE_MAC_STRING", "\"aa:bb:cc:dd:ee:ff\""),
                BuildFlag::new("DRONE_MAC_ARRAY", "{0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF}"),
            ]
        );
    }

    #[test]
    fn test_sink_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(&temp_dir);
        fs::write(
            &config.env.path,
            "HANDHELD_MAC_ADDRESS=30:ED:A0:A8:B5:70\nBASE_STATION_MAC_ADDRESS=24:6F:28:01:02:03\n",
        )
        .unwrap();

        let err = run(&config, &mut FailingSink).unwrap_err();
        assert!(matches!(err, LoadError::Sink(SinkError::Io(_))));
    }

    #[test]
    fn test_unreadable_env_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_for(&temp_dir);
        config.env.path = temp_dir.path().to_path_buf();

        let err = load_devices(&config).unwrap_err();
        assert!(matches!(err, LoadError::Io(EnvFileError::Io(_, _))));

        let source = std::error::Error::source(&err).expect("io error should be chained");
        assert!(source.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_empty_required_keys_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_for(&temp_dir);
        config.devices.required_keys.clear();
        fs::write(&config.env.path, "HANDHELD_MAC_ADDRESS=30:ED:A0:A8:B5:70\n").unwrap();

        let mut sink: Vec<BuildFlag> = Vec::new();
        let err = run(&config, &mut sink).unwrap_err();

        assert!(matches!(err, LoadError::Settings(ConfigError::Invalid(_))));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_colliding_flag_names_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_for(&temp_dir);
        config.devices.required_keys =
            vec!["HANDHELD_MAC_ADDRESS".to_string(), "HANDHELD".to_string()];
        fs::write(
            &config.env.path,
            "HANDHELD_MAC_ADDRESS=30:ED:A0:A8:B5:70\nHANDHELD=11:22:33:44:55:66\n",
        )
        .unwrap();

        let mut sink: Vec<BuildFlag> = Vec::new();
        let err = run(&config, &mut sink).unwrap_err();

        assert!(matches!(err, LoadError::Settings(_)));
        assert!(err.to_string().contains("HANDHELD"));
        assert!(sink.is_empty());
    }
}
