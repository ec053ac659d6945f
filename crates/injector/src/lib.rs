//! MAC build-flag injector
//!
//! Reads device MAC addresses from an env file, validates them, and emits
//! them as preprocessor build flags for the firmware build.

pub mod flags;
pub mod loader;
pub mod report;
pub mod sink;
pub mod validate;

pub use flags::{derive_flags, render_flags, BuildFlag};
pub use loader::{load_devices, run, LoadError, LoadSummary};
pub use mac_env_config as config;
pub use mac_env_config::{FlagFormat, LoaderConfig, MacAddress, DEFAULT_SETTINGS_FILE};
pub use report::render_template;
pub use sink::{open_sink, BuildFlagSink, FileSink, SinkError, WriterSink};
pub use validate::{validate_required, DeviceMac, InvalidEntry, ValidationReport};
