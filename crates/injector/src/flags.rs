//! Build flag derivation and rendering

use crate::config::FlagFormat;
use crate::validate::DeviceMac;
use serde::Serialize;
use std::fmt;

/// A preprocessor definition, `NAME=VALUE`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFlag {
    pub name: String,
    /// C-level value, e.g. `"30:ED:A0:A8:B5:70"` or `{0x30, ...}`
    pub value: String,
}

impl BuildFlag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Render as a single PlatformIO `build_flags` entry
    ///
    /// Inner quotes are backslash-escaped. Definitions containing spaces are
    /// wrapped in double quotes so they survive argument splitting.
    pub fn to_platformio(&self) -> String {
        let definition = format!("{}={}", self.name, self.value.replace('"', "\\\""));
        if definition.contains(' ') {
            format!("-D \"{}\"", definition)
        } else {
            format!("-D {}", definition)
        }
    }
}

impl fmt::Display for BuildFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Derive the build flags for validated devices
///
/// All `*_MAC_STRING` flags come first, then all `*_MAC_ARRAY` flags, each
/// group in device order.
pub fn derive_flags(devices: &[DeviceMac]) -> Vec<BuildFlag> {
    let strings = devices.iter().map(|d| {
        BuildFlag::new(
            format!("{}_MAC_STRING", d.flag_prefix()),
            format!("\"{}\"", d.raw),
        )
    });
    let arrays = devices.iter().map(|d| {
        BuildFlag::new(
            format!("{}_MAC_ARRAY", d.flag_prefix()),
            d.mac.to_array_literal(),
        )
    });
    strings.chain(arrays).collect()
}

/// Render flags in the requested format
///
/// Line formats end with a trailing newline.
pub fn render_flags(flags: &[BuildFlag], format: FlagFormat) -> Result<String, serde_json::Error> {
    let rendered = match format {
        FlagFormat::Platformio => lines(flags.iter().map(BuildFlag::to_platformio)),
        FlagFormat::Plain => lines(flags.iter().map(BuildFlag::to_string)),
        FlagFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = flags
                .iter()
                .map(|f| (f.name.clone(), serde_json::Value::String(f.value.clone())))
                .collect();
            let mut json = serde_json::to_string_pretty(&map)?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}

fn lines(items: impl Iterator<Item = String>) -> String {
    items.map(|line| line + "\n").collect()
}
