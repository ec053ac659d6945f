//! Required-key validation
//!
//! Every required key is checked before anything is reported, so the
//! operator sees all problems at once.

use crate::config::{flag_prefix, EnvMap, MacAddress};
use serde::Serialize;
use std::fmt;

/// A required key whose value passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMac {
    /// Env key, e.g. `HANDHELD_MAC_ADDRESS`
    pub key: String,
    /// Value exactly as written in the env file
    pub raw: String,
    pub mac: MacAddress,
}

impl DeviceMac {
    /// Flag name prefix, e.g. `HANDHELD` for `HANDHELD_MAC_ADDRESS`
    pub fn flag_prefix(&self) -> &str {
        flag_prefix(&self.key)
    }

    /// Human label, e.g. `Base Station` for `BASE_STATION_MAC_ADDRESS`
    pub fn label(&self) -> String {
        self.flag_prefix()
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let lower = word.to_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

/// A present value that is not a MAC address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidEntry {
    pub key: String,
    pub value: String,
}

/// Every problem found among the required keys
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    /// Keys absent from the env file or set to an empty value
    pub missing: Vec<String>,
    pub invalid: Vec<InvalidEntry>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing {}", self.missing.join(", ")));
        }
        if !self.invalid.is_empty() {
            let invalid: Vec<String> = self
                .invalid
                .iter()
                .map(|e| format!("{}={}", e.key, e.value))
                .collect();
            parts.push(format!("invalid {}", invalid.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Validate the required keys of an env map
///
/// Returns the parsed devices in key order, or a report listing every
/// missing and invalid key.
pub fn validate_required(
    vars: &EnvMap,
    required_keys: &[String],
) -> Result<Vec<DeviceMac>, ValidationReport> {
    let mut report = ValidationReport::default();
    let mut devices = Vec::with_capacity(required_keys.len());

    for key in required_keys {
        let value = match vars.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => {
                report.missing.push(key.clone());
                continue;
            }
        };

        match value.parse::<MacAddress>() {
            Ok(mac) => devices.push(DeviceMac {
                key: key.clone(),
                raw: value.clone(),
                mac,
            }),
            Err(_) => report.invalid.push(InvalidEntry {
                key: key.clone(),
                value: value.clone(),
            }),
        }
    }

    if report.is_empty() {
        Ok(devices)
    } else {
        tracing::debug!(
            missing = report.missing.len(),
            invalid = report.invalid.len(),
            "Required key validation failed"
        );
        Err(report)
    }
}
