//! Operator-facing console text

use crate::loader::{LoadError, LoadSummary};
use std::path::Path;

const RULE_WIDTH: usize = 60;
const EXAMPLE_MAC: &str = "30:ED:A0:A8:B5:70";
const MAC_PLACEHOLDER: &str = "XX:XX:XX:XX:XX:XX";

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl LoadError {
    /// Multi-line diagnostic with remediation steps
    pub fn diagnostic(&self) -> String {
        match self {
            LoadError::ConfigMissing {
                path,
                template,
                required_keys,
            } => missing_file_diagnostic(path, template, required_keys),
            LoadError::ConfigInvalid { path, report } => {
                let mut out = format!(
                    "\n{}\nERROR: Invalid {} configuration!\n{}\n",
                    rule(),
                    file_name(path),
                    rule()
                );
                if !report.missing.is_empty() {
                    out.push_str("\nMissing MAC addresses:\n");
                    for key in &report.missing {
                        out.push_str(&format!("  - {}\n", key));
                    }
                }
                if !report.invalid.is_empty() {
                    out.push_str("\nInvalid MAC address format:\n");
                    for entry in &report.invalid {
                        out.push_str(&format!("  - {}={}\n", entry.key, entry.value));
                    }
                }
                out.push_str(&format!(
                    "\nMAC addresses must be in format: {}\nExample: {}\n{}\n",
                    MAC_PLACEHOLDER,
                    EXAMPLE_MAC,
                    rule()
                ));
                out
            }
            other => format!("ERROR: {}", other),
        }
    }
}

fn missing_file_diagnostic(path: &Path, template: &Path, required_keys: &[String]) -> String {
    let env_name = file_name(path);
    let mut out = format!(
        "\n{rule}\nERROR: {env} file not found!\n{rule}\n\n\
         Please create a {env} file with your MAC addresses.\n\
         You can copy {template_name} as a starting point:\n\n  \
         cp {template} {path}\n\n\
         Then edit {env} and add your device MAC addresses:\n",
        rule = rule(),
        env = env_name,
        template_name = file_name(template),
        template = template.display(),
        path = path.display(),
    );
    for key in required_keys {
        out.push_str(&format!("  {}={}\n", key, MAC_PLACEHOLDER));
    }
    out.push_str(&format!(
        "\nTo find your ESP32 MAC addresses, upload a test sketch\n\
         that prints WiFi.macAddress()\n{}\n",
        rule()
    ));
    out
}

impl LoadSummary {
    /// Confirmation listing each loaded address
    pub fn confirmation(&self) -> String {
        let labels: Vec<String> = self
            .devices
            .iter()
            .map(|d| format!("{}:", d.label()))
            .collect();
        let width = labels.iter().map(String::len).max().unwrap_or(0) + 1;

        let mut out = format!(
            "\n\u{2713} Loaded MAC addresses from {}:\n",
            file_name(&self.env_path)
        );
        for (label, device) in labels.iter().zip(&self.devices) {
            out.push_str(&format!("  {:<width$}{}\n", label, device.raw, width = width));
        }
        out
    }
}

/// Body of an env template listing the required keys
pub fn render_template(required_keys: &[String]) -> String {
    let mut out = String::from(
        "# Device MAC addresses, one per line as XX:XX:XX:XX:XX:XX\n\
         # Copy this file to .env and fill in your own addresses.\n\
         # To find an ESP32 MAC address, flash a sketch that prints WiFi.macAddress()\n\n",
    );
    for key in required_keys {
        out.push_str(&format!("{}={}\n", key, MAC_PLACEHOLDER));
    }
    out
}
