//! MAC address parsing and C initializer rendering
//!
//! Only the colon-separated form `XX:XX:XX:XX:XX:XX` is accepted. Dashes,
//! dots and bare hex strings are rejected.

use std::fmt;
use std::str::FromStr;

/// Number of octets in a MAC address
pub const MAC_OCTETS: usize = 6;

/// Error returned when a string is not a colon-separated MAC address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMacAddress(pub String);

impl fmt::Display for InvalidMacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid MAC address '{}': expected XX:XX:XX:XX:XX:XX",
            self.0
        )
    }
}

impl std::error::Error for InvalidMacAddress {}

/// A validated 6-octet hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; MAC_OCTETS]);

impl MacAddress {
    pub fn new(octets: [u8; MAC_OCTETS]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; MAC_OCTETS] {
        self.0
    }

    /// Render as a C array initializer, e.g. `{0x30, 0xED, 0xA0, 0xA8, 0xB5, 0x70}`
    pub fn to_array_literal(&self) -> String {
        let bytes: Vec<String> = self.0.iter().map(|b| format!("0x{:02X}", b)).collect();
        format!("{{{}}}", bytes.join(", "))
    }
}

impl FromStr for MacAddress {
    type Err = InvalidMacAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMacAddress(s.to_string());

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != MAC_OCTETS {
            return Err(invalid());
        }

        let mut octets = [0u8; MAC_OCTETS];
        for (slot, part) in octets.iter_mut().zip(&parts) {
            // from_str_radix alone would accept a leading '+'
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }

        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl From<[u8; MAC_OCTETS]> for MacAddress {
    fn from(octets: [u8; MAC_OCTETS]) -> Self {
        Self(octets)
    }
}

/// Check whether `value` is a colon-separated MAC address
pub fn validate_mac_address(value: &str) -> bool {
    value.parse::<MacAddress>().is_ok()
}

/// Convert a MAC address string into its C array initializer
///
/// Returns `None` when `value` does not validate.
pub fn mac_to_byte_array_literal(value: &str) -> Option<String> {
    value
        .parse::<MacAddress>()
        .ok()
        .map(|mac| mac.to_array_literal())
}
