//! Configuration for the MAC build-flag injector
//!
//! Parses `.env` files, validates MAC addresses, and loads the loader's own
//! settings from TOML with environment variable overrides.

pub mod config;
pub mod env_file;
pub mod mac;

pub use config::*;
pub use env_file::{load_env_file, parse_env, EnvFileError, EnvMap};
pub use mac::{
    mac_to_byte_array_literal, validate_mac_address, InvalidMacAddress, MacAddress, MAC_OCTETS,
};
