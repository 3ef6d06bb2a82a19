//! Configuration module for the esld converter
//!
//! Provides types and parsing for `esld.toml` configuration.

pub mod loader;
pub mod schema;

pub use loader::{find_config, load_config, merge_cli_overrides, CliOverrides, ConfigError};
pub use schema::*;
