//! Configuration module for schemata.
//!
//! Handles the config file, environment variable expansion and defaults.

mod settings;

pub use settings::{expand_env_vars, ConnectionSettings, Settings, SettingsError};
