//! TOML-based configuration for schemata.
//!
//! Supports a config file (schemata.toml) with environment variable expansion
//! in the connection URL.
//!
//! Example configuration:
//! ```toml
//! schema = "public"
//! queries = "queries.toml"
//!
//! [connection]
//! url = "${DATABASE_URL}"
//! max_connections = 2
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("No database URL configured (set [connection] url or pass --database-url)")]
    MissingConnection,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Schema to inspect.
    pub schema: String,

    /// Path to the query definitions file.
    pub queries: Option<PathBuf>,

    /// Database connection.
    pub connection: ConnectionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema: "public".to_string(),
            queries: None,
            connection: ConnectionSettings::default(),
        }
    }
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Postgres URL (supports ${ENV_VAR} expansion).
    pub url: Option<String>,

    /// Pool size. Inspection is sequential, so this stays small.
    pub max_connections: u32,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 2,
        }
    }
}

impl ConnectionSettings {
    /// Get the URL with environment variables expanded.
    pub fn resolved_url(&self) -> Result<String, SettingsError> {
        let url = self.url.as_deref().ok_or(SettingsError::MissingConnection)?;
        expand_env_vars(url)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML source.
    pub fn from_toml(source: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SCHEMATA_CONFIG`
    /// 2. `./schemata.toml`
    /// 3. `~/.config/schemata/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("SCHEMATA_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("schemata.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("schemata").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.schema.trim().is_empty() {
            return Err(SettingsError::InvalidConfig("schema must not be empty".to_string()));
        }
        if self.connection.max_connections == 0 {
            return Err(SettingsError::InvalidConfig(
                "connection.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut var_name = String::new();
        while let Some(&ch) = chars.peek() {
            if braced && ch == '}' {
                chars.next();
                break;
            }
            if !braced && !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            var_name.push(ch);
            chars.next();
        }

        if var_name.is_empty() && !braced {
            // Lone '$', e.g. inside a password.
            result.push('$');
            continue;
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
