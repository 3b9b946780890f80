//! Application settings loaded from a TOML file with environment overrides.
//!
//! The settings file is optional. When it is missing every value falls back to
//! its default, so a fresh checkout runs with nothing but a `.env`.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default settings file location, overridable with `SKINCHECK_CONFIG`.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP server settings
    pub server: ServerSettings,
    /// Allergen catalog seeding settings
    pub catalog: CatalogSettings,
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,
    /// TCP port to bind
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerSettings {
    /// `host:port` string suitable for `TcpListener::bind`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Controls how the built-in allergen catalog is seeded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Insert missing catalog entries on startup
    pub seed_on_startup: bool,
    /// Allergen keys that are seeded as inactive
    pub disabled_keys: Vec<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            seed_on_startup: true,
            disabled_keys: Vec::new(),
        }
    }
}

/// Parses settings from a TOML string.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings: {e}"),
    })
}

/// Loads settings from a TOML file. A missing file yields the defaults.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!("No settings file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {path:?}: {e}"),
    })?;
    parse_settings(&contents)
}

/// Loads settings from `SKINCHECK_CONFIG` (or `config.toml`) and applies the
/// `HOST` / `PORT` environment overrides.
pub fn load_app_settings() -> Result<Settings> {
    let path =
        std::env::var("SKINCHECK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut settings = load_settings(&path)?;

    if let Ok(host) = std::env::var("HOST") {
        settings.server.host = host;
    }
    if let Ok(port) = std::env::var("PORT") {
        settings.server.port = port.parse().map_err(|e| Error::Config {
            message: format!("Invalid PORT value '{port}': {e}"),
        })?;
    }

    Ok(settings)
}
