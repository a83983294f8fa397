//! Configuration file loading and environment variable handling.
//!
//! Precedence: CLI args > Environment vars > Config file > Defaults

use macvendor_core::registry::{DEFAULT_TIMEOUT, DEFAULT_URL};
use macvendor_core::RegistryConfig;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Default config file content for `--config-init`.
pub const DEFAULT_CONFIG: &str = r#"# macvendor configuration
# See: macvendor --help for all options

# Local copy of the IEEE OUI registry (default: ~/.oui.txt)
# registry_path = "/var/cache/macvendor/oui.txt"

# Where the registry is downloaded from
registry_url = "http://standards-oui.ieee.org/oui.txt"

# Network timeout in seconds
timeout = 5

# Disable colored output
no_color = false
"#;

pub const ENV_REGISTRY: &str = "MACVENDOR_REGISTRY";
pub const ENV_URL: &str = "MACVENDOR_URL";
pub const ENV_TIMEOUT: &str = "MACVENDOR_TIMEOUT";
pub const ENV_NO_COLOR: &str = "MACVENDOR_NO_COLOR";

/// Configuration loaded from file and environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub registry_path: Option<PathBuf>,
    pub registry_url: Option<String>,
    pub timeout: Option<u64>,
    pub no_color: Option<bool>,
}

impl Config {
    /// Get the config file path.
    ///
    /// - Linux: `~/.config/macvendor/config.toml`
    /// - macOS: `~/Library/Application Support/macvendor/config.toml`
    /// - Windows: `%APPDATA%\macvendor\config.toml`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("macvendor").join("config.toml"))
    }

    /// Load config from file. Returns default if file doesn't exist.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };

        let Ok(contents) = fs::read_to_string(&path) else {
            return Self::default();
        };

        toml::from_str(&contents).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Read value from environment variable. Empty values count as unset.
    pub fn env_var<T: std::str::FromStr>(name: &str) -> Option<T> {
        std::env::var(name)
            .ok()
            .filter(|v| !v.is_empty())?
            .parse()
            .ok()
    }

    /// Get registry_path with precedence: env > config > default.
    pub fn registry_path(&self) -> PathBuf {
        Self::env_var(ENV_REGISTRY)
            .or_else(|| self.registry_path.clone())
            .unwrap_or_else(|| RegistryConfig::default().path)
    }

    /// Get registry_url with precedence: env > config > default.
    pub fn registry_url(&self) -> String {
        Self::env_var(ENV_URL)
            .or_else(|| self.registry_url.clone())
            .unwrap_or_else(|| DEFAULT_URL.to_string())
    }

    /// Get timeout (seconds) with precedence: env > config > default.
    pub fn timeout(&self) -> u64 {
        Self::env_var(ENV_TIMEOUT)
            .or(self.timeout)
            .unwrap_or(DEFAULT_TIMEOUT.as_secs())
    }

    /// Get no_color with precedence: env > config > default.
    ///
    /// Respects the `NO_COLOR` standard (https://no-color.org/).
    pub fn no_color(&self) -> bool {
        if std::env::var("NO_COLOR").is_ok() {
            return true;
        }
        if std::env::var(ENV_NO_COLOR).is_ok() {
            return true;
        }
        self.no_color.unwrap_or(false)
    }
}

/// Create a default config file at the standard location.
pub fn init_config() -> Result<PathBuf, String> {
    let path = Config::path().ok_or("Cannot determine config directory")?;

    if path.exists() {
        return Err(format!("Config file already exists: {}", path.display()));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create directory: {}", e))?;
    }

    fs::write(&path, DEFAULT_CONFIG).map_err(|e| format!("Failed to write config: {}", e))?;

    Ok(path)
}
