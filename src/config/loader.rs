//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from various
//! sources with proper error handling and validation.

use crate::{Result, config::Settings};
use std::path::Path;
use tracing::{debug, info, warn};

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Default settings
    defaults: Settings,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
        }
    }

    /// Get the config file path from `CLAILA_RELAY_CONFIG` or the default location
    ///
    /// Priority:
    /// 1. CLAILA_RELAY_CONFIG environment variable
    /// 2. ~/.config/claila-relay/config.toml (or platform equivalent)
    pub fn get_config_path() -> Option<std::path::PathBuf> {
        if let Ok(config_path) = std::env::var("CLAILA_RELAY_CONFIG") {
            let path = std::path::PathBuf::from(config_path);
            if path.exists() {
                debug!("Using config file from CLAILA_RELAY_CONFIG: {:?}", path);
                return Some(path);
            } else {
                warn!("CLAILA_RELAY_CONFIG points to non-existent file: {:?}", path);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let default_path = config_dir.join("claila-relay").join("config.toml");
            if default_path.exists() {
                debug!("Using default config file: {:?}", default_path);
                return Some(default_path);
            }
        }

        debug!("No config file found");
        None
    }

    /// Load configuration with precedence order:
    /// 1. Command line arguments (highest priority, applied by the caller)
    /// 2. Environment variables
    /// 3. Configuration file
    /// 4. Default values (lowest priority)
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from file: {:?}", path);
                settings = Settings::from_file(path)?;
            } else {
                warn!("Configuration file not found: {:?}, using defaults", path);
            }
        }

        debug!("Applying environment variable overrides");
        settings = settings.merge_with_env()?;

        settings.validate()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:?}", settings);

        Ok(settings)
    }

    /// Load configuration from environment only
    pub fn from_env_only(&self) -> Result<Settings> {
        let settings = Settings::from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Get default configuration
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Environment variable tests share the process environment
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_load_defaults() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();

        let loader = ConfigLoader::new();
        let defaults = loader.defaults();
        assert_eq!(defaults.server.port, 5000);
        assert_eq!(defaults.pool.max_sessions, 10);
    }

    #[test]
    fn test_load_from_file() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();

        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "0.0.0.0"
port = 8080

[pool]
max_sessions = 4
        "#
        )
        .unwrap();

        let loader = ConfigLoader::new();
        let settings = loader.load(Some(temp_file.path())).unwrap();

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.pool.max_sessions, 4);
    }

    #[test]
    fn test_env_var_override() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();

        let original_port = std::env::var("CLAILA_RELAY_PORT").ok();
        let original_sessions = std::env::var("CLAILA_RELAY_MAX_SESSIONS").ok();

        unsafe {
            std::env::set_var("CLAILA_RELAY_PORT", "9000");
            std::env::set_var("CLAILA_RELAY_MAX_SESSIONS", "2");
        }

        let loader = ConfigLoader::new();
        let settings = loader.from_env_only().unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.pool.max_sessions, 2);

        unsafe {
            std::env::remove_var("CLAILA_RELAY_PORT");
            std::env::remove_var("CLAILA_RELAY_MAX_SESSIONS");

            if let Some(port) = original_port {
                std::env::set_var("CLAILA_RELAY_PORT", port);
            }
            if let Some(sessions) = original_sessions {
                std::env::set_var("CLAILA_RELAY_MAX_SESSIONS", sessions);
            }
        }
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();

        let loader = ConfigLoader::new();
        let settings = loader
            .load(Some(Path::new("/nonexistent/claila-relay.toml")))
            .unwrap();
        assert_eq!(settings.server.port, 5000);
    }
}
