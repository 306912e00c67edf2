//! Configuration management
//!
//! Settings for the HTTP listener, the upstream endpoints, the session
//! pool, and logging, loadable from a TOML file with environment
//! variable overrides.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// Helper functions for serde defaults
fn default_host() -> String {
    "::".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_true() -> bool {
    true
}

fn default_token_url() -> String {
    "https://app.claila.com/api/v2/getcsrftoken".to_string()
}

fn default_chat_url() -> String {
    "https://app.claila.com/api/v2/unichat4".to_string()
}

fn default_model() -> String {
    "gpt-5-mini".to_string()
}

fn default_reply_language() -> String {
    "ENGLISH".to_string()
}

fn default_token_timeout() -> u64 {
    10
}

fn default_chat_timeout() -> u64 {
    30
}

fn default_max_sessions() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

// Duration serialization module
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Main configuration settings for the relay
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerSettings,
    /// Upstream endpoint configuration
    #[serde(default)]
    pub upstream: UpstreamSettings,
    /// Session pool configuration
    #[serde(default)]
    pub pool: PoolSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout duration
    #[serde(with = "duration_secs", default = "default_timeout")]
    pub timeout: Duration,
    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

/// Upstream endpoint and payload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    /// Token endpoint URL (GET, body is the token)
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Chat endpoint URL (POST, form-encoded)
    #[serde(default = "default_chat_url")]
    pub chat_url: String,
    /// Model identifier attached to every chat payload
    #[serde(default = "default_model")]
    pub model: String,
    /// Reply language pinned in the wrapped instruction
    #[serde(default = "default_reply_language")]
    pub reply_language: String,
    /// Token fetch timeout in seconds
    #[serde(default = "default_token_timeout")]
    pub token_timeout_secs: u64,
    /// Chat call timeout in seconds
    #[serde(default = "default_chat_timeout")]
    pub chat_timeout_secs: u64,
}

/// Session pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Maximum number of concurrent upstream sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout: default_timeout(),
            enable_cors: default_true(),
        }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            chat_url: default_chat_url(),
            model: default_model(),
            reply_language: default_reply_language(),
            token_timeout_secs: default_token_timeout(),
            chat_timeout_secs: default_chat_timeout(),
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
        }
    }
}

impl UpstreamSettings {
    /// Scheme+authority of the chat endpoint, used for identity material
    /// (origin/referer headers)
    pub fn origin(&self) -> String {
        match url::Url::parse(&self.chat_url) {
            Ok(parsed) => parsed.origin().ascii_serialization(),
            // Validation rejects unparseable URLs before this is reached
            Err(_) => self.chat_url.clone(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from environment variables only
    pub fn from_env() -> crate::Result<Self> {
        Settings::default().merge_with_env()
    }

    /// Apply environment variable overrides on top of current values
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Ok(host) = std::env::var("CLAILA_RELAY_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("CLAILA_RELAY_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| crate::Error::config("server.port", "CLAILA_RELAY_PORT is not a valid port"))?;
        }
        if let Ok(token_url) = std::env::var("CLAILA_RELAY_TOKEN_URL") {
            self.upstream.token_url = token_url;
        }
        if let Ok(chat_url) = std::env::var("CLAILA_RELAY_CHAT_URL") {
            self.upstream.chat_url = chat_url;
        }
        if let Ok(model) = std::env::var("CLAILA_RELAY_MODEL") {
            self.upstream.model = model;
        }
        if let Ok(max_sessions) = std::env::var("CLAILA_RELAY_MAX_SESSIONS") {
            self.pool.max_sessions = max_sessions.parse().map_err(|_| {
                crate::Error::config("pool.max_sessions", "CLAILA_RELAY_MAX_SESSIONS is not a number")
            })?;
        }
        if let Ok(level) = std::env::var("CLAILA_RELAY_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(self)
    }

    /// Validate the final configuration
    pub fn validate(&self) -> crate::Result<()> {
        url::Url::parse(&self.upstream.token_url)
            .map_err(|e| crate::Error::config("upstream.token_url", &format!("invalid URL: {}", e)))?;
        url::Url::parse(&self.upstream.chat_url)
            .map_err(|e| crate::Error::config("upstream.chat_url", &format!("invalid URL: {}", e)))?;

        if self.pool.max_sessions == 0 {
            return Err(crate::Error::config(
                "pool.max_sessions",
                "must be at least 1",
            ));
        }
        if self.upstream.token_timeout_secs == 0 || self.upstream.chat_timeout_secs == 0 {
            return Err(crate::Error::config(
                "upstream",
                "timeouts must be non-zero",
            ));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(crate::Error::config(
                    "logging.level",
                    &format!("unknown log level: {}", other),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.pool.max_sessions, 10);
        assert_eq!(settings.upstream.model, "gpt-5-mini");
        assert_eq!(settings.upstream.token_timeout_secs, 10);
        assert_eq!(settings.upstream.chat_timeout_secs, 30);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_origin_derivation() {
        let upstream = UpstreamSettings::default();
        assert_eq!(upstream.origin(), "https://app.claila.com");

        let custom = UpstreamSettings {
            chat_url: "http://127.0.0.1:8080/api/v2/unichat4".to_string(),
            ..Default::default()
        };
        assert_eq!(custom.origin(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let settings = Settings {
            upstream: UpstreamSettings {
                token_url: "not a url".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_pool() {
        let settings = Settings {
            pool: PoolSettings { max_sessions: 0 },
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let settings = Settings {
            logging: LoggingSettings {
                level: "loud".to_string(),
                verbose: false,
            },
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip_partial_file() {
        let parsed: Settings = toml::from_str(
            r#"
[server]
port = 9000

[pool]
max_sessions = 3
"#,
        )
        .unwrap();
        assert_eq!(parsed.server.port, 9000);
        assert_eq!(parsed.pool.max_sessions, 3);
        // Unspecified sections keep defaults
        assert_eq!(parsed.upstream.model, "gpt-5-mini");
        assert_eq!(parsed.server.host, "::");
    }
}
