//! Error taxonomy for the relay
//!
//! Classifies every failure the relay can surface: client-caused
//! validation errors, credential-layer failures, pool exhaustion, and
//! the upstream call failures the orchestrator normalizes.

use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client-caused input errors, never retried
    #[error("Validation failed for {field}: {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Error message describing the validation failure
        message: String,
    },

    /// Token fetch failed at the network level
    ///
    /// Absorbed by the pool (a session that cannot acquire credentials is
    /// skipped or never added); the orchestrator never sees this variant.
    #[error("Credential acquisition failed: {reason}")]
    CredentialAcquisition {
        /// Why the token could not be fetched
        reason: String,
    },

    /// The pool could not produce any valid session
    #[error("No valid upstream session available")]
    SessionExhausted,

    /// Timeout errors on upstream calls
    #[error("Operation timed out after {duration_secs} seconds: {operation}")]
    UpstreamTimeout {
        /// The operation that timed out
        operation: String,
        /// Duration in seconds before timing out
        duration_secs: u64,
    },

    /// Any other upstream call failure, message passed through
    #[error("Upstream request failed: {message}")]
    Upstream {
        /// Error message describing the upstream failure
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error in {field}: {message}")]
    Config {
        /// The configuration field that has an error
        field: String,
        /// Error message describing the issue
        message: String,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a credential acquisition error
    pub fn credential<S: Into<String>>(reason: S) -> Self {
        Self::CredentialAcquisition {
            reason: reason.into(),
        }
    }

    /// Create an upstream timeout error
    pub fn upstream_timeout<S: Into<String>>(operation: S, duration_secs: u64) -> Self {
        Self::UpstreamTimeout {
            operation: operation.into(),
            duration_secs,
        }
    }

    /// Create a generic upstream error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(field: S, message: S) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::CredentialAcquisition { .. } => true,
            Error::UpstreamTimeout { .. } => true,
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Get error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(..) => "http",
            Error::Json(..) => "json",
            Error::Toml(..) => "toml",
            Error::Url(..) => "url",
            Error::Io(..) => "io",
            Error::Validation { .. } => "validation",
            Error::CredentialAcquisition { .. } => "credential",
            Error::SessionExhausted => "session_exhausted",
            Error::UpstreamTimeout { .. } => "upstream_timeout",
            Error::Upstream { .. } => "upstream",
            Error::Config { .. } => "config",
        }
    }

    /// HTTP status code the listener should answer with for this error
    ///
    /// 400 for client mistakes, 503 when no session can be produced,
    /// 504 for upstream timeouts, 502 for other upstream failures,
    /// 500 for everything internal.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation { .. } => 400,
            Error::SessionExhausted | Error::CredentialAcquisition { .. } => 503,
            Error::UpstreamTimeout { .. } => 504,
            Error::Upstream { .. } => 502,
            Error::Http(e) if e.is_timeout() => 504,
            _ => 500,
        }
    }
}
