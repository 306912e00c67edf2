//! Response type definitions
//!
//! Defines the structures returned by the relay and its HTTP listener.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Successful relay reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// The normalized upstream reply text
    pub response: String,
}

impl ChatReply {
    /// Create a new reply
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

/// Status response for the index route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Service status indicator
    pub status: String,

    /// Human-readable status message
    pub message: String,
}

impl StatusResponse {
    /// Create the "online" status response
    pub fn online() -> Self {
        Self {
            status: "online".to_string(),
            message: "Claila relay is running. Send POST requests to /chat.".to_string(),
        }
    }
}

/// Ping response for health checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    /// Server uptime in seconds
    pub server_uptime: u64,

    /// Server version
    pub version: String,
}

impl PingResponse {
    /// Create a new ping response
    pub fn new(server_uptime: u64, version: impl Into<String>) -> Self {
        Self {
            server_uptime,
            version: version.into(),
        }
    }
}

/// Error response for API errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Error timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Service version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            context: None,
            timestamp: Some(Utc::now()),
            version: Some(crate::utils::version::get_version().to_string()),
        }
    }

    /// Create error response with context
    pub fn with_context(error: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            context: Some(context.into()),
            timestamp: Some(Utc::now()),
            version: Some(crate::utils::version::get_version().to_string()),
        }
    }
}
