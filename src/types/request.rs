//! Request type definitions
//!
//! Defines the inbound relay request shape.

use serde::{Deserialize, Serialize};

/// Inbound chat relay request
///
/// Per-call upstream fields (the random `sessionId` the upstream schema
/// requires) are generated at payload-build time and never stored here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatRequest {
    /// The user message to relay
    #[serde(default)]
    pub message: String,

    /// Optional system prompt prepended to the wrapped instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl ChatRequest {
    /// Create a new request for the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            system_prompt: None,
        }
    }

    /// Attach a system prompt
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_builder() {
        let request = ChatRequest::new("hello").with_system_prompt("be brief");
        assert_eq!(request.message, "hello");
        assert_eq!(request.system_prompt, Some("be brief".to_string()));
    }

    #[test]
    fn test_chat_request_deserializes_without_system_prompt() {
        let request: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(request.message, "hi");
        assert!(request.system_prompt.is_none());
    }

    #[test]
    fn test_chat_request_missing_message_defaults_empty() {
        // The orchestrator rejects empty messages; deserialization just
        // hands it through.
        let request: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(request.message.is_empty());
    }

    #[test]
    fn test_chat_request_serialization_skips_none() {
        let json = serde_json::to_string(&ChatRequest::new("hi")).unwrap();
        assert!(!json.contains("system_prompt"));
    }
}
