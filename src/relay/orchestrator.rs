//! Request orchestration
//!
//! Given a user message, obtains a valid session from the pool, issues
//! the upstream chat call, detects authentication-expiry signals, forces
//! a refresh-and-retry exactly once, and normalizes the result.

use crate::{
    Result,
    config::Settings,
    session::{HttpTokenFetcher, Identity, SessionPoolGeneric, TokenFetcher, random_string},
    types::{ChatReply, ChatRequest},
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Convenience type alias for the relay with the real HTTP fetcher
pub type ChatRelay = ChatRelayGeneric<HttpTokenFetcher>;

/// Outcome of a single upstream chat attempt
///
/// The retry policy is a two-step state machine: one attempt, then on
/// `NeedsRefresh` a forced session refresh and a single unconditional
/// second attempt whose outcome is used as-is. Never recursive.
#[derive(Debug)]
enum AttemptOutcome {
    /// Response usable as the reply body
    Success {
        /// Upstream HTTP status
        status: u16,
        /// Raw response body
        body: String,
    },
    /// Response signaling an expired session
    NeedsRefresh {
        /// Upstream HTTP status
        status: u16,
        /// Raw response body
        body: String,
    },
}

/// Main orchestrator relaying chat messages upstream
#[derive(Debug)]
pub struct ChatRelayGeneric<F: TokenFetcher> {
    /// Configuration settings
    settings: Arc<Settings>,
    /// HTTP client for chat calls
    http_client: Client,
    /// Pool of upstream sessions
    pool: SessionPoolGeneric<F>,
}

impl ChatRelayGeneric<HttpTokenFetcher> {
    /// Create a relay with the real HTTP token fetcher
    ///
    /// Token and chat calls share one connection-pooling client.
    pub fn new(settings: Settings) -> Self {
        let http_client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        let fetcher = HttpTokenFetcher::new(
            http_client.clone(),
            settings.upstream.token_url.clone(),
            Duration::from_secs(settings.upstream.token_timeout_secs),
        );

        Self::from_parts(settings, fetcher, http_client)
    }
}

impl<F: TokenFetcher> ChatRelayGeneric<F> {
    /// Create a relay with a custom token fetcher
    pub fn with_fetcher(settings: Settings, fetcher: F) -> Self {
        let http_client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self::from_parts(settings, fetcher, http_client)
    }

    fn from_parts(settings: Settings, fetcher: F, http_client: Client) -> Self {
        let pool = SessionPoolGeneric::new(
            fetcher,
            settings.upstream.origin(),
            settings.pool.max_sessions,
        );

        Self {
            settings: Arc::new(settings),
            http_client,
            pool,
        }
    }

    /// The session pool backing this relay
    pub fn pool(&self) -> &SessionPoolGeneric<F> {
        &self.pool
    }

    /// Relay a chat message upstream and return the normalized reply
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Validation`] for an empty message (the pool and
    ///   upstream are never contacted)
    /// - [`crate::Error::SessionExhausted`] when no session can be
    ///   acquired or a forced refresh fails
    /// - [`crate::Error::UpstreamTimeout`] when a chat call times out
    /// - [`crate::Error::Upstream`] for any other upstream call failure
    pub async fn relay(&self, request: &ChatRequest) -> Result<ChatReply> {
        if request.message.trim().is_empty() {
            return Err(crate::Error::validation(
                "message",
                "no message provided",
            ));
        }

        let handle = self
            .pool
            .acquire()
            .await
            .ok_or(crate::Error::SessionExhausted)?;
        // Snapshot the credentials and release the lock before the
        // upstream call; holding it across a 30s exchange would stall
        // every other caller sharing this session.
        let identity = {
            let session = handle.lock().await;
            session
                .identity()
                .cloned()
                .ok_or(crate::Error::SessionExhausted)?
        };

        let payload = self.build_payload(request);

        let (status, body) = match self.attempt(&identity, &payload).await? {
            AttemptOutcome::Success { status, body } => (status, body),
            AttemptOutcome::NeedsRefresh { status, .. } => {
                tracing::info!(
                    "Upstream session invalid or expired (status {}), refreshing for retry",
                    status
                );
                // Re-lock only for the refresh itself
                let refreshed = {
                    let mut session = handle.lock().await;
                    if !session.ensure_valid(self.pool.fetcher().as_ref(), true).await {
                        return Err(crate::Error::SessionExhausted);
                    }
                    session
                        .identity()
                        .cloned()
                        .ok_or(crate::Error::SessionExhausted)?
                };
                // Exactly one resend; its outcome is used regardless.
                match self.attempt(&refreshed, &payload).await? {
                    AttemptOutcome::Success { status, body }
                    | AttemptOutcome::NeedsRefresh { status, body } => (status, body),
                }
            }
        };

        tracing::debug!("Upstream chat call completed with status {}", status);
        Ok(ChatReply::new(normalize_reply(body)))
    }

    /// Issue one upstream chat call with a snapshot of the session's
    /// credentials
    async fn attempt(
        &self,
        identity: &Identity,
        payload: &[(&'static str, String)],
    ) -> Result<AttemptOutcome> {
        let timeout_secs = self.settings.upstream.chat_timeout_secs;

        let mut request = self
            .http_client
            .post(&self.settings.upstream.chat_url)
            .timeout(Duration::from_secs(timeout_secs))
            .header("cookie", identity.cookie_header());

        for (name, value) in &identity.headers {
            // form() below sets the form content-type itself
            if name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            request = request.header(name, value);
        }

        let response = request.form(payload).send().await.map_err(|e| {
            if e.is_timeout() {
                crate::Error::upstream_timeout("chat", timeout_secs)
            } else {
                crate::Error::upstream(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| crate::Error::upstream(e.to_string()))?;

        Ok(classify_response(status, body))
    }

    /// Build the form-encoded upstream payload
    ///
    /// The `sessionId` field is a fresh random value on every call, as
    /// the upstream schema requires.
    fn build_payload(&self, request: &ChatRequest) -> Vec<(&'static str, String)> {
        let upstream = &self.settings.upstream;
        vec![
            ("model", upstream.model.clone()),
            ("calltype", "completion".to_string()),
            (
                "message",
                wrap_message(
                    &request.message,
                    request.system_prompt.as_deref(),
                    &upstream.reply_language,
                ),
            ),
            ("sessionId", random_string(12)),
            ("chat_mode", "chat".to_string()),
            ("websearch", "false".to_string()),
            ("tmp_enabled", "0".to_string()),
            ("lang", "en".to_string()),
            ("language", "english".to_string()),
        ]
    }
}

/// Wrap the user message into the single instruction string the
/// upstream expects, pinning the reply language
fn wrap_message(message: &str, system_prompt: Option<&str>, reply_language: &str) -> String {
    match system_prompt {
        Some(prompt) if !prompt.trim().is_empty() => {
            format!(
                "[SYSTEM: {}] [USER: {}] [RESPOND IN {} ONLY]",
                prompt, message, reply_language
            )
        }
        _ => format!("[RESPOND IN {} ONLY] {}", reply_language, message),
    }
}

/// Classify an upstream response as usable or session-expired
///
/// 401/403/419 signal auth/session expiry. A 200 whose body mentions
/// both "csrf" and "token" is the upstream's idiosyncratic way of
/// reporting an expired token inside a success status. The substring
/// heuristic can false-positive on legitimate replies that discuss CSRF
/// tokens; that is a known correctness risk carried over deliberately
/// from the upstream protocol's observed behavior.
fn classify_response(status: u16, body: String) -> AttemptOutcome {
    let needs_refresh = match status {
        401 | 403 | 419 => true,
        200 => {
            let lower = body.to_lowercase();
            lower.contains("csrf") && lower.contains("token")
        }
        _ => false,
    };

    if needs_refresh {
        AttemptOutcome::NeedsRefresh { status, body }
    } else {
        AttemptOutcome::Success { status, body }
    }
}

/// Extract the `response` field from a structured body, falling back to
/// the raw text verbatim
fn normalize_reply(body: String) -> String {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => match value.get("response") {
            Some(serde_json::Value::String(reply)) => reply.clone(),
            Some(other) => other.to_string(),
            None => body,
        },
        Err(_) => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_message_without_system_prompt() {
        let wrapped = wrap_message("hello", None, "ENGLISH");
        assert_eq!(wrapped, "[RESPOND IN ENGLISH ONLY] hello");
    }

    #[test]
    fn test_wrap_message_with_system_prompt() {
        let wrapped = wrap_message("hello", Some("be brief"), "ENGLISH");
        assert_eq!(
            wrapped,
            "[SYSTEM: be brief] [USER: hello] [RESPOND IN ENGLISH ONLY]"
        );
    }

    #[test]
    fn test_wrap_message_blank_system_prompt_ignored() {
        let wrapped = wrap_message("hello", Some("   "), "ENGLISH");
        assert_eq!(wrapped, "[RESPOND IN ENGLISH ONLY] hello");
    }

    #[test]
    fn test_classify_auth_statuses_need_refresh() {
        for status in [401, 403, 419] {
            let outcome = classify_response(status, "denied".to_string());
            assert!(matches!(outcome, AttemptOutcome::NeedsRefresh { .. }));
        }
    }

    #[test]
    fn test_classify_200_with_csrf_token_body_needs_refresh() {
        let outcome = classify_response(200, "CSRF Token mismatch".to_string());
        assert!(matches!(outcome, AttemptOutcome::NeedsRefresh { .. }));
    }

    #[test]
    fn test_classify_200_needs_both_substrings() {
        let outcome = classify_response(200, "your token is fine".to_string());
        assert!(matches!(outcome, AttemptOutcome::Success { .. }));

        let outcome = classify_response(200, "csrf mentioned alone".to_string());
        assert!(matches!(outcome, AttemptOutcome::Success { .. }));
    }

    #[test]
    fn test_classify_other_statuses_pass_through() {
        // A 500 is not an auth signal; it flows through as the reply
        // body for normalization.
        let outcome = classify_response(500, "server error".to_string());
        assert!(matches!(outcome, AttemptOutcome::Success { status: 500, .. }));
    }

    #[test]
    fn test_normalize_extracts_response_field() {
        let reply = normalize_reply(r#"{"response": "hi there"}"#.to_string());
        assert_eq!(reply, "hi there");
    }

    #[test]
    fn test_normalize_falls_back_on_unparseable_body() {
        let reply = normalize_reply("plain text reply".to_string());
        assert_eq!(reply, "plain text reply");
    }

    #[test]
    fn test_normalize_falls_back_on_missing_field() {
        let body = r#"{"answer": "elsewhere"}"#.to_string();
        let reply = normalize_reply(body.clone());
        assert_eq!(reply, body);
    }

    #[test]
    fn test_normalize_non_string_response_field() {
        let reply = normalize_reply(r#"{"response": {"nested": true}}"#.to_string());
        assert_eq!(reply, r#"{"nested":true}"#);
    }

    #[tokio::test]
    async fn test_relay_rejects_empty_message() {
        let relay = ChatRelay::new(Settings::default());
        let result = relay.relay(&ChatRequest::new("   ")).await;
        assert!(matches!(
            result.unwrap_err(),
            crate::Error::Validation { .. }
        ));
        // The pool was never contacted
        assert!(relay.pool().is_empty().await);
    }
}
