//! CSRF token acquisition
//!
//! Exchanges a generated identity for a short-lived anti-forgery token
//! via a single GET to the upstream token endpoint.

use crate::{Result, session::Identity};
use reqwest::Client;
use std::time::Duration;

/// Trait for token acquisition to enable testing with stub fetchers
#[async_trait::async_trait]
pub trait TokenFetcher: Send + Sync {
    /// Fetch a CSRF token for the given identity
    ///
    /// Fails only on network-level errors; any HTTP response is treated
    /// as a token (see [`HttpTokenFetcher`]).
    async fn fetch_token(&self, identity: &Identity) -> Result<String>;
}

/// HTTP client for the upstream token endpoint
#[derive(Debug, Clone)]
pub struct HttpTokenFetcher {
    /// Shared HTTP client
    client: Client,
    /// Token endpoint URL
    token_url: String,
    /// Per-request timeout
    timeout: Duration,
}

impl HttpTokenFetcher {
    /// Create a new token fetcher for the given endpoint
    pub fn new(client: Client, token_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            timeout,
        }
    }

    /// The configured token endpoint URL
    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait::async_trait]
impl TokenFetcher for HttpTokenFetcher {
    async fn fetch_token(&self, identity: &Identity) -> Result<String> {
        let mut request = self
            .client
            .get(&self.token_url)
            .timeout(self.timeout)
            .header("cookie", identity.cookie_header());

        for (name, value) in &identity.headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("Token fetch failed: {}", e);
            crate::Error::credential(format!("token request failed: {}", e))
        })?;

        // The upstream returns a usable token body even on unusual status
        // codes, so no status validation happens here. Whether the token
        // actually works is discovered by the next chat call.
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::warn!("Token fetch body read failed: {}", e);
            crate::Error::credential(format!("token body read failed: {}", e))
        })?;

        let token = body.trim().to_string();
        tracing::debug!(
            "Fetched token ({} chars) from {} with status {}",
            token.len(),
            self.token_url,
            status
        );
        Ok(token)
    }
}
