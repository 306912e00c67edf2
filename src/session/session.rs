//! One upstream chat session
//!
//! A [`ChatSession`] bundles a generated identity with its current CSRF
//! token. Refreshing replaces both atomically: a failed token fetch
//! leaves the previous state untouched, so the session never carries a
//! half-updated identity.

use crate::session::{CSRF_HEADER, Identity, TokenFetcher};
use chrono::{DateTime, Utc};

/// A single upstream session: identity + token + refresh timestamp
///
/// Validity is optimistic; an initialized session is assumed valid until
/// an upstream call proves otherwise and forces a refresh.
#[derive(Debug)]
pub struct ChatSession {
    /// Upstream origin the identity is generated for
    origin: String,
    /// Current identity, set only after a successful refresh
    identity: Option<Identity>,
    /// Current CSRF token, set only after a successful refresh
    token: Option<String>,
    /// Wall-clock time of the last successful refresh
    last_refresh: Option<DateTime<Utc>>,
}

impl ChatSession {
    /// Create an uninitialized session for the given upstream origin
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            identity: None,
            token: None,
            last_refresh: None,
        }
    }

    /// Ensure the session holds usable credentials
    ///
    /// If `force_refresh` is set, or the session has never been
    /// initialized, generates a fresh identity and fetches a token for
    /// it. On success the new identity and token are adopted together,
    /// the refresh time is stamped, and the token is injected into the
    /// outgoing headers under [`CSRF_HEADER`]. On fetch failure the
    /// prior state is retained and `false` is returned.
    ///
    /// If the session is already initialized and no refresh is forced,
    /// returns `true` immediately without any network call.
    pub async fn ensure_valid<F>(&mut self, fetcher: &F, force_refresh: bool) -> bool
    where
        F: TokenFetcher + ?Sized,
    {
        if !force_refresh && self.token.is_some() {
            return true;
        }

        tracing::info!("Refreshing session credentials (forced: {})", force_refresh);
        let mut identity = Identity::generate(&self.origin);

        match fetcher.fetch_token(&identity).await {
            Ok(token) => {
                identity.headers.insert(CSRF_HEADER.to_string(), token.clone());
                // The token is opaque; truncate on char boundaries, a byte
                // slice could split a multibyte sequence and panic.
                tracing::debug!(
                    "Session refreshed, token prefix: {}",
                    token.chars().take(10).collect::<String>()
                );
                self.identity = Some(identity);
                self.token = Some(token);
                self.last_refresh = Some(Utc::now());
                true
            }
            Err(e) => {
                tracing::warn!("Session refresh failed: {}", e);
                false
            }
        }
    }

    /// Whether the session has ever been successfully refreshed
    pub fn is_initialized(&self) -> bool {
        self.token.is_some()
    }

    /// Current identity, if initialized
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Current token, if initialized
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Time of the last successful refresh
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }
}
