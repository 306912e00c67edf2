//! Bounded session pool with round-robin reuse
//!
//! Owns every [`ChatSession`] the relay uses. Sessions are created
//! lazily, cycled through for reuse, and never evicted: once created a
//! session lives for the process lifetime and is reused until it fails
//! and cannot be repaired. Capacity bounds identity churn under
//! sustained upstream failure.

use crate::session::{ChatSession, HttpTokenFetcher, TokenFetcher};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to one pooled session
///
/// Callers lock the handle only briefly, to snapshot credentials or to
/// run a forced refresh; the lock is never held across an upstream chat
/// exchange.
pub type SessionHandle = Arc<Mutex<ChatSession>>;

/// Convenience type alias for the pool with the real HTTP fetcher
pub type SessionPool = SessionPoolGeneric<HttpTokenFetcher>;

/// Mutable pool state, guarded by one mutex
///
/// All acquisition (scan, cursor rotation, lazy creation) runs under
/// this lock, which serializes pool operations the same way a single
/// owner task would.
#[derive(Debug)]
struct PoolInner {
    /// Ordered session list, never shrinks
    sessions: Vec<SessionHandle>,
    /// Round-robin cursor into `sessions`
    cursor: usize,
}

/// Bounded pool of upstream sessions, generic over the token fetcher
#[derive(Debug)]
pub struct SessionPoolGeneric<F: TokenFetcher> {
    /// Token fetcher shared by all sessions
    fetcher: Arc<F>,
    /// Upstream origin new identities are generated for
    origin: String,
    /// Maximum number of sessions ever created
    capacity: usize,
    /// Guarded session list + cursor
    inner: Mutex<PoolInner>,
}

impl<F: TokenFetcher> SessionPoolGeneric<F> {
    /// Create an empty pool
    pub fn new(fetcher: F, origin: impl Into<String>, capacity: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            origin: origin.into(),
            capacity: capacity.max(1),
            inner: Mutex::new(PoolInner {
                sessions: Vec::new(),
                cursor: 0,
            }),
        }
    }

    /// The token fetcher shared with pooled sessions
    ///
    /// The orchestrator uses this for forced refreshes after an upstream
    /// auth failure.
    pub fn fetcher(&self) -> Arc<F> {
        Arc::clone(&self.fetcher)
    }

    /// Acquire a valid session, creating one lazily if needed
    ///
    /// Scan order: existing sessions round-robin from the cursor, then a
    /// newly created session if the pool has spare capacity. Returns
    /// `None` only when no existing session validates and a new one
    /// cannot acquire credentials either; credential-layer errors never
    /// escape this boundary.
    pub async fn acquire(&self) -> Option<SessionHandle> {
        let mut inner = self.inner.lock().await;

        if inner.sessions.is_empty() {
            return self.create_session(&mut inner).await;
        }

        for _ in 0..inner.sessions.len() {
            let idx = inner.cursor % inner.sessions.len();
            inner.cursor = (inner.cursor + 1) % inner.sessions.len();
            let handle = Arc::clone(&inner.sessions[idx]);

            // Awaiting a busy session's lock here would stall every
            // other acquire behind it; skip and let the scan (or lazy
            // creation) find a free one.
            let Ok(mut session) = handle.try_lock() else {
                tracing::debug!("Pooled session {} busy, rotating", idx);
                continue;
            };
            let valid = session.ensure_valid(self.fetcher.as_ref(), false).await;
            drop(session);
            if valid {
                return Some(handle);
            }
            tracing::debug!("Pooled session {} failed validation, rotating", idx);
        }

        if inner.sessions.len() < self.capacity {
            return self.create_session(&mut inner).await;
        }

        tracing::warn!(
            "Session pool exhausted: {} sessions, none valid",
            inner.sessions.len()
        );
        None
    }

    /// Create, validate, and append a new session
    ///
    /// A session that fails its first validation is discarded, not
    /// retained; the pool only ever holds sessions that were valid at
    /// least once.
    async fn create_session(&self, inner: &mut PoolInner) -> Option<SessionHandle> {
        let mut session = ChatSession::new(&self.origin);
        if session.ensure_valid(self.fetcher.as_ref(), false).await {
            tracing::info!("Created new upstream session ({} pooled)", inner.sessions.len() + 1);
            let handle = Arc::new(Mutex::new(session));
            inner.sessions.push(Arc::clone(&handle));
            Some(handle)
        } else {
            tracing::warn!("Failed to initialize new upstream session");
            None
        }
    }

    /// Number of sessions currently pooled
    pub async fn len(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }

    /// Whether the pool holds no sessions
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.sessions.is_empty()
    }

    /// Configured capacity bound
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
