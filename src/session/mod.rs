//! Session and credential lifecycle
//!
//! This module owns everything between "a caller wants to talk upstream"
//! and "a request carries valid cookies, headers, and a CSRF token":
//! identity generation, token acquisition, per-session state, and the
//! bounded round-robin pool.

pub mod identity;
pub mod pool;
pub mod session;
pub mod token;

pub use identity::{CSRF_HEADER, Identity, random_string};
pub use pool::{SessionHandle, SessionPool, SessionPoolGeneric};
pub use session::ChatSession;
pub use token::{HttpTokenFetcher, TokenFetcher};
