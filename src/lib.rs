//! Claila Chat Relay
//!
//! A relay service that forwards chat messages to the Claila upstream
//! chat API, managing the CSRF-token and cookie credentials the upstream
//! requires. Exposes both an HTTP server and a command-line chat mode.
//!
//! # Features
//!
//! - **Credential Management**: Generates browser-like identities and
//!   fetches the matching CSRF tokens on demand
//! - **Session Pooling**: A bounded round-robin pool of ready sessions
//!   shared across concurrent requests
//! - **Refresh-Once Retry**: Detects expired-session responses and
//!   retries each exchange at most once after a forced refresh
//! - **HTTP Server Mode**: Always-running REST API for chat forwarding
//! - **Chat Mode**: Command-line interface for one-shot or interactive use
//!
//! # Usage
//!
//! ## HTTP Server Mode
//!
//! ```bash
//! claila-relay server --port 5000 --host 0.0.0.0
//! ```
//!
//! ## Chat Mode
//!
//! ```bash
//! claila-relay --message "hello there"
//! ```
//!
//! # Examples
//!
//! ```rust
//! use claila_relay::{ChatRelay, Settings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::default();
//! let relay = ChatRelay::new(settings);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod relay;
pub mod server;
pub mod session;
pub mod types;
pub mod utils;

pub use config::{ConfigLoader, Settings};
pub use error::{Error, Result};
pub use relay::ChatRelay;
pub use session::{ChatSession, SessionPool};
pub use types::{ChatReply, ChatRequest, ErrorResponse, PingResponse};
