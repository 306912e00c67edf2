//! Error handling for the relay
//!
//! Defines the error taxonomy shared by the session, pool, and relay
//! layers, with HTTP status mapping for the listener.

pub mod types;

pub use types::{Error, Result};
