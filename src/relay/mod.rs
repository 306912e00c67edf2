//! Chat relay orchestration
//!
//! Coordinates session acquisition, the upstream chat exchange, and the
//! refresh-once retry policy.

pub mod orchestrator;

pub use orchestrator::{ChatRelay, ChatRelayGeneric};
