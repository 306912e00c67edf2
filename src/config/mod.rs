//! Configuration management
//!
//! Settings structures and loading utilities with file, environment,
//! and CLI precedence.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{LoggingSettings, PoolSettings, ServerSettings, Settings, UpstreamSettings};
