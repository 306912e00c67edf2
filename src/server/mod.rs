//! HTTP server module
//!
//! The Axum application, its shared state, and the request handlers.

pub mod app;
pub mod handlers;

pub use app::{AppState, create_app};
