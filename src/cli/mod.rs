//! CLI module
//!
//! Mode-specific command line logic shared by the unified binary.

pub mod chat;
pub mod server;

pub use chat::{ChatArgs, run_chat_mode};
pub use server::{ServerArgs, run_server_mode};
