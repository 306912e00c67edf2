//! Utility modules
//!
//! Small shared helpers that do not belong to a specific layer.

pub mod version;

pub use version::{VERSION, get_version};
