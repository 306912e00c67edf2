//! Shared request/response types
//!
//! The inbound relay request and the JSON shapes returned by the HTTP
//! listener.

pub mod request;
pub mod response;

pub use request::ChatRequest;
pub use response::{ChatReply, ErrorResponse, PingResponse, StatusResponse};
