//! Service layer module
//!
//! Contains the chat stream relay and the SSE decoder it reads upstream with

pub mod relay;
pub mod sse;

pub use relay::{RelayEvent, RelayStream, StreamRelay};
