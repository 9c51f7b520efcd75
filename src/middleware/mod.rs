//! HTTP middleware
//!
//! Request logging applied to every route

pub mod logging;

pub use logging::request_logging_middleware;
