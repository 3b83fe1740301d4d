//! Error types for the engine.

use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors raised while registering routes, running the pipeline or serving
/// connections.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// An interceptor invoked its continuation more than once.
    #[error("next() called multiple times")]
    NextCalledMultipleTimes,

    /// No adapter can load a route document of this kind.
    #[error("No adapter found for: {0}")]
    NoAdapter(String),

    /// The request body exceeds the configured limit.
    #[error("Request body of {0} bytes exceeds the limit")]
    PayloadTooLarge(usize),

    /// A handler or interceptor failed.
    #[error("Handler error: {0}")]
    Handler(String),
}
