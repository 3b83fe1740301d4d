//! HTTP parser module.
//!
//! Turns the bytes of a single HTTP/1.x request into an [`HttpRequest`].
//! This is the transport boundary of the engine: everything above it works
//! on parsed requests only.

mod request;
mod method;
mod version;
mod error;
mod tests;

// Re-export public items
pub use request::{find_head_end, parse_request, HttpRequest};
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;
