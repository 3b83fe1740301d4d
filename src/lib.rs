//! A small HTTP serving engine with onion-model middleware.
//!
//! Requests are parsed off the wire, wrapped in a [`Context`] and run through
//! an ordered stack of interceptors. Route dispatch is one of those
//! interceptors: a radix tree per HTTP method maps literal paths to async
//! handlers.
//!
//! # Features
//!
//! - Radix-tree routing on literal, case-insensitive paths
//! - Koa-style middleware with `next` continuations and double-call detection
//! - A request context with lazily parsed URL, query and merged params
//! - Response bodies as text, bytes, JSON or streams, with headers kept in
//!   step with the body
//! - Body parsing, access logging, latency injection and static assets
//! - Mock servers generated from JSON route documents
//!
//! # Examples
//!
//! ## Handling requests in process
//!
//! ```
//! use flowhttp::{Flow, HttpRequest, NotFound};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut flow = Flow::new();
//! flow.get("/ping", |ctx| Box::pin(async move {
//!     ctx.set_body("pong");
//!     Ok(())
//! }));
//! flow.use_router().use_middleware(NotFound);
//!
//! let service = flow.build();
//! let ctx = service.handle(HttpRequest::get("/ping")).await;
//! assert_eq!(ctx.status(), 200);
//! assert_eq!(ctx.body().as_text(), Some("pong"));
//!
//! let ctx = service.handle(HttpRequest::get("/missing")).await;
//! assert_eq!(ctx.status(), 404);
//! # }
//! ```
//!
//! ## Error handling
//!
//! ```
//! use flowhttp::{parse_request, ParserError};
//!
//! let invalid_request = b"INVALID /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
//!
//! match parse_request(invalid_request) {
//!     Ok(_) => println!("Request parsed successfully"),
//!     Err(ParserError::InvalidMethod(method)) => println!("Invalid method: {}", method),
//!     Err(err) => println!("Other error: {}", err),
//! }
//! ```
//!
//! See the `demos` directory for complete servers.

pub mod context;
pub mod middleware;
pub mod mock;
pub mod parser;
pub mod router;
pub mod server;

// Re-export commonly used items for convenience
pub use context::{Body, Context};
pub use middleware::{from_fn, AccessLog, Assets, BodyParser, Latency, Middleware, Next, NotFound};
pub use parser::{parse_request, Error as ParserError, HttpRequest, HttpVersion, Method};
pub use router::{PathTree, Router};
pub use server::{Error as ServerError, Flow, Server, ServerConfig, Service, StatusCode};
