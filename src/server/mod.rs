//! HTTP engine for flowhttp.
//!
//! [`Flow`] collects routes and interceptors and freezes them into a
//! [`Service`]. [`Server`] binds a TCP listener and hands each accepted
//! connection to the service: the request is read and parsed, run through
//! the pipeline, and the resulting context is written back.

mod config;
mod error;
mod flow;
mod handler;
mod listener;
mod response;
mod transport;

pub use config::ServerConfig;
pub use error::Error;
pub use flow::{Flow, Service};
pub use handler::{handler, BoxFuture, HandlerFn};
pub use listener::{Server, ShutdownHandle};
pub use response::{encode_head, reason_phrase, HttpResponse, StatusCode};
pub use transport::{read_request, write_response, SERVER_NAME};
