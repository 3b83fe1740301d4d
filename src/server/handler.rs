//! Route handler types.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::server::Error;

/// A boxed, sendable future borrowing from the request it serves.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A route handler: mutates the context to describe the response.
pub type HandlerFn =
    Arc<dyn for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<(), Error>> + Send + Sync>;

/// Box a handler closure.
///
/// ```
/// use flowhttp::server::handler;
///
/// let ping = handler(|ctx| Box::pin(async move {
///     ctx.set_body("pong");
///     Ok(())
/// }));
/// # let _ = ping;
/// ```
pub fn handler<F>(f: F) -> HandlerFn
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
{
    Arc::new(f)
}
