//! Onion-model middleware.
//!
//! A [`Pipeline`] runs an ordered stack of [`Middleware`]. Each one receives
//! the request [`Context`] and a [`Next`] continuation for the rest of the
//! stack. Code before `next.run(ctx)` runs on the way in, code after it on
//! the way out, in reverse registration order. Not calling `next` ends the
//! chain early.
//!
//! ```
//! use flowhttp::middleware::{from_fn, Pipeline};
//!
//! let timing = from_fn(|ctx, next| Box::pin(async move {
//!     let started = std::time::Instant::now();
//!     next.run(ctx).await?;
//!     ctx.set_header("X-Response-Time", format!("{}ms", started.elapsed().as_millis()));
//!     Ok(())
//! }));
//! let pipeline = Pipeline::from_middleware(vec![timing]);
//! assert_eq!(pipeline.len(), 1);
//! ```

mod access_log;
mod assets;
mod body_parser;
mod latency;
mod not_found;
mod tests;

use std::fmt;
use std::future::ready;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::context::Context;
use crate::server::{BoxFuture, Error};

pub use access_log::AccessLog;
pub use assets::Assets;
pub use body_parser::BodyParser;
pub use latency::Latency;
pub use not_found::NotFound;

/// An interceptor in the request pipeline.
pub trait Middleware: Send + Sync {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>>;
}

/// The rest of the chain after the current interceptor.
///
/// `Next` is `Copy`; running it a second time within the same chain fails
/// with [`Error::NextCalledMultipleTimes`].
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stack: &'a [Arc<dyn Middleware>],
    index: usize,
    /// Count of positions already dispatched in this run.
    dispatched: &'a AtomicUsize,
}

impl<'a> Next<'a> {
    /// Run the remaining interceptors.
    pub fn run<'c>(self, ctx: &'c mut Context) -> BoxFuture<'c, Result<(), Error>>
    where
        'a: 'c,
    {
        dispatch(self.stack, self.index, self.dispatched, ctx)
    }

    /// Position of the interceptor this continuation will run.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("len", &self.stack.len())
            .finish()
    }
}

fn dispatch<'c>(
    stack: &'c [Arc<dyn Middleware>],
    index: usize,
    dispatched: &'c AtomicUsize,
    ctx: &'c mut Context,
) -> BoxFuture<'c, Result<(), Error>> {
    // Only strictly increasing positions may run.
    if index < dispatched.load(Ordering::Acquire) {
        return Box::pin(ready(Err(Error::NextCalledMultipleTimes)));
    }
    dispatched.store(index + 1, Ordering::Release);

    match stack.get(index) {
        Some(middleware) => middleware.handle(
            ctx,
            Next {
                stack,
                index: index + 1,
                dispatched,
            },
        ),
        None => Box::pin(ready(Ok(()))),
    }
}

/// An immutable stack of interceptors composed into one continuation chain.
#[derive(Clone, Default)]
pub struct Pipeline {
    stack: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    pub fn new(stack: Vec<Arc<dyn Middleware>>) -> Self {
        Self { stack }
    }

    pub fn from_middleware<M: Middleware + 'static>(stack: Vec<M>) -> Self {
        Self::new(
            stack
                .into_iter()
                .map(|m| Arc::new(m) as Arc<dyn Middleware>)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Run the whole chain against `ctx`.
    ///
    /// Each run tracks its own dispatch position, so one pipeline can serve
    /// many requests concurrently.
    pub async fn run(&self, ctx: &mut Context) -> Result<(), Error> {
        let dispatched = AtomicUsize::new(0);
        dispatch(&self.stack, 0, &dispatched, ctx).await
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("len", &self.stack.len()).finish()
    }
}

/// Middleware built from a closure, see [`from_fn`].
pub struct FnMiddleware<F>(F);

/// Adapt a closure into [`Middleware`].
pub fn from_fn<F>(f: F) -> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
{
    FnMiddleware(f)
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, Result<(), Error>> + Send + Sync,
{
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        (self.0)(ctx, next)
    }
}
