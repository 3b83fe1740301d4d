use std::time::Duration;

use super::{Middleware, Next};
use crate::context::Context;
use crate::server::{BoxFuture, Error};

/// Delays every request before passing it on.
#[derive(Debug, Default, Clone, Copy)]
pub struct Latency {
    delay: Option<Duration>,
}

impl Latency {
    /// `None` passes requests through without waiting.
    pub fn new(delay: Option<Duration>) -> Self {
        Self { delay }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Some(Duration::from_millis(millis)))
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }
}

impl Middleware for Latency {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            next.run(ctx).await
        })
    }
}
