use std::time::Instant;

use log::info;

use super::{Middleware, Next};
use crate::context::Context;
use crate::server::{BoxFuture, Error};

/// Logs one line per completed request: client address, method, status,
/// URL and elapsed milliseconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessLog;

impl Middleware for AccessLog {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let started = Instant::now();
            next.run(ctx).await?;
            let elapsed = started.elapsed().as_secs_f64() * 1000.0;
            info!(
                "{} {} [{}] {} {:.2}ms",
                ctx.ip(),
                ctx.method(),
                ctx.status(),
                ctx.href(),
                elapsed
            );
            Ok(())
        })
    }
}
