use super::{Middleware, Next};
use crate::context::Context;
use crate::server::{BoxFuture, Error, StatusCode};

/// Terminal interceptor answering 404 with an empty body.
///
/// Register it last; nothing after it runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotFound;

impl Middleware for NotFound {
    fn handle<'a>(&'a self, ctx: &'a mut Context, _next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            ctx.set_status(StatusCode::NotFound.as_u16());
            Ok(())
        })
    }
}
