//! Request body decoding.

use serde_json::{Map, Value};

use super::{Middleware, Next};
use crate::context::{parse_urlencoded, Context};
use crate::server::{BoxFuture, Error};

/// Content types decoded as JSON.
pub const JSON_TYPES: [&str; 4] = [
    "application/json",
    "application/json-patch+json",
    "application/vnd.api+json",
    "application/csp-report",
];

/// Content types decoded as url-encoded forms.
pub const FORM_TYPES: [&str; 1] = ["application/x-www-form-urlencoded"];

/// Decodes JSON and form bodies into [`Context::request_body`].
///
/// Other content types, and requests without a body, get an empty object. A
/// body that was already decoded is left alone. Malformed JSON fails the
/// request.
#[derive(Debug, Default, Clone, Copy)]
pub struct BodyParser;

impl Middleware for BodyParser {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            if ctx.request_body().is_none() {
                let fields = decode(ctx)?;
                ctx.set_request_body(fields);
            }
            next.run(ctx).await
        })
    }
}

fn decode(ctx: &Context) -> Result<Value, Error> {
    let raw = &ctx.request().body;

    if ctx.is(&JSON_TYPES).is_some() {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(Map::new()));
        }
        return Ok(serde_json::from_slice(raw)?);
    }

    if ctx.is(&FORM_TYPES).is_some() {
        return Ok(Value::Object(parse_urlencoded(raw)));
    }

    Ok(Value::Object(Map::new()))
}
