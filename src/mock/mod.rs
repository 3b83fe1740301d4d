//! Canned-response routes described by a route document.
//!
//! A [`Document`] maps each path to the methods it answers and, per method,
//! the parameters it requires and the response it returns:
//!
//! ```json
//! {
//!   "/users": {
//!     "GET": {
//!       "params": [{ "name": "page", "required": true }],
//!       "response": { "type": "json", "content": [{ "id": 1 }] }
//!     }
//!   }
//! }
//! ```
//!
//! [`register_document`] turns every entry into a route on a [`Flow`].

mod adapter;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{Body, Params};
use crate::parser::Method;
use crate::server::{handler, Flow, HandlerFn, StatusCode};

pub use adapter::{load_document, Adapter, JsonAdapter, Registry};

/// A parameter a mocked route expects in its query or body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

/// The canned response of a mocked route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// Type hint passed to [`Context::set_type`](crate::context::Context::set_type).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content: Value,
}

/// One method of one path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    #[serde(default)]
    pub response: ResponseSpec,
}

impl RouteSpec {
    /// First required parameter that is absent or falsy in `params`.
    pub fn missing_param(&self, params: &Params) -> Option<&str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .find(|p| !params.get(&p.name).is_some_and(truthy))
            .map(|p| p.name.as_str())
    }
}

/// Path -> method name -> route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub routes: BTreeMap<String, BTreeMap<String, RouteSpec>>,
}

impl Document {
    /// Number of (path, method) entries.
    pub fn len(&self) -> usize {
        self.routes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn response_body(content: &Value) -> Body {
    match content {
        Value::Null => Body::Empty,
        Value::String(text) => Body::Text(text.clone()),
        other => Body::Json(other.clone()),
    }
}

/// Handler answering with `spec.response`, or 400 when a required
/// parameter is missing.
pub fn mock_handler(spec: RouteSpec) -> HandlerFn {
    let spec = Arc::new(spec);
    handler(move |ctx| {
        let spec = Arc::clone(&spec);
        Box::pin(async move {
            if let Some(missing) = spec.missing_param(ctx.params()) {
                debug!("{} {}: missing required parameter {missing}", ctx.method(), ctx.path());
                ctx.set_status(StatusCode::BadRequest.as_u16());
                return Ok(());
            }

            if let Some(hint) = &spec.response.content_type {
                ctx.set_type(hint);
            }
            ctx.set_body(response_body(&spec.response.content));
            ctx.set_status(StatusCode::Ok.as_u16());
            Ok(())
        })
    })
}

/// Register every route in `document` on `flow`, returning how many were
/// added. Entries under unknown method names are skipped.
pub fn register_document(flow: &mut Flow, document: &Document) -> usize {
    let mut registered = 0;
    for (path, methods) in &document.routes {
        for (name, spec) in methods {
            match Method::from_name(name) {
                Some(method) => {
                    flow.route_handler(method, path, mock_handler(spec.clone()));
                    registered += 1;
                }
                None => warn!("Skipping {path}: unknown method {name}"),
            }
        }
    }
    registered
}
