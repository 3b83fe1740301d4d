//! Per-request context.
//!
//! A [`Context`] owns one parsed request and the response being built for
//! it. Request-side views (URL, query, params) are computed lazily and
//! cached for the lifetime of the context. Response-side setters keep status,
//! body and headers consistent with each other and stop touching anything
//! once the head has been written to the transport.

mod body;
mod headers;
pub mod mime;

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use url::{form_urlencoded, Url};

use crate::parser::{HttpRequest, Method};
use crate::server::{Error, StatusCode};

pub use body::{Body, BodyStream};
pub use headers::Headers;

/// Flat parameter mapping; repeated query keys collect into arrays.
pub type Params = Map<String, Value>;

/// Statuses that never carry a body.
pub const EMPTY_BODY_STATUSES: [u16; 3] = [204, 205, 304];

/// State for a single request/response exchange.
#[derive(Debug)]
pub struct Context {
    request: HttpRequest,
    attributes: HashMap<String, Value>,
    request_body: Option<Value>,

    status: u16,
    headers: Headers,
    body: Body,
    headers_sent: bool,
    explicit_status: bool,
    explicit_type: bool,

    url_cache: Option<Url>,
    query_cache: HashMap<String, Params>,
    params_cache: Option<Params>,
}

impl Context {
    pub fn new(request: HttpRequest) -> Self {
        Self {
            request,
            attributes: HashMap::new(),
            request_body: None,
            status: StatusCode::Ok.as_u16(),
            headers: Headers::new(),
            body: Body::Empty,
            headers_sent: false,
            explicit_status: false,
            explicit_type: false,
            url_cache: None,
            query_cache: HashMap::new(),
            params_cache: None,
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// The raw request target as received.
    pub fn raw_url(&self) -> &str {
        &self.request.target
    }

    /// Parsed absolute URL built from protocol, host and target.
    ///
    /// Returns `None` when the pieces do not form a valid URL; a later call
    /// tries again.
    pub fn url(&mut self) -> Option<&Url> {
        if self.url_cache.is_none() {
            self.url_cache = Url::parse(&self.href()).ok();
        }
        self.url_cache.as_ref()
    }

    /// `X-Forwarded-Host` when present, otherwise `Host`; first entry only.
    pub fn host(&self) -> &str {
        let raw = self
            .request
            .header("x-forwarded-host")
            .filter(|h| !h.is_empty())
            .or_else(|| self.request.header("host"))
            .unwrap_or("");
        first_token(raw)
    }

    /// Host without the port.
    pub fn hostname(&mut self) -> String {
        let host = self.host();
        if host.starts_with('[') {
            return self
                .url()
                .and_then(Url::host_str)
                .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_string())
                .unwrap_or_default();
        }
        host.split(':').next().unwrap_or("").to_string()
    }

    /// Pathname of the request target.
    pub fn path(&self) -> &str {
        split_target(&self.request.target).0
    }

    /// Raw query string, without the leading `?`.
    pub fn querystring(&self) -> &str {
        split_target(&self.request.target).1
    }

    /// `X-Forwarded-Proto` when present, otherwise `http`; first entry only.
    pub fn protocol(&self) -> &str {
        match self.request.header("x-forwarded-proto").filter(|p| !p.is_empty()) {
            Some(proto) => first_token(proto),
            None => "http",
        }
    }

    pub fn secure(&self) -> bool {
        self.protocol() == "https"
    }

    pub fn origin(&self) -> String {
        format!("{}://{}", self.protocol(), self.host())
    }

    /// Full request URL; absolute targets are returned unchanged.
    pub fn href(&self) -> String {
        let target = self.raw_url();
        let lower = target.get(..8).unwrap_or(target).to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return target.to_string();
        }
        format!("{}{}", self.origin(), target)
    }

    /// Addresses from `X-Forwarded-For`, client first.
    pub fn ips(&self) -> Vec<&str> {
        match self.request.header("x-forwarded-for") {
            Some(raw) if !raw.is_empty() => raw.split(',').map(str::trim).collect(),
            _ => Vec::new(),
        }
    }

    /// First forwarded address, falling back to the peer address.
    pub fn ip(&self) -> String {
        if let Some(first) = self.ips().first() {
            return (*first).to_string();
        }
        self.request
            .remote_addr
            .map(|addr| addr.ip().to_string())
            .unwrap_or_default()
    }

    pub fn method(&self) -> Method {
        self.request.method
    }

    /// Request header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    /// Request mime type without parameters such as `charset`.
    pub fn request_type(&self) -> &str {
        self.request
            .header("content-type")
            .and_then(|t| t.split(';').next())
            .map(str::trim)
            .unwrap_or("")
    }

    /// First entry of `types` matching the request content type.
    ///
    /// Entries may be full types (`application/json`), wildcards
    /// (`text/*`), `+suffix` forms (`+json`) or extensions (`json`).
    /// Requests without a body never match.
    pub fn is<'t>(&self, types: &[&'t str]) -> Option<&'t str> {
        if !self.request.has_body() {
            return None;
        }
        let actual = self.request_type().to_ascii_lowercase();
        if actual.is_empty() {
            return None;
        }
        types.iter().copied().find(|expected| mime_matches(expected, &actual))
    }

    /// Parsed query string, cached per distinct query string.
    pub fn query(&mut self) -> &Params {
        let raw = self.querystring().to_string();
        self.query_cache
            .entry(raw)
            .or_insert_with_key(|raw| parse_urlencoded(raw.as_bytes()))
    }

    /// Query parameters merged with the parsed body fields; body fields win.
    ///
    /// Computed on first access and kept for the rest of the request.
    pub fn params(&mut self) -> &Params {
        if self.params_cache.is_none() {
            let mut params = self.query().clone();
            if let Some(Value::Object(fields)) = &self.request_body {
                for (key, value) in fields {
                    params.insert(key.clone(), value.clone());
                }
            }
            self.params_cache = Some(params);
        }
        self.params_cache.get_or_insert_with(Params::new)
    }

    pub fn param(&mut self, name: &str) -> Option<&Value> {
        self.params().get(name)
    }

    /// Body fields decoded by the body parser, if it ran.
    pub fn request_body(&self) -> Option<&Value> {
        self.request_body.as_ref()
    }

    pub fn set_request_body(&mut self, body: Value) {
        self.request_body = Some(body);
    }

    /// Request-scoped attribute set by an earlier interceptor.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Set the response status; ignored once headers are sent.
    pub fn set_status(&mut self, code: u16) {
        if self.headers_sent {
            return;
        }
        self.explicit_status = true;
        self.status = code;
    }

    /// Response Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    /// Set the response type from a hint (`json`, `.css`, `text/plain`).
    ///
    /// An unknown hint removes the Content-Type header instead and lets later
    /// body assignments infer a type again.
    pub fn set_type(&mut self, hint: &str) {
        if self.headers_sent {
            return;
        }
        match mime::content_type(hint) {
            Some(value) => {
                self.set_header("Content-Type", value);
                self.explicit_type = true;
            }
            None => {
                self.remove_header("Content-Type");
                self.explicit_type = false;
            }
        }
    }

    fn infer_type(&mut self, hint: &str) {
        if let Some(value) = mime::content_type(hint) {
            self.set_header("Content-Type", value);
        }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Assign the response body and update status and headers to match.
    pub fn set_body(&mut self, value: impl Into<Body>) {
        let original = std::mem::replace(&mut self.body, value.into());

        if self.body.is_empty() {
            if !EMPTY_BODY_STATUSES.contains(&self.status) {
                self.set_status(StatusCode::NoContent.as_u16());
            }
            self.remove_header("Content-Type");
            self.remove_header("Content-Length");
            self.remove_header("Transfer-Encoding");
            return;
        }

        if !self.explicit_status {
            self.set_status(StatusCode::Ok.as_u16());
        }
        let infer = !self.explicit_type;

        match &self.body {
            Body::Text(text) => {
                let hint = if text.trim_start().starts_with('<') { "html" } else { "text" };
                let len = text.len() as u64;
                if infer {
                    self.infer_type(hint);
                }
                self.set_length(len);
            }
            Body::Bytes(bytes) => {
                let len = bytes.len() as u64;
                if infer {
                    self.infer_type("bin");
                }
                self.set_length(len);
            }
            Body::Stream(stream) => {
                let id = stream.id();
                if !original.is_empty() && original.stream_id() != Some(id) {
                    self.remove_header("Content-Length");
                }
                if infer {
                    self.infer_type("bin");
                }
            }
            Body::Json(_) => self.remove_header("Content-Length"),
            Body::Empty => {}
        }
    }

    /// Content-Length header when set, else the length of an in-memory body.
    /// `None` means unknown.
    pub fn length(&self) -> Option<u64> {
        match self.headers.get("Content-Length") {
            Some(raw) => raw.trim().parse().ok(),
            None => self.body.byte_len(),
        }
    }

    pub fn set_length(&mut self, len: u64) {
        self.set_header("Content-Length", len.to_string());
    }

    /// Set status and body in one step.
    pub fn send(&mut self, status: u16, body: impl Into<Body>) {
        self.set_status(status);
        if status == StatusCode::NoContent.as_u16() || status == StatusCode::NotModified.as_u16() {
            self.remove_header("Content-Type");
            self.remove_header("Content-Length");
            self.remove_header("Transfer-Encoding");
        }
        self.set_body(body);
    }

    /// Serialize `data` as the JSON response body.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: u16, data: &T) -> Result<(), Error> {
        let body = serde_json::to_string(data)?;
        self.set_type("json");
        self.send(status, body);
        Ok(())
    }

    /// Response header.
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn response_headers(&self) -> &Headers {
        &self.headers
    }

    /// Set a response header; ignored once headers are sent.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        if self.headers_sent {
            return;
        }
        self.headers.set(name, value);
    }

    /// Remove a response header; ignored once headers are sent.
    pub fn remove_header(&mut self, name: &str) {
        if self.headers_sent {
            return;
        }
        self.headers.remove(name);
    }

    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    pub(crate) fn mark_headers_sent(&mut self) {
        self.headers_sent = true;
    }

    /// Move the body out for dispatch without touching status or headers.
    pub(crate) fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    /// Replace whatever the pipeline produced with the fixed 500 response.
    pub(crate) fn internal_error(&mut self) {
        let status = StatusCode::InternalServerError;
        self.headers = Headers::new();
        self.explicit_type = false;
        self.body = Body::Empty;
        self.set_status(status.as_u16());
        self.set_body(status.reason_phrase());
    }
}

/// Decode `application/x-www-form-urlencoded` input into params.
pub fn parse_urlencoded(input: &[u8]) -> Params {
    let mut params = Params::new();
    for (key, value) in form_urlencoded::parse(input) {
        let value = Value::String(value.into_owned());
        match params.get_mut(key.as_ref()) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(key.into_owned(), value);
            }
        }
    }
    params
}

fn first_token(raw: &str) -> &str {
    raw.split(',').next().unwrap_or("").trim()
}

/// Split a request target into pathname and query string.
fn split_target(target: &str) -> (&str, &str) {
    let target = target.split('#').next().unwrap_or("");

    // absolute-form: drop scheme and authority
    let rest = match target.find("://") {
        Some(pos) if !target[..pos].contains('/') => {
            let after = &target[pos + 3..];
            after
                .find(|c: char| c == '/' || c == '?')
                .map_or("", |i| &after[i..])
        }
        _ => target,
    };

    rest.split_once('?').unwrap_or((rest, ""))
}

fn mime_matches(expected: &str, actual: &str) -> bool {
    let expected = expected.trim().to_ascii_lowercase();

    if let Some(suffix) = expected.strip_prefix('+') {
        return actual.ends_with(&format!("+{suffix}"));
    }

    let expected = if expected.contains('/') {
        expected
    } else {
        match mime::lookup(&expected) {
            Some(mime) => mime.to_string(),
            None => return false,
        }
    };

    let (e_type, e_sub) = expected.split_once('/').unwrap_or((expected.as_str(), ""));
    let (a_type, a_sub) = actual.split_once('/').unwrap_or((actual, ""));
    (e_type == "*" || e_type == a_type) && (e_sub == "*" || e_sub == a_sub)
}
