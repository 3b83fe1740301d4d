//! Status codes and response head encoding.

use crate::context::Headers;

/// HTTP status codes with their standard reason phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    Accepted = 202,
    NoContent = 204,
    ResetContent = 205,
    MovedPermanently = 301,
    Found = 302,
    NotModified = 304,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    PayloadTooLarge = 413,
    InternalServerError = 500,
    NotImplemented = 501,
    BadGateway = 502,
    ServiceUnavailable = 503,
}

impl StatusCode {
    const ALL: [StatusCode; 18] = [
        StatusCode::Ok,
        StatusCode::Created,
        StatusCode::Accepted,
        StatusCode::NoContent,
        StatusCode::ResetContent,
        StatusCode::MovedPermanently,
        StatusCode::Found,
        StatusCode::NotModified,
        StatusCode::BadRequest,
        StatusCode::Unauthorized,
        StatusCode::Forbidden,
        StatusCode::NotFound,
        StatusCode::MethodNotAllowed,
        StatusCode::PayloadTooLarge,
        StatusCode::InternalServerError,
        StatusCode::NotImplemented,
        StatusCode::BadGateway,
        StatusCode::ServiceUnavailable,
    ];

    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn from_u16(code: u16) -> Option<StatusCode> {
        StatusCode::ALL.into_iter().find(|s| s.as_u16() == code)
    }

    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::ResetContent => "Reset Content",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::BadGateway => "Bad Gateway",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }
}

/// Reason phrase for any numeric status; unknown codes get an empty phrase.
pub fn reason_phrase(code: u16) -> &'static str {
    StatusCode::from_u16(code).map_or("", |s| s.reason_phrase())
}

/// Serialize a status line and headers, including the terminating blank line.
pub fn encode_head(status: u16, headers: &Headers) -> Vec<u8> {
    let mut bytes = Vec::new();

    let status_line = format!("HTTP/1.1 {status} {}\r\n", reason_phrase(status));
    bytes.extend_from_slice(status_line.as_bytes());

    for (name, value) in headers.iter() {
        let header_line = format!("{name}: {value}\r\n");
        bytes.extend_from_slice(header_line.as_bytes());
    }

    // Empty line separating headers from body
    bytes.extend_from_slice(b"\r\n");
    bytes
}

/// A fully buffered response written outside the pipeline, for requests the
/// engine rejects before any interceptor runs.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_content_type(self, content_type: &str) -> Self {
        self.with_header("Content-Type", content_type)
    }

    pub fn with_body_string(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self
    }

    /// Head and body, with `Content-Length` and `Connection: close` filled in.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut headers = self.headers.clone();
        if !headers.contains("Content-Length") {
            headers.set("Content-Length", self.body.len().to_string());
        }
        if !headers.contains("Connection") {
            headers.set("Connection", "close");
        }

        let mut bytes = encode_head(self.status.as_u16(), &headers);
        bytes.extend_from_slice(&self.body);
        bytes
    }
}
