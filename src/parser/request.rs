//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// A request as read off the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The raw request target, including any query string
    pub target: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// Header names are stored lower-cased; repeated headers are joined with ", "
    pub headers: HashMap<String, String>,
    /// The raw request body
    pub body: Vec<u8>,
    /// Address of the peer, when the request came from a socket
    pub remote_addr: Option<SocketAddr>,
}

impl HttpRequest {
    /// Create a request with an empty body.
    ///
    /// Header names are normalized to lower case.
    pub fn new(
        method: Method,
        target: impl Into<String>,
        version: HttpVersion,
        headers: HashMap<String, String>,
    ) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();

        Self {
            method,
            target: target.into(),
            version,
            headers,
            body: Vec::new(),
            remote_addr: None,
        }
    }

    /// Shorthand used by tests and in-process callers: an HTTP/1.1 request
    /// to `target` with a `Host: localhost` header.
    pub fn get(target: impl Into<String>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("host".to_string(), "localhost".to_string());
        Self::new(Method::GET, target, HttpVersion::Http11, headers)
    }

    /// Replace the request method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header, joining with any existing value of the same name.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, name, value.into());
        self
    }

    /// Replace the request body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// The declared Content-Length, if any.
    pub fn content_length(&self) -> Result<Option<usize>, Error> {
        match self.header("content-length") {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map(Some)
                .map_err(|_| Error::InvalidContentLength(raw.to_string())),
        }
    }

    /// Whether the request announces a body, either by length or by
    /// transfer encoding.
    pub fn has_body(&self) -> bool {
        self.has_header("transfer-encoding")
            || matches!(self.content_length(), Ok(Some(n)) if n > 0)
    }
}

fn insert_header(headers: &mut HashMap<String, String>, name: &str, value: String) {
    headers
        .entry(name.to_ascii_lowercase())
        .and_modify(|existing| {
            existing.push_str(", ");
            existing.push_str(&value);
        })
        .or_insert(value);
}

/// Offset just past the blank line that terminates the request head.
pub fn find_head_end(input: &[u8]) -> Option<usize> {
    input
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

/// Parse an HTTP request from a byte slice.
///
/// Bytes after the head are taken as the body, truncated to Content-Length
/// when one is declared.
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    if input.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let (head, rest) = match find_head_end(input) {
        Some(end) => (&input[..end], &input[end..]),
        None => (input, &[][..]),
    };

    let head = std::str::from_utf8(head)
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;
    let mut lines = head.lines();

    let request_line = lines.next().ok_or(Error::EmptyRequest)?;

    // Split the request line into method, target, and version
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    }

    let method = Method::from_str(parts[0])?;
    let target = parts[1];
    if target.is_empty() {
        return Err(Error::InvalidPath);
    }
    let version = HttpVersion::from_str(parts[2])?;

    let mut headers = HashMap::new();
    for line in lines {
        // Empty line indicates the end of headers
        if line.is_empty() {
            break;
        }

        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidHeaderFormat);
        }
        insert_header(&mut headers, name, value.trim().to_string());
    }

    if version == HttpVersion::Http11 && !headers.contains_key("host") {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    let mut request = HttpRequest::new(method, target, version, headers);
    let body = match request.content_length()? {
        Some(len) => &rest[..len.min(rest.len())],
        None => rest,
    };
    request.body = body.to_vec();
    Ok(request)
}
