//! Tests for the HTTP parser.

#[cfg(test)]
mod tests {
    use crate::parser::{find_head_end, parse_request, Error, HttpRequest, HttpVersion, Method};

    #[test]
    fn test_parse_simple_get_request() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::GET);
        assert_eq!(result.target, "/index.html");
        assert_eq!(result.version, HttpVersion::Http11);
        assert_eq!(result.header("Host"), Some("example.com"));
        assert!(result.body.is_empty());
    }

    #[test]
    fn test_header_names_are_lowercased() {
        let request = b"GET / HTTP/1.1\r\nHost: example.com\r\nX-Forwarded-For: 10.0.0.1\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert!(result.headers.contains_key("x-forwarded-for"));
        assert!(result.has_header("HOST"));
        assert!(result.has_header("host"));
    }

    #[test]
    fn test_repeated_headers_are_joined() {
        let request = b"GET / HTTP/1.1\r\nHost: a\r\nX-Forwarded-For: 1.1.1.1\r\nX-Forwarded-For: 2.2.2.2\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.header("x-forwarded-for"), Some("1.1.1.1, 2.2.2.2"));
    }

    #[test]
    fn test_body_is_truncated_to_content_length() {
        let request = b"POST /form HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\nhello world";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::POST);
        assert_eq!(result.body, b"hello");
        assert_eq!(result.content_length().unwrap(), Some(5));
        assert!(result.has_body());
    }

    #[test]
    fn test_http10_does_not_require_host() {
        let request = b"GET / HTTP/1.0\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.version, HttpVersion::Http10);
    }

    #[test]
    fn test_missing_host_header() {
        let request = b"GET /index.html HTTP/1.1\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MissingHeader(ref h)) if h == "Host"));
    }

    #[test]
    fn test_invalid_method() {
        let request = b"INVALID /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidMethod(ref m)) if m == "INVALID"));
    }

    #[test]
    fn test_lowercase_method_is_rejected_on_the_wire() {
        let request = b"get / HTTP/1.1\r\nHost: example.com\r\n\r\n";
        assert!(matches!(parse_request(request), Err(Error::InvalidMethod(_))));
        assert_eq!(Method::from_name("get"), Some(Method::GET));
    }

    #[test]
    fn test_invalid_http_version() {
        let request = b"GET /index.html HTTP/9.9\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidVersion(ref v)) if v == "HTTP/9.9"));
    }

    #[test]
    fn test_malformed_request_line() {
        let result = parse_request(b"GET /index.html\r\nHost: a\r\n\r\n");
        assert!(matches!(result, Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_invalid_header_format() {
        let result = parse_request(b"GET / HTTP/1.1\r\nHost: a\r\nbroken header\r\n\r\n");
        assert!(matches!(result, Err(Error::InvalidHeaderFormat)));
    }

    #[test]
    fn test_invalid_content_length() {
        let result = parse_request(b"POST / HTTP/1.1\r\nHost: a\r\nContent-Length: ten\r\n\r\n");
        assert!(matches!(result, Err(Error::InvalidContentLength(ref v)) if v == "ten"));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(parse_request(b""), Err(Error::EmptyRequest)));
    }

    #[test]
    fn test_find_head_end() {
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\nHost: a\r\n\r\nbody"), Some(27));
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\nHost: a\r\n"), None);
    }

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::get("/ping?x=1")
            .with_method(Method::POST)
            .with_header("Content-Type", "application/json")
            .with_body(b"{}".to_vec());
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("host"), Some("localhost"));
        assert_eq!(request.body, b"{}");
    }
}
