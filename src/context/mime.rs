//! Content-type resolution from short hints.
//!
//! A hint is either a full mime type (`text/plain`), an extension with or
//! without a leading dot (`.css`, `json`), or a file name (`logo.png`).

const TYPES: &[(&str, &str)] = &[
    ("bin", "application/octet-stream"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("gif", "image/gif"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("ico", "image/vnd.microsoft.icon"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("map", "application/json"),
    ("markdown", "text/markdown"),
    ("md", "text/markdown"),
    ("mjs", "application/javascript"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("text", "text/plain"),
    ("txt", "text/plain"),
    ("wasm", "application/wasm"),
    ("webp", "image/webp"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("xml", "application/xml"),
    ("yaml", "text/yaml"),
    ("yml", "text/yaml"),
    ("zip", "application/zip"),
];

/// Mime type registered for an extension or file name.
pub fn lookup(hint: &str) -> Option<&'static str> {
    let ext = hint.rsplit('.').next()?.to_ascii_lowercase();
    TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Full Content-Type header value for `hint`, with a UTF-8 charset added to
/// textual types that do not carry one.
pub fn content_type(hint: &str) -> Option<String> {
    let hint = hint.trim();
    if hint.is_empty() {
        return None;
    }

    let mime = if hint.contains('/') {
        hint.to_string()
    } else {
        lookup(hint)?.to_string()
    };

    if mime.contains("charset") {
        return Some(mime);
    }
    match charset(&mime) {
        Some(cs) => Some(format!("{mime}; charset={cs}")),
        None => Some(mime),
    }
}

fn charset(mime: &str) -> Option<&'static str> {
    let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    let textual = essence.starts_with("text/")
        || matches!(
            essence.as_str(),
            "application/json" | "application/javascript" | "application/xml"
        );
    textual.then_some("utf-8")
}
