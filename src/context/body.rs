//! Response body values.

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::io::AsyncRead;

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

/// A readable source piped to the client when the response is dispatched.
///
/// The reader is released when the stream is dropped, which happens once the
/// response finishes or the body is replaced.
pub struct BodyStream {
    id: u64,
    reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl BodyStream {
    pub fn new(reader: impl AsyncRead + Send + 'static) -> Self {
        Self {
            id: NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed),
            reader: Box::pin(reader),
        }
    }

    /// Identity of this stream; distinct for every constructed stream.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The underlying reader; `Unpin`, so it can be handed to `tokio::io::copy`.
    pub fn reader_mut(&mut self) -> &mut Pin<Box<dyn AsyncRead + Send>> {
        &mut self.reader
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyStream").field("id", &self.id).finish()
    }
}

/// The value a handler assigns as the response body.
#[derive(Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    Text(String),
    Bytes(Vec<u8>),
    Stream(BodyStream),
    /// Serialized at dispatch time; its length is not known up front.
    Json(Value),
}

impl Body {
    pub fn stream(reader: impl AsyncRead + Send + 'static) -> Self {
        Body::Stream(BodyStream::new(reader))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Body::Stream(_))
    }

    /// Byte length for in-memory bodies.
    pub fn byte_len(&self) -> Option<u64> {
        match self {
            Body::Text(s) => Some(s.len() as u64),
            Body::Bytes(b) => Some(b.len() as u64),
            Body::Empty | Body::Stream(_) | Body::Json(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn stream_id(&self) -> Option<u64> {
        match self {
            Body::Stream(s) => Some(s.id()),
            _ => None,
        }
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Text(value)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Body::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Body::Bytes(value)
    }
}

impl From<&[u8]> for Body {
    fn from(value: &[u8]) -> Self {
        Body::Bytes(value.to_vec())
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<BodyStream> for Body {
    fn from(value: BodyStream) -> Self {
        Body::Stream(value)
    }
}

impl<T: Into<Body>> From<Option<T>> for Body {
    fn from(value: Option<T>) -> Self {
        value.map_or(Body::Empty, Into::into)
    }
}
