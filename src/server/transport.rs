//! Reading requests from and writing responses to a byte stream.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::context::{Body, BodyStream, Context, EMPTY_BODY_STATUSES};
use crate::parser::{find_head_end, parse_request, Error as ParserError, HttpRequest};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::response::encode_head;

/// Value of the `Server` response header.
pub const SERVER_NAME: &str = "flowhttp";

/// Read one request: the head, then exactly `Content-Length` body bytes.
///
/// Returns `Ok(None)` when the peer closes before sending anything.
pub async fn read_request<R>(socket: &mut R, config: &ServerConfig) -> Result<Option<HttpRequest>, Error>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(config.read_buffer_size);
    let mut chunk = vec![0; config.read_buffer_size.max(1)];

    let head_end = loop {
        if let Some(end) = find_head_end(&buf) {
            break end;
        }
        if buf.len() > config.max_header_size {
            return Err(ParserError::HeadTooLarge(config.max_header_size).into());
        }

        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            // Peer stopped writing; let the parser judge what arrived.
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let mut request = parse_request(&buf[..head_end])?;
    let length = request.content_length()?.unwrap_or(0);
    if length > config.max_body_size {
        return Err(Error::PayloadTooLarge(length));
    }

    let mut body = buf.split_off(head_end);
    while body.len() < length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(ParserError::Incomplete.into());
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(length);
    request.body = body;

    Ok(Some(request))
}

enum Payload {
    Buffered(Vec<u8>),
    Streamed(BodyStream),
}

/// Write the response described by `ctx`.
///
/// Buffered bodies get a `Content-Length` unless one is already set. Stream
/// bodies are copied until the reader ends. Nothing follows the head for
/// HEAD requests or for 204, 205 and 304.
pub async fn write_response<W>(socket: &mut W, ctx: &mut Context, head_only: bool) -> Result<(), Error>
where
    W: AsyncWrite + Unpin,
{
    let bodyless = head_only || EMPTY_BODY_STATUSES.contains(&ctx.status());

    let payload = match ctx.take_body() {
        Body::Stream(stream) => Payload::Streamed(stream),
        Body::Empty => Payload::Buffered(Vec::new()),
        Body::Text(text) => Payload::Buffered(text.into_bytes()),
        Body::Bytes(bytes) => Payload::Buffered(bytes),
        Body::Json(value) => {
            if ctx.content_type().is_none() {
                ctx.set_type("json");
            }
            Payload::Buffered(serde_json::to_vec(&value)?)
        }
    };

    if let Payload::Buffered(bytes) = &payload {
        if !EMPTY_BODY_STATUSES.contains(&ctx.status()) && ctx.response_header("Content-Length").is_none() {
            ctx.set_length(bytes.len() as u64);
        }
    }
    if ctx.response_header("Server").is_none() {
        ctx.set_header("Server", SERVER_NAME);
    }
    ctx.set_header("Connection", "close");

    let head = encode_head(ctx.status(), ctx.response_headers());
    socket.write_all(&head).await?;
    ctx.mark_headers_sent();

    if !bodyless {
        match payload {
            Payload::Buffered(bytes) => socket.write_all(&bytes).await?,
            Payload::Streamed(mut stream) => {
                tokio::io::copy(stream.reader_mut(), socket).await?;
            }
        }
    }

    socket.flush().await?;
    Ok(())
}
