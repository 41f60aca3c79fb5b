//! Response writer bound to one output sink.

use crate::{
    errors::Error,
    http::types::{HeaderName, StatusCode},
    limits::RespLimits,
};
use std::fmt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// HTTP response writer.
///
/// Writes go straight to the sink, nothing is buffered between calls:
/// - [`write_headers`](Response::write_headers) once, first
/// - [`write_str`](Response::write_str) / [`write_bytes`](Response::write_bytes)
///   any number of times
///
/// No `Content-Length` is computed. A handler that wants one measures its
/// body and passes the header itself.
///
/// Instances are created by the server and passed to
/// [`Handler::handle`](crate::Handler::handle).
///
/// # Examples
/// ```
/// use embed_http::{Error, HeaderName, Request, Response, StatusCode};
///
/// // In your implementation `Handler`
/// async fn handle(_req: &Request, resp: &mut Response) -> Result<(), Error> {
///     let body = "<h1>Hello World</h1>";
///     let len = body.len().to_string();
///
///     resp.write_headers(
///         StatusCode::Ok,
///         &[
///             (HeaderName::ContentType, "text/html"),
///             (HeaderName::ContentLength, len.as_str()),
///         ],
///     )
///     .await?;
///     resp.write_str(body).await
/// }
/// ```
///
/// # Panics
/// Calling `write_headers` twice panics in `debug` mode. In `release` mode
/// the check is omitted and a second header block is written as is.
pub struct Response {
    sink: Box<dyn AsyncWrite + Send + Unpin>,
    capacity: usize,
    headers_written: bool,
}

impl Response {
    /// Creates a writer over `sink` with default [`RespLimits`].
    #[inline]
    pub fn new<W>(sink: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::with_limits(sink, &RespLimits::default())
    }

    #[inline]
    pub fn with_limits<W>(sink: W, limits: &RespLimits) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Response {
            sink: Box::new(sink),
            capacity: limits.default_capacity,
            headers_written: false,
        }
    }

    /// Whether the header block has been written.
    #[inline(always)]
    pub const fn headers_written(&self) -> bool {
        self.headers_written
    }

    /// Writes the status line and the header block.
    ///
    /// Headers are written in the given order. A header whose value is empty
    /// or only whitespace is left out. Unless one of `headers` is
    /// [`HeaderName::Connection`], `Connection: close` is added last.
    ///
    /// # Examples
    /// ```
    /// use embed_http::{HeaderName, Response, StatusCode};
    /// use tokio::io::AsyncReadExt;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), embed_http::Error> {
    /// let (mut client, server) = tokio::io::duplex(256);
    ///
    /// let mut resp = Response::new(server);
    /// resp.write_headers(StatusCode::NoContent, &[(HeaderName::CacheControl, "no-store")])
    ///     .await?;
    /// drop(resp);
    ///
    /// let mut wire = String::new();
    /// client.read_to_string(&mut wire).await?;
    /// assert_eq!(
    ///     wire,
    ///     "HTTP/1.1 204 No Content\r\nCache-Control: no-store\r\nConnection: close\r\n\r\n"
    /// );
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Panics
    /// Error message: `Headers must be written only once`
    ///
    /// Panics in `debug` mode when called a second time.
    pub async fn write_headers(
        &mut self,
        status: StatusCode,
        headers: &[(HeaderName, &str)],
    ) -> Result<(), Error> {
        debug_assert!(!self.headers_written, "Headers must be written only once");
        self.headers_written = true;

        let block = header_block(status, headers, self.capacity);
        self.sink.write_all(&block).await?;

        Ok(())
    }

    /// Writes `text` as is.
    #[inline]
    pub async fn write_str(&mut self, text: &str) -> Result<(), Error> {
        self.write_bytes(text.as_bytes()).await
    }

    /// Writes `bytes` as is.
    #[inline]
    pub async fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.sink.write_all(bytes).await?;
        Ok(())
    }

    /// Flushes and shuts down the sink.
    #[inline]
    pub async fn finish(&mut self) -> Result<(), Error> {
        self.sink.shutdown().await?;
        Ok(())
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("capacity", &self.capacity)
            .field("headers_written", &self.headers_written)
            .finish_non_exhaustive()
    }
}

fn header_block(status: StatusCode, headers: &[(HeaderName, &str)], capacity: usize) -> Vec<u8> {
    let mut block = Vec::with_capacity(capacity);
    block.extend_from_slice(status.status_line().as_bytes());

    for (name, value) in headers {
        if value.trim().is_empty() {
            continue;
        }

        block.extend_from_slice(name.as_str().as_bytes());
        block.extend_from_slice(b": ");
        block.extend_from_slice(value.as_bytes());
        block.extend_from_slice(b"\r\n");
    }

    if !headers.iter().any(|(name, _)| *name == HeaderName::Connection) {
        block.extend_from_slice(b"Connection: close\r\n");
    }

    block.extend_from_slice(b"\r\n");
    block
}
