use crate::{
    errors::Error,
    http::{reader::LineReader, request::Request, response::Response},
    limits::{ReqLimits, RespLimits},
    router::Router,
};
use tokio::io::{self, AsyncRead, AsyncWrite};

/// Serves exactly one request on `stream`, then shuts the write side down.
///
/// Every failure (I/O, parsing, handler) is returned as is. Nothing is
/// written back to the client on error, the caller drops the stream.
pub(crate) async fn serve_connection<S>(
    stream: S,
    router: &Router,
    req_limits: &ReqLimits,
    resp_limits: &RespLimits,
) -> Result<(), Error>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let (source, sink) = io::split(stream);

    let mut reader = LineReader::with_capacity(source, req_limits.buffer_size);
    let mut response = Response::with_limits(sink, resp_limits);

    let request = Request::parse(&mut reader).await?;
    router.dispatch(&request, &mut response).await?;

    response.finish().await
}
