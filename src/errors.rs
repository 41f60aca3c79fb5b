use crate::multipart::MultipartError;
use std::{fmt, io};
use thiserror::Error as ThisError;

/// Everything that can fail while parsing, dispatching or writing a request.
///
/// None of these produce an automatic error response. A failure ends the
/// enclosing call, and the connection task logs it and drops the socket.
#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    /// The first token of the request line is not a supported method.
    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),

    /// The request line has fewer than two space separated tokens
    /// (or the stream ended before any line arrived).
    #[error("malformed request line `{0}`")]
    MalformedRequestLine(String),

    /// A numeric status code with no status line text.
    #[error("status code {0} has no status line text")]
    UnmappedStatus(u16),

    /// Header text that matches no [`HeaderName`](crate::HeaderName).
    #[error("`{0}` is not a recognized header name")]
    UnmappedHeaderName(String),

    /// A single-value query lookup matched more than one parameter.
    #[error("query parameter `{0}` occurs more than once")]
    AmbiguousParameter(String),

    #[error("multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("I/O error: {0}")]
    Io(IoError),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(IoError(err))
    }
}

/// [`io::Error`] compared by [`io::ErrorKind`] only.
#[derive(Debug)]
pub struct IoError(pub io::Error);

impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
