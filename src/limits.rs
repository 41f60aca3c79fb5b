//! Per-connection buffer sizes
//!
//! # Memory Consumption
//!
//! Each active connection holds:
//!
//! `Total` = [`Read Buffer`](crate::limits::ReqLimits::buffer_size) +
//!           [`Header Block`](crate::limits::RespLimits::default_capacity) +
//!           `Request` (line, headers and body as owned strings)
//!
//! The read buffer is allocated once when the connection is accepted and
//! never grows. The header block buffer lives only while
//! [`write_headers`](crate::Response::write_headers) runs.
//!
//! # Examples
//!
//! ```no_run
//! use embed_http::{limits::{ReqLimits, RespLimits}, Router, Server};
//! # use embed_http::{Error, Handler, Request, Response};
//! # struct NotFound;
//! # impl Handler for NotFound {
//! #     async fn handle(&self, _: &Request, _: &mut Response) -> Result<(), Error> { Ok(()) }
//! # }
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     Server::builder()
//!         .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
//!         .router(Router::builder().fallback(NotFound).build())
//!         .request_limits(ReqLimits {
//!             buffer_size: 16 * 1024,
//!             ..ReqLimits::default()
//!         })
//!         .response_limits(RespLimits {
//!             default_capacity: 256,
//!             ..RespLimits::default()
//!         })
//!         .build()
//!         .launch()
//!         .await;
//! }
//! ```

/// Configuration for request reading.
#[derive(Debug, Clone)]
pub struct ReqLimits {
    /// Capacity of the fixed read buffer of every connection (default: `8192 B`).
    ///
    /// This is the largest amount of bytes requested from the socket in one
    /// read. A read that fills the whole buffer is taken as a sign that more
    /// bytes are waiting, so while reading a body to its end the reader keeps
    /// reading only as long as reads come back full.
    ///
    /// Zero is treated as one byte.
    pub buffer_size: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ReqLimits {
    fn default() -> Self {
        Self {
            buffer_size: crate::http::reader::DEFAULT_BUFFER_SIZE,

            _priv: (),
        }
    }
}

/// Configuration for response header assembly.
#[derive(Debug, Clone)]
pub struct RespLimits {
    /// Initial capacity of the buffer the header block is built in (default: `1024 B`)
    ///
    /// The status line and all header lines are assembled in one buffer and
    /// written with a single call, the buffer grows if the headers need more.
    pub default_capacity: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for RespLimits {
    fn default() -> Self {
        Self {
            default_capacity: 1024,

            _priv: (),
        }
    }
}
