//! embed_http - Embeddable HTTP/1.1 protocol core
//!
//! Turns a raw forward-only byte stream into a structured [`Request`],
//! dispatches it through a substring-matching [`Router`] and writes the
//! [`Response`] straight back onto the stream. Small enough to link into a
//! host application that needs a few local HTTP endpoints.
//!
//! # Protocol Support
//!
//! - **HTTP/1.1 request line and headers**, one request per connection
//!   (`Connection: close` is sent unless a handler says otherwise)
//! - **Bodies** read to the end of what the client sent: plain text or
//!   [`multipart/form-data`](multipart)
//! - **Not supported**: keep-alive, pipelining, chunked encoding, TLS,
//!   HTTP/2, compression, timeouts
//!
//! # Building blocks
//!
//! - [`LineReader`] - buffered line, byte and read-to-end access over any
//!   [`AsyncRead`](tokio::io::AsyncRead), correct across fragmented reads
//! - [`Request::parse`] - request line, headers and body
//! - [`Response`] - status line, headers and raw body writes
//! - [`Router`] + [`Handler`] - first route key contained in the path wins
//! - [`Server`] - tokio accept loop, one task per connection
//!
//! # Examples
//!
//! Quick start:
//! ```no_run
//! use embed_http::{Error, Handler, Request, Response, Router, Server, StatusCode};
//! use tokio::net::TcpListener;
//!
//! struct MyHandler;
//!
//! impl Handler for MyHandler {
//!     async fn handle(&self, _: &Request, resp: &mut Response) -> Result<(), Error> {
//!         resp.write_headers(StatusCode::Ok, &[]).await?;
//!         resp.write_str("Hello World!").await
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     Server::builder()
//!         .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
//!         .router(Router::builder().fallback(MyHandler).build())
//!         .build()
//!         .launch()
//!         .await;
//! }
//! ```
//! Without the server, on any pair of streams:
//! ```
//! use embed_http::{Body, LineReader, Method, Request};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), embed_http::Error> {
//! let wire = b"POST /notes?tag=a&tag=b HTTP/1.1\r\nContent-Type: text/plain\r\n\r\nbuy milk";
//! let request = Request::parse(&mut LineReader::new(&wire[..])).await?;
//!
//! assert_eq!(request.method(), Method::Post);
//! assert_eq!(request.path(), "/notes");
//! assert_eq!(request.query().get_all("tag").count(), 2);
//! assert_eq!(request.body(), &Body::Text("buy milk".into()));
//! # Ok(())
//! # }
//! ```

pub(crate) mod http {
    pub mod multipart;
    pub mod query;
    pub(crate) mod reader;
    pub(crate) mod request;
    pub(crate) mod response;
    pub(crate) mod types;
}
pub(crate) mod server {
    pub(crate) mod connection;
    pub(crate) mod server_impl;
}
pub(crate) mod errors;
pub mod limits;
mod router;

pub use crate::{
    errors::{Error, IoError},
    http::{
        multipart,
        query,
        reader::LineReader,
        request::{Body, Request, RequestLine},
        response::Response,
        types::{HeaderName, Method, StatusCode},
    },
    router::{Handler, Router, RouterBuilder},
    server::server_impl::{Server, ServerBuilder},
};
