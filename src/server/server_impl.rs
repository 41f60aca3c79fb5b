use crate::{
    limits::{ReqLimits, RespLimits},
    router::Router,
    server::connection::serve_connection,
};
use std::{io, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// An HTTP server that accepts connections and serves one request on each.
///
/// Every accepted connection runs in its own tokio task. A failure in one
/// connection is logged and that socket dropped, the accept loop and all
/// other connections keep going. There is no limit on concurrent
/// connections and no timeout for clients that stall.
///
/// # Examples
///
/// ```no_run
/// use embed_http::{Error, Handler, Request, Response, Router, Server, StatusCode};
/// use tokio::net::TcpListener;
///
/// struct Hello;
///
/// impl Handler for Hello {
///     async fn handle(&self, _: &Request, resp: &mut Response) -> Result<(), Error> {
///         resp.write_headers(StatusCode::Ok, &[]).await?;
///         resp.write_str("Hello world!").await
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     Server::builder()
///         .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
///         .router(Router::builder().fallback(Hello).build())
///         .build()
///         .launch()
///         .await
/// }
/// ```
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
    req_limits: Arc<ReqLimits>,
    resp_limits: Arc<RespLimits>,
}

impl Server {
    /// Creates a new builder for configuring the server instance.
    #[inline]
    pub fn builder() -> ServerBuilder {
        ServerBuilder {
            listener: None,
            router: None,

            request_limits: None,
            response_limits: None,
        }
    }

    /// Address the listener is bound to.
    #[inline]
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Starts accepting connections. Never returns.
    pub async fn launch(self) {
        match self.listener.local_addr() {
            Ok(addr) => info!(%addr, "server started"),
            Err(err) => info!(error = %err, "server started"),
        }

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(value) => value,
                Err(err) => {
                    warn!(error = %err, "failed to accept connection");
                    continue;
                }
            };

            let router = self.router.clone();
            let req_limits = self.req_limits.clone();
            let resp_limits = self.resp_limits.clone();

            tokio::spawn(async move {
                if let Err(err) = serve_connection(stream, &router, &req_limits, &resp_limits).await
                {
                    warn!(%peer, error = %err, "connection dropped");
                }
            });
        }
    }
}

/// Builder for configuring and creating [`Server`] instances.
#[derive(Debug)]
pub struct ServerBuilder {
    listener: Option<TcpListener>,
    router: Option<Router>,

    request_limits: Option<ReqLimits>,
    response_limits: Option<RespLimits>,
}

impl ServerBuilder {
    /// Sets the TCP listener that the server will use to accept connections.
    ///
    /// **This is a required component.**
    #[inline(always)]
    pub fn listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Sets the route table shared by all connections.
    ///
    /// **This is a required component.**
    #[inline(always)]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// See [`ReqLimits`].
    #[inline(always)]
    pub fn request_limits(mut self, limits: ReqLimits) -> Self {
        self.request_limits = Some(limits);
        self
    }

    /// See [`RespLimits`].
    #[inline(always)]
    pub fn response_limits(mut self, limits: RespLimits) -> Self {
        self.response_limits = Some(limits);
        self
    }

    /// # Panics
    ///
    /// Error messages:
    /// - `The `listener` method must be called to create`
    /// - `The `router` method must be called to create`
    ///
    /// Panics when a required component is missing.
    #[inline]
    #[track_caller]
    pub fn build(self) -> Server {
        Server {
            listener: self
                .listener
                .expect("The `listener` method must be called to create"),
            router: Arc::new(
                self.router
                    .expect("The `router` method must be called to create"),
            ),
            req_limits: Arc::new(self.request_limits.unwrap_or_default()),
            resp_limits: Arc::new(self.response_limits.unwrap_or_default()),
        }
    }
}
