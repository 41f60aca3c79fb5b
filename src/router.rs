use crate::{errors::Error, http::request::Request, http::response::Response};
use std::{fmt, future::Future, pin::Pin};
use tracing::{debug, warn};

/// A trait for handling HTTP requests and writing responses.
///
/// `&self` is shared by every connection at once, keep per-request state in
/// locals. An `Err` ends the connection without any further response.
///
/// # Examples
///
/// ```
/// use embed_http::{Error, Handler, HeaderName, Request, Response, StatusCode};
///
/// struct Echo;
///
/// impl Handler for Echo {
///     async fn handle(&self, req: &Request, resp: &mut Response) -> Result<(), Error> {
///         resp.write_headers(StatusCode::Ok, &[(HeaderName::ContentType, "text/plain")])
///             .await?;
///         resp.write_str(req.path()).await
///     }
/// }
/// ```
pub trait Handler
where
    Self: Send + Sync + 'static,
{
    /// Processes one request.
    ///
    /// # Errors
    ///
    /// Whatever the handler returns, usually a write failure. The server logs
    /// it and drops the connection.
    fn handle(
        &self,
        request: &Request,
        response: &mut Response,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;

// Object safe view of `Handler`, so one table can hold different handler types.
trait ErasedHandler: Send + Sync {
    fn call<'a>(&'a self, request: &'a Request, response: &'a mut Response) -> HandlerFuture<'a>;
}

impl<H: Handler> ErasedHandler for H {
    #[inline]
    fn call<'a>(&'a self, request: &'a Request, response: &'a mut Response) -> HandlerFuture<'a> {
        Box::pin(self.handle(request, response))
    }
}

/// Route table: match keys tried in registration order, plus a fallback.
///
/// A key matches when it occurs **anywhere** in the lower-cased request
/// path, it is not a prefix match. With a key `"api"` both `/v1/api/users`
/// and `/apiary` are routed to the same handler, so order and choose keys
/// with that in mind. Keys should be lower case, a key with an upper-case
/// letter never matches.
///
/// Built once with [`Router::builder`] and read-only afterwards.
///
/// # Examples
///
/// ```
/// use embed_http::{Error, Handler, Request, Response, Router, StatusCode};
///
/// struct Status(StatusCode);
///
/// impl Handler for Status {
///     async fn handle(&self, _: &Request, resp: &mut Response) -> Result<(), Error> {
///         resp.write_headers(self.0, &[]).await
///     }
/// }
///
/// let router = Router::builder()
///     .route("/health", Status(StatusCode::NoContent))
///     .route("/api/", Status(StatusCode::Ok))
///     .fallback(Status(StatusCode::NotFound))
///     .build();
///
/// assert_eq!(router.route_for("/API/users"), Some("/api/"));
/// assert_eq!(router.route_for("/internal/health"), Some("/health"));
/// assert_eq!(router.route_for("/"), None); // fallback
/// ```
pub struct Router {
    routes: Vec<(String, Box<dyn ErasedHandler>)>,
    fallback: Box<dyn ErasedHandler>,
}

impl Router {
    #[inline]
    pub fn builder() -> RouterBuilder {
        RouterBuilder {
            routes: Vec::new(),
            fallback: None,
        }
    }

    /// Key of the route `path` is dispatched to, `None` for the fallback.
    #[inline]
    pub fn route_for(&self, path: &str) -> Option<&str> {
        self.find(&path.to_lowercase()).map(|(key, _)| key.as_str())
    }

    /// Invokes the handler selected for the request path.
    pub async fn dispatch(&self, request: &Request, response: &mut Response) -> Result<(), Error> {
        let path = request.path().to_lowercase();

        let handler = match self.find(&path) {
            Some((key, handler)) => {
                debug!(path = %request.path(), route = %key, "dispatching request");
                handler
            }
            None => {
                debug!(path = %request.path(), "no route matched, using fallback");
                &self.fallback
            }
        };

        handler.call(request, response).await
    }

    #[inline]
    fn find(&self, lower_path: &str) -> Option<&(String, Box<dyn ErasedHandler>)> {
        self.routes
            .iter()
            .find(|(key, _)| lower_path.contains(key.as_str()))
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Router`].
pub struct RouterBuilder {
    routes: Vec<(String, Box<dyn ErasedHandler>)>,
    fallback: Option<Box<dyn ErasedHandler>>,
}

impl RouterBuilder {
    /// Adds a route. Earlier routes win over later ones.
    #[inline]
    pub fn route<H: Handler>(mut self, key: impl Into<String>, handler: H) -> Self {
        self.routes.push((key.into(), Box::new(handler)));
        self
    }

    /// Sets the handler for paths no route matches.
    ///
    /// **This is a required component.**
    #[inline(always)]
    pub fn fallback<H: Handler>(mut self, handler: H) -> Self {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// # Panics
    ///
    /// Error message: `The `fallback` method must be called to create`
    ///
    /// Panics when no fallback handler was set.
    #[inline]
    #[track_caller]
    pub fn build(self) -> Router {
        for (key, _) in &self.routes {
            if key.bytes().any(|b| b.is_ascii_uppercase()) {
                warn!(route = %key, "route key has upper-case letters and will never match");
            }
        }

        Router {
            routes: self.routes,
            fallback: self
                .fallback
                .expect("The `fallback` method must be called to create"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{http::reader::LineReader, StatusCode};
    use tokio::io::{duplex, AsyncReadExt};

    struct Tag(&'static str);

    impl Handler for Tag {
        async fn handle(&self, _: &Request, resp: &mut Response) -> Result<(), Error> {
            resp.write_str(self.0).await
        }
    }

    struct Fails;

    impl Handler for Fails {
        async fn handle(&self, req: &Request, _: &mut Response) -> Result<(), Error> {
            req.query().single("id").map(|_| ())
        }
    }

    fn router() -> Router {
        Router::builder()
            .route("api", Tag("h1"))
            .route("static", Tag("h2"))
            .fallback(Tag("h0"))
            .build()
    }

    async fn dispatched(router: &Router, path: &str) -> Result<String, Error> {
        let data = format!("GET {path} HTTP/1.1\r\n\r\n");
        let request = Request::parse(&mut LineReader::new(data.as_bytes())).await?;

        let (mut client, server) = duplex(256);
        let mut response = Response::new(server);
        router.dispatch(&request, &mut response).await?;
        drop(response);

        let mut wire = String::new();
        client.read_to_string(&mut wire).await?;
        Ok(wire)
    }

    #[tokio::test]
    async fn substring_dispatch() {
        let router = router();

        #[rustfmt::skip]
        let cases = [
            ("/v1/api/users",       "h1"),
            ("/other",              "h0"),
            ("/static/app.js",      "h2"),
            ("/API/Users",          "h1"),
            ("/apiary",             "h1"),
            ("/static/api.js",      "h1"), // first registered key wins
            ("/",                   "h0"),
            ("/x?route=api",        "h0"), // only the path is matched
        ];

        for (path, expected) in cases {
            assert_eq!(dispatched(&router, path).await.unwrap(), expected, "{path}");
        }
    }

    #[test]
    fn route_for() {
        let router = router();

        assert_eq!(router.route_for("/v1/api/users"), Some("api"));
        assert_eq!(router.route_for("/STATIC/"), Some("static"));
        assert_eq!(router.route_for("/other"), None);
    }

    #[test]
    fn upper_case_keys_never_match() {
        let router = Router::builder()
            .route("/Admin", Tag("admin"))
            .fallback(Tag("h0"))
            .build();

        assert_eq!(router.route_for("/Admin"), None);
        assert_eq!(router.route_for("/admin"), None);
    }

    #[test]
    fn empty_key_matches_everything() {
        let router = Router::builder()
            .route("", Tag("any"))
            .fallback(Tag("h0"))
            .build();

        assert_eq!(router.route_for("/whatever"), Some(""));
    }

    #[tokio::test]
    async fn handler_errors_propagate() {
        let router = Router::builder().route("/items", Fails).fallback(Tag("h0")).build();

        assert_eq!(
            dispatched(&router, "/items?id=1&id=2").await,
            Err(Error::AmbiguousParameter("id".to_owned()))
        );
        assert_eq!(dispatched(&router, "/items?id=1").await, Ok(String::new()));
    }

    #[tokio::test]
    async fn handlers_write_full_responses() {
        struct Created;

        impl Handler for Created {
            async fn handle(&self, _: &Request, resp: &mut Response) -> Result<(), Error> {
                resp.write_headers(StatusCode::Created, &[]).await?;
                resp.write_str("done").await
            }
        }

        let router = Router::builder().fallback(Created).build();

        assert_eq!(
            dispatched(&router, "/anything").await.unwrap(),
            "HTTP/1.1 201 Created\r\nConnection: close\r\n\r\ndone"
        );
    }

    #[test]
    #[should_panic(expected = "The `fallback` method must be called to create")]
    fn build_requires_fallback() {
        let _ = Router::builder().route("api", Tag("h1")).build();
    }
}
