use embed_http::{Error, Handler, HeaderName, Request, Response, Router, Server, StatusCode};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

struct HelloWorld;

impl Handler for HelloWorld {
    async fn handle(&self, _: &Request, resp: &mut Response) -> Result<(), Error> {
        resp.write_headers(
            StatusCode::Ok,
            &[
                (HeaderName::ContentType, "text/plain"),
                (HeaderName::ContentLength, "13"),
            ],
        )
        .await?;
        resp.write_str("Hello, world!").await
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    Server::builder()
        .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
        .router(Router::builder().fallback(HelloWorld).build())
        .build()
        .launch()
        .await;
}
