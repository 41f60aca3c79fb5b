use embed_http::{Error, Handler, HeaderName, Request, Response, Router, Server, StatusCode};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

struct Text(StatusCode, &'static str);

impl Handler for Text {
    async fn handle(&self, _: &Request, resp: &mut Response) -> Result<(), Error> {
        let len = self.1.len().to_string();

        resp.write_headers(
            self.0,
            &[
                (HeaderName::ContentType, "text/plain"),
                (HeaderName::ContentLength, len.as_str()),
            ],
        )
        .await?;
        resp.write_str(self.1).await
    }
}

struct Greet;

impl Handler for Greet {
    async fn handle(&self, req: &Request, resp: &mut Response) -> Result<(), Error> {
        // `?name=a&name=b` is rejected and the connection dropped
        let name = req.query().single("name")?.unwrap_or("stranger");
        let body = format!("Hello, {name}!");

        resp.write_headers(StatusCode::Ok, &[(HeaderName::ContentType, "text/plain")])
            .await?;
        resp.write_str(&body).await
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Keys match anywhere in the lower-cased path, first one wins
    let router = Router::builder()
        .route("/health", Text(StatusCode::Ok, "ok"))
        .route("/greet", Greet)
        .route("/admin", Text(StatusCode::Forbidden, "forbidden"))
        .fallback(Text(StatusCode::NotFound, "not found"))
        .build();

    Server::builder()
        .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
        .router(router)
        .build()
        .launch()
        .await;
}
