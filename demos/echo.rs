use embed_http::{Body, Error, Handler, HeaderName, Request, Response, Router, Server, StatusCode};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

struct Echo;

impl Handler for Echo {
    async fn handle(&self, req: &Request, resp: &mut Response) -> Result<(), Error> {
        let query = req
            .query()
            .iter()
            .map(|(key, value)| format!("{key:?}: {:?}", value.unwrap_or("")))
            .collect::<Vec<_>>()
            .join(", ");

        let body = match req.body() {
            Body::Empty => String::new(),
            Body::Text(text) => format!(r#", "body": {text:?}"#),
            Body::Multipart(form) => format!(r#", "parts": {}"#, form.len()),
        };

        let result = format!(
            r#"{{"method": "{}", "path": {:?}, "query": {{{query}}}{body}}}"#,
            req.method(),
            req.path()
        );
        let len = result.len().to_string();

        resp.write_headers(
            StatusCode::Ok,
            &[
                (HeaderName::ContentType, "application/json"),
                (HeaderName::ContentLength, len.as_str()),
            ],
        )
        .await?;
        resp.write_str(&result).await
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    Server::builder()
        .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
        .router(Router::builder().fallback(Echo).build())
        .build()
        .launch()
        .await;
}
