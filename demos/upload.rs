//! Try it with:
//! `curl -F note=hi -F file=@Cargo.toml http://127.0.0.1:8080/upload`

use embed_http::{Body, Error, Handler, HeaderName, Request, Response, Router, Server, StatusCode};
use std::fmt::Write;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

struct Upload;

impl Handler for Upload {
    async fn handle(&self, req: &Request, resp: &mut Response) -> Result<(), Error> {
        let Body::Multipart(form) = req.body() else {
            resp.write_headers(StatusCode::BadRequest, &[]).await?;
            return resp.write_str("expected multipart/form-data").await;
        };

        let mut summary = String::new();
        for part in form.parts() {
            let _ = match &part.filename {
                Some(filename) => writeln!(
                    summary,
                    "file {}: {filename} ({} bytes, {})",
                    part.name,
                    part.data.len(),
                    part.content_type.as_deref().unwrap_or("unknown type")
                ),
                None => writeln!(
                    summary,
                    "field {}: {}",
                    part.name,
                    part.text().unwrap_or("<binary>")
                ),
            };
        }

        resp.write_headers(StatusCode::Ok, &[(HeaderName::ContentType, "text/plain")])
            .await?;
        resp.write_str(&summary).await
    }
}

struct NotFound;

impl Handler for NotFound {
    async fn handle(&self, _: &Request, resp: &mut Response) -> Result<(), Error> {
        resp.write_headers(StatusCode::NotFound, &[]).await
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    Server::builder()
        .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
        .router(Router::builder().route("/upload", Upload).fallback(NotFound).build())
        .build()
        .launch()
        .await;
}
