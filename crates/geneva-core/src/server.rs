//! HTTP server implementation

use crate::engine::{App, PAYLOAD_TOO_LARGE_BODY};
use crate::error::Result;
use crate::response::{text_response, Response};
use http::{Method, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Internal server struct
pub(crate) struct Server {
    app: App,
}

impl Server {
    pub(crate) fn new(app: App) -> Self {
        Self { app }
    }

    /// Run the server
    pub(crate) async fn run(self, addr: &str) -> Result<()> {
        let addr: SocketAddr = addr.parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("geneva server listening on http://{}", addr);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let app = self.app.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: hyper::Request<Incoming>| {
                    let app = app.clone();
                    async move {
                        let response = handle_request(app, req, remote_addr).await;
                        Ok::<_, Infallible>(response)
                    }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!(remote_addr = %remote_addr, "connection error: {}", err);
                }
            });
        }
    }
}

/// Collect the body and hand the request to the application
async fn handle_request(
    app: App,
    req: hyper::Request<Incoming>,
    remote_addr: SocketAddr,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let (parts, body) = req.into_parts();

    let body = match Limited::new(body, app.config().body_limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            let response = if err.downcast_ref::<LengthLimitError>().is_some() {
                text_response(StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE_BODY)
            } else {
                debug!(remote_addr = %remote_addr, error = %err, "failed to read request body");
                text_response(StatusCode::BAD_REQUEST, "400 bad request")
            };
            log_request(&method, &path, response.status(), start);
            return response;
        }
    };

    let response = app.dispatch(http::Request::from_parts(parts, body));

    log_request(&method, &path, response.status(), start);
    response
}

/// Log request completion
fn log_request(method: &Method, path: &str, status: StatusCode, start: Instant) {
    let elapsed = start.elapsed();

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "request failed"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "request rejected"
        );
    } else {
        debug!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::context::Context;
    use crate::engine::Engine;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn free_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
        let mut stream = loop {
            match TcpStream::connect(addr).await {
                Ok(stream) => break stream,
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            }
        };
        stream.write_all(raw.as_bytes()).await.unwrap();

        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_serves_requests_over_tcp() {
        let addr = free_addr().await;
        let r = Engine::new();
        r.get("/ping", |c: &mut Context| c.string(StatusCode::OK, "pong"));
        let app = r.build().unwrap();
        tokio::spawn(async move { app.serve(&addr.to_string()).await });

        let raw = roundtrip(
            addr,
            "GET /ping HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;

        assert!(raw.starts_with("HTTP/1.1 200 OK"));
        assert!(raw.ends_with("pong"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let addr = free_addr().await;
        let r = Engine::with_config(ServerConfig::default().body_limit(8));
        r.post("/upload", |c: &mut Context| c.status(StatusCode::CREATED));
        let app = r.build().unwrap();
        tokio::spawn(async move { app.serve(&addr.to_string()).await });

        let raw = roundtrip(
            addr,
            "POST /upload HTTP/1.1\r\nHost: localhost\r\nContent-Length: 16\r\nConnection: close\r\n\r\n0123456789abcdef",
        )
        .await;

        assert!(raw.starts_with("HTTP/1.1 413"));
    }

    #[tokio::test]
    async fn test_invalid_addr_is_an_error() {
        let app = Engine::new().build().unwrap();
        let result = app.serve("not an address").await;
        assert!(matches!(result, Err(crate::GenevaError::AddrParse(_))));
    }
}
