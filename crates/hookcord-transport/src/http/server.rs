//! HTTP listener.
//!
//! One axum [`Router`] with a single fallback hands every request, whatever
//! its method or path, to the [`InboundService`]. Routing between the
//! interaction endpoint and plain routes happens behind that seam.
//!
//! ```text
//! 0.0.0.0:8080
//! └── * /*  → InboundService::handle(Request, ConnectionInfo)
//! ```
//!
//! [`InboundService`]: hookcord_core::InboundService

use std::net::SocketAddr;

use axum::{
    Router,
    body::{Body as AxumBody, to_bytes},
    extract::{ConnectInfo, Request as AxumRequest, State},
    http::{HeaderMap, StatusCode, Uri, header::HOST},
    response::{IntoResponse, Response as AxumResponse},
};
use hookcord_core::{
    Body, BoxedInboundService, ConnectionInfo, ListenerHandle, Request, Response, TransportError,
    TransportResult, Url,
};
use tokio::net::TcpListener;
use tracing::{error, info, trace, warn};

/// Largest request body accepted.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// HTTP listener.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpServer;

impl HttpServer {
    /// Creates a new listener.
    pub fn new() -> Self {
        Self
    }

    /// Binds `addr` and serves every request through `service`.
    ///
    /// The returned handle stops the listener when stopped or dropped;
    /// in-flight requests are allowed to finish.
    pub async fn listen(
        &self,
        addr: &str,
        service: BoxedInboundService,
    ) -> TransportResult<ListenerHandle> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| TransportError::Bind {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?;
        let local_addr = listener.local_addr()?;

        let router = Router::new().fallback(dispatch).with_state(ServerState {
            service,
            local_addr,
        });

        info!(addr = %local_addr, "HTTP server listening");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
                info!(addr = %local_addr, "HTTP server shutting down");
            });

            if let Err(e) = server.await {
                error!(error = %e, "HTTP server error");
            }
        });

        Ok(ListenerHandle::new(local_addr.to_string(), shutdown_tx))
    }
}

#[derive(Clone)]
struct ServerState {
    service: BoxedInboundService,
    local_addr: SocketAddr,
}

async fn dispatch(
    State(state): State<ServerState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: AxumRequest,
) -> AxumResponse {
    let (parts, body) = request.into_parts();

    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            warn!(remote_addr = %remote, error = %e, "Failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    let Some(url) = request_url(&parts.headers, &parts.uri, state.local_addr) else {
        warn!(remote_addr = %remote, uri = %parts.uri, "Unparseable request URL");
        return (StatusCode::BAD_REQUEST, "bad request").into_response();
    };

    trace!(
        remote_addr = %remote,
        method = %parts.method,
        path = url.path(),
        len = body.len(),
        "Received HTTP request"
    );

    let request = Request::new(parts.method, url)
        .with_headers(parts.headers)
        .with_body(body);
    let connection = ConnectionInfo::new("http")
        .with_remote_addr(remote.to_string())
        .with_local_addr(state.local_addr.to_string());

    into_axum(state.service.handle(request, connection).await)
}

/// Rebuilds the absolute URL of an inbound request.
fn request_url(headers: &HeaderMap, uri: &Uri, local_addr: SocketAddr) -> Option<Url> {
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| local_addr.to_string());
    let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
    Url::parse(&format!("http://{host}{path}")).ok()
}

fn into_axum(response: Response) -> AxumResponse {
    let body = match response.body {
        Body::Empty => AxumBody::empty(),
        Body::Full(bytes) => AxumBody::from(bytes),
        Body::Stream(stream) => AxumBody::from_stream(stream),
    };
    let mut out = AxumResponse::new(body);
    *out.status_mut() = response.status;
    *out.headers_mut() = response.headers;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use futures::StreamExt;

    #[test]
    fn test_request_url_uses_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("bot.example:8443"));
        let uri: Uri = "/hello/Ann?age=9".parse().unwrap();
        let local: SocketAddr = "127.0.0.1:8080".parse().unwrap();

        let url = request_url(&headers, &uri, local).unwrap();
        assert_eq!(url.as_str(), "http://bot.example:8443/hello/Ann?age=9");

        let url = request_url(&HeaderMap::new(), &uri, local).unwrap();
        assert_eq!(url.host_str(), Some("127.0.0.1"));
        assert_eq!(url.port(), Some(8080));
    }

    #[tokio::test]
    async fn test_streaming_response_is_forwarded() {
        let (tx, response) = Response::stream(4);
        tokio::spawn(async move {
            tx.send("a").await.unwrap();
            tx.send("b").await.unwrap();
        });

        let out = into_axum(response.header(HOST, HeaderValue::from_static("x")));
        assert_eq!(out.status(), StatusCode::OK);
        assert_eq!(out.headers()[HOST], "x");

        let mut stream = out.into_body().into_data_stream();
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"ab");
    }
}
