//! Request, response and body types exchanged with route handlers.
//!
//! Handlers receive a [`Request`] and return a [`Response`] whose [`Body`] is
//! either available at once or streamed through a bounded channel. The
//! channel's capacity is the backpressure between a handler producing output
//! and the edit bridge consuming it.

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::model::Interaction;

/// Chunks a streaming body queues before `send` waits, unless configured.
pub const DEFAULT_STREAM_CAPACITY: usize = 16;

/// Boxed error carried by a streamed body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Body
// =============================================================================

/// A response body.
pub enum Body {
    /// No content.
    Empty,
    /// Content available immediately.
    Full(Bytes),
    /// Content produced over time.
    Stream(BoxStream<'static, Result<Bytes, BoxError>>),
}

impl Body {
    /// Creates a bounded streaming body and the sender that feeds it.
    ///
    /// `send` waits while `capacity` chunks are queued and unread. Dropping
    /// the sender ends the body.
    pub fn channel(capacity: usize) -> (BodySender, Body) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        (BodySender { tx }, Body::Stream(stream.boxed()))
    }

    /// Wraps an arbitrary fallible byte stream.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: futures::Stream<Item = Result<Bytes, BoxError>> + Send + 'static,
    {
        Body::Stream(stream.boxed())
    }

    /// Returns whether the body is known to stream.
    pub fn is_stream(&self) -> bool {
        matches!(self, Body::Stream(_))
    }

    /// Converts the body into a stream of chunks.
    pub fn into_stream(self) -> BoxStream<'static, Result<Bytes, BoxError>> {
        match self {
            Body::Empty => stream::empty().boxed(),
            Body::Full(bytes) => stream::once(async move { Ok(bytes) }).boxed(),
            Body::Stream(s) => s,
        }
    }

    /// Reads the whole body into memory.
    pub async fn collect(self) -> Result<Bytes, BoxError> {
        match self {
            Body::Empty => Ok(Bytes::new()),
            Body::Full(bytes) => Ok(bytes),
            Body::Stream(mut s) => {
                let mut buf = Vec::new();
                while let Some(chunk) = s.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(Bytes::from(buf))
            }
        }
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Full(bytes) => write!(f, "Body::Full({} bytes)", bytes.len()),
            Body::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Full(Bytes::from(value))
    }
}

impl From<&'static str> for Body {
    fn from(value: &'static str) -> Self {
        Body::Full(Bytes::from_static(value.as_bytes()))
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Body::Full(value)
    }
}

/// Returned by [`BodySender::send`] once the reading side is gone.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("body receiver dropped")]
pub struct BodyClosed;

/// Producer half of [`Body::channel`].
#[derive(Debug, Clone)]
pub struct BodySender {
    tx: mpsc::Sender<Result<Bytes, BoxError>>,
}

impl BodySender {
    /// Queues a chunk, waiting for room in the channel.
    pub async fn send(&self, chunk: impl Into<Bytes>) -> Result<(), BodyClosed> {
        self.tx.send(Ok(chunk.into())).await.map_err(|_| BodyClosed)
    }

    /// Ends the body with an error.
    pub async fn abort(&self, error: impl Into<BoxError>) -> Result<(), BodyClosed> {
        self.tx.send(Err(error.into())).await.map_err(|_| BodyClosed)
    }

    /// Returns whether the reading side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// =============================================================================
// Request
// =============================================================================

/// A request handed to a route handler.
///
/// For plain HTTP requests this mirrors the inbound request. For interactions
/// it is synthesized from the resolved route: `GET` on the substituted path
/// with the inbound headers plus identity headers.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
    cancel: CancellationToken,
    interaction: Option<Arc<Interaction>>,
    stream_capacity: usize,
}

impl Request {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            cancel: CancellationToken::new(),
            interaction: None,
            stream_capacity: DEFAULT_STREAM_CAPACITY,
        }
    }

    /// Replaces the headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Replaces the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Attaches a cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Attaches the interaction this request was synthesized from.
    pub fn with_interaction(mut self, interaction: Arc<Interaction>) -> Self {
        self.interaction = Some(interaction);
        self
    }

    /// Sets the capacity used by [`Request::stream`].
    pub fn with_stream_capacity(mut self, capacity: usize) -> Self {
        self.stream_capacity = capacity;
        self
    }

    /// Creates a `200 OK` streaming response sized by the configured capacity.
    pub fn stream(&self) -> (BodySender, Response) {
        Response::stream(self.stream_capacity)
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Returns the decoded query pairs in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Returns a header value as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Token cancelled when nobody is reading the response any more.
    ///
    /// Streaming handlers should stop producing once it fires.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns whether the response consumer has gone away.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns the originating interaction, if any.
    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_deref()
    }
}

// =============================================================================
// Response
// =============================================================================

/// A response produced by a route handler or by the dispatcher itself.
#[derive(Debug)]
pub struct Response {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Body,
}

impl Response {
    /// Creates an empty response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Body::Empty,
        }
    }

    /// Creates a `200 OK` plain-text response.
    pub fn text(body: impl Into<Body>) -> Self {
        Self::new(StatusCode::OK)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))
            .body(body)
    }

    /// Creates a `200 OK` streaming response and its sender.
    pub fn stream(capacity: usize) -> (BodySender, Self) {
        let (tx, body) = Body::channel(capacity);
        (tx, Self::new(StatusCode::OK).body(body))
    }

    /// Creates a JSON response.
    pub fn json(status: StatusCode, value: &impl serde::Serialize) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => Self::new(status)
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(Bytes::from(bytes)),
            Err(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Creates a JSON `{"error": message}` response.
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    /// Sets a header, replacing previous values.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces the body.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns a header value as text.
    pub fn header_str(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
