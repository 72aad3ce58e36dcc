//! Route handlers.
//!
//! A handler receives an ordinary HTTP-style [`Request`] and produces a
//! [`Response`]. It never learns whether the request came straight from an
//! HTTP client or was synthesized from a slash-command interaction.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn hello(_req: Request, _conn: ConnectionInfo, params: Params) -> String {
//!     format!("hello {}", params.get("name").unwrap_or("world"))
//! }
//!
//! let route = Route::new("/hello/:name", hello)?;
//! ```

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use hookcord_core::http::StatusCode;
use hookcord_core::{ConnectionInfo, Request, Response};
use tracing::error;

use crate::params::Params;

// ============================================================================
// IntoResponse - Handler return values
// ============================================================================

/// Types a handler may return.
pub trait IntoResponse: Send {
    /// Converts this value into a response.
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

/// `()` yields an empty `204 No Content`.
impl IntoResponse for () {
    fn into_response(self) -> Response {
        Response::new(StatusCode::NO_CONTENT)
    }
}

/// On Err, the error is logged and a `500` JSON error is returned.
impl<T: IntoResponse, E: Display + Send> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(t) => t.into_response(),
            Err(e) => {
                error!(error = %e, "Handler error");
                Response::error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
            }
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// A route handler.
///
/// Implemented for every `Fn(Request, ConnectionInfo, Params) -> impl Future`
/// whose output implements [`IntoResponse`].
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Handles one request.
    async fn call(&self, request: Request, conn: ConnectionInfo, params: Params) -> Response;
}

#[async_trait]
impl<F, Fut, Res> Handler for F
where
    F: Fn(Request, ConnectionInfo, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse + 'static,
{
    async fn call(&self, request: Request, conn: ConnectionInfo, params: Params) -> Response {
        (self)(request, conn, params).await.into_response()
    }
}

/// A type-erased handler shared between the router and spawned tasks.
pub type BoxedHandler = Arc<dyn Handler>;

#[cfg(test)]
mod tests {
    use super::*;
    use hookcord_core::Url;
    use hookcord_core::http::Method;

    fn request() -> Request {
        Request::new(Method::GET, Url::parse("http://localhost/x").unwrap())
    }

    #[tokio::test]
    async fn test_closure_handler_string() {
        let handler: BoxedHandler = Arc::new(|_req: Request, _conn: ConnectionInfo, params: Params| async move {
            format!("hi {}", params.get("name").unwrap_or("?"))
        });
        let params: Params = [("name", "Ann")].into_iter().collect();
        let resp = handler.call(request(), ConnectionInfo::new("test"), params).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(&resp.body.collect().await.unwrap()[..], b"hi Ann");
    }

    #[tokio::test]
    async fn test_result_error_is_500() {
        async fn failing(_: Request, _: ConnectionInfo, _: Params) -> Result<String, String> {
            Err("boom".into())
        }
        let resp = Handler::call(&failing, request(), ConnectionInfo::new("test"), Params::new()).await;
        assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unit_is_no_content() {
        assert_eq!(().into_response().status, StatusCode::NO_CONTENT);
    }
}
