//! # Hookcord
//!
//! Serve slash commands from ordinary HTTP-style route handlers.
//!
//! ## Overview
//!
//! Every route pattern such as `/hello/:name?age=` is both a plain HTTP
//! route and a slash command: `hello` with a required `name` option and an
//! optional `age` option. When a user invokes the command, Hookcord verifies
//! the signed interaction, rebuilds the request `GET /hello/Ann?age=9`, hands
//! it to the handler and turns whatever the handler streams back into
//! rate-limited edits of the reply.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   signed POST   ┌────────────┐  Request   ┌─────────┐
//! │ platform │───────────────▶│ Dispatcher │──────────▶│ handler │
//! │          │◀── ACK ────────│            │           └────┬────┘
//! │          │                 └────────────┘                │ Response body
//! │          │◀── PATCH edits ───── EditBridge ◀────────────┘
//! └──────────┘
//! ```
//!
//! - **core**: wire model, request/response types, signatures, text processing
//! - **framework**: route patterns, command derivation, parameter resolution
//! - **transport**: axum listener and reqwest platform client
//! - **runtime**: configuration, logging, dispatcher, edit bridge, lifecycle
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hookcord::prelude::*;
//!
//! async fn hello(req: Request, _conn: ConnectionInfo, params: Params) -> Response {
//!     let (tx, response) = req.stream();
//!     let name = params.get("name").unwrap_or("there").to_string();
//!     tokio::spawn(async move {
//!         let _ = tx.send(format!("Hello, {name}!")).await;
//!     });
//!     response
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     HookcordRuntime::new()
//!         .route("/hello/:name?age=", hello)?
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: load `hookcord.toml` (default)
//! - `yaml-config`: load `hookcord.yaml`
//! - `json-log`: JSON log output

pub use hookcord_core as core;
pub use hookcord_framework as framework;
pub use hookcord_runtime as runtime;
pub use hookcord_transport as transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use hookcord::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use hookcord_runtime::{HookcordConfig, HookcordRuntime, RunningServer, RuntimeResult};

    // Handler surface
    pub use hookcord_core::{
        Body, BodySender, CancellationToken, ConnectionInfo, Interaction, Request, Response,
    };
    pub use hookcord_framework::{Handler, IntoResponse, Params, Route};

    // Header names a handler may set or read
    pub use hookcord_core::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, LINK};
    pub use hookcord_core::http::{HeaderValue, StatusCode};
    pub use hookcord_runtime::{GUILD_LOCALE_HEADER, LOCALE_HEADER, USER_ID_HEADER};
}
