//! Wires routes, configuration and the HTTP transports into a running bot.
//!
//! [`HookcordRuntime`] is the entry point. The pieces it assembles are public
//! for applications that want to host the dispatcher themselves:
//! [`InteractionDispatcher`] answers webhooks, [`EditBridge`] turns a
//! streamed response into message edits, and [`ConfigLoader`] reads
//! `hookcord.toml`.
//!
//! ```ignore
//! use hookcord_runtime::HookcordRuntime;
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
//! # Request flow
//!
//! ```text
//! listener ──► InteractionDispatcher ──┬─► plain route ──► handler ──► HTTP reply
//!                                      │
//!                                      └─► interaction ──► ACK
//!                                                 │
//!                                                 └─► handler ──► EditBridge ──► platform
//! ```

pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod runtime;

#[cfg(test)]
mod testing;

pub use bridge::{BridgeOutcome, BridgeSettings, EditBridge};
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, EditFailurePolicy, HookcordConfig, load_config,
    load_config_from_file,
};
pub use dispatcher::{
    GUILD_LOCALE_HEADER, InteractionDispatcher, InteractionState, LOCALE_HEADER, USER_ID_HEADER,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{HookcordRuntime, RunningServer, RuntimeBuilder};

pub use tracing;
pub use tracing_subscriber;

/// Logging macros, so handlers need no direct `tracing` dependency.
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
