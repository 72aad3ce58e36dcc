//! HTTP plumbing for Hookcord.
//!
//! `hookcord-core` only declares the two seams; this crate fills them in:
//!
//! | Feature       | Type             | Seam               |
//! |---------------|------------------|--------------------|
//! | `http-server` | [`HttpServer`]   | [`InboundService`] |
//! | `http-client` | [`PlatformClient`] | [`PlatformApi`]  |
//!
//! `full` turns both on. The runtime enables `full`.
//!
//! [`InboundService`]: hookcord_core::InboundService
//! [`PlatformApi`]: hookcord_core::PlatformApi

#[cfg(any(feature = "http-client", feature = "http-server"))]
pub mod http;

#[cfg(feature = "http-server")]
pub use http::HttpServer;

#[cfg(feature = "http-client")]
pub use http::{PlatformClient, PlatformClientConfig};
