//! Transport seams.
//!
//! Concrete implementations live in `hookcord-transport`; the runtime only
//! sees the traits defined here.

pub mod api;
pub mod connection;

pub use api::{CommandScope, ORIGINAL_MESSAGE, PlatformApi};
pub use connection::{BoxedInboundService, ConnectionInfo, InboundService, ListenerHandle};
