//! # Hookcord Core
//!
//! Shared building blocks for bridging signed slash-command webhooks to
//! HTTP-style route handlers:
//!
//! - [`model`]: interaction, message, component and command wire types
//! - [`web`]: request/response/body types handed to handlers
//! - [`signature`]: Ed25519 request validation
//! - [`text`]: control-code processing for streamed text
//! - [`transport`]: the inbound listener and outbound platform API seams
//!
//! ```text
//! ┌─────────────────────┐
//! │  hookcord-runtime   │  dispatcher, edit bridge, config, logging
//! ├─────────────────────┤
//! │  hookcord-framework │  routes, commands, parameter resolution
//! ├─────────────────────┤
//! │  hookcord-core      │  <- this crate
//! ├─────────────────────┤
//! │  hookcord-transport │  axum listener, reqwest platform client
//! └─────────────────────┘
//! ```

pub mod error;
pub mod model;
pub mod signature;
pub mod text;
pub mod transport;
pub mod web;

pub use error::{
    ApiError, ApiResult, SignatureError, SignatureResult, TransportError, TransportResult,
};
pub use web::{Body, BodyClosed, BodySender, BoxError, DEFAULT_STREAM_CAPACITY, Request, Response};
pub use model::{
    Attachment, AttachmentFile, ButtonStyle, CallbackType, CommandOptionSchema,
    CommandOptionValue, CommandSchema, Component, ComponentKind, Interaction, InteractionData,
    InteractionResponse, InteractionType, Message, OptionKind,
};
pub use signature::{SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER};
pub use text::{Utf8Decoder, apply_control_codes, tail_chars};
pub use transport::{
    BoxedInboundService, CommandScope, ConnectionInfo, InboundService, ListenerHandle,
    ORIGINAL_MESSAGE, PlatformApi,
};

// Re-exported so downstream crates agree on the exact versions.
pub use bytes;
pub use http;
pub use tokio_util::sync::CancellationToken;
pub use url::Url;
