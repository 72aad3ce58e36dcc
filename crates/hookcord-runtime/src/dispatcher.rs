//! Interaction dispatcher.
//!
//! Every request accepted by the listener ends up here. Plain HTTP requests
//! matching a route go straight to the handler. Signed POSTs on the
//! interaction endpoint walk the following states:
//!
//! ```text
//! RECEIVED ──signature──► VALIDATED ──┬── ping ──────────────► PONG
//!     │                               │
//!     └─ 401                          ├── command/component ─► RESOLVED ──► ACK_SENT
//!                                     │                                       │
//!                                     └── other ─► 400          STREAMING ◄───┘
//!                                                                   │
//!                                                       COMPLETED ◄─┴─► ABORTED
//! ```
//!
//! The ACK is returned synchronously; the handler and its edit bridge run on
//! a spawned task sharing one cancellation token.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use hookcord_core::http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderName, HeaderValue};
use hookcord_core::http::{HeaderMap, Method, StatusCode};
use hookcord_core::{
    CancellationToken, ConnectionInfo, DEFAULT_STREAM_CAPACITY, InboundService, Interaction,
    InteractionResponse, InteractionType, Message, PlatformApi, Request, Response,
    SignatureVerifier, Url,
};
use hookcord_framework::{CommandRegistry, Params, Route, resolve_options};
use tracing::{Instrument, debug, info_span, trace, warn};

use crate::bridge::{BridgeOutcome, BridgeSettings, EditBridge};

/// Header carrying the invoking user's id.
pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-interaction-user-id");

/// Header carrying the invoking user's locale.
pub const LOCALE_HEADER: HeaderName = HeaderName::from_static("x-interaction-locale");

/// Header carrying the guild's preferred locale.
pub const GUILD_LOCALE_HEADER: HeaderName = HeaderName::from_static("x-interaction-guild-locale");

/// Stage an interaction has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Received,
    Validated,
    Pong,
    Resolved,
    AckSent,
    Streaming,
    Completed,
    Aborted,
}

impl InteractionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Pong => "pong",
            Self::Resolved => "resolved",
            Self::AckSent => "ack_sent",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BridgeOutcome> for InteractionState {
    fn from(outcome: BridgeOutcome) -> Self {
        match outcome {
            BridgeOutcome::Completed { .. } => Self::Completed,
            BridgeOutcome::Aborted => Self::Aborted,
        }
    }
}

/// Routes inbound requests to handlers and bridges their output back.
pub struct InteractionDispatcher {
    registry: Arc<CommandRegistry>,
    verifier: SignatureVerifier,
    api: Arc<dyn PlatformApi>,
    settings: BridgeSettings,
    placeholder: String,
    path: String,
    stream_capacity: usize,
}

impl InteractionDispatcher {
    /// Creates a dispatcher serving interactions on `/`.
    pub fn new(
        registry: Arc<CommandRegistry>,
        verifier: SignatureVerifier,
        api: Arc<dyn PlatformApi>,
    ) -> Self {
        Self {
            registry,
            verifier,
            api,
            settings: BridgeSettings::default(),
            placeholder: String::new(),
            path: "/".to_string(),
            stream_capacity: DEFAULT_STREAM_CAPACITY,
        }
    }

    /// Sets the settings handed to each edit bridge.
    pub fn with_settings(mut self, settings: BridgeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the content of the deferred reply.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets the interaction endpoint path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the capacity of streams opened through [`Request::stream`].
    pub fn with_stream_capacity(mut self, capacity: usize) -> Self {
        self.stream_capacity = capacity;
        self
    }

    async fn interaction(&self, mut request: Request, connection: ConnectionInfo) -> Response {
        trace!(state = %InteractionState::Received, "Interaction request");

        let body = match self
            .verifier
            .validate(&request.headers, std::mem::take(&mut request.body))
        {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, remote_addr = ?connection.remote_addr, "Rejected interaction signature");
                return Response::error(StatusCode::UNAUTHORIZED, "invalid request signature");
            }
        };

        let interaction: Interaction = match serde_json::from_slice(&body) {
            Ok(interaction) => interaction,
            Err(e) => {
                debug!(error = %e, "Malformed interaction payload");
                return bad_request();
            }
        };
        trace!(state = %InteractionState::Validated, kind = ?interaction.kind, "Signature verified");

        match interaction.kind {
            InteractionType::Ping => {
                trace!(state = %InteractionState::Pong, "Answering ping");
                Response::json(StatusCode::OK, &InteractionResponse::pong())
            }
            InteractionType::ApplicationCommand => self.command(request, connection, interaction),
            InteractionType::MessageComponent => self.component(request, connection, interaction),
            InteractionType::Unknown(kind) => {
                warn!(kind, "Unsupported interaction type");
                bad_request()
            }
        }
    }

    fn command(&self, request: Request, connection: ConnectionInfo, interaction: Interaction) -> Response {
        let route = match self.registry.command(interaction.command_name()) {
            Ok(route) => Arc::clone(route),
            Err(e) => {
                warn!(error = %e, "Command not dispatched");
                return bad_request();
            }
        };
        let name = interaction.command_name().unwrap_or_default();

        let resolution = match resolve_options(route.pattern(), interaction.options()) {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(command = name, error = %e, "Command options did not resolve");
                return bad_request();
            }
        };
        let url = match resolution.to_url(&request.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(command = name, error = %e, "Could not build request URL");
                return bad_request();
            }
        };
        trace!(
            state = %InteractionState::Resolved,
            command = name,
            path = url.path(),
            "Command resolved"
        );

        self.spawn(route, url, request.headers, connection, resolution.params, interaction);

        trace!(state = %InteractionState::AckSent, "Deferring reply");
        Response::json(
            StatusCode::OK,
            &InteractionResponse::deferred_channel_message(Message::with_content(
                self.placeholder.clone(),
            )),
        )
    }

    fn component(&self, request: Request, connection: ConnectionInfo, interaction: Interaction) -> Response {
        let (route, params, url) = match self.registry.component(&request.url, interaction.custom_id()) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(error = %e, "Component not dispatched");
                return bad_request();
            }
        };
        trace!(
            state = %InteractionState::Resolved,
            route = %route.pattern(),
            custom_id = interaction.custom_id().unwrap_or_default(),
            "Component resolved"
        );

        self.spawn(route, url, request.headers, connection, params, interaction);

        trace!(state = %InteractionState::AckSent, "Deferring update");
        Response::json(StatusCode::OK, &InteractionResponse::deferred_update_message())
    }

    /// Runs the handler and its edit bridge on a new task.
    fn spawn(
        &self,
        route: Arc<Route>,
        url: Url,
        headers: HeaderMap,
        connection: ConnectionInfo,
        params: Params,
        interaction: Interaction,
    ) {
        let cancel = CancellationToken::new();
        let token = interaction.token.clone();
        let span = info_span!(
            "interaction",
            id = interaction.id.as_deref().unwrap_or_default(),
            route = %route.pattern(),
            user = interaction.user_id().unwrap_or_default(),
        );

        let request = Request::new(Method::GET, url)
            .with_headers(synthetic_headers(headers, &interaction))
            .with_cancellation(cancel.clone())
            .with_stream_capacity(self.stream_capacity)
            .with_interaction(Arc::new(interaction));

        let api = Arc::clone(&self.api);
        let settings = self.settings.clone();

        tokio::spawn(
            async move {
                let response = route.handler().call(request, connection, params).await;
                trace!(state = %InteractionState::Streaming, status = %response.status, "Handler responded");

                let outcome = EditBridge::new(api, settings, token, cancel).run(response).await;
                debug!(state = %InteractionState::from(outcome), ?outcome, "Interaction finished");
            }
            .instrument(span),
        );
    }
}

#[async_trait]
impl InboundService for InteractionDispatcher {
    async fn handle(&self, request: Request, connection: ConnectionInfo) -> Response {
        if request.method == Method::POST && request.path() == self.path {
            return self.interaction(request, connection).await;
        }

        if let Some((route, params)) = self
            .registry
            .match_path(request.path(), &request.query_pairs())
        {
            debug!(route = %route.pattern(), method = %request.method, "Plain request");
            let request = request.with_stream_capacity(self.stream_capacity);
            return route.handler().call(request, connection, params).await;
        }

        debug!(method = %request.method, path = request.path(), "Unroutable request");
        Response::error(StatusCode::UNAUTHORIZED, "unauthorized")
    }
}

fn bad_request() -> Response {
    Response::error(StatusCode::BAD_REQUEST, "bad request")
}

/// Inbound headers minus the body framing, plus the identity headers.
fn synthetic_headers(mut headers: HeaderMap, interaction: &Interaction) -> HeaderMap {
    headers.remove(CONTENT_LENGTH);
    headers.remove(CONTENT_TYPE);

    let identity = [
        (USER_ID_HEADER, interaction.user_id()),
        (LOCALE_HEADER, interaction.locale.as_deref()),
        (GUILD_LOCALE_HEADER, interaction.guild_locale.as_deref()),
    ];
    for (name, value) in identity {
        if let Some(value) = value.and_then(|v| HeaderValue::from_str(v).ok()) {
            headers.insert(name, value);
        }
    }
    headers
}
