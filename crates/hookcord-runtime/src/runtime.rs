//! Startup and teardown orchestration.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hookcord_runtime::HookcordRuntime;
//!
//! // Loads hookcord.toml from the current directory plus HOOKCORD_* variables
//! let runtime = HookcordRuntime::new()
//!     .route("/hello/:name?age=", hello)?;
//!
//! // Serves until Ctrl+C, then unregisters the commands
//! runtime.run().await?;
//! ```
//!
//! For hosts with their own lifecycle, [`HookcordRuntime::start`] returns a
//! [`RunningServer`] whose [`shutdown`](RunningServer::shutdown) is the
//! teardown.

use std::future::Future;
use std::sync::Arc;

use hookcord_core::{CommandSchema, CommandScope, ListenerHandle, PlatformApi, SignatureVerifier};
use hookcord_framework::{CommandRegistry, Handler, Route};
use hookcord_transport::{HttpServer, PlatformClient, PlatformClientConfig};
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::bridge::BridgeSettings;
use crate::config::{ConfigLoader, ConfigResult, HookcordConfig, validate_config};
use crate::dispatcher::InteractionDispatcher;
use crate::error::RuntimeResult;
use crate::logging;

/// Collects routes and configuration, then serves them.
///
/// # Custom Configuration
///
/// ```rust,ignore
/// let runtime = HookcordRuntime::builder()
///     .config_file("config/hookcord.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct HookcordRuntime {
    config: HookcordConfig,
    routes: Vec<Route>,
    api: Option<Arc<dyn PlatformApi>>,
}

impl HookcordRuntime {
    /// Creates a runtime from `hookcord.toml` in the current directory and
    /// `HOOKCORD_*` environment variables.
    ///
    /// If loading fails, default settings are used and [`start`](Self::start)
    /// reports what is missing.
    pub fn new() -> Self {
        let config = ConfigLoader::new()
            .with_current_dir()
            .load()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config ({e}), using defaults");
                HookcordConfig::default()
            });

        Self::from_config(&config)
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration and initializes logging.
    pub fn from_config(config: &HookcordConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            routes: Vec::new(),
            api: None,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HookcordConfig {
        &self.config
    }

    /// Uses `api` instead of the REST client built from configuration.
    pub fn with_api(mut self, api: Arc<dyn PlatformApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Registers `handler` under `pattern`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let runtime = HookcordRuntime::new()
    ///     .route("/hello/:name?age=", hello)?
    ///     .route("/roll/:sides(\\d+)", roll)?;
    /// ```
    pub fn route<H: Handler>(self, pattern: &str, handler: H) -> RuntimeResult<Self> {
        Ok(self.add_route(Route::new(pattern, handler)?))
    }

    /// Registers a prepared route, e.g. one carrying a description.
    pub fn add_route(mut self, route: Route) -> Self {
        debug!(route = %route.pattern(), "Route added");
        self.routes.push(route);
        self
    }

    /// Returns the number of registered routes.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Binds the listener and registers the commands.
    ///
    /// Registration runs in the background; a failing scope is logged and
    /// does not stop the listener.
    pub async fn start(self) -> RuntimeResult<RunningServer> {
        validate_config(&self.config)?;
        let HookcordConfig {
            server,
            platform,
            streaming,
            ..
        } = self.config;

        let verifier = SignatureVerifier::from_hex(&platform.public_key)?;
        let api: Arc<dyn PlatformApi> = match self.api {
            Some(api) => api,
            None => Arc::new(PlatformClient::new(PlatformClientConfig {
                api_base: platform.api_base.clone(),
                application_id: platform.application_id.clone(),
                bot_token: platform.bot_token.clone(),
                token_prefix: platform.token_prefix.clone(),
                timeout: platform.timeout(),
            })?),
        };

        let registry = Arc::new(CommandRegistry::new(self.routes));
        info!(
            routes = registry.len(),
            commands = registry.schemas().len(),
            "Registry built"
        );

        let dispatcher = InteractionDispatcher::new(Arc::clone(&registry), verifier, Arc::clone(&api))
            .with_settings(BridgeSettings::from(&streaming))
            .with_placeholder(streaming.placeholder.clone())
            .with_stream_capacity(streaming.channel_capacity)
            .with_path(server.path.clone());

        let listener = HttpServer::new()
            .listen(&server.bind_addr(), Arc::new(dispatcher))
            .await?;
        info!(addr = %listener.local_addr, path = %server.path, "Interaction endpoint ready");

        let scopes = platform.scopes();
        let registration = tokio::spawn(register_commands(
            Arc::clone(&api),
            scopes.clone(),
            registry.schemas().to_vec(),
        ));

        Ok(RunningServer {
            listener,
            api,
            scopes,
            registration,
            cleanup: platform.cleanup_on_shutdown,
        })
    }

    /// Serves until Ctrl+C or SIGTERM, then tears down.
    pub async fn run(self) -> RuntimeResult<()> {
        let server = self.start().await?;
        info!("Hookcord is now running. Press Ctrl+C to stop.");

        wait_for_shutdown().await;

        server.shutdown().await
    }

    /// Serves until `shutdown` completes, then tears down.
    pub async fn run_until<F>(self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let server = self.start().await?;
        shutdown.await;
        server.shutdown().await
    }
}

impl Default for HookcordRuntime {
    fn default() -> Self {
        Self::new()
    }
}

async fn register_commands(
    api: Arc<dyn PlatformApi>,
    scopes: Vec<CommandScope>,
    commands: Vec<CommandSchema>,
) {
    for scope in &scopes {
        match api.replace_commands(scope, &commands).await {
            Ok(()) => info!(scope = %scope, commands = commands.len(), "Commands registered"),
            Err(e) => error!(scope = %scope, error = %e, "Failed to register commands"),
        }
    }
}

/// Waits for shutdown signals (Ctrl+C or SIGTERM).
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => {
                        info!("Received Ctrl+C, shutting down");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
    }
}

// =============================================================================
// RunningServer
// =============================================================================

/// A started runtime.
///
/// Dropping it stops the listener without unregistering commands; call
/// [`shutdown`](Self::shutdown) for a full teardown.
pub struct RunningServer {
    listener: ListenerHandle,
    api: Arc<dyn PlatformApi>,
    scopes: Vec<CommandScope>,
    registration: JoinHandle<()>,
    cleanup: bool,
}

impl RunningServer {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> &str {
        &self.listener.local_addr
    }

    /// Scopes the commands are registered in.
    pub fn scopes(&self) -> &[CommandScope] {
        &self.scopes
    }

    /// Stops the listener and, when configured, empties every registered
    /// command set.
    ///
    /// All scopes are attempted; the first failure is returned.
    pub async fn shutdown(self) -> RuntimeResult<()> {
        let Self {
            listener,
            api,
            scopes,
            registration,
            cleanup,
        } = self;

        info!("Stopping Hookcord");
        listener.stop();

        if let Err(e) = registration.await {
            warn!(error = %e, "Command registration task did not finish");
        }

        if !cleanup {
            return Ok(());
        }

        let mut result = Ok(());
        for scope in &scopes {
            match api.replace_commands(scope, &[]).await {
                Ok(()) => info!(scope = %scope, "Commands removed"),
                Err(e) => {
                    error!(scope = %scope, error = %e, "Failed to remove commands");
                    if result.is_ok() {
                        result = Err(e.into());
                    }
                }
            }
        }
        result
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`HookcordRuntime`] with custom configuration sources.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a builder searching the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: HookcordConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> ConfigResult<HookcordRuntime> {
        let config = self.config_loader.load()?;
        Ok(HookcordRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
