//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use hookcord_core::CommandScope;
use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HookcordConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote platform credentials and endpoints.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Streaming edit bridge settings.
    #[serde(default)]
    pub streaming: StreamingConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Server
// =============================================================================

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on. `0` picks a free port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the interaction endpoint.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
        }
    }
}

impl ServerConfig {
    /// Returns the `host:port` bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_path() -> String {
    "/".to_string()
}

// =============================================================================
// Platform
// =============================================================================

/// Remote platform configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Application id owning the commands.
    #[serde(default, deserialize_with = "string_or_number")]
    pub application_id: String,

    /// Hex-encoded Ed25519 public key used to verify interactions.
    #[serde(default)]
    pub public_key: String,

    /// Bot token for REST calls.
    #[serde(default)]
    pub bot_token: String,

    /// Authorization scheme placed before the token.
    #[serde(default = "default_token_prefix")]
    pub token_prefix: String,

    /// REST API root.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Comma-separated guild ids. Absent means global registration.
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub guild_ids: Option<String>,

    /// Timeout for REST calls in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Whether shutdown replaces every registered command set with nothing.
    #[serde(default = "default_cleanup_on_shutdown")]
    pub cleanup_on_shutdown: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            public_key: String::new(),
            bot_token: String::new(),
            token_prefix: default_token_prefix(),
            api_base: default_api_base(),
            guild_ids: None,
            timeout_ms: default_timeout_ms(),
            cleanup_on_shutdown: default_cleanup_on_shutdown(),
        }
    }
}

impl PlatformConfig {
    /// Returns the registration scopes.
    pub fn scopes(&self) -> Vec<CommandScope> {
        CommandScope::parse_list(self.guild_ids.as_deref())
    }

    /// Returns the REST timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_token_prefix() -> String {
    "Bot".to_string()
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_cleanup_on_shutdown() -> bool {
    true
}

/// Ids arrive from environment variables as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Unsigned(u64),
    Signed(i64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Unsigned(n) => n.to_string(),
            StringOrNumber::Signed(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}

// =============================================================================
// Streaming
// =============================================================================

/// What the edit bridge does when an edit fails with a status other than 404.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditFailurePolicy {
    /// Log the failure and keep editing.
    #[default]
    Continue,
    /// Cancel the stream, as for a vanished interaction.
    Abort,
}

/// Streaming edit bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Minimum delay between edits in milliseconds.
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Maximum message length in characters.
    #[serde(default = "default_character_limit")]
    pub character_limit: usize,

    /// Chunks a streaming handler may queue before `send` waits.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Reaction to non-404 edit failures.
    #[serde(default)]
    pub edit_failure_policy: EditFailurePolicy,

    /// Content of the acknowledgment sent before any output.
    #[serde(default)]
    pub placeholder: String,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            rate_limit_ms: default_rate_limit_ms(),
            character_limit: default_character_limit(),
            channel_capacity: default_channel_capacity(),
            edit_failure_policy: EditFailurePolicy::default(),
            placeholder: String::new(),
        }
    }
}

impl StreamingConfig {
    /// Returns the edit rate limit.
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

fn default_rate_limit_ms() -> u64 {
    1000
}

fn default_character_limit() -> usize {
    2000
}

fn default_channel_capacity() -> usize {
    16
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Rotation of the log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level; `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,

    /// Destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Span lifecycle events.
    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file names and line numbers.
    #[serde(default)]
    pub file_location: bool,

    /// Log file, when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Log file rotation.
    #[serde(default)]
    pub rotation: LogRotation,

    /// Rotated files kept; `0` keeps all.
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Per-module levels, e.g. `hookcord_runtime = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
            rotation: LogRotation::default(),
            max_files: default_max_files(),
            filters: HashMap::new(),
        }
    }
}

fn default_max_files() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HookcordConfig::default();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.server.path, "/");
        assert_eq!(config.platform.token_prefix, "Bot");
        assert_eq!(config.platform.scopes(), vec![CommandScope::Global]);
        assert_eq!(config.streaming.rate_limit(), Duration::from_millis(1000));
        assert_eq!(config.streaming.character_limit, 2000);
        assert_eq!(config.streaming.edit_failure_policy, EditFailurePolicy::Continue);
        assert!(config.platform.cleanup_on_shutdown);
    }

    #[test]
    fn test_numeric_ids_deserialize_as_strings() {
        let config: PlatformConfig = serde_json::from_value(serde_json::json!({
            "application_id": 1234567890123u64,
            "guild_ids": 42,
        }))
        .unwrap();
        assert_eq!(config.application_id, "1234567890123");
        assert_eq!(config.scopes(), vec![CommandScope::Guild("42".into())]);
    }

    #[test]
    fn test_policy_names() {
        let policy: EditFailurePolicy = serde_json::from_str("\"abort\"").unwrap();
        assert_eq!(policy, EditFailurePolicy::Abort);
    }
}
