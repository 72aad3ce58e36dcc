//! Configuration for the Hookcord runtime.
//!
//! One [`HookcordConfig`] is loaded once at startup and handed by reference
//! to every component that needs a setting.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    EditFailurePolicy, HookcordConfig, LogFormat, LogLevel, LogOutput, LogRotation,
    LoggingConfig, PlatformConfig, ServerConfig, SpanEventConfig, StreamingConfig,
};
pub use validation::validate_config;
