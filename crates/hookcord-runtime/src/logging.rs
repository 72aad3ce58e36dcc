//! Subscriber installation.
//!
//! The runtime calls [`init_from_config`] once at startup. Applications that
//! want to install logging before loading any configuration can use
//! [`LoggingBuilder`] directly:
//!
//! ```rust,ignore
//! use hookcord_runtime::logging::{LoggingBuilder, SpanEvents};
//!
//! LoggingBuilder::new()
//!     .directive("hookcord_runtime::bridge=trace")
//!     .span_events(SpanEvents::LIFECYCLE)
//!     .init();
//! ```
//!
//! `RUST_LOG`, when set, replaces the configured base level. Per-module
//! directives are always added on top.

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Span lifecycle events to log.
///
/// Each interaction runs in its own span, so `LIFECYCLE` prints one line when
/// the interaction is acknowledged and one when its stream finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanEvents {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

impl SpanEvents {
    pub const NONE: Self = Self::flags(false, false, false, false);
    pub const LIFECYCLE: Self = Self::flags(true, false, false, true);
    pub const FULL: Self = Self::flags(true, true, true, true);

    const fn flags(new: bool, enter: bool, exit: bool, close: bool) -> Self {
        Self {
            new,
            enter,
            exit,
            close,
        }
    }

    fn fmt_span(self) -> FmtSpan {
        [
            (self.new, FmtSpan::NEW),
            (self.enter, FmtSpan::ENTER),
            (self.exit, FmtSpan::EXIT),
            (self.close, FmtSpan::CLOSE),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .fold(FmtSpan::NONE, |acc, (_, span)| acc | span)
    }
}

impl From<&SpanEventConfig> for SpanEvents {
    fn from(config: &SpanEventConfig) -> Self {
        Self::flags(config.new, config.enter, config.exit, config.close)
    }
}

/// Installs the global subscriber described by `config`.
///
/// A subscriber that is already installed is left in place.
pub fn init_from_config(config: &LoggingConfig) {
    LoggingBuilder::from_config(config).init();
}

/// Collects subscriber settings; nothing is installed until [`init`](Self::init).
pub struct LoggingBuilder {
    level: tracing::Level,
    directives: Vec<String>,
    format: LogFormat,
    output: LogOutput,
    span_events: SpanEvents,
    target: bool,
    thread_ids: bool,
    file_location: bool,
    file: Option<PathBuf>,
    rotation: LogRotation,
    max_files: usize,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    /// Compact lines at `info` on stdout.
    pub fn new() -> Self {
        Self {
            level: tracing::Level::INFO,
            directives: Vec::new(),
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            span_events: SpanEvents::NONE,
            target: true,
            thread_ids: false,
            file_location: false,
            file: None,
            rotation: LogRotation::Never,
            max_files: 5,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut filters: Vec<_> = config.filters.iter().collect();
        filters.sort_by_key(|(module, _)| module.as_str());

        Self {
            level: config.level.to_tracing_level(),
            directives: filters
                .into_iter()
                .map(|(module, level)| format!("{module}={level}"))
                .collect(),
            format: config.format,
            output: config.output,
            span_events: SpanEvents::from(&config.span_events),
            target: true,
            thread_ids: config.thread_ids,
            file_location: config.file_location,
            file: config.file_path.clone(),
            rotation: config.rotation,
            max_files: config.max_files,
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// Adds a directive such as `hookcord_runtime=debug`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = enabled;
        self
    }

    /// Prints `file:line` of each event.
    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.file_location = enabled;
        self
    }

    /// Writes to `path` instead of a terminal stream.
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self.output = LogOutput::File;
        self
    }

    /// `max_files == 0` keeps every rotated file.
    pub fn rotation(mut self, rotation: LogRotation, max_files: usize) -> Self {
        self.rotation = rotation;
        self.max_files = max_files;
        self
    }

    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Fails if another global subscriber is already installed.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.filter();
        let layer = self.layer(self.writer());
        tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()
    }

    fn filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_lowercase()));
        for directive in &self.directives {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => eprintln!("ignoring log directive `{directive}`: {e}"),
            }
        }
        filter
    }

    fn writer(&self) -> BoxMakeWriter {
        match self.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::File => match self.file.as_deref().and_then(|p| self.appender(p)) {
                Some(appender) => BoxMakeWriter::new(appender),
                None => {
                    eprintln!("file logging unavailable, writing to stdout");
                    BoxMakeWriter::new(std::io::stdout)
                }
            },
        }
    }

    fn appender(&self, path: &Path) -> Option<RollingFileAppender> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let prefix = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "hookcord.log".to_string());

        let mut builder = RollingFileAppender::builder()
            .rotation(match self.rotation {
                LogRotation::Never => Rotation::NEVER,
                LogRotation::Hourly => Rotation::HOURLY,
                LogRotation::Daily => Rotation::DAILY,
            })
            .filename_prefix(prefix);
        if self.max_files > 0 {
            builder = builder.max_log_files(self.max_files);
        }

        builder
            .build(dir)
            .map_err(|e| eprintln!("cannot open log file {}: {e}", path.display()))
            .ok()
    }

    fn layer(&self, writer: BoxMakeWriter) -> BoxedLayer {
        let base = fmt::layer()
            .with_writer(writer)
            .with_span_events(self.span_events.fmt_span())
            .with_target(self.target)
            .with_thread_ids(self.thread_ids)
            .with_file(self.file_location)
            .with_line_number(self.file_location);

        match self.format {
            LogFormat::Compact => base.compact().boxed(),
            LogFormat::Full => base.boxed(),
            LogFormat::Pretty => base.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => base.json().boxed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_from_config_collects_sorted_directives() {
        let mut config = LoggingConfig::default();
        config.level = LogLevel::Warn;
        config.filters.insert("hookcord_runtime".into(), LogLevel::Trace);
        config.filters.insert("hookcord_framework".into(), LogLevel::Debug);
        config.file_location = true;

        let builder = LoggingBuilder::from_config(&config);
        assert_eq!(builder.level, tracing::Level::WARN);
        assert_eq!(
            builder.directives,
            ["hookcord_framework=debug", "hookcord_runtime=trace"]
        );
        assert!(builder.file_location);
    }

    #[test]
    fn test_span_event_flags() {
        assert_eq!(SpanEvents::NONE.fmt_span(), FmtSpan::NONE);
        assert_eq!(SpanEvents::LIFECYCLE.fmt_span(), FmtSpan::NEW | FmtSpan::CLOSE);
        assert_eq!(
            SpanEvents::FULL.fmt_span(),
            FmtSpan::NEW | FmtSpan::ENTER | FmtSpan::EXIT | FmtSpan::CLOSE
        );
    }

    #[test]
    fn test_file_path_switches_output() {
        let builder = LoggingBuilder::new().file_path("logs/hookcord.log");
        assert_eq!(builder.output, LogOutput::File);
    }
}
