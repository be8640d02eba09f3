//! Shared tracing configuration utilities for the freshet workspace.
//!
//! The helpers in this crate centralise how the benchmark binaries and
//! integration tests install `tracing` subscribers. Routing setup through a
//! single crate keeps the logging surface consistent and keeps stdout free
//! for the benchmark report, which downstream scripts parse line by line.

pub mod performance;

#[macro_use]
pub mod macros;

use std::env;
use std::error::Error;
use std::fmt;

pub use tracing::{debug, error, info, trace, warn};

use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter, Registry};

/// Configuration describing how the shared tracing subscriber should behave.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    /// Optional tracing directives (e.g. `freshet_backends=debug,info`). When
    /// absent the crate falls back to `RUST_LOG` and finally to
    /// [`default_directive`](Self::default_directive).
    pub directives: Option<String>,
    /// Fallback directive used when neither [`directives`](Self::directives)
    /// nor `RUST_LOG` resolve to a valid filter.
    pub default_directive: String,
    /// Controls whether event targets (module paths) appear in output.
    pub include_targets: bool,
    /// Controls ANSI formatting. Disable for CI logs that strip colour codes.
    pub ansi: bool,
    /// Span lifecycle events to emit. Defaults to [`FmtSpan::NONE`].
    pub span_events: FmtSpan,
    /// Output format for the formatter layer.
    pub output: TracingOutput,
    /// Stream the formatter writes to. The benchmark report owns stdout, so
    /// every preset logs to stderr; stdout is opt-in.
    pub sink: TracingSink,
    /// Controls whether performance tracing is enabled.
    /// When false, performance spans are no-ops with minimal overhead.
    pub enable_performance_tracing: bool,
    /// Minimum duration in microseconds to log performance spans.
    /// Spans with duration below this threshold are not logged.
    /// None means all spans are logged regardless of duration.
    pub performance_threshold_us: Option<u64>,
    /// Performance-specific tracing directives, merged into the filter when
    /// performance tracing is enabled.
    pub performance_directives: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_local()
    }
}

impl TracingConfig {
    /// Returns a configuration tuned for local development (pretty, ANSI-enabled output).
    pub fn for_local() -> Self {
        Self {
            directives: None,
            default_directive: "warn".to_string(),
            include_targets: true,
            ansi: true,
            span_events: FmtSpan::NONE,
            output: TracingOutput::Pretty,
            sink: TracingSink::Stderr,
            enable_performance_tracing: cfg!(debug_assertions),
            performance_threshold_us: None,
            performance_directives: None,
        }
    }

    /// Returns a configuration tuned for CI or log collection environments (JSON, no ANSI).
    pub fn for_ci() -> Self {
        Self {
            directives: None,
            default_directive: "info".to_string(),
            include_targets: true,
            ansi: false,
            span_events: FmtSpan::NONE,
            output: TracingOutput::Json,
            sink: TracingSink::Stderr,
            enable_performance_tracing: false,
            performance_threshold_us: None,
            performance_directives: None,
        }
    }

    /// Returns a configuration for bandwidth investigation runs.
    ///
    /// This preset enables:
    /// - JSON output for machine-readable logs
    /// - Detailed span events (ENTER, EXIT, CLOSE)
    /// - Performance tracing with debug-level directives for the launch and
    ///   engine crates
    pub fn for_bench() -> Self {
        Self {
            directives: Some("freshet_backends=debug,freshet_core=debug".to_string()),
            default_directive: "info".to_string(),
            include_targets: true,
            ansi: false,
            span_events: FmtSpan::ENTER | FmtSpan::EXIT | FmtSpan::CLOSE,
            output: TracingOutput::Json,
            sink: TracingSink::Stderr,
            enable_performance_tracing: true,
            performance_threshold_us: None,
            performance_directives: Some("freshet_backends=trace,freshet_core=trace".to_string()),
        }
    }

    /// Build a configuration using environment hints.
    ///
    /// # Environment Variables
    ///
    /// - `FRESHET_TRACING_PROFILE` - Profile preset: `local` (default), `ci`, or `bench`
    /// - `FRESHET_TRACING_DIRECTIVES` - Overrides tracing directives
    /// - `FRESHET_TRACING_FORMAT` - Output format: `pretty`, `compact`, or `json`
    /// - `FRESHET_TRACING_SINK` - Output stream: `stderr` (default) or `stdout`
    /// - `FRESHET_PERF_TRACING` - Enable/disable performance tracing: `true` or `false`
    /// - `FRESHET_PERF_THRESHOLD_US` - Minimum duration (microseconds) to log
    /// - `FRESHET_PERF_DIRECTIVES` - Performance-specific tracing directives
    pub fn from_env() -> Self {
        let profile = env::var("FRESHET_TRACING_PROFILE")
            .unwrap_or_else(|_| "local".to_string())
            .to_ascii_lowercase();

        let mut config = match profile.as_str() {
            "ci" => Self::for_ci(),
            "bench" => Self::for_bench(),
            _ => Self::for_local(),
        };

        if let Ok(directives) = env::var("FRESHET_TRACING_DIRECTIVES") {
            if !directives.trim().is_empty() {
                config.directives = Some(directives);
            }
        }

        if let Ok(format) = env::var("FRESHET_TRACING_FORMAT") {
            if let Some(parsed) = TracingOutput::from_env_value(&format) {
                config.output = parsed;
                if matches!(config.output, TracingOutput::Json) {
                    config.ansi = false;
                }
            }
        }

        if let Ok(sink) = env::var("FRESHET_TRACING_SINK") {
            if let Some(parsed) = TracingSink::from_env_value(&sink) {
                config.sink = parsed;
            }
        }

        // Performance tracing configuration
        if let Ok(perf_tracing) = env::var("FRESHET_PERF_TRACING") {
            config.enable_performance_tracing = perf_tracing.eq_ignore_ascii_case("true")
                || perf_tracing == "1"
                || perf_tracing.eq_ignore_ascii_case("yes");
        }

        if let Ok(threshold) = env::var("FRESHET_PERF_THRESHOLD_US") {
            if let Ok(threshold_us) = threshold.parse::<u64>() {
                config.performance_threshold_us = Some(threshold_us);
            }
        }

        if let Ok(perf_directives) = env::var("FRESHET_PERF_DIRECTIVES") {
            if !perf_directives.trim().is_empty() {
                config.performance_directives = Some(perf_directives);
            }
        }

        config
    }

    /// Resolve the `EnvFilter` to use for the subscriber.
    fn resolve_filter(&self) -> Result<EnvFilter, TracingSetupError> {
        let mut filter = if let Some(directives) = &self.directives {
            EnvFilter::try_new(directives)
                .map_err(|err| TracingSetupError::InvalidFilter(err.to_string()))?
        } else {
            match EnvFilter::try_from_default_env() {
                Ok(filter) => filter,
                Err(_) => EnvFilter::new(self.default_directive.clone()),
            }
        };

        // Performance directives widen the filter, never narrow it, and only
        // take effect while performance tracing is on.
        if self.enable_performance_tracing {
            if let Some(perf) = &self.performance_directives {
                for directive in perf.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                    let parsed = directive
                        .parse()
                        .map_err(|err| TracingSetupError::InvalidFilter(format!("{err}")))?;
                    filter = filter.add_directive(parsed);
                }
            }
        }

        Ok(filter)
    }
}

/// Errors surfaced when configuring the shared tracing subscriber fails.
#[derive(Debug)]
pub enum TracingSetupError {
    /// The provided directive string could not be parsed.
    InvalidFilter(String),
    /// Installing the global subscriber failed (usually because one is
    /// already set).
    SubscriberInit(tracing_subscriber::util::TryInitError),
}

impl fmt::Display for TracingSetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TracingSetupError::InvalidFilter(msg) => {
                write!(f, "invalid tracing directive: {msg}")
            }
            TracingSetupError::SubscriberInit(err) => {
                write!(f, "failed to install global tracing subscriber: {err}")
            }
        }
    }
}

impl Error for TracingSetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TracingSetupError::SubscriberInit(err) => Some(err),
            _ => None,
        }
    }
}

/// Build a `tracing` subscriber using the provided configuration.
pub fn build_subscriber(config: &TracingConfig) -> Result<impl Subscriber + Send + Sync, TracingSetupError> {
    let (filter, fmt_layer) = subscriber_layers(config)?;
    Ok(Registry::default().with(fmt_layer).with(filter))
}

/// Build the filter and formatting layers for external composition.
pub fn subscriber_layers(
    config: &TracingConfig,
) -> Result<(EnvFilter, Box<dyn Layer<Registry> + Send + Sync>), TracingSetupError> {
    let filter = config.resolve_filter()?;
    let span_events = config.span_events.clone();
    let include_targets = config.include_targets;
    let ansi = config.ansi;
    let stderr_sink = matches!(config.sink, TracingSink::Stderr);

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.output {
        TracingOutput::Compact => {
            let layer = tracing_fmt::layer()
                .with_target(include_targets)
                .with_ansi(ansi)
                .with_span_events(span_events);
            if stderr_sink {
                Box::new(layer.with_writer(std::io::stderr))
            } else {
                Box::new(layer)
            }
        }
        TracingOutput::Pretty => {
            let layer = tracing_fmt::layer()
                .pretty()
                .with_target(include_targets)
                .with_ansi(ansi)
                .with_span_events(span_events);
            if stderr_sink {
                Box::new(layer.with_writer(std::io::stderr))
            } else {
                Box::new(layer)
            }
        }
        TracingOutput::Json => {
            let layer = tracing_fmt::layer()
                .json()
                .with_target(include_targets)
                .with_span_events(span_events)
                .with_ansi(false);
            if stderr_sink {
                Box::new(layer.with_writer(std::io::stderr))
            } else {
                Box::new(layer)
            }
        }
    };

    Ok((filter, layer))
}

/// Install the configured subscriber as the process-wide default.
pub fn init_global_tracing(config: &TracingConfig) -> Result<(), TracingSetupError> {
    build_subscriber(config)?
        .try_init()
        .map_err(TracingSetupError::SubscriberInit)
}

/// Output format choices for the tracing formatter layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TracingOutput {
    Compact,
    Pretty,
    Json,
}

impl TracingOutput {
    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Output stream choices for the tracing formatter layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TracingSink {
    Stdout,
    Stderr,
}

impl TracingSink {
    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdout" => Some(Self::Stdout),
            "stderr" => Some(Self::Stderr),
            _ => None,
        }
    }
}
