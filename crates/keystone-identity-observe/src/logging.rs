//! Logging setup for the identity service.
//!
//! Library crates only emit `tracing` events; the subscriber is installed
//! once, by the composing binary or service, through [`init_logging`].

use tracing::Span;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Filter used when neither the config nor `RUST_LOG` provides one.
pub const DEFAULT_FILTER: &str = "info,keystone=debug";

/// How events are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colored. Debug builds default to this.
    Pretty,
    Compact,
    /// One JSON object per event. Release builds default to this.
    Json,
}

#[allow(clippy::derivable_impls)]
impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) { LogFormat::Pretty } else { LogFormat::Json }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Source file and line on every event
    pub include_location: bool,
    pub include_target: bool,
    /// Emit events when spans open and close
    pub log_spans: bool,
    /// `EnvFilter` directives; `RUST_LOG` or [`DEFAULT_FILTER`] when unset
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            include_location: cfg!(debug_assertions),
            include_target: true,
            log_spans: false,
            filter: None,
        }
    }
}

impl LogConfig {
    /// Default settings filtered at `level` for everything.
    pub fn with_level(level: &str) -> Self {
        Self { filter: Some(level.to_lowercase()), ..Self::default() }
    }

    fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        match &self.filter {
            Some(directives) => Ok(EnvFilter::try_new(directives)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
        }
    }
}

/// Install the global subscriber.
///
/// Fails if the filter does not parse or a subscriber is already installed.
pub fn init_logging(config: LogConfig) -> anyhow::Result<()> {
    let env_filter = config.env_filter()?;
    let span_events = if config.log_spans { FmtSpan::NEW | FmtSpan::CLOSE } else { FmtSpan::NONE };

    let fmt = tracing_subscriber::fmt::layer()
        .with_target(config.include_target)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(span_events);
    let fmt = match config.format {
        LogFormat::Pretty => fmt.pretty().boxed(),
        LogFormat::Compact => fmt.compact().boxed(),
        LogFormat::Json => fmt.json().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install {:?} logger: {}", config.format, e))?;

    tracing::info!(format = ?config.format, spans = config.log_spans, "Logging initialized");
    Ok(())
}

/// Span for one identity operation on behalf of a user.
pub fn identity_span(operation: &str, user_id: &str) -> Span {
    tracing::info_span!(
        "identity",
        operation = operation,
        user_id = user_id,
        outcome = tracing::field::Empty,
        duration_ms = tracing::field::Empty,
    )
}

/// Record how an identity operation ended.
pub fn record_outcome(span: &Span, outcome: &str, duration_ms: u128) {
    span.record("outcome", outcome);
    span.record("duration_ms", duration_ms);
}

/// Warn when an operation took longer than `threshold_ms`. Name scans grow
/// with the collection, so this is where they show up first.
pub fn log_slow_operation(operation: &str, duration_ms: u128, threshold_ms: u128) {
    if duration_ms > threshold_ms {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            threshold_ms = threshold_ms,
            "Slow identity operation"
        );
    }
}
