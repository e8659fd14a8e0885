//! Tracing subscriber setup for the service binary

use hrlink_domain::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{value}'")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(DEFAULT_FILTER)
            .map_err(|source| LoggingError::Filter { value: DEFAULT_FILTER.into(), source }),
    }
}

/// Install the global subscriber in the configured output format.
///
/// # Errors
/// Fails when a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let subscriber = subscriber(config.format, env_filter()?, std::io::stdout);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| LoggingError::Subscriber(Box::new(err)))
}

/// Subscriber writing `format` lines to `writer`.
fn subscriber<W>(format: LogFormat, filter: EnvFilter, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder =
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(writer);

    match format {
        LogFormat::Json => Box::new(builder.json().with_current_span(true).finish()),
        LogFormat::Pretty => Box::new(builder.pretty().finish()),
    }
}
