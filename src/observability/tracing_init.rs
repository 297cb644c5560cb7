//! Global subscriber setup.

use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::LevelFilter, fmt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingConfig, ObservabilityConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global tracing subscriber.
///
/// Fails if one is already installed, which happens when a command is
/// invoked twice in the same process.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<(), TracingError> {
    let logging = &config.logging;

    tracing_subscriber::registry()
        .with(format_layer(logging))
        .with(build_env_filter(logging))
        .try_init()
        .map_err(|e| TracingError::Init(e.to_string()))
}

fn format_layer(logging: &LoggingConfig) -> BoxedLayer {
    let base = fmt::layer()
        .with_file(logging.file_line)
        .with_line_number(logging.file_line);

    match (logging.format, logging.timestamps) {
        (LogFormat::Pretty, true) => base.pretty().boxed(),
        (LogFormat::Pretty, false) => base.pretty().without_time().boxed(),
        (LogFormat::Compact, true) => base.compact().boxed(),
        (LogFormat::Compact, false) => base.compact().without_time().boxed(),
        // The request span carries the request id, so keep it on every line.
        (LogFormat::Json, true) => base
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        (LogFormat::Json, false) => base
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .without_time()
            .boxed(),
    }
}

fn build_env_filter(logging: &LoggingConfig) -> EnvFilter {
    let fallback = || {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from(logging.level).into())
            .parse_lossy("")
    };

    // RUST_LOG wins over everything in the config file
    let directives = match std::env::var("RUST_LOG") {
        Ok(env) => env,
        Err(_) => match &logging.filter {
            Some(filter) => format!("{},{}", logging.level, filter),
            None => logging.default_directives(),
        },
    };

    EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("Ignoring invalid log filter {directives:?}: {e}");
        fallback()
    })
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}
