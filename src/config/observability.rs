use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

/// `[observability]` section. Lyceum only emits logs; there is no metrics
/// or trace export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[observability.logging]`. `RUST_LOG`, when set, replaces `level` and
/// `filter` entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub timestamps: bool,
    /// Attach source file and line to each event.
    pub file_line: bool,
    /// Extra directives appended after the level, e.g. `"lyceum::authz=debug"`.
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            timestamps: true,
            file_line: false,
            filter: None,
        }
    }
}

impl LoggingConfig {
    /// Directives used when neither `RUST_LOG` nor `filter` is set.
    ///
    /// sqlx logs every statement at info, which drowns out request logs.
    pub fn default_directives(&self) -> String {
        format!(
            "{},sqlx=warn,hyper=warn,h2=warn,tower=warn,tower_http={}",
            self.level, self.level
        )
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // LevelFilter displays as the lowercase directive name.
        write!(f, "{}", LevelFilter::from(*self).to_string().to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Multi-line output for local development.
    Pretty,
    #[default]
    Compact,
    /// One JSON object per event, including the request span.
    Json,
}
