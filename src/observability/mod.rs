//! Observability: structured logging with configurable output formats.

mod tracing_init;

pub use tracing_init::*;
