//! Tracing subscriber setup for binaries and tests.

use tracing_subscriber::{fmt, EnvFilter};

use crate::types::{GraphError, Result};

/// Installs a global `fmt` subscriber filtered by `filter`
/// (`RUST_LOG` syntax, e.g. `"sombra_slots=debug"`).
pub fn init_logging(filter: &str) -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(filter)
                .map_err(|e| GraphError::InvalidArgument(format!("invalid log filter: {e}")))?,
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| GraphError::InvalidArgument("logging already initialized".into()))
}
