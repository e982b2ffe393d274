use tracing_subscriber::EnvFilter;

use crate::error::{AppError, AppResult};

const DEFAULT_FILTER: &str = "warn";

/// Installs the stderr subscriber. An explicit level wins over `RUST_LOG`.
pub fn init_logging(level: Option<&str>) -> AppResult<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|err| AppError::Configuration(format!("invalid log level '{level}': {err}")))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}
