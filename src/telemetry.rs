use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LogFormat;

/// Installs the global `tracing` subscriber. Verbosity follows `RUST_LOG`,
/// defaulting to `info`.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(true);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if let Err(e) = installed {
        eprintln!("tracing init failed: {e}");
    }
}
