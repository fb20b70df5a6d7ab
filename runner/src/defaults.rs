use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber; `RUST_LOG` wins over the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
