use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber: a fmt layer filtered by
/// `RUST_LOG`, defaulting to `info`.
pub fn init_telemetry() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}
