use tracing_subscriber::EnvFilter;

/// Installs a `tracing_subscriber` filtered by `PI_PROGRESS_LOG`, then `RUST_LOG`, then `info`.
///
/// Logs go to stderr so the `Progress: P%` stream on stdout stays clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .init();
}

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("PI_PROGRESS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
