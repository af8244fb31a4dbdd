use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over `default_filter`. Logs go to stderr so they never mix
/// with the snapshot and replies on stdout.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
