use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. RUST_LOG, when set, replaces the
/// `--log-level` directive entirely.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,sqlite_webgui={log_level},tower_http={log_level}"
        ))
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
