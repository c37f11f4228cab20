use env_logger::Env;

/// Initialise `log` output from RUST_LOG, defaulting to info.
/// Logs go to stderr so stdout stays clean for JSON previews.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_target(true)
        .try_init();
}
