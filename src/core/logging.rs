//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g.
/// `RUST_LOG=skyprobe=debug` to see per-dispatch statistics.
///
/// # Example
/// ```
/// skyprobe::core::logging::init();
/// log::info!("Probe renderer ready");
/// ```
pub fn init() {
    // try_init: tests and benches may call this more than once
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
